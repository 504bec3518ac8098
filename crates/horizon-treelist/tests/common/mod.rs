//! Shared fixture: a mutable in-memory hierarchy that counts fetches.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use horizon_treelist::error::DelegateError;
use horizon_treelist::model::TreeDelegate;
use parking_lot::Mutex;

pub type Node = &'static str;

#[derive(Clone, Default)]
pub struct Shape {
    children: Arc<Mutex<HashMap<Node, Vec<Node>>>>,
    calls: Arc<Mutex<HashMap<Node, usize>>>,
    failing: Arc<Mutex<HashSet<Node>>>,
}

impl Shape {
    /// Every listed parent is expandable, even with no children.
    pub fn new(entries: &[(Node, &[Node])]) -> Self {
        let shape = Self::default();
        for (parent, children) in entries {
            shape.set(*parent, children);
        }
        shape
    }

    pub fn set(&self, parent: Node, children: &[Node]) {
        self.children.lock().insert(parent, children.to_vec());
    }

    pub fn calls(&self, model: Node) -> usize {
        self.calls.lock().get(model).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn fail(&self, model: Node) {
        self.failing.lock().insert(model);
    }

    pub fn heal(&self, model: Node) {
        self.failing.lock().remove(model);
    }
}

impl TreeDelegate<Node> for Shape {
    fn can_expand(&self, model: &Node) -> bool {
        self.children.lock().contains_key(model)
    }

    fn children(&self, model: &Node) -> Result<Vec<Node>, DelegateError> {
        *self.calls.lock().entry(*model).or_insert(0) += 1;
        if self.failing.lock().contains(model) {
            return Err(format!("cannot list {model}").into());
        }
        Ok(self.children.lock().get(model).cloned().unwrap_or_default())
    }

    fn parent(&self, model: &Node) -> Option<Node> {
        self.children
            .lock()
            .iter()
            .find(|(_, children)| children.contains(model))
            .map(|(parent, _)| *parent)
    }
}

/// Installs a `tracing` subscriber once so `RUST_LOG` works in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
