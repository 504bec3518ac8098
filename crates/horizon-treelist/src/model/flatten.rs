//! Depth-first projection of the branch tree into visible rows.
//!
//! The [`Flattener`] walks the tree from a branch downwards, descending only
//! into expanded branches, and yields the rows a viewport shows. Filtering uses
//! the rescue rule: a branch stays visible when it matches the model filter or
//! when any of its materialized descendants does.
//!
//! The walk is iterative so very deep trees do not grow the call stack.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use super::branch::{BranchFlags, BranchId, BranchStore};

/// Type alias for a model filter.
///
/// Returns `true` if the model matches and should be shown.
pub type ModelFilter<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;

/// Type alias for a list filter.
///
/// Receives the top-level roots that survived the model filter, in display
/// order, and returns the ones to keep. Models it returns that were not in
/// its input are ignored, and the display order is preserved.
pub type ListFilter<M> = Arc<dyn Fn(&[M]) -> Vec<M> + Send + Sync>;

/// One pass over the tree.
///
/// A flattener borrows the tree state for the duration of a single projection
/// and caches rescue decisions along the way. The connector flags it computes
/// for every sibling group it visits are collected and handed back with
/// [`into_flags`](Self::into_flags) so the caller can store them.
pub(crate) struct Flattener<'a, M> {
    store: &'a BranchStore<M>,
    expanded: &'a HashMap<M, bool>,
    model_filter: Option<&'a ModelFilter<M>>,
    list_filter: Option<&'a ListFilter<M>>,
    rescued: HashMap<BranchId, bool>,
    flags: Vec<(BranchId, BranchFlags)>,
}

impl<'a, M: Clone + Eq + Hash> Flattener<'a, M> {
    pub(crate) fn new(
        store: &'a BranchStore<M>,
        expanded: &'a HashMap<M, bool>,
        model_filter: Option<&'a ModelFilter<M>>,
        list_filter: Option<&'a ListFilter<M>>,
    ) -> Self {
        Self {
            store,
            expanded,
            model_filter,
            list_filter,
            rescued: HashMap::new(),
            flags: Vec::new(),
        }
    }

    /// The trunk is always expanded; every other branch defers to the
    /// expansion table.
    pub(crate) fn is_expanded(&self, id: BranchId) -> bool {
        if id == self.store.trunk() {
            return true;
        }
        self.store
            .model(id)
            .is_some_and(|model| self.expanded.get(model).copied().unwrap_or(false))
    }

    fn matches(&self, id: BranchId) -> bool {
        match (self.model_filter, self.store.model(id)) {
            (Some(filter), Some(model)) => filter(model),
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    /// Applies the rescue rule to one branch.
    pub(crate) fn includes(&mut self, id: BranchId) -> bool {
        if self.model_filter.is_none() {
            return true;
        }
        if let Some(&known) = self.rescued.get(&id) {
            return known;
        }
        if self.matches(id) {
            self.rescued.insert(id, true);
            return true;
        }

        let mut visited = Vec::new();
        let mut stack: Vec<BranchId> = self.store.children(id).to_vec();
        let mut found = false;
        while let Some(next) = stack.pop() {
            match self.rescued.get(&next) {
                Some(true) => {
                    found = true;
                    break;
                }
                Some(false) => continue,
                None => {}
            }
            if self.matches(next) {
                found = true;
                break;
            }
            visited.push(next);
            stack.extend_from_slice(self.store.children(next));
        }

        // A failed search explored every visited subtree completely.
        if !found {
            for branch in visited {
                self.rescued.insert(branch, false);
            }
        }
        self.rescued.insert(id, found);
        found
    }

    /// Children of `id` that pass the filters, regardless of expansion.
    pub(crate) fn included_children(&mut self, id: BranchId) -> Vec<BranchId> {
        let store = self.store;
        let mut children: Vec<BranchId> = store
            .children(id)
            .iter()
            .copied()
            .filter(|&child| self.includes(child))
            .collect();

        if id == store.trunk()
            && let Some(list_filter) = self.list_filter
        {
            let models: Vec<M> = children
                .iter()
                .filter_map(|&child| store.model(child).cloned())
                .collect();
            let keep: HashSet<M> = list_filter(&models).into_iter().collect();
            children.retain(|&child| store.model(child).is_some_and(|model| keep.contains(model)));
        }
        children
    }

    /// Children of an expanded branch that will be shown, with their connector
    /// flags recorded. Collapsed branches have none.
    pub(crate) fn filtered_children(&mut self, id: BranchId) -> Vec<BranchId> {
        if !self.is_expanded(id) {
            return Vec::new();
        }
        let children = self.included_children(id);
        let top_level = id == self.store.trunk();
        let count = children.len();
        for (position, &child) in children.iter().enumerate() {
            self.flags.push((
                child,
                BranchFlags {
                    is_first_branch: top_level && position == 0,
                    is_last_child: position + 1 == count,
                    is_only_branch: top_level && count == 1,
                },
            ));
        }
        children
    }

    /// Visits every visible row below `id` in display order.
    fn walk(&mut self, id: BranchId, mut visit: impl FnMut(BranchId)) {
        let mut stack = vec![self.filtered_children(id).into_iter()];
        loop {
            let next = match stack.last_mut() {
                Some(siblings) => siblings.next(),
                None => break,
            };
            match next {
                Some(child) => {
                    visit(child);
                    if self.is_expanded(child) {
                        let grandchildren = self.filtered_children(child);
                        stack.push(grandchildren.into_iter());
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    /// The rows shown below `id` when it is expanded, in display order.
    pub(crate) fn visible_block(&mut self, id: BranchId) -> Vec<BranchId> {
        let mut rows = Vec::new();
        self.walk(id, |row| rows.push(row));
        rows
    }

    /// Number of rows shown below `id`, without materializing them.
    pub(crate) fn number_visible_descendants(&mut self, id: BranchId) -> usize {
        let mut count = 0;
        self.walk(id, |_| count += 1);
        count
    }

    /// Every visible row of the tree.
    #[cfg(test)]
    pub(crate) fn flatten(&mut self) -> Vec<BranchId> {
        self.visible_block(self.store.trunk())
    }

    pub(crate) fn into_flags(self) -> Vec<(BranchId, BranchFlags)> {
        self.flags
    }
}
