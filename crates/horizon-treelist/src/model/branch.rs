//! Branch storage for the virtual tree.
//!
//! Every node of the tree is a [`Branch`] living in a slot-map arena owned by
//! [`BranchStore`]. Parents are referenced by [`BranchId`] rather than by
//! pointer, so the parent/child graph never forms ownership cycles. A branch is
//! never destroyed on its own: it is either reused (when a logically equal model
//! shows up again) or dropped wholesale when the store is cleared.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::mem;

use slotmap::{new_key_type, SlotMap};

use super::comparer::BranchComparer;

new_key_type! {
    /// Key of a branch inside the tree's arena.
    pub struct BranchId;
}

/// Per-render bookkeeping used to draw branch connectors.
///
/// Recomputed every time the branch's sibling group is flattened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BranchFlags {
    /// The branch is the first visible top-level root.
    pub is_first_branch: bool,
    /// The branch is the last visible child of its parent.
    pub is_last_child: bool,
    /// The branch is the only visible top-level root.
    pub is_only_branch: bool,
}

/// One node of the tree.
#[derive(Debug)]
pub(crate) struct Branch<M> {
    /// `None` only for the synthetic trunk.
    pub(crate) model: Option<M>,
    /// Non-owning back-reference. `None` for the trunk and detached branches.
    pub(crate) parent: Option<BranchId>,
    pub(crate) children: Vec<BranchId>,
    pub(crate) already_fetched: bool,
    pub(crate) flags: BranchFlags,
}

impl<M> Branch<M> {
    fn new(model: Option<M>, parent: Option<BranchId>) -> Self {
        Self {
            model,
            parent,
            children: Vec::new(),
            already_fetched: false,
            flags: BranchFlags::default(),
        }
    }
}

/// Arena of branches plus the model→branch table.
pub(crate) struct BranchStore<M> {
    arena: SlotMap<BranchId, Branch<M>>,
    table: HashMap<M, BranchId>,
    trunk: BranchId,
}

impl<M: Clone + Eq + Hash> BranchStore<M> {
    /// Creates a store holding only the trunk.
    pub(crate) fn new() -> Self {
        let mut arena = SlotMap::with_key();
        let mut trunk = Branch::new(None, None);
        // Roots are assigned directly, never fetched.
        trunk.already_fetched = true;
        let trunk = arena.insert(trunk);
        Self {
            arena,
            table: HashMap::new(),
            trunk,
        }
    }

    pub(crate) fn trunk(&self) -> BranchId {
        self.trunk
    }

    /// Number of branches, trunk included.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn get(&self, id: BranchId) -> Option<&Branch<M>> {
        self.arena.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: BranchId) -> Option<&mut Branch<M>> {
        self.arena.get_mut(id)
    }

    pub(crate) fn id_of(&self, model: &M) -> Option<BranchId> {
        self.table.get(model).copied()
    }

    pub(crate) fn model(&self, id: BranchId) -> Option<&M> {
        self.arena.get(id).and_then(|branch| branch.model.as_ref())
    }

    pub(crate) fn children(&self, id: BranchId) -> &[BranchId] {
        self.arena
            .get(id)
            .map(|branch| branch.children.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn child_models(&self, id: BranchId) -> Vec<M> {
        self.children(id)
            .iter()
            .filter_map(|&child| self.model(child).cloned())
            .collect()
    }

    pub(crate) fn parent(&self, id: BranchId) -> Option<BranchId> {
        self.arena.get(id).and_then(|branch| branch.parent)
    }

    pub(crate) fn is_fetched(&self, id: BranchId) -> bool {
        self.arena.get(id).is_some_and(|branch| branch.already_fetched)
    }

    /// Number of steps from `id` up to the trunk, or `None` if the chain does
    /// not reach the trunk.
    ///
    /// The walk is bounded by the arena size so a malformed (cyclic) chain
    /// terminates.
    fn distance_to_trunk(&self, id: BranchId) -> Option<usize> {
        let mut current = id;
        for steps in 0..=self.arena.len() {
            if current == self.trunk {
                return Some(steps);
            }
            current = self.parent(current)?;
        }
        None
    }

    /// Returns `true` if the branch hangs off the trunk.
    pub(crate) fn is_attached(&self, id: BranchId) -> bool {
        self.distance_to_trunk(id).is_some()
    }

    /// Level of an attached branch: top-level roots are level 0.
    ///
    /// The trunk sits at the conceptual level -1 and has no level here.
    pub(crate) fn level(&self, id: BranchId) -> Option<usize> {
        self.distance_to_trunk(id)?.checked_sub(1)
    }

    /// Returns the branch for `model` under `parent`, reusing an existing
    /// branch for a logically equal model.
    ///
    /// A reused branch keeps its cached children and fetch state, takes the new
    /// model instance and is moved under `parent`.
    fn attach(&mut self, parent: BranchId, model: M) -> BranchId {
        let Some(id) = self.table.get(&model).copied() else {
            let id = self.arena.insert(Branch::new(Some(model.clone()), Some(parent)));
            self.table.insert(model, id);
            return id;
        };

        let previous_parent = self.arena.get(id).and_then(|branch| branch.parent);
        if previous_parent != Some(parent)
            && let Some(old) = previous_parent.and_then(|p| self.arena.get_mut(p))
        {
            old.children.retain(|&child| child != id);
        }
        if let Some(branch) = self.arena.get_mut(id) {
            branch.parent = Some(parent);
            branch.model = Some(model.clone());
        }
        // Replace the key so the table holds the newest instance too.
        self.table.remove(&model);
        self.table.insert(model, id);
        id
    }

    /// Installs `models` as the children of `parent` and marks it fetched.
    ///
    /// Previous children that do not reappear are detached: they stay in the
    /// table so a later fetch can reuse them, but no longer reach the trunk.
    pub(crate) fn set_children(&mut self, parent: BranchId, models: Vec<M>) {
        let previous = match self.arena.get_mut(parent) {
            Some(branch) => mem::take(&mut branch.children),
            None => return,
        };

        let children: Vec<BranchId> = models
            .into_iter()
            .map(|model| self.attach(parent, model))
            .collect();

        let kept: HashSet<BranchId> = children.iter().copied().collect();
        for old in previous {
            if !kept.contains(&old)
                && let Some(branch) = self.arena.get_mut(old)
                && branch.parent == Some(parent)
            {
                branch.parent = None;
            }
        }

        if let Some(branch) = self.arena.get_mut(parent) {
            branch.children = children;
            branch.already_fetched = true;
        }
    }

    /// Detaches every child and resets the fetch flag so the next fetch asks
    /// the children source again.
    pub(crate) fn discard_children(&mut self, id: BranchId) {
        let previous = match self.arena.get_mut(id) {
            Some(branch) => {
                branch.already_fetched = false;
                mem::take(&mut branch.children)
            }
            None => return,
        };
        for child in previous {
            if let Some(branch) = self.arena.get_mut(child)
                && branch.parent == Some(id)
            {
                branch.parent = None;
            }
        }
    }

    /// Replaces the stored instance of a logically equal model.
    pub(crate) fn replace_model(&mut self, model: M) -> Option<BranchId> {
        let id = self.table.remove(&model)?;
        if let Some(branch) = self.arena.get_mut(id) {
            branch.model = Some(model.clone());
        }
        self.table.insert(model, id);
        Some(id)
    }

    /// Sorts the direct children of `id`. The sort is stable.
    pub(crate) fn sort_direct(&mut self, id: BranchId, comparer: &BranchComparer<'_, M>) {
        let mut children = match self.arena.get_mut(id) {
            Some(branch) => mem::take(&mut branch.children),
            None => return,
        };
        let arena = &self.arena;
        children.sort_by(|&a, &b| {
            let a = arena.get(a).and_then(|branch| branch.model.as_ref());
            let b = arena.get(b).and_then(|branch| branch.model.as_ref());
            match (a, b) {
                (Some(a), Some(b)) => comparer.compare(a, b),
                _ => std::cmp::Ordering::Equal,
            }
        });
        if let Some(branch) = self.arena.get_mut(id) {
            branch.children = children;
        }
    }

    /// Sorts the children of `id`, then each child's children, top-down.
    pub(crate) fn sort_subtree(&mut self, id: BranchId, comparer: &BranchComparer<'_, M>) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.sort_direct(next, comparer);
            stack.extend_from_slice(self.children(next));
        }
    }

    /// Pre-order walk over the materialized subtree below `id`.
    #[cfg(test)]
    pub(crate) fn descendants(&self, id: BranchId) -> Vec<BranchId> {
        let mut out = Vec::new();
        let mut stack: Vec<BranchId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::comparer::SortKey;

    fn store_with(roots: &[&'static str]) -> BranchStore<&'static str> {
        let mut store = BranchStore::new();
        let trunk = store.trunk();
        store.set_children(trunk, roots.to_vec());
        store
    }

    #[test]
    fn test_trunk_is_fetched_and_levelless() {
        let store: BranchStore<&str> = BranchStore::new();
        assert!(store.is_fetched(store.trunk()));
        assert!(store.is_attached(store.trunk()));
        assert_eq!(store.level(store.trunk()), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_levels() {
        let mut store = store_with(&["root"]);
        let root = store.id_of(&"root").unwrap();
        store.set_children(root, vec!["child"]);
        let child = store.id_of(&"child").unwrap();
        store.set_children(child, vec!["grandchild"]);
        let grandchild = store.id_of(&"grandchild").unwrap();

        assert_eq!(store.level(root), Some(0));
        assert_eq!(store.level(child), Some(1));
        assert_eq!(store.level(grandchild), Some(2));
        assert_eq!(store.parent(grandchild), Some(child));
    }

    #[test]
    fn test_set_children_reuses_equal_models() {
        let mut store = store_with(&["a", "b"]);
        let a = store.id_of(&"a").unwrap();
        store.set_children(a, vec!["a1"]);

        let trunk = store.trunk();
        store.set_children(trunk, vec!["b", "a", "c"]);

        assert_eq!(store.id_of(&"a"), Some(a));
        assert!(store.is_fetched(a));
        assert_eq!(store.child_models(a), vec!["a1"]);
        assert_eq!(store.child_models(trunk), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_dropped_children_are_detached() {
        let mut store = store_with(&["a", "b"]);
        let b = store.id_of(&"b").unwrap();
        let trunk = store.trunk();
        store.set_children(trunk, vec!["a"]);

        assert!(!store.is_attached(b));
        assert_eq!(store.id_of(&"b"), Some(b));
    }

    #[test]
    fn test_attach_moves_branch_between_parents() {
        let mut store = store_with(&["p1", "p2"]);
        let p1 = store.id_of(&"p1").unwrap();
        let p2 = store.id_of(&"p2").unwrap();
        store.set_children(p1, vec!["x"]);
        store.set_children(p2, vec!["x"]);

        let x = store.id_of(&"x").unwrap();
        assert!(store.children(p1).is_empty());
        assert_eq!(store.children(p2), &[x]);
        assert_eq!(store.parent(x), Some(p2));
    }

    #[test]
    fn test_self_parenting_stays_local() {
        let mut store = store_with(&["a", "b"]);
        let a = store.id_of(&"a").unwrap();
        store.set_children(a, vec!["a"]);

        assert!(!store.is_attached(a));
        assert_eq!(store.level(a), None);
        let trunk = store.trunk();
        assert_eq!(store.child_models(trunk), vec!["b"]);
    }

    #[test]
    fn test_discard_children() {
        let mut store = store_with(&["a"]);
        let a = store.id_of(&"a").unwrap();
        store.set_children(a, vec!["a1", "a2"]);
        let a1 = store.id_of(&"a1").unwrap();

        store.discard_children(a);
        assert!(!store.is_fetched(a));
        assert!(store.children(a).is_empty());
        assert!(!store.is_attached(a1));
    }

    #[test]
    fn test_sort_subtree_is_per_sibling_group() {
        let mut store = store_with(&["b", "a"]);
        let b = store.id_of(&"b").unwrap();
        store.set_children(b, vec!["b2", "b1"]);

        fn by_name(x: &&'static str, y: &&'static str, _column: usize) -> std::cmp::Ordering {
            x.cmp(y)
        }
        let comparer = BranchComparer::<&'static str>::new(&by_name, SortKey::ascending(0), None);
        let trunk = store.trunk();
        store.sort_subtree(trunk, &comparer);

        assert_eq!(store.child_models(trunk), vec!["a", "b"]);
        assert_eq!(store.child_models(b), vec!["b1", "b2"]);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut store = store_with(&["a", "b"]);
        let a = store.id_of(&"a").unwrap();
        store.set_children(a, vec!["a1", "a2"]);
        let a1 = store.id_of(&"a1").unwrap();
        store.set_children(a1, vec!["a1x"]);

        let trunk = store.trunk();
        let order: Vec<&str> = store
            .descendants(trunk)
            .into_iter()
            .filter_map(|id| store.model(id).copied())
            .collect();
        assert_eq!(order, vec!["a", "a1", "a1x", "a2", "b"]);
    }

    #[test]
    fn test_replace_model_keeps_branch() {
        let mut store = store_with(&["a"]);
        let a = store.id_of(&"a").unwrap();
        assert_eq!(store.replace_model("a"), Some(a));
        assert_eq!(store.replace_model("missing"), None);
    }
}
