//! The tree coordinator.
//!
//! [`VirtualTree`] owns the branch arena and keeps a flat projection of the
//! visible branches in step with it. The projection is a `Vec` of models plus a
//! model→row table, so row lookups in both directions are O(1). Expanding or
//! collapsing a visible branch splices only that branch's block of rows;
//! whole-tree operations rebuild the projection in one pass.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use horizon_treelist_core::logging::{span_names, targets};
use horizon_treelist_core::{treelist_debug, treelist_trace, treelist_warn, PerfSpan};

use super::branch::{BranchFlags, BranchId, BranchStore};
use super::check::CheckTable;
use super::comparer::{BranchComparer, ModelComparer, SortKey, SortOrder};
use super::delegate::{NeverExpand, TreeDelegate};
use super::flatten::{Flattener, ListFilter, ModelFilter};
use super::signals::TreeSignals;
use crate::config::TreeConfig;
use crate::error::{TreeError, TreeResult};

/// A lazily materialized tree exposed as a flat, row-indexed list.
///
/// The tree never owns the domain data. Models are cheap handles compared by
/// logical equality: a refreshed instance equal to an old one reuses its
/// branch, its expansion state and its check state.
///
/// # Example
///
/// ```
/// use horizon_treelist::model::{FnDelegate, VirtualTree};
///
/// // "a" has two children, everything else is a leaf.
/// let delegate = FnDelegate::new(
///     |m: &&'static str| *m == "a",
///     |_: &&'static str| Ok(vec!["a1", "a2"]),
/// );
/// let mut tree = VirtualTree::with_delegate(delegate);
/// tree.set_roots(["a", "b"]).unwrap();
/// assert_eq!(tree.object_count(), 2);
///
/// assert_eq!(tree.expand(&"a").unwrap(), Some(0));
/// assert_eq!(tree.visible_objects(), &["a", "a1", "a2", "b"]);
/// assert_eq!(tree.object_index(&"b"), Some(3));
/// ```
pub struct VirtualTree<M> {
    pub(super) store: BranchStore<M>,
    pub(super) visible: Vec<M>,
    pub(super) index_table: HashMap<M, usize>,
    /// Outlives branch regeneration; cleared only by `discard_all_state`.
    pub(super) expanded_table: HashMap<M, bool>,
    pub(super) delegate: Box<dyn TreeDelegate<M>>,
    pub(super) comparer: Option<Box<dyn ModelComparer<M>>>,
    pub(super) sort_key: Option<SortKey>,
    pub(super) model_filter: Option<ModelFilter<M>>,
    pub(super) list_filter: Option<ListFilter<M>>,
    pub(super) checks: CheckTable<M>,
    pub(super) config: TreeConfig,
    pub(super) signals: TreeSignals<M>,
}

impl<M> VirtualTree<M>
where
    M: Clone + Eq + Hash + Send + 'static,
{
    /// Creates a tree in which nothing can be expanded.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a tree whose shape is described by `delegate`.
    pub fn with_delegate(delegate: impl TreeDelegate<M> + 'static) -> Self {
        Self::builder().delegate(delegate).build()
    }

    /// Starts building a tree.
    pub fn builder() -> VirtualTreeBuilder<M> {
        VirtualTreeBuilder::new()
    }

    /// The tree's change notifications.
    pub fn signals(&self) -> &TreeSignals<M> {
        &self.signals
    }

    /// The tree's configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Replaces the strategy used to compare models when sorting.
    ///
    /// The current order is kept until the next [`sort`](Self::sort).
    pub fn set_comparer(&mut self, comparer: impl ModelComparer<M> + 'static) {
        self.comparer = Some(Box::new(comparer));
    }

    // =========================================================================
    // Projection bookkeeping
    // =========================================================================

    pub(super) fn flattener(&self) -> Flattener<'_, M> {
        Flattener::new(
            &self.store,
            &self.expanded_table,
            self.model_filter.as_ref(),
            self.list_filter.as_ref(),
        )
    }

    fn store_flags(&mut self, flags: Vec<(BranchId, BranchFlags)>) {
        for (id, value) in flags {
            if let Some(branch) = self.store.get_mut(id) {
                branch.flags = value;
            }
        }
    }

    fn models_of(&self, ids: &[BranchId]) -> Vec<M> {
        ids.iter()
            .filter_map(|&id| self.store.model(id).cloned())
            .collect()
    }

    /// The rows shown below `id`, with connector flags refreshed.
    fn block_of(&mut self, id: BranchId) -> Vec<M> {
        let mut flattener = self.flattener();
        let block = flattener.visible_block(id);
        let flags = flattener.into_flags();
        self.store_flags(flags);
        self.models_of(&block)
    }

    fn visible_count_below(&self, id: BranchId) -> usize {
        self.flattener().number_visible_descendants(id)
    }

    /// Re-flattens the whole tree and rebuilds the index table.
    pub(super) fn rebuild_visible(&mut self) {
        let _perf = PerfSpan::new(span_names::FLATTEN);
        let trunk = self.store.trunk();
        self.visible = self.block_of(trunk);
        self.index_table.clear();
        self.reindex_from(0);
        tracing::trace!(target: targets::TREE, rows = self.visible.len(), "rebuilt visible list");
    }

    fn reindex_from(&mut self, start: usize) {
        for (row, model) in self.visible.iter().enumerate().skip(start) {
            self.index_table.insert(model.clone(), row);
        }
    }

    /// Replaces `remove` rows at `at` with `insert`, patching the index table
    /// for the affected suffix only.
    fn splice_rows(&mut self, at: usize, remove: usize, insert: Vec<M>) {
        let removed: Vec<M> = self.visible.splice(at..at + remove, insert).collect();
        for model in &removed {
            self.index_table.remove(model);
        }
        self.reindex_from(at);
    }

    /// Re-flattens when a model filter is active, since freshly materialized
    /// descendants may rescue branches that were hidden.
    pub(super) fn refresh_rescue(&mut self) {
        if self.model_filter.is_some() {
            self.rebuild_visible();
            self.signals.layout_changed.emit(());
        }
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    fn branch_expanded(&self, id: BranchId) -> bool {
        self.store
            .model(id)
            .is_some_and(|model| self.expanded_table.get(model).copied().unwrap_or(false))
    }

    /// Fetches the children of `id` unless that already happened this fetch
    /// cycle. Returns `true` if the children source was asked.
    pub(super) fn fetch_children(&mut self, id: BranchId) -> TreeResult<bool> {
        if self.store.is_fetched(id) {
            return Ok(false);
        }
        let Some(model) = self.store.model(id).cloned() else {
            return Ok(false);
        };
        if !self.delegate.can_expand(&model) {
            self.store.set_children(id, Vec::new());
            return Ok(false);
        }

        self.signals.fetching.emit((model.clone(), true));
        let fetched = self.delegate.children(&model);
        self.signals.fetching.emit((model.clone(), false));

        let children = match fetched {
            Ok(children) => children,
            Err(source) => {
                let level = self.store.level(id).unwrap_or(0);
                treelist_warn!(branch_level = level, error = %source, "children source failed");
                // An expanded branch must hold fetched children.
                if let Some(expanded) = self.expanded_table.get_mut(&model) {
                    *expanded = false;
                }
                return Err(TreeError::ChildrenFetch { level, source });
            }
        };
        tracing::debug!(target: targets::FETCH, count = children.len(), "fetched children");

        self.store.set_children(id, children);
        self.sort_fetched(id);
        self.inherit_check_state(id);
        Ok(true)
    }

    fn sort_fetched(&mut self, id: BranchId) {
        let Some(key) = self.sort_key else {
            return;
        };
        let Some(comparer) = self.comparer.as_deref() else {
            return;
        };
        let comparer = BranchComparer::new(comparer, key, self.config.secondary_sort);
        self.store.sort_subtree(id, &comparer);
    }

    /// Fetches `id` and every descendant remembered as expanded.
    ///
    /// Returns `true` if the children source was asked at least once.
    fn materialize(&mut self, id: BranchId) -> TreeResult<bool> {
        let mut fetched = false;
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            fetched |= self.fetch_children(next)?;
            stack.extend(
                self.store
                    .children(next)
                    .iter()
                    .copied()
                    .filter(|&child| self.branch_expanded(child)),
            );
        }
        Ok(fetched)
    }

    // =========================================================================
    // Roots
    // =========================================================================

    /// Replaces the top-level models.
    ///
    /// Branches of models equal to previous roots are reused along with their
    /// cached children. When [`TreeConfig::restore_expansion`] is set, roots
    /// that were expanded before stay expanded; otherwise the expansion table
    /// is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ChildrenFetch`] if re-expanding a remembered branch
    /// fails. The roots are installed and the projection is consistent either
    /// way.
    pub fn set_roots<I>(&mut self, roots: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = M>,
    {
        let restore = self.config.restore_expansion;
        self.install_roots(roots.into_iter().collect(), restore)
    }

    /// Appends top-level models, keeping the expansion of existing roots.
    pub fn add_roots<I>(&mut self, roots: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = M>,
    {
        let mut all = self.roots();
        let known: HashSet<M> = all.iter().cloned().collect();
        all.extend(roots.into_iter().filter(|model| !known.contains(model)));
        self.install_roots(all, true)
    }

    /// Removes top-level models, keeping the expansion of the remaining roots.
    pub fn remove_roots<I>(&mut self, roots: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = M>,
    {
        let doomed: HashSet<M> = roots.into_iter().collect();
        let remaining: Vec<M> = self
            .roots()
            .into_iter()
            .filter(|model| !doomed.contains(model))
            .collect();
        self.install_roots(remaining, true)
    }

    fn install_roots(&mut self, roots: Vec<M>, restore: bool) -> TreeResult<()> {
        let _perf = PerfSpan::new("set_roots");
        if !restore {
            self.expanded_table.clear();
        }
        let trunk = self.store.trunk();
        let count = roots.len();
        self.store.set_children(trunk, roots);
        if let Some(key) = self.sort_key
            && let Some(comparer) = self.comparer.as_deref()
        {
            let comparer = BranchComparer::new(comparer, key, self.config.secondary_sort);
            self.store.sort_direct(trunk, &comparer);
        }

        self.signals.suspend();
        let result = self.materialize(trunk);
        self.signals.resume();

        self.rebuild_visible();
        treelist_debug!(roots = count, rows = self.visible.len(), "roots installed");
        self.signals.model_reset.emit(());
        result.map(|_| ())
    }

    /// The top-level models, in display order before filtering.
    pub fn roots(&self) -> Vec<M> {
        self.store.child_models(self.store.trunk())
    }

    /// Drops every branch and rebuilds the tree from the current roots,
    /// re-expanding every branch remembered as expanded.
    ///
    /// Check states and the expansion table survive.
    pub fn regenerate_tree(&mut self) -> TreeResult<()> {
        let roots = self.roots();
        self.store = BranchStore::new();
        self.visible.clear();
        self.index_table.clear();
        self.install_roots(roots, true)
    }

    /// Forgets expansion and check states, then regenerates the tree.
    pub fn discard_all_state(&mut self) -> TreeResult<()> {
        self.expanded_table.clear();
        self.checks.clear();
        self.regenerate_tree()
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Returns `true` if the model is remembered as expanded.
    pub fn is_expanded(&self, model: &M) -> bool {
        self.expanded_table.get(model).copied().unwrap_or(false)
    }

    /// Returns `true` if the model can have children.
    pub fn can_expand(&self, model: &M) -> bool {
        self.delegate.can_expand(model)
    }

    /// Expands a branch, fetching its children if needed.
    ///
    /// Returns the branch's row so a view can redraw from there, or `None`
    /// when the model is unknown, cannot be expanded, is already expanded or
    /// is not currently visible.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ChildrenFetch`] if the children source fails. The
    /// branch stays collapsed in that case.
    pub fn expand(&mut self, model: &M) -> TreeResult<Option<usize>> {
        let Some(id) = self.store.id_of(model) else {
            return Ok(None);
        };
        if !self.store.is_attached(id) || !self.can_expand(model) || self.is_expanded(model) {
            return Ok(None);
        }

        // Fetch before touching the projection so a failure leaves it intact.
        self.expanded_table.insert(model.clone(), true);
        let fetched = match self.materialize(id) {
            Ok(fetched) => fetched,
            Err(err) => {
                self.expanded_table.insert(model.clone(), false);
                self.rebuild_visible();
                self.signals.layout_changed.emit(());
                return Err(err);
            }
        };

        let index = self.index_table.get(model).copied();
        match index {
            Some(row) => {
                let block = self.block_of(id);
                let count = block.len();
                self.splice_rows(row + 1, 0, block);
                self.signals.emit_rows_inserted(row + 1, count);
            }
            None if fetched => self.refresh_rescue(),
            None => {}
        }

        tracing::trace!(target: targets::TREE, row = ?index, "expanded branch");
        self.signals.expanded.emit(model.clone());
        Ok(index)
    }

    /// Collapses a branch.
    ///
    /// Returns the branch's row, or `None` when the model is unknown, already
    /// collapsed or not currently visible. A hidden branch is still marked
    /// collapsed, so it shows up collapsed once revealed.
    pub fn collapse(&mut self, model: &M) -> Option<usize> {
        let id = self.store.id_of(model)?;
        if !self.is_expanded(model) {
            return None;
        }

        let index = self.index_table.get(model).copied();
        let count = match index {
            Some(_) => self.visible_count_below(id),
            None => 0,
        };
        self.expanded_table.insert(model.clone(), false);

        if let Some(row) = index {
            self.splice_rows(row + 1, count, Vec::new());
            self.signals.emit_rows_removed(row + 1, count);
            tracing::trace!(target: targets::TREE, row, removed = count, "collapsed branch");
        }
        self.signals.collapsed.emit(model.clone());
        index
    }

    /// Collapses an expanded branch or expands a collapsed one.
    pub fn toggle_expansion(&mut self, model: &M) -> TreeResult<Option<usize>> {
        if self.is_expanded(model) {
            Ok(self.collapse(model))
        } else {
            self.expand(model)
        }
    }

    /// Expands every expandable branch in the tree.
    ///
    /// Returns `Some(0)` if anything was expanded and `None` if there was
    /// nothing to do. Emits a single `layout_changed`.
    pub fn expand_all(&mut self) -> TreeResult<Option<usize>> {
        let _perf = PerfSpan::new("expand_all");
        self.signals.suspend();
        let result = self.expand_subtrees();
        self.signals.resume();

        self.rebuild_visible();
        self.signals.layout_changed.emit(());
        Ok(result?.then_some(0))
    }

    fn expand_subtrees(&mut self) -> TreeResult<bool> {
        let mut changed = false;
        let mut seen = HashSet::new();
        let mut stack = self.store.children(self.store.trunk()).to_vec();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(model) = self.store.model(id).cloned() else {
                continue;
            };
            if !self.can_expand(&model) {
                continue;
            }
            self.fetch_children(id)?;
            if !self.is_expanded(&model) {
                self.expanded_table.insert(model, true);
                changed = true;
            }
            stack.extend_from_slice(self.store.children(id));
        }
        Ok(changed)
    }

    /// Collapses every branch, including hidden ones.
    ///
    /// Returns `Some(0)` if anything was collapsed and `None` if there was
    /// nothing to do. Emits a single `layout_changed`.
    pub fn collapse_all(&mut self) -> Option<usize> {
        let _perf = PerfSpan::new("collapse_all");
        let mut changed = false;
        for expanded in self.expanded_table.values_mut() {
            changed |= *expanded;
            *expanded = false;
        }
        if !changed {
            return None;
        }
        self.rebuild_visible();
        self.signals.layout_changed.emit(());
        Some(0)
    }

    /// Replaces the remembered expansion with exactly `models` and regenerates
    /// the tree.
    pub fn set_expanded_objects<I>(&mut self, models: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = M>,
    {
        self.expanded_table = models.into_iter().map(|model| (model, true)).collect();
        self.regenerate_tree()
    }

    /// Every model currently remembered as expanded.
    pub fn expanded_objects(&self) -> Vec<M> {
        self.expanded_table
            .iter()
            .filter(|&(_, &expanded)| expanded)
            .map(|(model, _)| model.clone())
            .collect()
    }

    /// Expands every ancestor of `model` so that it becomes visible.
    ///
    /// Ancestors without a branch are found through the delegate's parent
    /// getter. Returns the model's row afterwards, or `None` if it is still
    /// not visible (unknown ancestry or filtered out).
    pub fn reveal(&mut self, model: &M) -> TreeResult<Option<usize>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = model.clone();
        while let Some(parent) = self.parent(&current) {
            if !seen.insert(parent.clone()) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        for ancestor in chain.iter().rev() {
            self.expand(ancestor)?;
        }
        Ok(self.object_index(model))
    }

    // =========================================================================
    // Rebuilding
    // =========================================================================

    /// Discards the cached children of a branch and fetches them again if it
    /// is expanded.
    ///
    /// Only the branch's own block of rows is replaced. Returns the branch's
    /// row, or `None` if it is unknown or not visible.
    pub fn rebuild_children(&mut self, model: &M) -> TreeResult<Option<usize>> {
        let Some(id) = self.store.id_of(model) else {
            return Ok(None);
        };
        let index = self.index_table.get(model).copied();
        let old_count = match index {
            Some(_) => self.visible_count_below(id),
            None => 0,
        };

        self.store.discard_children(id);
        if self.is_expanded(model)
            && let Err(err) = self.materialize(id)
        {
            self.rebuild_visible();
            self.signals.layout_changed.emit(());
            return Err(err);
        }

        if self.model_filter.is_some() {
            // Rescue of the ancestors may have changed.
            self.rebuild_visible();
            self.signals.layout_changed.emit(());
            return Ok(self.object_index(model));
        }

        if let Some(row) = index {
            let block = self.block_of(id);
            let new_count = block.len();
            self.splice_rows(row + 1, old_count, block);
            self.signals.emit_rows_removed(row + 1, old_count);
            self.signals.emit_rows_inserted(row + 1, new_count);
        }
        Ok(index)
    }

    /// Swaps in a new instance of a logically equal model and rebuilds its
    /// children.
    pub fn refresh_object(&mut self, model: M) -> TreeResult<Option<usize>> {
        if self.store.replace_model(model.clone()).is_none() {
            return Ok(None);
        }
        if let Some(row) = self.index_table.remove(&model) {
            self.visible[row] = model.clone();
            self.index_table.insert(model.clone(), row);
        }
        if let Some(expanded) = self.expanded_table.remove(&model) {
            self.expanded_table.insert(model.clone(), expanded);
        }
        self.checks.rekey(&model);
        self.rebuild_children(&model)
    }

    // =========================================================================
    // Sorting and filtering
    // =========================================================================

    /// Sorts every sibling group by `column`.
    ///
    /// The sort is stable and stays active: children fetched later are sorted
    /// the same way. [`SortOrder::None`] clears the active sort and keeps the
    /// current order.
    pub fn sort(&mut self, column: usize, order: SortOrder) {
        if order == SortOrder::None {
            self.sort_key = None;
            return;
        }
        self.sort_key = Some(SortKey::new(column, order));
        if self.comparer.is_none() {
            treelist_warn!(column, "sort requested without a comparer");
            return;
        }

        {
            let _perf = PerfSpan::new(span_names::SORT);
            let trunk = self.store.trunk();
            self.sort_fetched(trunk);
        }
        treelist_trace!(column, ?order, "sorted every sibling group");
        self.rebuild_visible();
        self.signals.layout_changed.emit(());
    }

    /// The active sort key, if any.
    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    /// Replaces both filters and re-flattens.
    ///
    /// A branch stays visible when it matches `model_filter` or when any of
    /// its materialized descendants does. `list_filter` then narrows the
    /// surviving top-level roots.
    pub fn apply_filters(
        &mut self,
        model_filter: Option<ModelFilter<M>>,
        list_filter: Option<ListFilter<M>>,
    ) {
        let _perf = PerfSpan::new("apply_filters");
        self.model_filter = model_filter;
        self.list_filter = list_filter;
        self.rebuild_visible();
        self.signals.layout_changed.emit(());
    }

    /// Replaces the model filter, keeping the list filter.
    pub fn set_model_filter<F>(&mut self, filter: F)
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        let list_filter = self.list_filter.take();
        self.apply_filters(Some(Arc::new(filter)), list_filter);
    }

    /// Removes both filters.
    pub fn clear_filters(&mut self) {
        self.apply_filters(None, None);
    }

    /// Returns `true` if a model or list filter is active.
    pub fn is_filtered(&self) -> bool {
        self.model_filter.is_some() || self.list_filter.is_some()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The model at visible row `n`.
    pub fn nth_object(&self, n: usize) -> Option<&M> {
        self.visible.get(n)
    }

    /// The visible row of `model`, or `None` if it is not visible.
    pub fn object_index(&self, model: &M) -> Option<usize> {
        self.index_table.get(model).copied()
    }

    /// Number of visible rows.
    pub fn object_count(&self) -> usize {
        self.visible.len()
    }

    /// Every visible model, in row order.
    pub fn visible_objects(&self) -> &[M] {
        &self.visible
    }

    /// The children of a branch, fetching them if needed but without
    /// expanding it. Filters do not apply.
    ///
    /// A branch that is remembered as expanded but was never fetched (its
    /// last fetch failed) has its rows spliced in once the fetch succeeds.
    pub fn children(&mut self, model: &M) -> TreeResult<Vec<M>> {
        let Some(id) = self.store.id_of(model) else {
            return Ok(Vec::new());
        };
        let expanded = self.is_expanded(model);
        let index = self.index_table.get(model).copied();
        let old_count = match index {
            Some(_) if expanded => self.visible_count_below(id),
            _ => 0,
        };
        let result = if expanded {
            self.materialize(id)
        } else {
            self.fetch_children(id)
        };
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(err) => {
                self.rebuild_visible();
                self.signals.layout_changed.emit(());
                return Err(err);
            }
        };
        if fetched {
            if self.model_filter.is_some() {
                self.refresh_rescue();
            } else if expanded && let Some(row) = index {
                let block = self.block_of(id);
                let new_count = block.len();
                self.splice_rows(row + 1, old_count, block);
                self.signals.emit_rows_removed(row + 1, old_count);
                self.signals.emit_rows_inserted(row + 1, new_count);
            }
        }
        Ok(self.store.child_models(id))
    }

    /// The materialized children of a branch that pass the active filters.
    pub fn filtered_children(&self, model: &M) -> Vec<M> {
        let Some(id) = self.store.id_of(model) else {
            return Vec::new();
        };
        let ids = self.flattener().included_children(id);
        self.models_of(&ids)
    }

    /// Number of rows shown below a branch. Zero when it is collapsed.
    pub fn visible_descendant_count(&self, model: &M) -> usize {
        match self.store.id_of(model) {
            Some(id) if self.is_expanded(model) => self.visible_count_below(id),
            _ => 0,
        }
    }

    /// The parent of a model.
    ///
    /// Uses the branch structure for attached models and falls back to the
    /// delegate's parent getter otherwise. Top-level roots have no parent.
    pub fn parent(&self, model: &M) -> Option<M> {
        match self.store.id_of(model) {
            Some(id) if self.store.is_attached(id) => {
                let parent = self.store.parent(id)?;
                self.store.model(parent).cloned()
            }
            _ => self.delegate.parent(model),
        }
    }

    /// Depth of a model: top-level roots are level 0.
    pub fn level(&self, model: &M) -> Option<usize> {
        let id = self.store.id_of(model)?;
        self.store.level(id)
    }

    /// Connector bookkeeping from the last time the model's sibling group was
    /// flattened.
    pub fn branch_flags(&self, model: &M) -> Option<BranchFlags> {
        let id = self.store.id_of(model)?;
        self.store.get(id).map(|branch| branch.flags)
    }
}

impl<M> Default for VirtualTree<M>
where
    M: Clone + Eq + Hash + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`VirtualTree`].
///
/// # Example
///
/// ```
/// use horizon_treelist::config::TreeConfig;
/// use horizon_treelist::model::{NeverExpand, VirtualTree};
///
/// let tree = VirtualTree::<u32>::builder()
///     .delegate(NeverExpand)
///     .comparer(|a: &u32, b: &u32, _column: usize| a.cmp(b))
///     .config(TreeConfig::new().hierarchical_checkboxes(true))
///     .build();
/// assert_eq!(tree.object_count(), 0);
/// ```
pub struct VirtualTreeBuilder<M> {
    delegate: Option<Box<dyn TreeDelegate<M>>>,
    comparer: Option<Box<dyn ModelComparer<M>>>,
    config: TreeConfig,
    model_filter: Option<ModelFilter<M>>,
    list_filter: Option<ListFilter<M>>,
}

impl<M> Default for VirtualTreeBuilder<M>
where
    M: Clone + Eq + Hash + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M> VirtualTreeBuilder<M>
where
    M: Clone + Eq + Hash + Send + 'static,
{
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            delegate: None,
            comparer: None,
            config: TreeConfig::default(),
            model_filter: None,
            list_filter: None,
        }
    }

    /// Set the strategy describing how models nest.
    pub fn delegate(mut self, delegate: impl TreeDelegate<M> + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    /// Set the strategy used to compare models when sorting.
    pub fn comparer(mut self, comparer: impl ModelComparer<M> + 'static) -> Self {
        self.comparer = Some(Box::new(comparer));
        self
    }

    /// Set the configuration.
    pub fn config(mut self, config: TreeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial model filter.
    pub fn model_filter(mut self, filter: ModelFilter<M>) -> Self {
        self.model_filter = Some(filter);
        self
    }

    /// Set the initial list filter.
    pub fn list_filter(mut self, filter: ListFilter<M>) -> Self {
        self.list_filter = Some(filter);
        self
    }

    /// Build the tree. It starts without roots.
    pub fn build(self) -> VirtualTree<M> {
        VirtualTree {
            store: BranchStore::new(),
            visible: Vec::new(),
            index_table: HashMap::new(),
            expanded_table: HashMap::new(),
            delegate: self.delegate.unwrap_or_else(|| Box::new(NeverExpand)),
            comparer: self.comparer,
            sort_key: None,
            model_filter: self.model_filter,
            list_filter: self.list_filter,
            checks: CheckTable::default(),
            config: self.config,
            signals: TreeSignals::new(),
        }
    }
}
