//! Tri-state checkboxes.
//!
//! Check states live in a side table keyed by model, so they survive branch
//! regeneration the same way expansion does. With hierarchical checkboxes
//! enabled, checking a branch checks its whole subtree and every ancestor
//! shows the aggregate of its materialized children.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use horizon_treelist_core::logging::{span_names, targets};
use horizon_treelist_core::PerfSpan;

use super::branch::BranchId;
use super::tree::VirtualTree;
use crate::error::TreeResult;

/// State of a checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is checked.
    Checked,
    /// Some, but not all, of the item's children are checked.
    Indeterminate,
}

impl CheckState {
    /// Returns `true` if the item is fully checked.
    pub fn is_checked(&self) -> bool {
        matches!(self, CheckState::Checked)
    }

    /// Toggles between Unchecked and Checked.
    /// Indeterminate becomes Checked.
    pub fn toggle(&self) -> CheckState {
        match self {
            CheckState::Checked => CheckState::Unchecked,
            CheckState::Unchecked | CheckState::Indeterminate => CheckState::Checked,
        }
    }

    /// Combines the states of a group of children.
    ///
    /// All Checked gives Checked, all Unchecked gives Unchecked and anything
    /// else gives Indeterminate. Returns `None` for an empty group.
    pub fn aggregate<I>(states: I) -> Option<CheckState>
    where
        I: IntoIterator<Item = CheckState>,
    {
        let mut states = states.into_iter();
        let first = states.next()?;
        if first == CheckState::Indeterminate {
            return Some(CheckState::Indeterminate);
        }
        for state in states {
            if state != first {
                return Some(CheckState::Indeterminate);
            }
        }
        Some(first)
    }
}

/// Guards ancestor recalculation against re-entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum RecalcState {
    #[default]
    Idle,
    Recalculating,
}

/// Check states keyed by model. Absent means Unchecked.
#[derive(Debug)]
pub(crate) struct CheckTable<M> {
    states: HashMap<M, CheckState>,
    recalc: RecalcState,
    /// Collects inherited states while a check operation is running, so they
    /// are reported with it instead of separately.
    pending: Option<Vec<M>>,
}

impl<M> Default for CheckTable<M> {
    fn default() -> Self {
        Self {
            states: HashMap::new(),
            recalc: RecalcState::Idle,
            pending: None,
        }
    }
}

impl<M: Clone + Eq + Hash> CheckTable<M> {
    pub(crate) fn get(&self, model: &M) -> CheckState {
        self.states.get(model).copied().unwrap_or_default()
    }

    /// Stores `state`, recording the model in `changed` if it differs.
    fn write(&mut self, model: &M, state: CheckState, changed: &mut Vec<M>) {
        if self.get(model) == state {
            return;
        }
        if state == CheckState::Unchecked {
            self.states.remove(model);
        } else {
            self.states.insert(model.clone(), state);
        }
        changed.push(model.clone());
    }

    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }

    /// Moves the entry for a logically equal model onto the new instance.
    pub(crate) fn rekey(&mut self, model: &M) {
        if let Some(state) = self.states.remove(model) {
            self.states.insert(model.clone(), state);
        }
    }
}

/// Orders the ancestors of several models so every branch comes before its
/// own ancestors.
///
/// `paths` holds each model's ancestors, nearest first, concatenated. Keeping
/// only the last occurrence of each ancestor preserves that order.
fn deepest_first<M: Clone + Eq + Hash>(paths: Vec<M>) -> Vec<M> {
    let mut seen = HashSet::new();
    let mut ordered: Vec<M> = paths
        .into_iter()
        .rev()
        .filter(|model| seen.insert(model.clone()))
        .collect();
    ordered.reverse();
    ordered
}

impl<M> VirtualTree<M>
where
    M: Clone + Eq + Hash + Send + 'static,
{
    /// The check state of a model. Unknown models are Unchecked.
    pub fn check_state(&self, model: &M) -> CheckState {
        self.checks.get(model)
    }

    /// Sets the check state of one model.
    ///
    /// With hierarchical checkboxes, Checked and Unchecked are pushed down to
    /// the whole subtree (fetching children without expanding them) and the
    /// ancestors are recalculated.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ChildrenFetch`](crate::error::TreeError::ChildrenFetch)
    /// if the children source fails while pushing the state down. Ancestors
    /// are still recalculated for the part of the subtree already updated.
    pub fn set_check_state(&mut self, model: &M, state: CheckState) -> TreeResult<()> {
        self.set_check_states([(model.clone(), state)])
    }

    /// Sets the check states of several models as one operation.
    ///
    /// Emits a single `check_states_changed` listing every model whose state
    /// changed, including recalculated ancestors.
    pub fn set_check_states<I>(&mut self, states: I) -> TreeResult<()>
    where
        I: IntoIterator<Item = (M, CheckState)>,
    {
        let mut changed = Vec::new();
        let mut touched = Vec::new();
        let mut fetched = false;
        let mut result = Ok(());
        self.checks.pending = Some(Vec::new());

        for (model, state) in states {
            let applied = self.apply_check_state(&model, state, &mut changed);
            touched.push(model);
            match applied {
                Ok(any) => fetched |= any,
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }

        if let Some(inherited) = self.checks.pending.take() {
            changed.extend(inherited);
        }
        if self.config.hierarchical_checkboxes {
            self.recalculate_ancestors(&touched, &mut changed);
        }
        if fetched {
            self.refresh_rescue();
        }
        let mut reported = HashSet::new();
        changed.retain(|model| reported.insert(model.clone()));
        if !changed.is_empty() {
            tracing::debug!(target: targets::CHECK, changed = changed.len(), "check states changed");
            self.signals.check_states_changed.emit(changed);
        }
        result
    }

    /// Flips a model between Checked and Unchecked and returns the new state.
    pub fn toggle_check_state(&mut self, model: &M) -> TreeResult<CheckState> {
        let state = self.check_state(model).toggle();
        self.set_check_state(model, state)?;
        Ok(state)
    }

    /// Every model currently Checked, in no particular order.
    pub fn checked_objects(&self) -> Vec<M> {
        self.checks
            .states
            .iter()
            .filter(|&(_, state)| state.is_checked())
            .map(|(model, _)| model.clone())
            .collect()
    }

    /// Unchecks every model.
    pub fn uncheck_all(&mut self) {
        let changed: Vec<M> = self.checks.states.keys().cloned().collect();
        self.checks.clear();
        if !changed.is_empty() {
            self.signals.check_states_changed.emit(changed);
        }
    }

    /// Writes `state` and, for hierarchical checkboxes, pushes it down.
    /// Returns `true` if any children had to be fetched.
    fn apply_check_state(
        &mut self,
        model: &M,
        state: CheckState,
        changed: &mut Vec<M>,
    ) -> TreeResult<bool> {
        self.checks.write(model, state, changed);
        if !self.config.hierarchical_checkboxes || state == CheckState::Indeterminate {
            return Ok(false);
        }
        let Some(id) = self.store.id_of(model) else {
            return Ok(false);
        };

        let mut fetched = false;
        let mut seen: HashSet<BranchId> = HashSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            fetched |= self.fetch_children(next)?;
            for child in self.store.child_models(next) {
                self.checks.write(&child, state, changed);
            }
            stack.extend_from_slice(self.store.children(next));
        }
        Ok(fetched)
    }

    /// Ancestors of `model`, nearest first.
    fn ancestors_of(&self, model: &M) -> Vec<M> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::new();
        let mut current = model.clone();
        while let Some(parent) = self.parent(&current) {
            if !seen.insert(parent.clone()) {
                break;
            }
            ancestors.push(parent.clone());
            current = parent;
        }
        ancestors
    }

    /// Recomputes every ancestor of `models` from its materialized children,
    /// deepest first so each parent sees its children's final state.
    fn recalculate_ancestors(&mut self, models: &[M], changed: &mut Vec<M>) {
        if self.checks.recalc == RecalcState::Recalculating {
            return;
        }
        self.checks.recalc = RecalcState::Recalculating;
        let _perf = PerfSpan::new(span_names::CHECK);

        let paths: Vec<M> = models
            .iter()
            .flat_map(|model| self.ancestors_of(model))
            .collect();
        for ancestor in deepest_first(paths) {
            let Some(id) = self.store.id_of(&ancestor) else {
                continue;
            };
            let children = self.store.child_models(id);
            let aggregate = CheckState::aggregate(children.iter().map(|child| self.checks.get(child)));
            if let Some(state) = aggregate {
                self.checks.write(&ancestor, state, changed);
            }
        }

        self.checks.recalc = RecalcState::Idle;
    }

    /// Freshly fetched children of a checked parent start out checked.
    pub(super) fn inherit_check_state(&mut self, id: BranchId) {
        if !self.config.hierarchical_checkboxes || !self.config.inherit_checked_on_fetch {
            return;
        }
        let Some(parent) = self.store.model(id) else {
            return;
        };
        if !self.checks.get(parent).is_checked() {
            return;
        }
        // Inside a check operation the inherited models join its single
        // notification; otherwise they get one of their own.
        let batched = self.checks.pending.is_some();
        let mut inherited = self.checks.pending.take().unwrap_or_default();
        let reported = inherited.len();
        for child in self.store.child_models(id) {
            self.checks.write(&child, CheckState::Checked, &mut inherited);
        }
        tracing::trace!(
            target: targets::CHECK,
            inherited = inherited.len() - reported,
            "children inherited checked state"
        );

        if batched {
            self.checks.pending = Some(inherited);
        } else if !inherited.is_empty() {
            self.signals.check_states_changed.emit(inherited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        assert_eq!(CheckState::Unchecked.toggle(), CheckState::Checked);
        assert_eq!(CheckState::Checked.toggle(), CheckState::Unchecked);
        assert_eq!(CheckState::Indeterminate.toggle(), CheckState::Checked);
    }

    #[test]
    fn test_aggregate() {
        use CheckState::*;
        assert_eq!(CheckState::aggregate(std::iter::empty()), None);
        assert_eq!(CheckState::aggregate([Checked, Checked]), Some(Checked));
        assert_eq!(CheckState::aggregate([Unchecked]), Some(Unchecked));
        assert_eq!(CheckState::aggregate([Checked, Unchecked]), Some(Indeterminate));
        assert_eq!(CheckState::aggregate([Indeterminate, Indeterminate]), Some(Indeterminate));
    }

    #[test]
    fn test_deepest_first() {
        // leaf1 under b under a; leaf2 under a.
        let paths = vec!["b", "a", "a"];
        assert_eq!(deepest_first(paths), vec!["b", "a"]);

        let paths = vec!["a", "b", "c", "b", "c"];
        assert_eq!(deepest_first(paths), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_table_write_reports_changes_once() {
        let mut table = CheckTable::default();
        let mut changed = Vec::new();
        table.write(&1, CheckState::Checked, &mut changed);
        table.write(&1, CheckState::Checked, &mut changed);
        table.write(&2, CheckState::Unchecked, &mut changed);
        assert_eq!(changed, vec![1]);
        assert_eq!(table.get(&1), CheckState::Checked);
        assert_eq!(table.get(&2), CheckState::Unchecked);
    }
}
