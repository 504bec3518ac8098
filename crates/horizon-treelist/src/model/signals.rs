//! Change notifications emitted by a [`VirtualTree`](super::VirtualTree).

use horizon_treelist_core::Signal;

/// Signals emitted by the tree when its visible projection or its check
/// states change.
///
/// Views connect to these to stay in sync with the flat row list. Row ranges
/// are inclusive and expressed in visible-row indices after the change.
///
/// # Batching
///
/// Whole-tree operations (expand all, collapse all, sort, filtering, regeneration)
/// suppress the per-row signals and emit a single [`layout_changed`](Self::layout_changed)
/// or [`model_reset`](Self::model_reset) instead.
pub struct TreeSignals<M> {
    /// Emitted after rows were inserted into the visible list.
    /// Args: (first row, last row)
    pub rows_inserted: Signal<(usize, usize)>,

    /// Emitted after rows were removed from the visible list.
    /// Args: (first row, last row) as they were before the removal
    pub rows_removed: Signal<(usize, usize)>,

    /// Emitted after a branch was expanded.
    pub expanded: Signal<M>,

    /// Emitted after a branch was collapsed.
    pub collapsed: Signal<M>,

    /// Emitted around each call to the children source.
    /// Args: (model, `true` before the call and `false` after)
    pub fetching: Signal<(M, bool)>,

    /// Emitted after the visible list was rebuilt in place.
    pub layout_changed: Signal<()>,

    /// Emitted after the roots were replaced or all state was discarded.
    pub model_reset: Signal<()>,

    /// Emitted once per check operation with every model whose state changed.
    pub check_states_changed: Signal<Vec<M>>,
}

impl<M: Clone + Send + 'static> Default for TreeSignals<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone + Send + 'static> TreeSignals<M> {
    /// Creates a new set of tree signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            expanded: Signal::new(),
            collapsed: Signal::new(),
            fetching: Signal::new(),
            layout_changed: Signal::new(),
            model_reset: Signal::new(),
            check_states_changed: Signal::new(),
        }
    }

    /// Blocks the per-step signals for the duration of a batch operation.
    ///
    /// `fetching` stays live so a host can keep showing progress. Every call
    /// must be paired with [`resume`](Self::resume).
    pub(crate) fn suspend(&self) {
        self.rows_inserted.set_blocked(true);
        self.rows_removed.set_blocked(true);
        self.expanded.set_blocked(true);
        self.collapsed.set_blocked(true);
        self.check_states_changed.set_blocked(true);
    }

    /// Undoes one [`suspend`](Self::suspend).
    pub(crate) fn resume(&self) {
        self.rows_inserted.set_blocked(false);
        self.rows_removed.set_blocked(false);
        self.expanded.set_blocked(false);
        self.collapsed.set_blocked(false);
        self.check_states_changed.set_blocked(false);
    }

    /// Emits `rows_inserted` for `count` rows starting at `first`.
    pub(crate) fn emit_rows_inserted(&self, first: usize, count: usize) {
        if count > 0 {
            self.rows_inserted.emit((first, first + count - 1));
        }
    }

    /// Emits `rows_removed` for `count` rows starting at `first`.
    pub(crate) fn emit_rows_removed(&self, first: usize, count: usize) {
        if count > 0 {
            self.rows_removed.emit((first, first + count - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_suspend_blocks_rows_but_not_fetching() {
        let signals = TreeSignals::<u32>::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let rows = log.clone();
        signals
            .rows_inserted
            .connect(move |&(first, last)| rows.lock().push(format!("rows {first}..={last}")));
        let fetches = log.clone();
        signals
            .fetching
            .connect(move |&(model, busy)| fetches.lock().push(format!("fetch {model} {busy}")));

        signals.suspend();
        signals.emit_rows_inserted(0, 3);
        signals.fetching.emit((7, true));
        signals.resume();
        signals.emit_rows_inserted(1, 2);

        assert_eq!(*log.lock(), vec!["fetch 7 true", "rows 1..=2"]);
    }

    #[test]
    fn test_empty_ranges_are_not_emitted() {
        let signals = TreeSignals::<u32>::new();
        let count = Arc::new(Mutex::new(0));
        let seen = count.clone();
        signals.rows_removed.connect(move |_| *seen.lock() += 1);

        signals.emit_rows_removed(4, 0);
        assert_eq!(*count.lock(), 0);
    }
}
