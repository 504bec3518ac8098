//! Signal/slot system for Horizon TreeList.
//!
//! This module provides a type-safe, Qt-inspired signal/slot mechanism used by
//! the tree engine to announce structural changes (rows inserted or removed,
//! branches expanded, check states recalculated) to whoever renders the rows.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The main signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//! - [`BlockGuard`] - RAII guard that suppresses emission for a batch
//!
//! # Invocation Model
//!
//! The tree engine is single-threaded and synchronous, so every slot is invoked
//! directly on the emitting thread before `emit` returns. Hosts that need to
//! hop threads must marshal inside their own slot.
//!
//! # Batching
//!
//! Batch operations suppress per-step notifications by blocking a signal and
//! emitting a single consolidated notification afterwards. Blocking nests:
//! a signal stays blocked until every [`BlockGuard`] has been dropped.
//!
//! # Example
//!
//! ```
//! use horizon_treelist_core::Signal;
//!
//! // Create a signal that passes a row range
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! // Connect a slot (closure)
//! let conn_id = rows_inserted.connect(|(first, last)| {
//!     println!("rows {first}..={last} inserted");
//! });
//!
//! // Emit the signal
//! rows_inserted.emit((3, 5));
//!
//! // Disconnect when done
//! rows_inserted.disconnect(conn_id);
//! ```

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle for one connected slot, returned by [`Signal::connect`].
    ///
    /// Stays usable for [`Signal::disconnect`] until the slot is removed.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A slot tagged with its connection sequence number. Slot map iteration
/// follows slot indices, which are reused after a disconnect, so emission
/// orders by the sequence number instead.
struct Connection<Args> {
    seq: u64,
    slot: Slot<Args>,
}

type ConnectionTable<Args> = Mutex<SlotMap<ConnectionId, Connection<Args>>>;

/// A notification channel with any number of connected slots.
///
/// Emitting calls every slot with a reference to the arguments, in the order
/// the slots were connected. `Args` is `()` for bare notifications and a tuple
/// such as `(usize, usize)` for row ranges.
pub struct Signal<Args> {
    /// Shared with scoped guards through a weak handle.
    connections: Arc<ConnectionTable<Args>>,
    /// Emission is suppressed while non-zero.
    block_depth: AtomicUsize,
    next_seq: AtomicU64,
}

impl<Args: Clone + Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Clone + Send + 'static> Signal<Args> {
    /// Creates a signal without slots.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
            block_depth: AtomicUsize::new(0),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Connects `slot` and returns a handle for disconnecting it.
    ///
    /// ```
    /// use horizon_treelist_core::Signal;
    ///
    /// let collapsed = Signal::<&'static str>::new();
    /// let id = collapsed.connect(|model| println!("{model} collapsed"));
    /// collapsed.emit("src");
    /// assert!(collapsed.disconnect(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().insert(Connection {
            seq,
            slot: Arc::new(slot),
        })
    }

    /// Connects `slot` for as long as the returned guard lives.
    ///
    /// The guard holds a weak handle to the connection table, so it may
    /// outlive the signal.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id,
        }
    }

    /// Removes one slot. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Removes every slot.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Pushes (`true`) or pops (`false`) one block level.
    ///
    /// Paired calls nest. Prefer [`block`](Self::block), which cannot be left
    /// unbalanced.
    pub fn set_blocked(&self, blocked: bool) {
        if blocked {
            self.block_depth.fetch_add(1, Ordering::SeqCst);
        } else {
            // Saturate at zero: an unbalanced unblock is a no-op.
            let _ = self
                .block_depth
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |depth| {
                    depth.checked_sub(1)
                });
        }
    }

    /// Blocks emission until the returned guard is dropped.
    pub fn block(&self) -> BlockGuard<'_, Args> {
        self.set_blocked(true);
        BlockGuard { signal: self }
    }

    /// Returns `true` while at least one block level is active.
    pub fn is_blocked(&self) -> bool {
        self.block_depth.load(Ordering::SeqCst) > 0
    }

    /// Calls every connected slot with `args`, unless the signal is blocked.
    ///
    /// The slot list is snapshotted before the first call, so a slot may
    /// connect or disconnect on this same signal.
    #[tracing::instrument(skip_all, target = "horizon_treelist_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_treelist_core::signal", "blocked, dropping emission");
            return;
        }

        let slots: Vec<Slot<Args>> = {
            let connections = self.connections.lock();
            let mut ordered: Vec<&Connection<Args>> = connections.values().collect();
            ordered.sort_unstable_by_key(|connection| connection.seq);
            ordered.iter().map(|connection| connection.slot.clone()).collect()
        };
        tracing::trace!(target: "horizon_treelist_core::signal", slots = slots.len(), "emitting");

        for slot in slots {
            slot(&args);
        }
    }
}

/// Disconnects its slot when dropped.
///
/// Returned by [`Signal::connect_scoped`]:
///
/// ```
/// use horizon_treelist_core::Signal;
/// use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let rows_removed = Signal::<(usize, usize)>::new();
/// let removed = Arc::new(AtomicUsize::new(0));
/// {
///     let removed = removed.clone();
///     let _guard = rows_removed.connect_scoped(move |&(first, last)| {
///         removed.fetch_add(last - first + 1, Ordering::SeqCst);
///     });
///     rows_removed.emit((2, 4));
/// }
/// rows_removed.emit((0, 9)); // no longer observed
/// assert_eq!(removed.load(Ordering::SeqCst), 3);
/// ```
pub struct ConnectionGuard<Args> {
    connections: Weak<ConnectionTable<Args>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    /// The id of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().remove(self.id);
        }
    }
}

/// Keeps a signal blocked while alive. Created by [`Signal::block`].
pub struct BlockGuard<'a, Args: Clone + Send + 'static> {
    signal: &'a Signal<Args>,
}

impl<Args: Clone + Send + 'static> Drop for BlockGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.set_blocked(false);
    }
}
