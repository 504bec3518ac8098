//! Core systems for Horizon TreeList.
//!
//! This crate provides the foundational components the tree engine builds on:
//!
//! - **Signal/Slot System**: Type-safe change notification with batching
//! - **Logging**: `tracing` targets, span names and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_treelist_core::Signal;
//!
//! // Create a signal that notifies when a row range changes
//! let rows_removed = Signal::<(usize, usize)>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = rows_removed.connect(|(first, last)| {
//!     println!("rows {first}..={last} removed");
//! });
//!
//! // Suppress notifications during a batch
//! {
//!     let _blocked = rows_removed.block();
//!     rows_removed.emit((0, 1)); // dropped
//! }
//!
//! // Emit the signal
//! rows_removed.emit((4, 7));
//!
//! // Disconnect when done
//! rows_removed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod signal;

pub use logging::PerfSpan;
pub use signal::{BlockGuard, ConnectionGuard, ConnectionId, Signal};
