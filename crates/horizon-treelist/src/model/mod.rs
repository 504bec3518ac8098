//! The virtual tree engine.
//!
//! This module turns a lazily materialized hierarchy of caller-owned models
//! into a flat list of rows that a fixed-size viewport can query by number.
//!
//! # Core Types
//!
//! - `VirtualTree`: The coordinator. Owns the branches and the visible projection
//! - `TreeDelegate`: The strategy describing how models nest
//! - `ModelComparer` / `BranchComparer`: Per-sibling-group ordering
//! - `CheckState`: Tri-state checkbox values
//! - `TreeSignals`: Signals for change notifications
//!
//! # Example
//!
//! ```
//! use horizon_treelist::model::{FnDelegate, SortOrder, VirtualTree};
//!
//! // Numbers below 10 have three children each.
//! let delegate = FnDelegate::new(
//!     |n: &u32| *n < 10,
//!     |n: &u32| Ok(vec![n * 10 + 3, n * 10 + 1, n * 10 + 2]),
//! );
//! let mut tree = VirtualTree::builder()
//!     .delegate(delegate)
//!     .comparer(|a: &u32, b: &u32, _column: usize| a.cmp(b))
//!     .build();
//!
//! tree.set_roots([2, 1]).unwrap();
//! tree.expand(&1).unwrap();
//! tree.sort(0, SortOrder::Ascending);
//! assert_eq!(tree.visible_objects(), &[1, 11, 12, 13, 2]);
//!
//! // Views follow along through signals.
//! tree.signals().rows_inserted.connect(|&(first, last)| {
//!     println!("rows {first}..={last} appeared");
//! });
//! tree.expand(&2).unwrap();
//! assert_eq!(tree.object_count(), 8);
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐  children   ┌──────────────┐  flatten   ┌──────────────┐
//! │ TreeDelegate │────────────>│ BranchStore  │───────────>│ visible rows │
//! └──────────────┘             │  (slot map)  │            │ + row index  │
//!                              └──────────────┘            └──────────────┘
//!                                     ^                           │
//!                    expansion table  │           TreeSignals     v
//!                    check table ─────┘                        views
//! ```

mod branch;
mod check;
mod comparer;
mod delegate;
mod flatten;
mod signals;
mod tree;

pub use branch::BranchFlags;
pub use check::CheckState;
pub use comparer::{BranchComparer, ModelComparer, SortKey, SortOrder};
pub use delegate::{CanExpandFn, ChildrenFn, FnDelegate, NeverExpand, ParentFn, TreeDelegate};
pub use flatten::{ListFilter, ModelFilter};
pub use signals::TreeSignals;
pub use tree::{VirtualTree, VirtualTreeBuilder};
