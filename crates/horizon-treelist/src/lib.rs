//! Horizon TreeList - a virtualized hierarchical list engine.
//!
//! A [`VirtualTree`](model::VirtualTree) reconciles a recursive, lazily
//! populated tree of caller-owned models with a flat sequence of rows that a
//! viewport queries by number. It handles expansion and collapse, lazy child
//! fetching, filtering with ancestor rescue, per-branch stable sorting and
//! tri-state checkboxes while keeping row lookups O(1).
//!
//! # Example
//!
//! ```
//! use horizon_treelist::prelude::*;
//!
//! fn main() -> TreeResult<()> {
//!     let delegate = FnDelegate::new(
//!         |path: &String| path.ends_with('/'),
//!         |path: &String| Ok(vec![format!("{path}a.txt"), format!("{path}b.txt")]),
//!     );
//!     let mut tree = VirtualTree::with_delegate(delegate);
//!     tree.set_roots(["docs/".to_string(), "README".to_string()])?;
//!
//!     assert_eq!(tree.expand(&"docs/".to_string())?, Some(0));
//!     assert_eq!(tree.object_count(), 4);
//!     assert_eq!(tree.nth_object(2).map(String::as_str), Some("docs/b.txt"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod debug;
pub mod error;
pub mod model;
pub mod prelude;

pub use error::{TreeError, TreeResult};
pub use horizon_treelist_core::{ConnectionGuard, ConnectionId, Signal};
