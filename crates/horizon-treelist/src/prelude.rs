//! Prelude module for Horizon TreeList.
//!
//! ```ignore
//! use horizon_treelist::prelude::*;
//! ```

pub use crate::config::TreeConfig;
pub use crate::error::{DelegateError, TreeError, TreeResult};
pub use crate::model::{
    CheckState, FnDelegate, ListFilter, ModelComparer, ModelFilter, NeverExpand, SortKey,
    SortOrder, TreeDelegate, TreeSignals, VirtualTree,
};
pub use horizon_treelist_core::Signal;
