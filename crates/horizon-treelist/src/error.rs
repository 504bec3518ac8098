//! Error types for the tree engine.
//!
//! Operations on models the tree does not know about are not errors: they are
//! silent no-ops that return `None` or `false`. Errors only arise when a
//! host-supplied collaborator fails, and they are returned to the caller of
//! the operation that triggered the collaborator without being retried.

use thiserror::Error;

/// Boxed error returned by host-supplied collaborators.
pub type DelegateError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while operating on a [`VirtualTree`](crate::model::VirtualTree).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TreeError {
    /// The children source failed while materializing a branch.
    #[error("failed to fetch children of a branch at level {level}")]
    ChildrenFetch {
        /// Level of the branch whose children were requested.
        level: usize,
        /// The collaborator's error.
        #[source]
        source: DelegateError,
    },
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
