//! Host-supplied strategy describing the shape of the tree.
//!
//! The tree never owns the domain objects it shows. It asks a [`TreeDelegate`]
//! whether a model can have children, what those children are, and
//! (optionally) who a model's parent is.

use std::sync::Arc;

use crate::error::DelegateError;

/// Strategy that tells a [`VirtualTree`](super::VirtualTree) how models nest.
///
/// # Contract
///
/// - [`can_expand`](Self::can_expand) is queried very frequently and must be
///   cheap and free of side effects.
/// - [`children`](Self::children) may be expensive. The tree calls it at most
///   once per branch per fetch cycle, and blocks until it returns.
/// - [`parent`](Self::parent) is optional. It is used to reveal models whose
///   ancestors have not been materialized yet and to walk up from models that
///   have no branch when recalculating check states.
///
/// # Example
///
/// ```
/// use horizon_treelist::error::DelegateError;
/// use horizon_treelist::model::TreeDelegate;
///
/// struct Directories;
///
/// impl TreeDelegate<String> for Directories {
///     fn can_expand(&self, path: &String) -> bool {
///         path.ends_with('/')
///     }
///
///     fn children(&self, path: &String) -> Result<Vec<String>, DelegateError> {
///         Ok(vec![format!("{path}README"), format!("{path}src/")])
///     }
/// }
/// ```
pub trait TreeDelegate<M> {
    /// Returns `true` if the model can have children.
    fn can_expand(&self, model: &M) -> bool;

    /// Returns the children of the model, in their natural order.
    fn children(&self, model: &M) -> Result<Vec<M>, DelegateError>;

    /// Returns the parent of the model, if the host knows it.
    ///
    /// The default returns `None`.
    fn parent(&self, _model: &M) -> Option<M> {
        None
    }
}

/// The default strategy: nothing can be expanded, so the tree behaves as a
/// flat list of its roots.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverExpand;

impl<M> TreeDelegate<M> for NeverExpand {
    fn can_expand(&self, _model: &M) -> bool {
        false
    }

    fn children(&self, _model: &M) -> Result<Vec<M>, DelegateError> {
        Ok(Vec::new())
    }
}

/// Type alias for an expandability predicate.
pub type CanExpandFn<M> = Arc<dyn Fn(&M) -> bool + Send + Sync>;

/// Type alias for a children getter.
pub type ChildrenFn<M> = Arc<dyn Fn(&M) -> Result<Vec<M>, DelegateError> + Send + Sync>;

/// Type alias for a parent getter.
pub type ParentFn<M> = Arc<dyn Fn(&M) -> Option<M> + Send + Sync>;

/// Closure-based [`TreeDelegate`] for when a dedicated type is overkill.
///
/// # Example
///
/// ```
/// use horizon_treelist::model::FnDelegate;
///
/// // Every number below 100 has ten children.
/// let delegate = FnDelegate::new(
///     |n: &u32| *n < 100,
///     |n: &u32| Ok((0..10).map(|i| n * 10 + i + 1).collect()),
/// )
/// .with_parent(|n: &u32| (*n > 10).then(|| (n - 1) / 10));
/// ```
pub struct FnDelegate<M> {
    can_expand: CanExpandFn<M>,
    children: ChildrenFn<M>,
    parent: Option<ParentFn<M>>,
}

impl<M> FnDelegate<M> {
    /// Creates a delegate from an expandability predicate and a children getter.
    pub fn new<E, C>(can_expand: E, children: C) -> Self
    where
        E: Fn(&M) -> bool + Send + Sync + 'static,
        C: Fn(&M) -> Result<Vec<M>, DelegateError> + Send + Sync + 'static,
    {
        Self {
            can_expand: Arc::new(can_expand),
            children: Arc::new(children),
            parent: None,
        }
    }

    /// Sets the parent getter.
    pub fn with_parent<P>(mut self, parent: P) -> Self
    where
        P: Fn(&M) -> Option<M> + Send + Sync + 'static,
    {
        self.parent = Some(Arc::new(parent));
        self
    }
}

impl<M> Clone for FnDelegate<M> {
    fn clone(&self) -> Self {
        Self {
            can_expand: self.can_expand.clone(),
            children: self.children.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<M> TreeDelegate<M> for FnDelegate<M> {
    fn can_expand(&self, model: &M) -> bool {
        (self.can_expand)(model)
    }

    fn children(&self, model: &M) -> Result<Vec<M>, DelegateError> {
        (self.children)(model)
    }

    fn parent(&self, model: &M) -> Option<M> {
        self.parent.as_ref().and_then(|parent| parent(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_expand() {
        let delegate = NeverExpand;
        assert!(!TreeDelegate::<i32>::can_expand(&delegate, &1));
        assert!(TreeDelegate::<i32>::children(&delegate, &1).unwrap().is_empty());
        assert_eq!(TreeDelegate::<i32>::parent(&delegate, &1), None);
    }

    #[test]
    fn test_fn_delegate() {
        let delegate = FnDelegate::new(|n: &u32| *n < 10, |n: &u32| Ok(vec![n * 10, n * 10 + 1]))
            .with_parent(|n: &u32| (*n >= 10).then_some(n / 10));

        assert!(delegate.can_expand(&1));
        assert!(!delegate.can_expand(&10));
        assert_eq!(delegate.children(&1).unwrap(), vec![10, 11]);
        assert_eq!(delegate.parent(&11), Some(1));
        assert_eq!(delegate.parent(&1), None);
    }

    #[test]
    fn test_fn_delegate_without_parent() {
        let delegate = FnDelegate::new(|_: &u32| false, |_: &u32| Ok(Vec::new()));
        assert_eq!(delegate.parent(&5), None);
    }
}
