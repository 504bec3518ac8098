//! Tree configuration.

use crate::model::SortKey;

/// Behavioural switches for a [`VirtualTree`](crate::model::VirtualTree).
///
/// # Example
///
/// ```
/// use horizon_treelist::config::TreeConfig;
/// use horizon_treelist::model::SortKey;
///
/// let config = TreeConfig::new()
///     .hierarchical_checkboxes(true)
///     .secondary_sort(SortKey::ascending(0));
/// assert!(config.hierarchical_checkboxes);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Parent check states follow their children, and checking a parent
    /// checks its whole subtree.
    pub hierarchical_checkboxes: bool,
    /// `set_roots` re-expands branches that were expanded before the call.
    pub restore_expansion: bool,
    /// Children fetched under a checked parent start out checked.
    /// Only meaningful with hierarchical checkboxes.
    pub inherit_checked_on_fetch: bool,
    /// Tie-breaker applied when the primary sort key compares equal.
    pub secondary_sort: Option<SortKey>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            hierarchical_checkboxes: false,
            restore_expansion: true,
            inherit_checked_on_fetch: true,
            secondary_sort: None,
        }
    }
}

impl TreeConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable hierarchical checkboxes.
    pub fn hierarchical_checkboxes(mut self, enabled: bool) -> Self {
        self.hierarchical_checkboxes = enabled;
        self
    }

    /// Enable or disable expansion restore on `set_roots`.
    pub fn restore_expansion(mut self, enabled: bool) -> Self {
        self.restore_expansion = enabled;
        self
    }

    /// Enable or disable check inheritance for freshly fetched children.
    pub fn inherit_checked_on_fetch(mut self, enabled: bool) -> Self {
        self.inherit_checked_on_fetch = enabled;
        self
    }

    /// Set the secondary sort key.
    pub fn secondary_sort(mut self, key: SortKey) -> Self {
        self.secondary_sort = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TreeConfig::default();
        assert!(!config.hierarchical_checkboxes);
        assert!(config.restore_expansion);
        assert!(config.inherit_checked_on_fetch);
        assert_eq!(config.secondary_sort, None);
    }

    #[test]
    fn test_chained_setters() {
        let config = TreeConfig::new()
            .restore_expansion(false)
            .inherit_checked_on_fetch(false)
            .secondary_sort(SortKey::descending(2));
        assert!(!config.restore_expansion);
        assert!(!config.inherit_checked_on_fetch);
        assert_eq!(config.secondary_sort, Some(SortKey::descending(2)));
    }
}
