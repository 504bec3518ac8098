//! Logging and tracing facilities for Horizon TreeList.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Target and span name constants for filtering by subsystem
//! - Performance tracing hooks for whole-tree operations
//!
//! # Tracing Integration
//!
//! Horizon TreeList uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_treelist=debug")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

use std::time::Instant;

/// Span names used throughout Horizon TreeList for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Whole-tree flatten span.
    pub const FLATTEN: &str = "horizon_treelist::flatten";
    /// Children fetch span.
    pub const FETCH: &str = "horizon_treelist::fetch";
    /// Recursive sibling sort span.
    pub const SORT: &str = "horizon_treelist::sort";
    /// Check state recalculation span.
    pub const CHECK: &str = "horizon_treelist::check";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_treelist_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_treelist_core::signal";
    /// Tree coordinator target.
    pub const TREE: &str = "horizon_treelist::tree";
    /// Lazy children fetching target.
    pub const FETCH: &str = "horizon_treelist::fetch";
    /// Hierarchical checkbox target.
    pub const CHECK: &str = "horizon_treelist::check";
    /// Performance spans target.
    pub const PERF: &str = "horizon_treelist::perf";
}

/// A guard that keeps a performance span entered and reports its duration
/// when dropped.
#[derive(Debug)]
pub struct PerfSpan {
    name: &'static str,
    started: Instant,
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_treelist::perf", "perf", operation = name);
        Self {
            name,
            started: Instant::now(),
            span: span.entered(),
        }
    }

    /// The operation name this span was created with.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        tracing::debug!(
            target: "horizon_treelist::perf",
            operation = self.name,
            elapsed_us = self.started.elapsed().as_micros() as u64,
            "operation finished"
        );
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` crate macros with consistent
/// target naming.
#[macro_export]
macro_rules! treelist_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "horizon_treelist", $($arg)*)
    };
}

#[macro_export]
macro_rules! treelist_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_treelist", $($arg)*)
    };
}

#[macro_export]
macro_rules! treelist_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_treelist", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let span = PerfSpan::new("test_operation");
        assert_eq!(span.name(), "test_operation");
    }

    #[test]
    fn test_perf_span_with_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new("flatten");
            treelist_debug!(rows = 3, "inside span");
        });
    }

    #[test]
    fn test_targets_share_prefix() {
        for target in [targets::TREE, targets::FETCH, targets::CHECK, targets::PERF] {
            assert!(target.starts_with("horizon_treelist::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
