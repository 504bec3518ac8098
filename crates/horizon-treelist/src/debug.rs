//! Text rendering of the visible rows for debugging.
//!
//! # Example
//!
//! ```
//! use horizon_treelist::debug::{TreeDebug, TreeFormatOptions, TreeStyle};
//! use horizon_treelist::model::{FnDelegate, VirtualTree};
//!
//! let delegate = FnDelegate::new(
//!     |m: &&'static str| *m == "src",
//!     |_: &&'static str| Ok(vec!["lib.rs", "main.rs"]),
//! );
//! let mut tree = VirtualTree::with_delegate(delegate);
//! tree.set_roots(["src", "Cargo.toml"]).unwrap();
//! tree.expand(&"src").unwrap();
//!
//! let options = TreeFormatOptions {
//!     style: TreeStyle::Ascii,
//!     ..TreeFormatOptions::minimal()
//! };
//! let text = TreeDebug::with_options(options).format(&tree);
//! assert_eq!(text, "\"src\"\n+-- \"lib.rs\"\n`-- \"main.rs\"\n\"Cargo.toml\"\n");
//! ```

use std::fmt;
use std::hash::Hash;

use horizon_treelist_core::treelist_debug;

use crate::model::{CheckState, VirtualTree};

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

impl TreeStyle {
    /// (continuing line, tee, last corner)
    fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "", ""),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to prefix each line with its row number.
    pub show_indices: bool,
    /// Whether to show check states as `[x]`, `[-]` or `[ ]`.
    pub show_check_states: bool,
    /// Whether to mark expandable rows with `+` (collapsed) or `-` (expanded).
    pub show_expansion: bool,
    /// Deepest level to print (None for unlimited).
    pub max_depth: Option<usize>,
    /// Spaces after each continuing line.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_indices: true,
            show_check_states: false,
            show_expansion: true,
            max_depth: None,
            indent_size: 3,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_check_states: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_indices: false,
            show_check_states: false,
            show_expansion: false,
            ..Default::default()
        }
    }
}

/// Renders the visible rows of a [`VirtualTree`] with branch connectors.
///
/// Connectors follow the last-child flags computed by the latest flatten, so
/// the drawing matches what a view would show.
#[derive(Debug, Clone, Default)]
pub struct TreeDebug {
    options: TreeFormatOptions,
}

impl TreeDebug {
    /// Create a debug visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a debug visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the visible rows, labelling models with their `Debug` output.
    pub fn format<M>(&self, tree: &VirtualTree<M>) -> String
    where
        M: Clone + Eq + Hash + Send + fmt::Debug + 'static,
    {
        self.format_with(tree, |model| format!("{model:?}"))
    }

    /// Format the visible rows with a custom label for each model.
    pub fn format_with<M, F>(&self, tree: &VirtualTree<M>, label: F) -> String
    where
        M: Clone + Eq + Hash + Send + 'static,
        F: Fn(&M) -> String,
    {
        let mut output = String::new();
        for (row, model) in tree.visible_objects().iter().enumerate() {
            let level = tree.level(model).unwrap_or(0);
            if self.options.max_depth.is_some_and(|max| level > max) {
                continue;
            }

            if self.options.show_indices {
                output.push_str(&format!("{row:>4} "));
            }
            output.push_str(&self.prefix(tree, model, level));
            if self.options.show_expansion && tree.can_expand(model) {
                output.push_str(if tree.is_expanded(model) { "- " } else { "+ " });
            }
            if self.options.show_check_states {
                output.push_str(match tree.check_state(model) {
                    CheckState::Checked => "[x] ",
                    CheckState::Indeterminate => "[-] ",
                    CheckState::Unchecked => "[ ] ",
                });
            }
            output.push_str(&label(model));
            output.push('\n');
        }
        output
    }

    /// Format the visible rows and emit them as a debug event.
    pub fn log<M>(&self, tree: &VirtualTree<M>)
    where
        M: Clone + Eq + Hash + Send + fmt::Debug + 'static,
    {
        treelist_debug!(rows = tree.object_count(), "visible rows:\n{}", self.format(tree));
    }

    /// Connector prefix for a row at `level`.
    fn prefix<M>(&self, tree: &VirtualTree<M>, model: &M, level: usize) -> String
    where
        M: Clone + Eq + Hash + Send + 'static,
    {
        if level == 0 {
            return String::new();
        }
        let (line, tee, corner) = self.options.style.glyphs();
        let is_last = |m: &M| tree.branch_flags(m).is_some_and(|flags| flags.is_last_child);

        // Ancestors between the root and this row, nearest first.
        let mut ancestors = Vec::with_capacity(level);
        let mut current = tree.parent(model);
        while let Some(parent) = current {
            if ancestors.len() + 1 >= level {
                break;
            }
            current = tree.parent(&parent);
            ancestors.push(parent);
        }

        let mut prefix = String::new();
        for ancestor in ancestors.iter().rev() {
            if self.options.style != TreeStyle::Compact {
                prefix.push_str(if is_last(ancestor) { " " } else { line });
            }
            prefix.push_str(&" ".repeat(self.options.indent_size));
        }
        match self.options.style {
            TreeStyle::Compact => prefix.push_str(&" ".repeat(self.options.indent_size)),
            _ => {
                prefix.push_str(if is_last(model) { corner } else { tee });
                prefix.push(' ');
            }
        }
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FnDelegate;

    fn sample() -> VirtualTree<&'static str> {
        let delegate = FnDelegate::new(
            |m: &&'static str| matches!(*m, "root" | "a"),
            |m: &&'static str| {
                Ok(match *m {
                    "root" => vec!["a", "b"],
                    _ => vec!["a1"],
                })
            },
        );
        let mut tree = VirtualTree::with_delegate(delegate);
        tree.set_roots(["root"]).unwrap();
        tree.expand(&"root").unwrap();
        tree.expand(&"a").unwrap();
        tree
    }

    #[test]
    fn test_ascii_connectors() {
        let tree = sample();
        let debug = TreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::minimal()
        });
        let text = debug.format_with(&tree, |m| m.to_string());
        assert_eq!(text, "root\n+-- a\n|   `-- a1\n`-- b\n");
    }

    #[test]
    fn test_max_depth() {
        let tree = sample();
        let debug = TreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Ascii,
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        });
        let text = debug.format_with(&tree, |m| m.to_string());
        assert_eq!(text, "root\n+-- a\n`-- b\n");
    }

    #[test]
    fn test_markers() {
        let tree = sample();
        let debug = TreeDebug::with_options(TreeFormatOptions {
            style: TreeStyle::Compact,
            show_check_states: true,
            ..TreeFormatOptions::default()
        });
        let text = debug.format_with(&tree, |m| m.to_string());
        let first = text.lines().next().unwrap();
        assert_eq!(first, "   0 - [ ] root");
    }
}
