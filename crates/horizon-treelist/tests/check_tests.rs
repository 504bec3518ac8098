//! Tests for tri-state checkbox aggregation.

mod common;

use std::sync::Arc;

use common::{Node, Shape, init_tracing};
use horizon_treelist::config::TreeConfig;
use horizon_treelist::model::{CheckState, VirtualTree};
use parking_lot::Mutex;

/// G { P { L1, L2, L3 }, Q { M1 } }, H
fn hierarchical() -> (VirtualTree<Node>, Shape) {
    init_tracing();
    let shape = Shape::new(&[("G", &["P", "Q"]), ("P", &["L1", "L2", "L3"]), ("Q", &["M1"])]);
    let mut tree = VirtualTree::builder()
        .delegate(shape.clone())
        .config(TreeConfig::new().hierarchical_checkboxes(true))
        .build();
    tree.set_roots(["G", "H"]).unwrap();
    (tree, shape)
}

fn materialize(tree: &mut VirtualTree<Node>) {
    for branch in ["G", "P", "Q"] {
        tree.children(&branch).unwrap();
    }
}

#[test]
fn test_checking_every_leaf_checks_parent() {
    let (mut tree, _) = hierarchical();
    materialize(&mut tree);

    tree.set_check_state(&"L1", CheckState::Checked).unwrap();
    assert_eq!(tree.check_state(&"P"), CheckState::Indeterminate);
    assert_eq!(tree.check_state(&"G"), CheckState::Indeterminate);

    tree.set_check_states([("L2", CheckState::Checked), ("L3", CheckState::Checked)])
        .unwrap();
    assert_eq!(tree.check_state(&"P"), CheckState::Checked);
    assert_eq!(tree.check_state(&"G"), CheckState::Indeterminate);

    tree.set_check_state(&"M1", CheckState::Checked).unwrap();
    assert_eq!(tree.check_state(&"Q"), CheckState::Checked);
    assert_eq!(tree.check_state(&"G"), CheckState::Checked);
    assert_eq!(tree.check_state(&"H"), CheckState::Unchecked);
}

#[test]
fn test_unchecking_one_leaf_marks_ancestors_indeterminate() {
    let (mut tree, _) = hierarchical();
    tree.set_check_state(&"G", CheckState::Checked).unwrap();
    assert_eq!(tree.check_state(&"L2"), CheckState::Checked);

    tree.set_check_state(&"L2", CheckState::Unchecked).unwrap();
    assert_eq!(tree.check_state(&"P"), CheckState::Indeterminate);
    assert_eq!(tree.check_state(&"G"), CheckState::Indeterminate);
    assert_eq!(tree.check_state(&"Q"), CheckState::Checked);
}

#[test]
fn test_checking_branch_fetches_without_expanding() {
    let (mut tree, shape) = hierarchical();
    tree.set_check_state(&"G", CheckState::Checked).unwrap();

    for model in ["P", "Q", "L1", "L2", "L3", "M1"] {
        assert_eq!(tree.check_state(&model), CheckState::Checked, "{model}");
    }
    assert_eq!(shape.calls("P"), 1);
    assert!(!tree.is_expanded(&"G"));
    assert_eq!(tree.visible_objects(), &["G", "H"]);
}

#[test]
fn test_batch_emits_one_notification() {
    let (mut tree, _) = hierarchical();
    materialize(&mut tree);

    let batches = Arc::new(Mutex::new(Vec::new()));
    let seen = batches.clone();
    tree.signals()
        .check_states_changed
        .connect(move |changed: &Vec<Node>| seen.lock().push(changed.clone()));

    tree.set_check_states([
        ("L1", CheckState::Checked),
        ("L2", CheckState::Checked),
        ("L3", CheckState::Checked),
    ])
    .unwrap();

    let batches = batches.lock();
    assert_eq!(batches.len(), 1);
    let mut changed = batches[0].clone();
    changed.sort();
    assert_eq!(changed, vec!["G", "L1", "L2", "L3", "P"]);
}

#[test]
fn test_new_children_inherit_checked_parent() {
    let (mut tree, shape) = hierarchical();
    tree.set_check_state(&"P", CheckState::Checked).unwrap();

    shape.set("P", &["L1", "L4"]);
    tree.expand(&"G").unwrap();
    tree.expand(&"P").unwrap();
    tree.rebuild_children(&"P").unwrap();
    assert_eq!(tree.check_state(&"L4"), CheckState::Checked);
}

#[test]
fn test_inheritance_can_be_disabled() {
    let shape = Shape::new(&[("P", &["L1"])]);
    let mut tree = VirtualTree::builder()
        .delegate(shape.clone())
        .config(
            TreeConfig::new()
                .hierarchical_checkboxes(true)
                .inherit_checked_on_fetch(false),
        )
        .build();
    tree.set_roots(["P"]).unwrap();
    tree.set_check_state(&"P", CheckState::Checked).unwrap();

    shape.set("P", &["L1", "L2"]);
    tree.rebuild_children(&"P").unwrap();
    tree.children(&"P").unwrap();
    assert_eq!(tree.check_state(&"L1"), CheckState::Checked);
    assert_eq!(tree.check_state(&"L2"), CheckState::Unchecked);
}

#[test]
fn test_indeterminate_is_not_pushed_down() {
    let (mut tree, _) = hierarchical();
    materialize(&mut tree);
    tree.set_check_state(&"P", CheckState::Indeterminate).unwrap();
    assert_eq!(tree.check_state(&"L1"), CheckState::Unchecked);
}

#[test]
fn test_flat_checkboxes_are_independent() {
    init_tracing();
    let shape = Shape::new(&[("P", &["L1"])]);
    let mut tree = VirtualTree::with_delegate(shape);
    tree.set_roots(["P"]).unwrap();
    tree.children(&"P").unwrap();

    tree.set_check_state(&"L1", CheckState::Checked).unwrap();
    assert_eq!(tree.check_state(&"P"), CheckState::Unchecked);
    tree.set_check_state(&"L1", CheckState::Unchecked).unwrap();
    tree.set_check_state(&"P", CheckState::Checked).unwrap();
    assert_eq!(tree.check_state(&"L1"), CheckState::Unchecked);

    tree.set_check_state(&"L1", CheckState::Checked).unwrap();
    tree.set_check_state(&"L1", CheckState::Unchecked).unwrap();
    assert_eq!(tree.check_state(&"P"), CheckState::Checked);
}

#[test]
fn test_toggle_and_uncheck_all() {
    let (mut tree, _) = hierarchical();
    materialize(&mut tree);
    assert_eq!(tree.toggle_check_state(&"H").unwrap(), CheckState::Checked);
    assert_eq!(tree.toggle_check_state(&"Q").unwrap(), CheckState::Checked);

    let mut checked = tree.checked_objects();
    checked.sort();
    assert_eq!(checked, vec!["H", "M1", "Q"]);

    tree.uncheck_all();
    assert!(tree.checked_objects().is_empty());
    assert_eq!(tree.check_state(&"G"), CheckState::Unchecked);
}

#[test]
fn test_check_states_survive_regeneration() {
    let (mut tree, _) = hierarchical();
    materialize(&mut tree);
    tree.set_check_state(&"P", CheckState::Checked).unwrap();
    tree.regenerate_tree().unwrap();
    assert_eq!(tree.check_state(&"L3"), CheckState::Checked);

    tree.discard_all_state().unwrap();
    assert_eq!(tree.check_state(&"L3"), CheckState::Unchecked);
}

#[test]
fn test_ancestors_found_through_delegate() {
    let (mut tree, _) = hierarchical();
    // Only G is materialized; L1 has no branch yet.
    tree.children(&"G").unwrap();
    tree.set_check_state(&"L1", CheckState::Checked).unwrap();
    assert_eq!(tree.check_state(&"L1"), CheckState::Checked);
    // P has a branch but no fetched children, so it has nothing to aggregate.
    assert_eq!(tree.check_state(&"P"), CheckState::Unchecked);
}
