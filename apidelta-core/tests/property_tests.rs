mod common;

use apidelta_core::{
    diff, flatten_changes, group_changes_by_descriptor, tags, ApiChange, DiffOptions,
};
use common::arb_snapshot;
use proptest::prelude::*;

/// `(path, is_top_level)` in pre-order.
fn preorder(changes: &[ApiChange<'_>], top: bool, out: &mut Vec<(String, bool)>) {
    for change in changes {
        out.push((change.path.clone(), top));
        preorder(&change.nested_changes, false, out);
    }
}

proptest! {
    #[test]
    fn prop_diff_with_itself_is_empty(tree in arb_snapshot()) {
        prop_assert!(diff(&tree, &tree, &DiffOptions::default()).is_empty());
    }

    #[test]
    fn prop_flatten_visits_every_change_once_in_preorder(
        old in arb_snapshot(),
        new in arb_snapshot(),
    ) {
        let changes = diff(&old, &new, &DiffOptions::default());
        let flat = flatten_changes(&changes);

        let mut expected = Vec::new();
        preorder(&changes, true, &mut expected);
        let total: usize = changes.iter().map(|c| c.total_len()).sum();

        prop_assert_eq!(flat.len(), total);
        prop_assert_eq!(flat.len(), expected.len());
        for (entry, (path, top)) in flat.iter().zip(&expected) {
            prop_assert_eq!(&entry.path, path);
            prop_assert_eq!(entry.descriptor.has_tag(tags::IS_NESTED_CHANGE), !*top);
        }
    }

    #[test]
    fn prop_grouping_partitions_changes(old in arb_snapshot(), new in arb_snapshot()) {
        let changes = flatten_changes(&diff(&old, &new, &DiffOptions::default()));
        let groups = group_changes_by_descriptor(&changes);

        let grouped: usize = groups.values().map(|g| g.len()).sum();
        prop_assert_eq!(grouped, changes.len());
        for (key, members) in &groups {
            let segments = key.split(':').count();
            prop_assert!(segments == 2 || segments == 3, "bad key {}", key);
            for change in members {
                prop_assert_eq!(&change.descriptor.group_key(), key);
            }
        }
    }

    #[test]
    fn prop_diff_is_deterministic(old in arb_snapshot(), new in arb_snapshot()) {
        let first = serde_json::to_string(&diff(&old, &new, &DiffOptions::default())).unwrap();
        let second = serde_json::to_string(&diff(&old, &new, &DiffOptions::default())).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_aspect_present_iff_modified(old in arb_snapshot(), new in arb_snapshot()) {
        for change in flatten_changes(&diff(&old, &new, &DiffOptions::default())) {
            let modified = change.descriptor.action() == apidelta_core::ChangeAction::Modified;
            prop_assert_eq!(change.descriptor.aspect().is_some(), modified);
            prop_assert_eq!(change.descriptor.impact().is_some(), modified);
        }
    }
}
