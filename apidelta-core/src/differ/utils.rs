//! Boundary helpers over finished change lists.

use std::collections::BTreeMap;

use crate::differ::changes::{tags, ApiChange};

/// Pre-order flatten of a change forest.
///
/// Entries below the top level are copies tagged `is-nested-change`; the
/// input is left untouched. Flattened entries keep their own nested lists.
pub fn flatten_changes<'a>(changes: &[ApiChange<'a>]) -> Vec<ApiChange<'a>> {
    let mut flat = Vec::new();
    for change in changes {
        flat.push(change.clone());
        flatten_nested(&change.nested_changes, &mut flat);
    }
    flat
}

fn flatten_nested<'a>(changes: &[ApiChange<'a>], flat: &mut Vec<ApiChange<'a>>) {
    for change in changes {
        let mut copy = change.clone();
        copy.descriptor = change.descriptor.with_tag(tags::IS_NESTED_CHANGE);
        flat.push(copy);
        flatten_nested(&change.nested_changes, flat);
    }
}

/// Bucket changes by `target:action[:aspect]`.
pub fn group_changes_by_descriptor<'c, 'a>(
    changes: &'c [ApiChange<'a>],
) -> BTreeMap<String, Vec<&'c ApiChange<'a>>> {
    let mut groups: BTreeMap<String, Vec<&'c ApiChange<'a>>> = BTreeMap::new();
    for change in changes {
        groups
            .entry(change.descriptor.group_key())
            .or_default()
            .push(change);
    }
    groups
}
