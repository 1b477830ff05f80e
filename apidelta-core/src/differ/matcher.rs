//! Name-based matching of sibling declarations.

use std::collections::HashMap;

use crate::types::DeclarationNode;

/// Outcome of matching one level of old and new siblings.
#[derive(Debug, Default)]
pub struct MatchResult<'a> {
    /// Pairs sharing a name, in old declaration order.
    pub matched: Vec<(&'a DeclarationNode, &'a DeclarationNode)>,
    /// Old-only declarations, in old declaration order.
    pub removed: Vec<&'a DeclarationNode>,
    /// New-only declarations, in new declaration order.
    pub added: Vec<&'a DeclarationNode>,
}

impl MatchResult<'_> {
    pub fn is_identity(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Pair siblings by name.
///
/// Matching never crosses tree levels: only the two given sibling lists are
/// considered.
pub fn match_nodes<'a>(old: &'a [DeclarationNode], new: &'a [DeclarationNode]) -> MatchResult<'a> {
    let new_by_name: HashMap<&str, &DeclarationNode> =
        new.iter().map(|n| (n.name.as_str(), n)).collect();
    let old_by_name: HashMap<&str, &DeclarationNode> =
        old.iter().map(|n| (n.name.as_str(), n)).collect();

    let mut result = MatchResult::default();

    for node in old {
        match new_by_name.get(node.name.as_str()) {
            Some(counterpart) => result.matched.push((node, *counterpart)),
            None => result.removed.push(node),
        }
    }

    result.added = new
        .iter()
        .filter(|n| !old_by_name.contains_key(n.name.as_str()))
        .collect();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn nodes(names: &[&str]) -> Vec<DeclarationNode> {
        names
            .iter()
            .map(|n| DeclarationNode::new(n, NodeKind::Variable))
            .collect()
    }

    #[test]
    fn test_match_nodes_partitions_by_name() {
        let old = nodes(&["a", "b", "c"]);
        let new = nodes(&["d", "c", "a"]);

        let result = match_nodes(&old, &new);

        let matched: Vec<&str> = result.matched.iter().map(|(o, _)| o.name.as_str()).collect();
        assert_eq!(matched, vec!["a", "c"]);
        assert_eq!(result.removed[0].name, "b");
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].name, "d");
        assert!(!result.is_identity());
    }

    #[test]
    fn test_match_nodes_identical_levels() {
        let old = nodes(&["x", "y"]);
        let result = match_nodes(&old, &old);
        assert_eq!(result.matched.len(), 2);
        assert!(result.is_identity());
    }

    #[test]
    fn test_match_nodes_empty_sides() {
        let new = nodes(&["only"]);
        let result = match_nodes(&[], &new);
        assert!(result.matched.is_empty());
        assert_eq!(result.added.len(), 1);

        let result = match_nodes(&new, &[]);
        assert_eq!(result.removed.len(), 1);
    }
}
