//! Change descriptors and result structures for API diffs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::types::{DeclarationNode, NodeKind, SourceRange};

/// Construct category a change applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeTarget {
    Export,
    Property,
    Method,
    Parameter,
    TypeParameter,
    EnumMember,
    IndexSignature,
    Accessor,
    Constructor,
}

impl ChangeTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeTarget::Export => "export",
            ChangeTarget::Property => "property",
            ChangeTarget::Method => "method",
            ChangeTarget::Parameter => "parameter",
            ChangeTarget::TypeParameter => "type-parameter",
            ChangeTarget::EnumMember => "enum-member",
            ChangeTarget::IndexSignature => "index-signature",
            ChangeTarget::Accessor => "accessor",
            ChangeTarget::Constructor => "constructor",
        }
    }

    /// Category for a node at the given nesting depth.
    ///
    /// Top-level declarations are always exports; nested declarations inside
    /// namespaces are exports as well.
    pub fn for_node(kind: NodeKind, depth: usize) -> Self {
        if depth == 0 {
            return ChangeTarget::Export;
        }
        match kind {
            NodeKind::Property => ChangeTarget::Property,
            NodeKind::Method | NodeKind::CallSignature => ChangeTarget::Method,
            NodeKind::Parameter => ChangeTarget::Parameter,
            NodeKind::TypeParameter => ChangeTarget::TypeParameter,
            NodeKind::EnumMember => ChangeTarget::EnumMember,
            NodeKind::IndexSignature => ChangeTarget::IndexSignature,
            NodeKind::GetAccessor | NodeKind::SetAccessor => ChangeTarget::Accessor,
            NodeKind::Constructor | NodeKind::ConstructSignature => ChangeTarget::Constructor,
            NodeKind::Interface
            | NodeKind::Class
            | NodeKind::Function
            | NodeKind::TypeAlias
            | NodeKind::Enum
            | NodeKind::Variable
            | NodeKind::Namespace => ChangeTarget::Export,
        }
    }
}

/// What happened to the construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeAction {
    Added,
    Removed,
    Renamed,
    Reordered,
    Modified,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Added => "added",
            ChangeAction::Removed => "removed",
            ChangeAction::Renamed => "renamed",
            ChangeAction::Reordered => "reordered",
            ChangeAction::Modified => "modified",
        }
    }
}

/// Which dimension of a modified construct changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeAspect {
    Type,
    Optionality,
    Readonly,
    Visibility,
    Abstractness,
    Staticness,
    ExtendsClause,
    ImplementsClause,
    Deprecation,
    Constraint,
    DefaultType,
    EnumValue,
}

impl ChangeAspect {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAspect::Type => "type",
            ChangeAspect::Optionality => "optionality",
            ChangeAspect::Readonly => "readonly",
            ChangeAspect::Visibility => "visibility",
            ChangeAspect::Abstractness => "abstractness",
            ChangeAspect::Staticness => "staticness",
            ChangeAspect::ExtendsClause => "extends-clause",
            ChangeAspect::ImplementsClause => "implements-clause",
            ChangeAspect::Deprecation => "deprecation",
            ChangeAspect::Constraint => "constraint",
            ChangeAspect::DefaultType => "default-type",
            ChangeAspect::EnumValue => "enum-value",
        }
    }
}

/// Direction of a modification for callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeImpact {
    Widening,
    Narrowing,
    Equivalent,
    Unrelated,
    Undetermined,
}

impl ChangeImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeImpact::Widening => "widening",
            ChangeImpact::Narrowing => "narrowing",
            ChangeImpact::Equivalent => "equivalent",
            ChangeImpact::Unrelated => "unrelated",
            ChangeImpact::Undetermined => "undetermined",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(ChangeTarget, ChangeAction, ChangeAspect, ChangeImpact);

/// Auxiliary descriptor labels.
pub mod tags {
    pub const WAS_REQUIRED: &str = "was-required";
    pub const NOW_OPTIONAL: &str = "now-optional";
    pub const WAS_OPTIONAL: &str = "was-optional";
    pub const NOW_REQUIRED: &str = "now-required";
    pub const HAS_NESTED_CHANGES: &str = "has-nested-changes";
    pub const IS_NESTED_CHANGE: &str = "is-nested-change";
    pub const IS_REST_PARAMETER: &str = "is-rest-parameter";
    pub const IS_OPTIONAL: &str = "is-optional";
    pub const HAS_DEFAULT_VALUE: &str = "has-default-value";
    pub const AFFECTS_TYPE_PARAMETER: &str = "affects-type-parameter";
    pub const NOW_PUBLIC: &str = "now-public";
    pub const NOW_PROTECTED: &str = "now-protected";
    pub const NOW_PRIVATE: &str = "now-private";
    pub const NOW_DEPRECATED: &str = "now-deprecated";
    pub const NO_LONGER_DEPRECATED: &str = "no-longer-deprecated";
}

/// Multi-dimensional classification of one change.
///
/// `aspect` and `impact` are present exactly when `action` is
/// [`ChangeAction::Modified`]; the constructors are the only way to build one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeDescriptor {
    target: ChangeTarget,
    action: ChangeAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    aspect: Option<ChangeAspect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    impact: Option<ChangeImpact>,
    tags: BTreeSet<String>,
}

impl ChangeDescriptor {
    /// Pending descriptor for an action-only change (added, removed, renamed, reordered).
    ///
    /// Passing [`ChangeAction::Modified`] here is a caller bug; it is coerced
    /// to a `type`/`undetermined` modification so the invariant still holds.
    pub fn simple(target: ChangeTarget, action: ChangeAction) -> PendingDescriptor {
        if action == ChangeAction::Modified {
            return Self::modified(target, ChangeAspect::Type, ChangeImpact::Undetermined);
        }
        PendingDescriptor(ChangeDescriptor {
            target,
            action,
            aspect: None,
            impact: None,
            tags: BTreeSet::new(),
        })
    }

    /// Pending descriptor for a modification along one aspect.
    pub fn modified(
        target: ChangeTarget,
        aspect: ChangeAspect,
        impact: ChangeImpact,
    ) -> PendingDescriptor {
        PendingDescriptor(ChangeDescriptor {
            target,
            action: ChangeAction::Modified,
            aspect: Some(aspect),
            impact: Some(impact),
            tags: BTreeSet::new(),
        })
    }

    pub fn target(&self) -> ChangeTarget {
        self.target
    }

    pub fn action(&self) -> ChangeAction {
        self.action
    }

    pub fn aspect(&self) -> Option<ChangeAspect> {
        self.aspect
    }

    pub fn impact(&self) -> Option<ChangeImpact> {
        self.impact
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Copy of this descriptor carrying one more tag.
    pub fn with_tag(&self, tag: &str) -> ChangeDescriptor {
        let mut copy = self.clone();
        copy.tags.insert(tag.to_string());
        copy
    }

    /// The fallback classification that means nothing of interest changed.
    pub fn is_equivalent(&self) -> bool {
        self.action == ChangeAction::Modified
            && self.aspect == Some(ChangeAspect::Type)
            && self.impact == Some(ChangeImpact::Equivalent)
    }

    /// Grouping key: `target:action` or `target:action:aspect`.
    pub fn group_key(&self) -> String {
        match self.aspect {
            Some(aspect) => format!(
                "{}:{}:{}",
                self.target.as_str(),
                self.action.as_str(),
                aspect.as_str()
            ),
            None => format!("{}:{}", self.target.as_str(), self.action.as_str()),
        }
    }
}

/// A descriptor still accepting tags.
///
/// The differ keeps descriptors pending until nested changes of the pair are
/// known, then freezes them with [`PendingDescriptor::finalize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDescriptor(ChangeDescriptor);

impl PendingDescriptor {
    pub fn tag(mut self, tag: &str) -> Self {
        self.0.tags.insert(tag.to_string());
        self
    }

    pub fn tag_if(self, condition: bool, tag: &str) -> Self {
        if condition {
            self.tag(tag)
        } else {
            self
        }
    }

    pub fn add_tag(&mut self, tag: &str) {
        self.0.tags.insert(tag.to_string());
    }

    /// Peek at the descriptor being built.
    pub fn descriptor(&self) -> &ChangeDescriptor {
        &self.0
    }

    pub fn finalize(self) -> ChangeDescriptor {
        self.0
    }
}

/// Where a change sits in the tree and diagnostic extras.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChangeContext {
    pub is_nested: bool,
    pub depth: usize,
    /// Paths of enclosing declarations, outermost first.
    pub ancestors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_signature: Option<String>,
}

impl ChangeContext {
    pub fn at(depth: usize, ancestors: &[String]) -> Self {
        Self {
            is_nested: depth > 0,
            depth,
            ancestors: ancestors.to_vec(),
            ..Default::default()
        }
    }

    pub fn with_signatures(mut self, old: Option<&str>, new: Option<&str>) -> Self {
        self.old_signature = old.map(|s| s.to_string());
        self.new_signature = new.map(|s| s.to_string());
        self
    }
}

/// One reported API change.
///
/// Node references borrow from the snapshots that were diffed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ApiChange<'a> {
    pub descriptor: ChangeDescriptor,
    pub path: String,
    pub node_kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_range: Option<SourceRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_range: Option<SourceRange>,
    #[serde(skip)]
    pub old_node: Option<&'a DeclarationNode>,
    #[serde(skip)]
    pub new_node: Option<&'a DeclarationNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nested_changes: Vec<ApiChange<'a>>,
    pub context: ChangeContext,
    pub explanation: String,
}

impl<'a> ApiChange<'a> {
    /// Change for a declaration present in both snapshots.
    pub fn between(
        descriptor: ChangeDescriptor,
        old: &'a DeclarationNode,
        new: &'a DeclarationNode,
        context: ChangeContext,
        explanation: String,
    ) -> Self {
        Self {
            descriptor,
            path: old.path.clone(),
            node_kind: new.kind,
            old_range: Some(old.source_range),
            new_range: Some(new.source_range),
            old_node: Some(old),
            new_node: Some(new),
            nested_changes: Vec::new(),
            context,
            explanation,
        }
    }

    /// Change for a declaration that only exists in the old snapshot.
    pub fn removed(
        descriptor: ChangeDescriptor,
        old: &'a DeclarationNode,
        context: ChangeContext,
        explanation: String,
    ) -> Self {
        Self {
            descriptor,
            path: old.path.clone(),
            node_kind: old.kind,
            old_range: Some(old.source_range),
            new_range: None,
            old_node: Some(old),
            new_node: None,
            nested_changes: Vec::new(),
            context,
            explanation,
        }
    }

    /// Change for a declaration that only exists in the new snapshot.
    pub fn added(
        descriptor: ChangeDescriptor,
        new: &'a DeclarationNode,
        context: ChangeContext,
        explanation: String,
    ) -> Self {
        Self {
            descriptor,
            path: new.path.clone(),
            node_kind: new.kind,
            old_range: None,
            new_range: Some(new.source_range),
            old_node: None,
            new_node: Some(new),
            nested_changes: Vec::new(),
            context,
            explanation,
        }
    }

    pub fn with_nested(mut self, nested: Vec<ApiChange<'a>>) -> Self {
        self.nested_changes = nested;
        self
    }

    pub fn old_name(&self) -> Option<&str> {
        self.old_node.map(|n| n.name.as_str())
    }

    pub fn new_name(&self) -> Option<&str> {
        self.new_node.map(|n| n.name.as_str())
    }

    /// Number of changes in this subtree, including self.
    pub fn total_len(&self) -> usize {
        1 + self
            .nested_changes
            .iter()
            .map(|c| c.total_len())
            .sum::<usize>()
    }
}

/// Summary counts for a change list, nested changes included.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: u32,
    pub removed: u32,
    pub renamed: u32,
    pub reordered: u32,
    pub modified: u32,
    pub nested: u32,
}

impl DiffSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_changes(changes: &[ApiChange<'_>]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            summary.record(change);
        }
        summary
    }

    /// Count a change and its nested changes.
    pub fn record(&mut self, change: &ApiChange<'_>) {
        match change.descriptor.action() {
            ChangeAction::Added => self.added += 1,
            ChangeAction::Removed => self.removed += 1,
            ChangeAction::Renamed => self.renamed += 1,
            ChangeAction::Reordered => self.reordered += 1,
            ChangeAction::Modified => self.modified += 1,
        }
        if change.context.is_nested {
            self.nested += 1;
        }
        for nested in &change.nested_changes {
            self.record(nested);
        }
    }

    pub fn total(&self) -> u32 {
        self.added + self.removed + self.renamed + self.reordered + self.modified
    }

    /// Generate human-readable summary string.
    pub fn text(&self) -> String {
        let counts = [
            (self.added, "added"),
            (self.removed, "removed"),
            (self.renamed, "renamed"),
            (self.reordered, "reordered"),
            (self.modified, "modified"),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, label)| format!("{} {}", n, label))
            .collect();

        if parts.is_empty() {
            "No changes".to_string()
        } else if self.nested > 0 {
            format!("{} ({} nested)", parts.join(", "), self.nested)
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_matches_serde_names() {
        assert_eq!(ChangeTarget::TypeParameter.as_str(), "type-parameter");
        assert_eq!(
            serde_json::to_string(&ChangeTarget::TypeParameter).unwrap(),
            "\"type-parameter\""
        );
        assert_eq!(ChangeAspect::ExtendsClause.as_str(), "extends-clause");
        assert_eq!(
            serde_json::to_string(&ChangeAspect::ExtendsClause).unwrap(),
            "\"extends-clause\""
        );
        assert_eq!(ChangeImpact::Undetermined.to_string(), "undetermined");
    }

    #[test]
    fn test_target_for_node() {
        assert_eq!(
            ChangeTarget::for_node(NodeKind::Property, 0),
            ChangeTarget::Export
        );
        assert_eq!(
            ChangeTarget::for_node(NodeKind::Property, 1),
            ChangeTarget::Property
        );
        assert_eq!(
            ChangeTarget::for_node(NodeKind::SetAccessor, 2),
            ChangeTarget::Accessor
        );
        assert_eq!(
            ChangeTarget::for_node(NodeKind::ConstructSignature, 1),
            ChangeTarget::Constructor
        );
    }

    #[test]
    fn test_action_descriptor_has_no_aspect() {
        let descriptor = ChangeDescriptor::simple(ChangeTarget::Export, ChangeAction::Added)
            .tag(tags::IS_OPTIONAL)
            .finalize();
        assert_eq!(descriptor.action(), ChangeAction::Added);
        assert!(descriptor.aspect().is_none());
        assert!(descriptor.impact().is_none());
        assert!(descriptor.has_tag(tags::IS_OPTIONAL));
        assert_eq!(descriptor.group_key(), "export:added");
    }

    #[test]
    fn test_action_constructor_never_yields_bare_modified() {
        let descriptor =
            ChangeDescriptor::simple(ChangeTarget::Export, ChangeAction::Modified).finalize();
        assert_eq!(descriptor.aspect(), Some(ChangeAspect::Type));
        assert_eq!(descriptor.impact(), Some(ChangeImpact::Undetermined));
    }

    #[test]
    fn test_modified_descriptor_group_key() {
        let descriptor = ChangeDescriptor::modified(
            ChangeTarget::Property,
            ChangeAspect::Optionality,
            ChangeImpact::Widening,
        )
        .finalize();
        assert_eq!(descriptor.group_key(), "property:modified:optionality");
        assert!(!descriptor.is_equivalent());
    }

    #[test]
    fn test_with_tag_leaves_original_untouched() {
        let descriptor =
            ChangeDescriptor::simple(ChangeTarget::Method, ChangeAction::Removed).finalize();
        let tagged = descriptor.with_tag(tags::IS_NESTED_CHANGE);
        assert!(tagged.has_tag(tags::IS_NESTED_CHANGE));
        assert!(!descriptor.has_tag(tags::IS_NESTED_CHANGE));
    }

    #[test]
    fn test_serialized_descriptor_omits_absent_aspect() {
        let descriptor =
            ChangeDescriptor::simple(ChangeTarget::Export, ChangeAction::Removed).finalize();
        let json = serde_json::to_value(&descriptor).unwrap();
        assert!(json.get("aspect").is_none());
        assert_eq!(json["action"], "removed");
    }

    #[test]
    fn test_diff_summary_counts_nested() {
        let parent_node = DeclarationNode::new("User", NodeKind::Interface);
        let child_node = DeclarationNode::new("User", NodeKind::Interface)
            .with_child(DeclarationNode::new("email", NodeKind::Property));
        let nested = ApiChange::added(
            ChangeDescriptor::simple(ChangeTarget::Property, ChangeAction::Added).finalize(),
            &child_node.children[0],
            ChangeContext::at(1, &["User".to_string()]),
            "Added property email".to_string(),
        );
        let parent = ApiChange::between(
            ChangeDescriptor::modified(
                ChangeTarget::Export,
                ChangeAspect::Type,
                ChangeImpact::Equivalent,
            )
            .tag(tags::HAS_NESTED_CHANGES)
            .finalize(),
            &parent_node,
            &child_node,
            ChangeContext::at(0, &[]),
            "No significant change".to_string(),
        )
        .with_nested(vec![nested]);

        let summary = DiffSummary::from_changes(&[parent]);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.modified, 1);
        assert_eq!(summary.nested, 1);
        assert_eq!(summary.text(), "1 added, 1 modified (1 nested)");
    }

    #[test]
    fn test_diff_summary_text_no_changes() {
        assert_eq!(DiffSummary::default().text(), "No changes");
    }
}
