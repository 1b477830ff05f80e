//! Release types, change matchers and policies.
//!
//! A [`ChangeMatcher`] is a conjunction of per-dimension tests. Within one
//! dimension the listed values are alternatives, except for `has_tag`, where
//! every listed tag is required. A dimension left empty accepts anything.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use apidelta_core::{ApiChange, ChangeAction, ChangeAspect, ChangeImpact, ChangeTarget, NodeKind};

use crate::error::{PolicyError, Result};

/// Release verdict for a change, ordered by severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Forbidden,
    Major,
    Minor,
    Patch,
    None,
}

impl ReleaseType {
    /// All release types, most severe first.
    pub const ALL: [ReleaseType; 5] = [
        ReleaseType::Forbidden,
        ReleaseType::Major,
        ReleaseType::Minor,
        ReleaseType::Patch,
        ReleaseType::None,
    ];

    /// Rank used for aggregation: forbidden 5 down to none 1.
    pub fn severity(&self) -> u8 {
        match self {
            ReleaseType::Forbidden => 5,
            ReleaseType::Major => 4,
            ReleaseType::Minor => 3,
            ReleaseType::Patch => 2,
            ReleaseType::None => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Forbidden => "forbidden",
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::None => "none",
        }
    }
}

impl PartialOrd for ReleaseType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReleaseType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arbitrary extra condition on a change.
pub type ChangePredicate = Arc<dyn Fn(&ApiChange<'_>) -> bool + Send + Sync>;

/// Composite predicate over a change's descriptor, node kind and context.
#[derive(Clone, Default)]
pub struct ChangeMatcher {
    targets: Vec<ChangeTarget>,
    actions: Vec<ChangeAction>,
    aspects: Vec<ChangeAspect>,
    impacts: Vec<ChangeImpact>,
    node_kinds: Vec<NodeKind>,
    all_tags: Vec<String>,
    any_tags: Vec<String>,
    excluded_tags: Vec<String>,
    nested: Option<bool>,
    custom: Option<ChangePredicate>,
}

impl ChangeMatcher {
    /// Matcher with no constraints; matches every change.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: ChangeTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn targets(mut self, targets: impl IntoIterator<Item = ChangeTarget>) -> Self {
        self.targets.extend(targets);
        self
    }

    pub fn action(mut self, action: ChangeAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = ChangeAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn aspect(mut self, aspect: ChangeAspect) -> Self {
        self.aspects.push(aspect);
        self
    }

    pub fn aspects(mut self, aspects: impl IntoIterator<Item = ChangeAspect>) -> Self {
        self.aspects.extend(aspects);
        self
    }

    pub fn impact(mut self, impact: ChangeImpact) -> Self {
        self.impacts.push(impact);
        self
    }

    pub fn impacts(mut self, impacts: impl IntoIterator<Item = ChangeImpact>) -> Self {
        self.impacts.extend(impacts);
        self
    }

    pub fn node_kind(mut self, kind: NodeKind) -> Self {
        self.node_kinds.push(kind);
        self
    }

    pub fn node_kinds(mut self, kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        self.node_kinds.extend(kinds);
        self
    }

    /// Require a tag. Repeated calls require all of them.
    pub fn has_tag(mut self, tag: &str) -> Self {
        self.all_tags.push(tag.to_string());
        self
    }

    /// Require at least one of the given tags.
    pub fn has_any_tag<'t>(mut self, tags: impl IntoIterator<Item = &'t str>) -> Self {
        self.any_tags.extend(tags.into_iter().map(str::to_string));
        self
    }

    /// Reject changes carrying the tag.
    pub fn not_tag(mut self, tag: &str) -> Self {
        self.excluded_tags.push(tag.to_string());
        self
    }

    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = Some(nested);
        self
    }

    /// Add a custom predicate, ANDed with everything else.
    pub fn custom<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ApiChange<'_>) -> bool + Send + Sync + 'static,
    {
        self.custom = Some(Arc::new(predicate));
        self
    }

    pub fn matches(&self, change: &ApiChange<'_>) -> bool {
        let descriptor = &change.descriptor;

        accepts(&self.targets, descriptor.target())
            && accepts(&self.actions, descriptor.action())
            && accepts_present(&self.aspects, descriptor.aspect())
            && accepts_present(&self.impacts, descriptor.impact())
            && accepts(&self.node_kinds, change.node_kind)
            && self.all_tags.iter().all(|t| descriptor.has_tag(t))
            && (self.any_tags.is_empty() || self.any_tags.iter().any(|t| descriptor.has_tag(t)))
            && !self.excluded_tags.iter().any(|t| descriptor.has_tag(t))
            && self.nested.map_or(true, |n| n == change.context.is_nested)
            && self.custom.as_ref().map_or(true, |predicate| predicate(change))
    }
}

fn accepts<T: PartialEq>(accepted: &[T], actual: T) -> bool {
    accepted.is_empty() || accepted.contains(&actual)
}

/// An absent value never satisfies a non-empty constraint.
fn accepts_present<T: PartialEq>(accepted: &[T], actual: Option<T>) -> bool {
    match actual {
        Some(value) => accepts(accepted, value),
        None => accepted.is_empty(),
    }
}

impl fmt::Debug for ChangeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeMatcher")
            .field("targets", &self.targets)
            .field("actions", &self.actions)
            .field("aspects", &self.aspects)
            .field("impacts", &self.impacts)
            .field("node_kinds", &self.node_kinds)
            .field("all_tags", &self.all_tags)
            .field("any_tags", &self.any_tags)
            .field("excluded_tags", &self.excluded_tags)
            .field("nested", &self.nested)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// A named matcher with the verdict it assigns.
#[derive(Clone, Debug)]
pub struct PolicyRule {
    pub name: String,
    pub matcher: ChangeMatcher,
    pub release_type: ReleaseType,
    pub rationale: Option<String>,
}

impl PolicyRule {
    pub fn new(name: &str, release_type: ReleaseType, matcher: ChangeMatcher) -> Self {
        Self {
            name: name.to_string(),
            matcher,
            release_type,
            rationale: None,
        }
    }

    pub fn with_rationale(mut self, rationale: &str) -> Self {
        self.rationale = Some(rationale.to_string());
        self
    }
}

/// Ordered rules plus the verdict for changes no rule matches.
#[derive(Clone, Debug)]
pub struct Policy {
    pub name: String,
    pub rules: Vec<PolicyRule>,
    pub default_release_type: ReleaseType,
}

impl Policy {
    pub fn new(name: &str, default_release_type: ReleaseType) -> Self {
        Self {
            name: name.to_string(),
            rules: Vec::new(),
            default_release_type,
        }
    }

    /// Append a rule; earlier rules take precedence.
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rule(&self, name: &str) -> Option<&PolicyRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Check that the policy and every rule are named, and rule names are unique.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PolicyError::EmptyPolicyName);
        }
        let mut seen = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(PolicyError::EmptyRuleName { index });
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(PolicyError::DuplicateRule {
                    name: rule.name.clone(),
                });
            }
        }
        Ok(())
    }
}
