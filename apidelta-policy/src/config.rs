//! Declarative policy files.
//!
//! # Example Configuration
//!
//! ```toml
//! name = "library"
//! default_release_type = "patch"
//!
//! [[rules]]
//! name = "removals"
//! release_type = "major"
//! rationale = "Consumers lose access"
//! [rules.when]
//! action = ["removed", "renamed"]
//! not_tag = ["is-nested-change"]
//! ```
//!
//! Every matcher dimension except the custom predicate can be expressed in
//! `when`; an omitted dimension is unconstrained. Misspelled dimensions are
//! rejected rather than silently widening the rule.

use serde::{Deserialize, Serialize};

use apidelta_core::{ChangeAction, ChangeAspect, ChangeImpact, ChangeTarget, NodeKind};

use crate::error::Result;
use crate::rules::{ChangeMatcher, Policy, PolicyRule, ReleaseType};

/// Root of a policy file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub name: String,

    /// Verdict for changes no rule matches.
    #[serde(default = "default_release_type")]
    pub default_release_type: ReleaseType,

    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

fn default_release_type() -> ReleaseType {
    ReleaseType::Patch
}

/// One `[[rules]]` entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub release_type: ReleaseType,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub when: MatchConfig,
}

/// Matcher dimensions of a rule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchConfig {
    #[serde(default)]
    pub target: Vec<ChangeTarget>,
    #[serde(default)]
    pub action: Vec<ChangeAction>,
    #[serde(default)]
    pub aspect: Vec<ChangeAspect>,
    #[serde(default)]
    pub impact: Vec<ChangeImpact>,
    #[serde(default)]
    pub node_kind: Vec<NodeKind>,
    /// All must be present.
    #[serde(default)]
    pub has_tag: Vec<String>,
    /// At least one must be present.
    #[serde(default)]
    pub has_any_tag: Vec<String>,
    /// None may be present.
    #[serde(default)]
    pub not_tag: Vec<String>,
    #[serde(default)]
    pub nested: Option<bool>,
}

impl MatchConfig {
    pub fn to_matcher(&self) -> ChangeMatcher {
        let mut matcher = ChangeMatcher::new()
            .targets(self.target.iter().copied())
            .actions(self.action.iter().copied())
            .aspects(self.aspect.iter().copied())
            .impacts(self.impact.iter().copied())
            .node_kinds(self.node_kind.iter().copied())
            .has_any_tag(self.has_any_tag.iter().map(String::as_str));
        for tag in &self.has_tag {
            matcher = matcher.has_tag(tag);
        }
        for tag in &self.not_tag {
            matcher = matcher.not_tag(tag);
        }
        if let Some(nested) = self.nested {
            matcher = matcher.nested(nested);
        }
        matcher
    }
}

impl PolicyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Build the policy, rejecting unnamed or duplicate rules.
    pub fn into_policy(self) -> Result<Policy> {
        let policy = self.rules.into_iter().fold(
            Policy::new(&self.name, self.default_release_type),
            |policy, rule| {
                let mut built = PolicyRule::new(&rule.name, rule.release_type, rule.when.to_matcher());
                built.rationale = rule.rationale;
                policy.with_rule(built)
            },
        );
        policy.validate()?;
        tracing::debug!(policy = %policy.name, rules = policy.rules.len(), "Loaded policy");
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PolicyError;

    const LIBRARY_POLICY: &str = r#"
name = "library"
default_release_type = "patch"

[[rules]]
name = "removals"
release_type = "major"
rationale = "Consumers lose access"
[rules.when]
action = ["removed", "renamed"]
not_tag = ["is-nested-change"]

[[rules]]
name = "optional-members"
release_type = "minor"
[rules.when]
target = ["property", "parameter"]
has_any_tag = ["now-optional", "is-optional"]
nested = true
"#;

    #[test]
    fn test_from_toml_str() {
        let config = PolicyConfig::from_toml_str(LIBRARY_POLICY).unwrap();
        assert_eq!(config.name, "library");
        assert_eq!(config.rules.len(), 2);
        assert_eq!(
            config.rules[0].when.action,
            vec![ChangeAction::Removed, ChangeAction::Renamed]
        );
        assert_eq!(config.rules[1].when.nested, Some(true));
        assert!(config.rules[1].rationale.is_none());
    }

    #[test]
    fn test_into_policy_keeps_order_and_rationale() {
        let policy = PolicyConfig::from_toml_str(LIBRARY_POLICY)
            .unwrap()
            .into_policy()
            .unwrap();
        assert_eq!(policy.rules[0].name, "removals");
        assert_eq!(
            policy.rules[0].rationale.as_deref(),
            Some("Consumers lose access")
        );
        assert_eq!(policy.rules[1].release_type, ReleaseType::Minor);
    }

    #[test]
    fn test_defaults() {
        let config = PolicyConfig::from_toml_str("name = \"bare\"").unwrap();
        assert_eq!(config.default_release_type, ReleaseType::Patch);
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_unknown_dimension_rejected() {
        let content = r#"
name = "typo"
[[rules]]
name = "r"
release_type = "major"
[rules.when]
actoin = ["removed"]
"#;
        assert!(matches!(
            PolicyConfig::from_toml_str(content),
            Err(PolicyError::Toml(_))
        ));
    }

    #[test]
    fn test_duplicate_rule_names_rejected() {
        let content = r#"
name = "dup"
[[rules]]
name = "r"
release_type = "major"
[[rules]]
name = "r"
release_type = "minor"
"#;
        let config = PolicyConfig::from_toml_str(content).unwrap();
        assert!(matches!(
            config.into_policy(),
            Err(PolicyError::DuplicateRule { .. })
        ));
    }

    #[test]
    fn test_from_json_str() {
        let json = r#"{
            "name": "json",
            "default_release_type": "none",
            "rules": [
                {"name": "any", "release_type": "forbidden", "when": {"impact": ["narrowing"]}}
            ]
        }"#;
        let policy = PolicyConfig::from_json_str(json).unwrap().into_policy().unwrap();
        assert_eq!(policy.default_release_type, ReleaseType::None);
        assert_eq!(policy.rules[0].release_type, ReleaseType::Forbidden);
    }
}
