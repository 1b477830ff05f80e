//! First-match policy evaluation and severity aggregation.

use serde::Serialize;

use apidelta_core::{flatten_changes, ApiChange};

use crate::rules::{Policy, ReleaseType};

/// Name and rationale of the rule that decided a verdict.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchedRule {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// A change together with its release verdict.
#[derive(Clone, Debug, Serialize)]
pub struct ClassifiedChange<'a> {
    pub change: &'a ApiChange<'a>,
    pub release_type: ReleaseType,
    /// `None` when the policy default applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<MatchedRule>,
}

/// Verdict of the first rule matching the change, or the policy default.
pub fn classify_change<'a>(change: &'a ApiChange<'a>, policy: &Policy) -> ClassifiedChange<'a> {
    match policy.rules.iter().find(|rule| rule.matcher.matches(change)) {
        Some(rule) => {
            tracing::trace!(
                path = %change.path,
                rule = %rule.name,
                release_type = %rule.release_type,
                "Rule matched"
            );
            ClassifiedChange {
                change,
                release_type: rule.release_type,
                matched_rule: Some(MatchedRule {
                    name: rule.name.clone(),
                    rationale: rule.rationale.clone(),
                }),
            }
        }
        None => ClassifiedChange {
            change,
            release_type: policy.default_release_type,
            matched_rule: None,
        },
    }
}

/// Classify each change in order. Nested changes are not visited; flatten first
/// to give them their own verdicts.
pub fn classify_changes<'a>(changes: &'a [ApiChange<'a>], policy: &Policy) -> Vec<ClassifiedChange<'a>> {
    changes.iter().map(|c| classify_change(c, policy)).collect()
}

/// Most severe verdict, or `none` for an empty list.
pub fn determine_overall_release(results: &[ClassifiedChange<'_>]) -> ReleaseType {
    highest(results.iter().map(|r| r.release_type))
}

/// Most severe of the given release types, or `none` when there are none.
pub fn highest(release_types: impl IntoIterator<Item = ReleaseType>) -> ReleaseType {
    release_types
        .into_iter()
        .max()
        .unwrap_or(ReleaseType::None)
}

/// Per-verdict counts for one evaluated change list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReleaseSummary {
    pub policy: String,
    pub release_type: Option<ReleaseType>,
    pub forbidden: u32,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub none: u32,
}

impl ReleaseSummary {
    pub fn from_classified(policy: &Policy, results: &[ClassifiedChange<'_>]) -> Self {
        let mut summary = Self {
            policy: policy.name.clone(),
            release_type: Some(determine_overall_release(results)),
            ..Default::default()
        };
        for result in results {
            summary.record(result.release_type);
        }
        summary
    }

    /// Flatten a diff, classify every entry and summarise.
    pub fn evaluate(changes: &[ApiChange<'_>], policy: &Policy) -> Self {
        let flat = flatten_changes(changes);
        let results = classify_changes(&flat, policy);
        let summary = Self::from_classified(policy, &results);
        tracing::debug!(
            policy = %policy.name,
            changes = flat.len(),
            release_type = %summary.overall(),
            "Evaluated release policy"
        );
        summary
    }

    fn record(&mut self, release_type: ReleaseType) {
        match release_type {
            ReleaseType::Forbidden => self.forbidden += 1,
            ReleaseType::Major => self.major += 1,
            ReleaseType::Minor => self.minor += 1,
            ReleaseType::Patch => self.patch += 1,
            ReleaseType::None => self.none += 1,
        }
    }

    /// Overall verdict, `none` when nothing was classified.
    pub fn overall(&self) -> ReleaseType {
        self.release_type.unwrap_or(ReleaseType::None)
    }

    pub fn total(&self) -> u32 {
        self.forbidden + self.major + self.minor + self.patch + self.none
    }

    /// e.g. `major (1 major, 2 minor)`.
    pub fn text(&self) -> String {
        let counts = [
            (self.forbidden, ReleaseType::Forbidden),
            (self.major, ReleaseType::Major),
            (self.minor, ReleaseType::Minor),
            (self.patch, ReleaseType::Patch),
            (self.none, ReleaseType::None),
        ];
        let parts: Vec<String> = counts
            .iter()
            .filter(|(n, _)| *n > 0)
            .map(|(n, release)| format!("{} {}", n, release))
            .collect();

        if parts.is_empty() {
            "No changes".to_string()
        } else {
            format!("{} ({})", self.overall(), parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ChangeMatcher, PolicyRule};
    use apidelta_core::{
        ChangeAction, ChangeContext, ChangeDescriptor, ChangeTarget, DeclarationNode, NodeKind,
    };

    fn removal(node: &DeclarationNode) -> ApiChange<'_> {
        ApiChange::removed(
            ChangeDescriptor::simple(ChangeTarget::Export, ChangeAction::Removed).finalize(),
            node,
            ChangeContext::at(0, &[]),
            "Removed".to_string(),
        )
    }

    fn two_rule_policy() -> Policy {
        Policy::new("test", ReleaseType::Patch)
            .with_rule(
                PolicyRule::new(
                    "removals",
                    ReleaseType::Major,
                    ChangeMatcher::new().action(ChangeAction::Removed),
                )
                .with_rationale("Consumers lose access"),
            )
            .with_rule(PolicyRule::new(
                "anything",
                ReleaseType::Minor,
                ChangeMatcher::new(),
            ))
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let node = DeclarationNode::new("gone", NodeKind::Function);
        let change = removal(&node);

        let result = classify_change(&change, &two_rule_policy());

        assert_eq!(result.release_type, ReleaseType::Major);
        let rule = result.matched_rule.unwrap();
        assert_eq!(rule.name, "removals");
        assert_eq!(rule.rationale.as_deref(), Some("Consumers lose access"));
    }

    #[test]
    fn test_default_applies_without_match() {
        let node = DeclarationNode::new("gone", NodeKind::Function);
        let change = removal(&node);
        let policy = Policy::new("empty", ReleaseType::Patch);

        let result = classify_change(&change, &policy);

        assert_eq!(result.release_type, ReleaseType::Patch);
        assert!(result.matched_rule.is_none());
    }

    #[test]
    fn test_determine_overall_release_empty_is_none() {
        assert_eq!(determine_overall_release(&[]), ReleaseType::None);
        assert_eq!(highest([]), ReleaseType::None);
    }

    #[test]
    fn test_forbidden_dominates() {
        assert_eq!(
            highest([ReleaseType::Minor, ReleaseType::Forbidden, ReleaseType::Major]),
            ReleaseType::Forbidden
        );
    }

    #[test]
    fn test_release_summary_text() {
        let node = DeclarationNode::new("gone", NodeKind::Function);
        let changes = vec![removal(&node)];
        let policy = two_rule_policy();
        let results = classify_changes(&changes, &policy);

        let summary = ReleaseSummary::from_classified(&policy, &results);

        assert_eq!(summary.major, 1);
        assert_eq!(summary.total(), 1);
        assert_eq!(summary.text(), "major (1 major)");
        assert_eq!(ReleaseSummary::default().text(), "No changes");
        assert_eq!(ReleaseSummary::default().overall(), ReleaseType::None);
    }
}
