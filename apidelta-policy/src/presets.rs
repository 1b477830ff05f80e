//! Built-in policies.
//!
//! Both are meant to be applied to a flattened change list, so that member
//! changes nested under an otherwise equivalent container get their own
//! verdict.

use apidelta_core::{
    tags, ChangeAction, ChangeAspect, ChangeImpact, ChangeTarget, DeclarationNode,
};

use crate::rules::{ChangeMatcher, Policy, PolicyRule, ReleaseType};

/// Semantic versioning for library consumers.
///
/// Anything that can break existing callers is major, backwards compatible
/// additions are minor, everything else is a patch. A signature whose only
/// undetermined change comes from its members (same return type) is left to
/// the member verdicts.
pub fn semver() -> Policy {
    Policy::new("semver", ReleaseType::Patch)
        .with_rule(
            PolicyRule::new(
                "removed-or-renamed",
                ReleaseType::Major,
                ChangeMatcher::new().actions([ChangeAction::Removed, ChangeAction::Renamed]),
            )
            .with_rationale("Code referencing the old declaration no longer compiles"),
        )
        .with_rule(
            PolicyRule::new(
                "reordered-parameters",
                ReleaseType::Major,
                ChangeMatcher::new().action(ChangeAction::Reordered),
            )
            .with_rationale("Positional arguments bind to different parameters"),
        )
        .with_rule(
            PolicyRule::new(
                "required-parameter-added",
                ReleaseType::Major,
                ChangeMatcher::new()
                    .target(ChangeTarget::Parameter)
                    .action(ChangeAction::Added)
                    .not_tag(tags::IS_OPTIONAL)
                    .not_tag(tags::HAS_DEFAULT_VALUE)
                    .not_tag(tags::IS_REST_PARAMETER),
            )
            .with_rationale("Existing calls do not pass the new argument"),
        )
        .with_rule(
            PolicyRule::new(
                "type-parameter-added-without-default",
                ReleaseType::Major,
                ChangeMatcher::new()
                    .target(ChangeTarget::TypeParameter)
                    .action(ChangeAction::Added)
                    .not_tag(tags::HAS_DEFAULT_VALUE),
            )
            .with_rationale("Explicit instantiations must supply the new argument"),
        )
        .with_rule(
            PolicyRule::new(
                "deprecation",
                ReleaseType::Minor,
                ChangeMatcher::new().aspect(ChangeAspect::Deprecation),
            )
            .with_rationale("Deprecation is advisory"),
        )
        .with_rule(
            PolicyRule::new(
                "signature-with-member-changes",
                ReleaseType::Patch,
                ChangeMatcher::new()
                    .aspect(ChangeAspect::Type)
                    .impact(ChangeImpact::Undetermined)
                    .has_tag(tags::HAS_NESTED_CHANGES)
                    .custom(|change| return_type(change.old_node) == return_type(change.new_node)),
            )
            .with_rationale("Member changes carry their own verdicts"),
        )
        .with_rule(
            PolicyRule::new(
                "incompatible-modification",
                ReleaseType::Major,
                ChangeMatcher::new().impacts([
                    ChangeImpact::Narrowing,
                    ChangeImpact::Unrelated,
                    ChangeImpact::Undetermined,
                ]),
            )
            .with_rationale("Callers may rely on what was accepted or returned before"),
        )
        .with_rule(
            PolicyRule::new(
                "widening",
                ReleaseType::Minor,
                ChangeMatcher::new().impact(ChangeImpact::Widening),
            )
            .with_rationale("Existing usage keeps working"),
        )
        .with_rule(
            PolicyRule::new(
                "addition",
                ReleaseType::Minor,
                ChangeMatcher::new().action(ChangeAction::Added),
            )
            .with_rationale("New API surface"),
        )
        .with_rule(PolicyRule::new(
            "equivalent",
            ReleaseType::Patch,
            ChangeMatcher::new().impact(ChangeImpact::Equivalent),
        ))
}

fn return_type(node: Option<&DeclarationNode>) -> Option<&str> {
    node.and_then(|n| n.type_info.return_type.as_deref())
}

/// No change to the public surface is allowed.
///
/// Containers that only report nested changes are left to their members.
pub fn frozen() -> Policy {
    Policy::new("frozen", ReleaseType::None)
        .with_rule(PolicyRule::new(
            "equivalent-container",
            ReleaseType::None,
            ChangeMatcher::new()
                .impact(ChangeImpact::Equivalent)
                .has_tag(tags::HAS_NESTED_CHANGES),
        ))
        .with_rule(
            PolicyRule::new("any-change", ReleaseType::Forbidden, ChangeMatcher::new())
                .with_rationale("The API surface is frozen"),
        )
}
