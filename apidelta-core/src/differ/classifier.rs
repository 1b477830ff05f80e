//! Classification of one matched declaration pair.
//!
//! Checks run in a fixed order and the first one that recognises a
//! difference decides the descriptor. The order matters when several
//! dimensions change at once (a property that becomes both readonly and
//! optional is reported as a readonly change).
//!
//! 1. parameter reordering
//! 2. type parameters
//! 3. enum member value
//! 4. type signature
//! 5. modifiers: readonly, optional, abstract, static, visibility
//! 6. extends / implements clauses
//! 7. deprecation
//!
//! When nothing differs the pair is classified as an equivalent type
//! change, which the tree differ suppresses unless nested changes exist.

use std::collections::HashMap;

use crate::differ::changes::{
    tags, ChangeAction, ChangeAspect, ChangeDescriptor, ChangeImpact, ChangeTarget,
    PendingDescriptor,
};
use crate::differ::impact::{determine_type_impact, normalize_signature, TypeRelation};
use crate::types::{DeclarationNode, Modifier, NodeKind, ParameterInfo, TypeParameterInfo};

/// Descriptor plus explanation for one pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub descriptor: PendingDescriptor,
    pub explanation: String,
}

impl Classification {
    fn new(descriptor: PendingDescriptor, explanation: String) -> Self {
        Self {
            descriptor,
            explanation,
        }
    }
}

/// Inputs shared by every check.
pub struct PairContext<'p> {
    pub old: &'p DeclarationNode,
    pub new: &'p DeclarationNode,
    /// Target of the pair itself; checks may report a more specific one.
    pub target: ChangeTarget,
    pub detect_parameter_reordering: bool,
    pub relation: Option<&'p dyn TypeRelation>,
}

type Check = fn(&PairContext<'_>) -> Option<Classification>;

/// The cascade, in evaluation order.
pub const CHECKS: &[(&str, Check)] = &[
    ("parameter-order", check_parameter_order),
    ("type-parameters", check_type_parameters),
    ("enum-value", check_enum_value),
    ("type-signature", check_type_signature),
    ("readonly", check_readonly),
    ("optionality", check_optionality),
    ("abstractness", check_abstractness),
    ("staticness", check_staticness),
    ("visibility", check_visibility),
    ("extends-clause", check_extends),
    ("implements-clause", check_implements),
    ("deprecation", check_deprecation),
];

/// Classify a matched pair. Always yields exactly one classification.
pub fn classify_pair(ctx: &PairContext<'_>) -> Classification {
    for (name, check) in CHECKS {
        if let Some(classification) = check(ctx) {
            tracing::trace!(path = %ctx.old.path, check = name, "Classifier branch fired");
            return classification;
        }
    }
    Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Type, ChangeImpact::Equivalent),
        format!("No significant change to {} '{}'", ctx.new.kind, ctx.new.name),
    )
}

fn check_parameter_order(ctx: &PairContext<'_>) -> Option<Classification> {
    if !ctx.detect_parameter_reordering || !ctx.old.kind.is_function_like() {
        return None;
    }
    let old_params = ctx.old.type_info.primary_parameters()?;
    let new_params = ctx.new.type_info.primary_parameters()?;
    if !is_reordering(old_params, new_params) {
        return None;
    }

    let names = |params: &[ParameterInfo]| {
        params
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    Some(Classification::new(
        ChangeDescriptor::simple(ChangeTarget::Parameter, ChangeAction::Reordered),
        format!(
            "Parameters of '{}' were reordered from ({}) to ({})",
            ctx.new.name,
            names(old_params),
            names(new_params)
        ),
    ))
}

/// Same multiset of (name, type) pairs in a different order.
fn is_reordering(old: &[ParameterInfo], new: &[ParameterInfo]) -> bool {
    if old.len() != new.len() || old.len() < 2 {
        return false;
    }
    let key = |p: &ParameterInfo| (p.name.clone(), normalize_signature(&p.type_text));
    let old_keys: Vec<_> = old.iter().map(key).collect();
    let new_keys: Vec<_> = new.iter().map(key).collect();
    if old_keys == new_keys {
        return false;
    }

    let mut counts: HashMap<&(String, String), i64> = HashMap::new();
    for k in &old_keys {
        *counts.entry(k).or_default() += 1;
    }
    for k in &new_keys {
        *counts.entry(k).or_default() -= 1;
    }
    counts.values().all(|&c| c == 0)
}

/// Node-level type parameters, or those of the first signature when neither
/// side records any at node level.
fn type_parameter_lists<'p>(
    ctx: &PairContext<'p>,
) -> (&'p [TypeParameterInfo], &'p [TypeParameterInfo]) {
    let old = ctx.old.type_info.type_parameters.as_slice();
    let new = ctx.new.type_info.type_parameters.as_slice();
    if old.is_empty() && new.is_empty() {
        (
            ctx.old.type_info.signature_type_parameters(),
            ctx.new.type_info.signature_type_parameters(),
        )
    } else {
        (old, new)
    }
}

fn check_type_parameters(ctx: &PairContext<'_>) -> Option<Classification> {
    let (old_params, new_params) = type_parameter_lists(ctx);
    if old_params.is_empty() && new_params.is_empty() {
        return None;
    }

    if let Some(removed) = old_params
        .iter()
        .find(|p| !new_params.iter().any(|n| n.name == p.name))
    {
        return Some(Classification::new(
            ChangeDescriptor::simple(ChangeTarget::TypeParameter, ChangeAction::Removed)
                .tag(tags::AFFECTS_TYPE_PARAMETER),
            format!("Type parameter '{}' was removed from '{}'", removed.name, ctx.new.name),
        ));
    }
    if let Some(added) = new_params
        .iter()
        .find(|p| !old_params.iter().any(|o| o.name == p.name))
    {
        return Some(Classification::new(
            ChangeDescriptor::simple(ChangeTarget::TypeParameter, ChangeAction::Added)
                .tag(tags::AFFECTS_TYPE_PARAMETER)
                .tag_if(added.default.is_some(), tags::HAS_DEFAULT_VALUE),
            format!("Type parameter '{}' was added to '{}'", added.name, ctx.new.name),
        ));
    }

    let shared: Vec<_> = old_params
        .iter()
        .filter_map(|o| new_params.iter().find(|n| n.name == o.name).map(|n| (o, n)))
        .collect();

    for (old, new) in &shared {
        if let Some(impact) = clause_impact(old.constraint.as_deref(), new.constraint.as_deref()) {
            return Some(Classification::new(
                ChangeDescriptor::modified(ChangeTarget::TypeParameter, ChangeAspect::Constraint, impact)
                    .tag(tags::AFFECTS_TYPE_PARAMETER),
                format!(
                    "Constraint of type parameter '{}' changed from {} to {}",
                    old.name,
                    describe(old.constraint.as_deref()),
                    describe(new.constraint.as_deref())
                ),
            ));
        }
    }
    for (old, new) in &shared {
        if let Some(impact) = default_impact(old.default.as_deref(), new.default.as_deref()) {
            return Some(Classification::new(
                ChangeDescriptor::modified(ChangeTarget::TypeParameter, ChangeAspect::DefaultType, impact)
                    .tag(tags::AFFECTS_TYPE_PARAMETER),
                format!(
                    "Default of type parameter '{}' changed from {} to {}",
                    old.name,
                    describe(old.default.as_deref()),
                    describe(new.default.as_deref())
                ),
            ));
        }
    }
    None
}

/// Adding a restriction narrows, dropping one widens, swapping is undetermined.
fn clause_impact(old: Option<&str>, new: Option<&str>) -> Option<ChangeImpact> {
    match (old.map(normalize_signature), new.map(normalize_signature)) {
        (None, None) => None,
        (None, Some(_)) => Some(ChangeImpact::Narrowing),
        (Some(_), None) => Some(ChangeImpact::Widening),
        (Some(a), Some(b)) if a == b => None,
        (Some(_), Some(_)) => Some(ChangeImpact::Undetermined),
    }
}

/// A new default lets callers omit the argument; losing it does the opposite.
fn default_impact(old: Option<&str>, new: Option<&str>) -> Option<ChangeImpact> {
    match (old.map(normalize_signature), new.map(normalize_signature)) {
        (None, None) => None,
        (None, Some(_)) => Some(ChangeImpact::Widening),
        (Some(_), None) => Some(ChangeImpact::Narrowing),
        (Some(a), Some(b)) if a == b => None,
        (Some(_), Some(_)) => Some(ChangeImpact::Undetermined),
    }
}

fn describe(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v),
        None => "none".to_string(),
    }
}

fn check_enum_value(ctx: &PairContext<'_>) -> Option<Classification> {
    if ctx.old.kind != NodeKind::EnumMember {
        return None;
    }
    let old = normalize_signature(&ctx.old.type_info.signature);
    let new = normalize_signature(&ctx.new.type_info.signature);
    if old == new {
        return None;
    }
    Some(Classification::new(
        ChangeDescriptor::modified(
            ChangeTarget::EnumMember,
            ChangeAspect::EnumValue,
            ChangeImpact::Unrelated,
        ),
        format!(
            "Value of enum member '{}' changed from '{}' to '{}'",
            ctx.new.name, old, new
        ),
    ))
}

fn check_type_signature(ctx: &PairContext<'_>) -> Option<Classification> {
    let old = normalize_signature(&ctx.old.type_info.signature);
    let new = normalize_signature(&ctx.new.type_info.signature);
    if old == new {
        return None;
    }
    let impact = determine_type_impact(&old, &new, ctx.relation);
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Type, impact),
        format!(
            "Type of {} '{}' changed from '{}' to '{}' ({})",
            ctx.new.kind, ctx.new.name, old, new, impact
        ),
    ))
}

/// `(was_present, is_present)` when the modifier flipped.
fn modifier_flip(ctx: &PairContext<'_>, modifier: Modifier) -> Option<bool> {
    let was = ctx.old.has_modifier(modifier);
    let is = ctx.new.has_modifier(modifier);
    (was != is).then_some(is)
}

fn check_readonly(ctx: &PairContext<'_>) -> Option<Classification> {
    let added = modifier_flip(ctx, Modifier::Readonly)?;
    let (impact, verb) = if added {
        (ChangeImpact::Narrowing, "became")
    } else {
        (ChangeImpact::Widening, "is no longer")
    };
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Readonly, impact),
        format!("{} '{}' {} readonly", ctx.new.kind, ctx.new.name, verb),
    ))
}

fn check_optionality(ctx: &PairContext<'_>) -> Option<Classification> {
    let now_optional = modifier_flip(ctx, Modifier::Optional)?;
    let descriptor = if now_optional {
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Optionality, ChangeImpact::Widening)
            .tag(tags::WAS_REQUIRED)
            .tag(tags::NOW_OPTIONAL)
    } else {
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Optionality, ChangeImpact::Narrowing)
            .tag(tags::WAS_OPTIONAL)
            .tag(tags::NOW_REQUIRED)
    };
    let state = if now_optional { "optional" } else { "required" };
    Some(Classification::new(
        descriptor,
        format!("{} '{}' became {}", ctx.new.kind, ctx.new.name, state),
    ))
}

fn check_abstractness(ctx: &PairContext<'_>) -> Option<Classification> {
    let added = modifier_flip(ctx, Modifier::Abstract)?;
    let (impact, verb) = if added {
        (ChangeImpact::Narrowing, "became")
    } else {
        (ChangeImpact::Widening, "is no longer")
    };
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Abstractness, impact),
        format!("{} '{}' {} abstract", ctx.new.kind, ctx.new.name, verb),
    ))
}

fn check_staticness(ctx: &PairContext<'_>) -> Option<Classification> {
    let added = modifier_flip(ctx, Modifier::Static)?;
    let verb = if added { "became" } else { "is no longer" };
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Staticness, ChangeImpact::Unrelated),
        format!("{} '{}' {} static", ctx.new.kind, ctx.new.name, verb),
    ))
}

/// A member without a visibility modifier is public.
fn check_visibility(ctx: &PairContext<'_>) -> Option<Classification> {
    let old = ctx.old.visibility().unwrap_or(Modifier::Public);
    let new = ctx.new.visibility().unwrap_or(Modifier::Public);
    if old == new {
        return None;
    }
    let tag = match new {
        Modifier::Protected => tags::NOW_PROTECTED,
        Modifier::Private => tags::NOW_PRIVATE,
        _ => tags::NOW_PUBLIC,
    };
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::Visibility, ChangeImpact::Undetermined)
            .tag(tag),
        format!(
            "Visibility of {} '{}' changed from {} to {}",
            ctx.new.kind,
            ctx.new.name,
            old.as_str(),
            new.as_str()
        ),
    ))
}

fn clause_change(old: &[String], new: &[String]) -> Option<ChangeImpact> {
    match (old.is_empty(), new.is_empty()) {
        (true, true) => None,
        (true, false) => Some(ChangeImpact::Narrowing),
        (false, true) => Some(ChangeImpact::Widening),
        (false, false) if old == new => None,
        (false, false) => Some(ChangeImpact::Undetermined),
    }
}

fn check_extends(ctx: &PairContext<'_>) -> Option<Classification> {
    let impact = clause_change(&ctx.old.extends, &ctx.new.extends)?;
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::ExtendsClause, impact),
        format!(
            "Extends clause of '{}' changed from [{}] to [{}]",
            ctx.new.name,
            ctx.old.extends.join(", "),
            ctx.new.extends.join(", ")
        ),
    ))
}

fn check_implements(ctx: &PairContext<'_>) -> Option<Classification> {
    let impact = clause_change(&ctx.old.implements, &ctx.new.implements)?;
    Some(Classification::new(
        ChangeDescriptor::modified(ctx.target, ChangeAspect::ImplementsClause, impact),
        format!(
            "Implements clause of '{}' changed from [{}] to [{}]",
            ctx.new.name,
            ctx.old.implements.join(", "),
            ctx.new.implements.join(", ")
        ),
    ))
}

fn check_deprecation(ctx: &PairContext<'_>) -> Option<Classification> {
    let was = ctx.old.is_deprecated();
    let is = ctx.new.is_deprecated();
    if was == is {
        return None;
    }
    if is {
        let message = ctx
            .new
            .metadata
            .as_ref()
            .and_then(|m| m.deprecation_message.as_deref())
            .map(|m| format!(": {}", m))
            .unwrap_or_default();
        Some(Classification::new(
            ChangeDescriptor::modified(ctx.target, ChangeAspect::Deprecation, ChangeImpact::Widening)
                .tag(tags::NOW_DEPRECATED),
            format!("{} '{}' was deprecated{}", ctx.new.kind, ctx.new.name, message),
        ))
    } else {
        Some(Classification::new(
            ChangeDescriptor::modified(ctx.target, ChangeAspect::Deprecation, ChangeImpact::Narrowing)
                .tag(tags::NO_LONGER_DEPRECATED),
            format!("{} '{}' is no longer deprecated", ctx.new.kind, ctx.new.name),
        ))
    }
}
