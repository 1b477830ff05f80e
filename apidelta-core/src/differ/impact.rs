//! Type-impact inference for changed signatures.
//!
//! Decides whether a signature change widens or narrows what callers may
//! pass or receive. Two strategies exist:
//!
//! - **Semantic**: when a [`TypeRelation`] oracle is injected, both
//!   signatures are treated as unions and members are compared through it.
//! - **Heuristic**: otherwise, union members are compared verbatim and
//!   optionality markers are inspected; anything else is `undetermined`.
//!
//! Both agree on the easy cases (equality, one-member union growth/shrink).
//!
//! Unions are only split before a top-level `=>`: in `(a: string) => void |
//! undefined` the union belongs to the return type, so the whole function
//! type is one member.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::differ::changes::ChangeImpact;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const UNION_SEPARATOR: char = '|';

/// Injected type-equivalence capability.
///
/// Implementations typically wrap a real type checker. The differ never
/// requires one.
pub trait TypeRelation: Send + Sync {
    /// Whether a value of type `from` is assignable to type `to`.
    fn is_assignable(&self, from: &str, to: &str) -> bool;

    /// Mutual assignability.
    fn is_equivalent(&self, a: &str, b: &str) -> bool {
        self.is_assignable(a, b) && self.is_assignable(b, a)
    }
}

/// Minimal oracle: types are equal after normalization, `any` and `unknown`
/// accept everything and `never` is assignable to everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NormalizedTypeRelation;

impl TypeRelation for NormalizedTypeRelation {
    fn is_assignable(&self, from: &str, to: &str) -> bool {
        let from = normalize_signature(from);
        let to = normalize_signature(to);
        from == to || to == "any" || to == "unknown" || from == "never"
    }
}

/// Collapse whitespace runs to one space and trim.
pub fn normalize_signature(signature: &str) -> String {
    WHITESPACE.replace_all(signature.trim(), " ").into_owned()
}

/// Split a type on top-level union separators.
///
/// Separators nested in brackets, parentheses, braces, angle brackets or
/// string literals are ignored, as is everything after a top-level arrow.
/// A leading separator is dropped.
pub fn split_union(signature: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    let mut arrow = false;

    for ch in signature.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == q && prev != '\\' {
                quote = None;
            }
            prev = ch;
            continue;
        }
        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            // `=>` is an arrow, not a closing angle bracket
            '>' if prev == '=' => arrow |= depth == 0,
            '>' => depth -= 1,
            UNION_SEPARATOR if depth == 0 && !arrow => {
                push_part(&mut parts, &current);
                current.clear();
                prev = ch;
                continue;
            }
            _ => {}
        }
        current.push(ch);
        prev = ch;
    }
    push_part(&mut parts, &current);
    parts
}

fn push_part(parts: &mut Vec<String>, raw: &str) {
    let part = normalize_signature(raw);
    if !part.is_empty() {
        parts.push(part);
    }
}

fn is_union(parts: &[String]) -> bool {
    parts.len() > 1
}

/// Whether the type admits absence: a trailing `?` or an `undefined` member.
fn has_optional_marker(signature: &str, parts: &[String]) -> bool {
    signature.ends_with('?') || parts.iter().any(|p| p == "undefined")
}

/// Classify how a signature change affects callers.
pub fn determine_type_impact(
    old_signature: &str,
    new_signature: &str,
    relation: Option<&dyn TypeRelation>,
) -> ChangeImpact {
    let old = normalize_signature(old_signature);
    let new = normalize_signature(new_signature);
    if old == new {
        return ChangeImpact::Equivalent;
    }

    let old_parts = split_union(&old);
    let new_parts = split_union(&new);

    match relation {
        Some(relation) => semantic_impact(&old, &new, &old_parts, &new_parts, relation),
        None => heuristic_impact(&old, &new, &old_parts, &new_parts),
    }
}

fn semantic_impact(
    old: &str,
    new: &str,
    old_parts: &[String],
    new_parts: &[String],
    relation: &dyn TypeRelation,
) -> ChangeImpact {
    let contains = |set: &[String], member: &String| set.iter().any(|m| relation.is_equivalent(member, m));
    let old_in_new = old_parts.iter().all(|m| contains(new_parts, m));
    let new_in_old = new_parts.iter().all(|m| contains(old_parts, m));

    match (old_in_new, new_in_old) {
        (true, true) => ChangeImpact::Equivalent,
        (true, false) => ChangeImpact::Widening,
        (false, true) => ChangeImpact::Narrowing,
        (false, false) => {
            if is_union(new_parts) && new_parts.iter().any(|p| p == old) {
                ChangeImpact::Widening
            } else if is_union(old_parts) && old_parts.iter().any(|p| p == new) {
                ChangeImpact::Narrowing
            } else {
                ChangeImpact::Unrelated
            }
        }
    }
}

fn heuristic_impact(old: &str, new: &str, old_parts: &[String], new_parts: &[String]) -> ChangeImpact {
    if new_parts.iter().any(|p| p == old) {
        return ChangeImpact::Widening;
    }
    if old_parts.iter().any(|p| p == new) {
        return ChangeImpact::Narrowing;
    }

    let old_optional = has_optional_marker(old, old_parts);
    let new_optional = has_optional_marker(new, new_parts);
    match (old_optional, new_optional) {
        (false, true) => ChangeImpact::Widening,
        (true, false) => ChangeImpact::Narrowing,
        _ => ChangeImpact::Undetermined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_signature() {
        assert_eq!(
            normalize_signature("  (a:  string,\n  b: number)   => void "),
            "(a: string, b: number) => void"
        );
    }

    #[test]
    fn test_split_union_respects_nesting() {
        assert_eq!(split_union("string | number"), vec!["string", "number"]);
        assert_eq!(
            split_union("Array<string | number> | null"),
            vec!["Array<string | number>", "null"]
        );
        assert_eq!(
            split_union("(a: string) => void | undefined"),
            vec!["(a: string) => void | undefined"]
        );
        assert_eq!(
            split_union("((a: string) => void) | undefined"),
            vec!["((a: string) => void)", "undefined"]
        );
        assert_eq!(split_union("'a|b' | 'c'"), vec!["'a|b'", "'c'"]);
        assert_eq!(split_union("| 'x' | 'y'"), vec!["'x'", "'y'"]);
    }

    #[test]
    fn test_equal_after_normalization_is_equivalent() {
        assert_eq!(
            determine_type_impact("string |  number", "string | number", None),
            ChangeImpact::Equivalent
        );
    }

    #[test]
    fn test_heuristic_union_growth_and_shrink() {
        assert_eq!(
            determine_type_impact("string", "string | number", None),
            ChangeImpact::Widening
        );
        assert_eq!(
            determine_type_impact("string | number", "string", None),
            ChangeImpact::Narrowing
        );
    }

    #[test]
    fn test_heuristic_optionality_markers() {
        assert_eq!(
            determine_type_impact("string | number", "string | number | undefined", None),
            ChangeImpact::Widening
        );
        assert_eq!(
            determine_type_impact("Foo | undefined", "Bar", None),
            ChangeImpact::Narrowing
        );
    }

    #[test]
    fn test_heuristic_unknown_change_is_undetermined() {
        assert_eq!(
            determine_type_impact("() => string", "() => number", None),
            ChangeImpact::Undetermined
        );
    }

    #[test]
    fn test_return_type_union_is_not_split() {
        assert_eq!(
            determine_type_impact("(a: string) => void", "(a: string) => void | undefined", None),
            ChangeImpact::Undetermined
        );
    }

    #[test]
    fn test_semantic_union_comparison() {
        let relation = NormalizedTypeRelation;
        assert_eq!(
            determine_type_impact("string | number", "number | string | boolean", Some(&relation)),
            ChangeImpact::Widening
        );
        assert_eq!(
            determine_type_impact("'a' | 'b' | 'c'", "'c' | 'a'", Some(&relation)),
            ChangeImpact::Narrowing
        );
        assert_eq!(
            determine_type_impact("number | string", "string | number", Some(&relation)),
            ChangeImpact::Equivalent
        );
        assert_eq!(
            determine_type_impact("string", "number", Some(&relation)),
            ChangeImpact::Unrelated
        );
    }

    #[test]
    fn test_strategies_agree_on_trivial_unions() {
        let relation = NormalizedTypeRelation;
        for (old, new) in [("string", "string | null"), ("string | null", "string")] {
            assert_eq!(
                determine_type_impact(old, new, None),
                determine_type_impact(old, new, Some(&relation))
            );
        }
    }

    #[test]
    fn test_normalized_relation_top_and_bottom_types() {
        let relation = NormalizedTypeRelation;
        assert!(relation.is_assignable("string", "unknown"));
        assert!(relation.is_assignable("never", "string"));
        assert!(!relation.is_assignable("string", "number"));
        assert!(relation.is_equivalent(" string", "string "));
    }
}
