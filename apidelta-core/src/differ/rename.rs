//! Rename inference among unmatched declarations.
//!
//! Every removed/added pair of the same kind is scored:
//!
//! | signal                 | weight |
//! |------------------------|--------|
//! | name similarity        | 0.4    |
//! | signature similarity   | 0.4    |
//! | modifier Jaccard       | 0.1    |
//! | child-count ratio      | 0.1    |
//!
//! Candidates at or above the threshold are accepted greedily by descending
//! confidence, each node taking part in at most one rename. This is a
//! heuristic, not an optimal assignment: near-ties resolve by input order
//! (removed order first, then added order), which keeps results
//! deterministic.

use std::collections::HashSet;

use crate::differ::impact::normalize_signature;
use crate::types::DeclarationNode;

const NAME_WEIGHT: f64 = 0.4;
const SIGNATURE_WEIGHT: f64 = 0.4;
const MODIFIER_WEIGHT: f64 = 0.1;
const CHILDREN_WEIGHT: f64 = 0.1;

const NORMALIZED_SIGNATURE_MATCH: f64 = 0.95;

/// An accepted rename.
#[derive(Clone, Copy, Debug)]
pub struct RenameCandidate<'a> {
    pub old: &'a DeclarationNode,
    pub new: &'a DeclarationNode,
    pub confidence: f64,
}

/// Pick renames out of the removed and added remainders.
pub fn detect_renames<'a>(
    removed: &[&'a DeclarationNode],
    added: &[&'a DeclarationNode],
    threshold: f64,
) -> Vec<RenameCandidate<'a>> {
    let mut candidates = Vec::new();
    for (old_idx, old) in removed.iter().enumerate() {
        for (new_idx, new) in added.iter().enumerate() {
            if old.kind != new.kind {
                continue;
            }
            let confidence = rename_confidence(old, new);
            if confidence < threshold {
                tracing::trace!(
                    old = %old.path,
                    new = %new.path,
                    confidence,
                    "Rename candidate below threshold"
                );
                continue;
            }
            candidates.push((old_idx, new_idx, confidence));
        }
    }

    // Stable sort keeps first-seen order among equal confidences.
    candidates.sort_by(|a, b| b.2.total_cmp(&a.2));

    let mut used_old = HashSet::new();
    let mut used_new = HashSet::new();
    let mut renames = Vec::new();
    for (old_idx, new_idx, confidence) in candidates {
        if used_old.contains(&old_idx) || used_new.contains(&new_idx) {
            continue;
        }
        used_old.insert(old_idx);
        used_new.insert(new_idx);
        tracing::debug!(
            old = %removed[old_idx].path,
            new = %added[new_idx].path,
            confidence,
            "Detected rename"
        );
        renames.push(RenameCandidate {
            old: removed[old_idx],
            new: added[new_idx],
            confidence,
        });
    }
    renames
}

/// Weighted similarity between a removed and an added declaration.
pub fn rename_confidence(old: &DeclarationNode, new: &DeclarationNode) -> f64 {
    NAME_WEIGHT * name_similarity(&old.name, &new.name)
        + SIGNATURE_WEIGHT * signature_similarity(&old.type_info.signature, &new.type_info.signature)
        + MODIFIER_WEIGHT * modifier_similarity(old, new)
        + CHILDREN_WEIGHT * children_similarity(old.children.len(), new.children.len())
}

/// Best of token overlap and edit-distance similarity, case-insensitive.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_tokens = tokenize_identifier(a);
    let b_tokens = tokenize_identifier(b);
    let token_score = jaccard(&a_tokens, &b_tokens);
    let edit_score = edit_similarity(&a.to_lowercase(), &b.to_lowercase());
    token_score.max(edit_score)
}

/// Exact match 1.0, whitespace-normalized match 0.95, else edit similarity.
pub fn signature_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a = normalize_signature(a);
    let b = normalize_signature(b);
    if a == b {
        return NORMALIZED_SIGNATURE_MATCH;
    }
    edit_similarity(&a, &b)
}

fn modifier_similarity(old: &DeclarationNode, new: &DeclarationNode) -> f64 {
    if old.modifiers.is_empty() && new.modifiers.is_empty() {
        return 1.0;
    }
    let shared = old.modifiers.intersection(&new.modifiers).count();
    let total = old.modifiers.union(&new.modifiers).count();
    shared as f64 / total as f64
}

fn children_similarity(old: usize, new: usize) -> f64 {
    if old == new {
        return 1.0;
    }
    if old == 0 || new == 0 {
        return 0.0;
    }
    old.min(new) as f64 / old.max(new) as f64
}

/// Split camelCase, PascalCase, snake_case and kebab-case into lowercase words.
pub fn tokenize_identifier(name: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if !ch.is_alphanumeric() {
            flush_token(&mut tokens, &mut current);
            continue;
        }
        let boundary = ch.is_uppercase()
            && i > 0
            && (chars[i - 1].is_lowercase()
                || chars[i - 1].is_ascii_digit()
                || chars.get(i + 1).is_some_and(|c| c.is_lowercase())
                    && chars[i - 1].is_uppercase());
        if boundary {
            flush_token(&mut tokens, &mut current);
        }
        current.extend(ch.to_lowercase());
    }
    flush_token(&mut tokens, &mut current);
    tokens
}

fn flush_token(tokens: &mut HashSet<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.insert(std::mem::take(current));
    }
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let shared = a.intersection(b).count();
    let total = a.union(b).count();
    shared as f64 / total as f64
}

/// `1 - distance / max_len` over characters.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// Levenshtein distance with a two-row table.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
