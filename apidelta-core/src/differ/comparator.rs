//! Recursive tree differ for API snapshots.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::Instant;

use crate::config::DiffOptions;
use crate::differ::changes::{
    tags, ApiChange, ChangeAction, ChangeContext, ChangeDescriptor, ChangeTarget,
    PendingDescriptor,
};
use crate::differ::classifier::{classify_pair, PairContext};
use crate::differ::impact::TypeRelation;
use crate::differ::matcher::match_nodes;
use crate::differ::rename::{detect_renames, RenameCandidate};
use crate::types::{ApiSnapshot, DeclarationNode, Modifier};

/// Diffs two snapshots with fixed options and an optional type oracle.
pub struct TreeDiffer<'o> {
    options: DiffOptions,
    relation: Option<&'o dyn TypeRelation>,
}

impl<'o> TreeDiffer<'o> {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options: options.sanitized(),
            relation: None,
        }
    }

    /// Use semantic union comparison for type changes.
    pub fn with_type_relation(mut self, relation: &'o dyn TypeRelation) -> Self {
        self.relation = Some(relation);
        self
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    /// Compute every change between two snapshots.
    ///
    /// Each level emits renames, then removals, then additions, then
    /// modified pairs in old declaration order.
    pub fn diff<'a>(&self, old: &'a ApiSnapshot, new: &'a ApiSnapshot) -> Vec<ApiChange<'a>> {
        let start = Instant::now();
        let changes = self.diff_level(&old.exports, &new.exports, 0, &[]);
        tracing::debug!(
            changes = changes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Diffed snapshots"
        );
        changes
    }

    fn diff_level<'a>(
        &self,
        old: &'a [DeclarationNode],
        new: &'a [DeclarationNode],
        depth: usize,
        ancestors: &[String],
    ) -> Vec<ApiChange<'a>> {
        let matches = match_nodes(old, new);
        let renames = if matches.is_identity() {
            Vec::new()
        } else {
            detect_renames(&matches.removed, &matches.added, self.options.rename_threshold)
        };

        tracing::debug!(
            depth,
            matched = matches.matched.len(),
            removed = matches.removed.len(),
            added = matches.added.len(),
            renamed = renames.len(),
            "Matched declaration level"
        );

        let renamed_old: HashSet<&str> = renames.iter().map(|r| r.old.path.as_str()).collect();
        let renamed_new: HashSet<&str> = renames.iter().map(|r| r.new.path.as_str()).collect();

        let mut changes = Vec::new();

        for rename in &renames {
            changes.push(self.renamed_change(rename, depth, ancestors));
        }

        for node in matches
            .removed
            .iter()
            .filter(|n| !renamed_old.contains(n.path.as_str()))
        {
            let descriptor = member_descriptor(node, depth, ChangeAction::Removed).finalize();
            let context = ChangeContext::at(depth, ancestors)
                .with_signatures(Some(&node.type_info.signature), None);
            changes.push(ApiChange::removed(
                descriptor,
                node,
                context,
                format!("Removed {} '{}'", node.kind, node.name),
            ));
        }

        for node in matches
            .added
            .iter()
            .filter(|n| !renamed_new.contains(n.path.as_str()))
        {
            let descriptor = member_descriptor(node, depth, ChangeAction::Added).finalize();
            let context = ChangeContext::at(depth, ancestors)
                .with_signatures(None, Some(&node.type_info.signature));
            changes.push(ApiChange::added(
                descriptor,
                node,
                context,
                format!("Added {} '{}'", node.kind, node.name),
            ));
        }

        changes.extend(self.diff_matched(&matches.matched, depth, ancestors));
        changes
    }

    /// Classify matched pairs, preserving their order.
    fn diff_matched<'a>(
        &self,
        matched: &[(&'a DeclarationNode, &'a DeclarationNode)],
        depth: usize,
        ancestors: &[String],
    ) -> Vec<ApiChange<'a>> {
        #[cfg(feature = "parallel")]
        {
            if depth == 0 {
                let results: Vec<Option<ApiChange<'a>>> = matched
                    .par_iter()
                    .map(|&(old, new)| self.diff_pair(old, new, depth, ancestors))
                    .collect();
                return results.into_iter().flatten().collect();
            }
        }

        matched
            .iter()
            .filter_map(|&(old, new)| self.diff_pair(old, new, depth, ancestors))
            .collect()
    }

    fn diff_pair<'a>(
        &self,
        old: &'a DeclarationNode,
        new: &'a DeclarationNode,
        depth: usize,
        ancestors: &[String],
    ) -> Option<ApiChange<'a>> {
        let classification = classify_pair(&PairContext {
            old,
            new,
            target: ChangeTarget::for_node(new.kind, depth),
            detect_parameter_reordering: self.options.detect_parameter_reordering,
            relation: self.relation,
        });

        let nested = if self.options.include_nested_changes
            && depth < self.options.max_nesting_depth
        {
            let mut chain = ancestors.to_vec();
            chain.push(old.path.clone());
            self.diff_level(&old.children, &new.children, depth + 1, &chain)
        } else {
            Vec::new()
        };

        let mut descriptor = classification.descriptor;
        if nested.is_empty() {
            if descriptor.descriptor().is_equivalent() {
                return None;
            }
        } else {
            descriptor.add_tag(tags::HAS_NESTED_CHANGES);
        }

        let context = ChangeContext::at(depth, ancestors).with_signatures(
            Some(&old.type_info.signature),
            Some(&new.type_info.signature),
        );
        Some(
            ApiChange::between(
                descriptor.finalize(),
                old,
                new,
                context,
                classification.explanation,
            )
            .with_nested(nested),
        )
    }

    fn renamed_change<'a>(
        &self,
        rename: &RenameCandidate<'a>,
        depth: usize,
        ancestors: &[String],
    ) -> ApiChange<'a> {
        let descriptor =
            ChangeDescriptor::simple(ChangeTarget::for_node(rename.old.kind, depth), ChangeAction::Renamed)
                .finalize();
        let mut context = ChangeContext::at(depth, ancestors).with_signatures(
            Some(&rename.old.type_info.signature),
            Some(&rename.new.type_info.signature),
        );
        context.rename_confidence = Some(rename.confidence);
        ApiChange::between(
            descriptor,
            rename.old,
            rename.new,
            context,
            format!(
                "{} '{}' was renamed to '{}' (confidence {:.2})",
                rename.old.kind, rename.old.name, rename.new.name, rename.confidence
            ),
        )
    }
}

/// Descriptor for an added or removed declaration.
fn member_descriptor(node: &DeclarationNode, depth: usize, action: ChangeAction) -> PendingDescriptor {
    ChangeDescriptor::simple(ChangeTarget::for_node(node.kind, depth), action)
        .tag_if(node.has_modifier(Modifier::Optional), tags::IS_OPTIONAL)
        .tag_if(node.default_value().is_some(), tags::HAS_DEFAULT_VALUE)
        .tag_if(node.is_rest_parameter(), tags::IS_REST_PARAMETER)
}

/// Diff two snapshots without a type oracle.
pub fn diff<'a>(old: &'a ApiSnapshot, new: &'a ApiSnapshot, options: &DiffOptions) -> Vec<ApiChange<'a>> {
    TreeDiffer::new(options.clone()).diff(old, new)
}
