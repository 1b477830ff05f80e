//! apidelta core - structural diffing of public API snapshots.
//!
//! Given two snapshots of a module's exported declarations, the differ
//! reports what changed, nested under the container it changed in, with a
//! multi-dimensional descriptor per change (target, action, aspect, impact
//! and tags). Release policies in `apidelta-policy` consume that output.
//!
//! # Features
//!
//! - **Name matching with rename inference**: weighted similarity over names, signatures, modifiers and members
//! - **Cascading classification**: one descriptor per matched pair, in a fixed check order
//! - **Type impact**: widening/narrowing via union heuristics or an injected [`TypeRelation`]
//! - **Deterministic output**: identical inputs always yield identical change lists
//!
//! # Usage
//!
//! ```
//! use apidelta_core::{ApiSnapshot, DeclarationNode, DiffOptions, DiffSummary, NodeKind, TreeDiffer};
//!
//! let old = ApiSnapshot::new(vec![DeclarationNode::new("Widget", NodeKind::Interface)]);
//! let new = old.clone().with_export(DeclarationNode::new("Product", NodeKind::Interface));
//!
//! let changes = TreeDiffer::new(DiffOptions::default()).diff(&old, &new);
//! assert_eq!(DiffSummary::from_changes(&changes).text(), "1 added");
//! ```

pub mod config;
pub mod differ;
pub mod error;
pub mod logging;
pub mod types;

pub use config::DiffOptions;
pub use differ::{
    diff, flatten_changes, group_changes_by_descriptor, tags, ApiChange, ChangeAction,
    ChangeAspect, ChangeContext, ChangeDescriptor, ChangeImpact, ChangeTarget, DiffSummary,
    NormalizedTypeRelation, TreeDiffer, TypeRelation,
};
pub use error::{DeltaError, Result};
pub use types::{
    ApiSnapshot, DeclarationNode, Modifier, NodeKind, NodeMetadata, ParameterInfo, Position,
    PropertyInfo, SignatureInfo, SourceRange, TypeInfo, TypeParameterInfo,
};
