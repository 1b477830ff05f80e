//! Structural diff engine for API snapshots.
//!
//! Compares two trees of exported declarations and reports one
//! [`ApiChange`] per difference, nesting member changes under the change
//! of their container.
//!
//! # Pipeline
//!
//! - **Matching**: siblings are paired by name, level by level
//! - **Rename detection**: unmatched same-kind pairs are scored and paired greedily
//! - **Classification**: each matched pair runs through a fixed cascade of checks
//! - **Recursion**: members of matched pairs are diffed up to a depth limit
//! - **Parallel processing**: top-level pairs are classified concurrently via Rayon
//!
//! # Example
//!
//! ```
//! use apidelta_core::differ::{diff, flatten_changes};
//! use apidelta_core::{ApiSnapshot, DeclarationNode, DiffOptions, NodeKind};
//!
//! let old = ApiSnapshot::new(vec![
//!     DeclarationNode::new("getValue", NodeKind::Function).with_signature("() => string"),
//! ]);
//! let new = ApiSnapshot::new(vec![
//!     DeclarationNode::new("getValue", NodeKind::Function).with_signature("() => number"),
//! ]);
//!
//! let changes = diff(&old, &new, &DiffOptions::default());
//! assert_eq!(changes.len(), 1);
//! assert_eq!(flatten_changes(&changes)[0].descriptor.group_key(), "export:modified:type");
//! ```

pub mod changes;
pub mod classifier;
pub mod comparator;
pub mod impact;
pub mod matcher;
pub mod rename;
pub mod utils;

pub use changes::{
    tags, ApiChange, ChangeAction, ChangeAspect, ChangeContext, ChangeDescriptor, ChangeImpact,
    ChangeTarget, DiffSummary, PendingDescriptor,
};
pub use comparator::{diff, TreeDiffer};
pub use impact::{determine_type_impact, NormalizedTypeRelation, TypeRelation};
pub use utils::{flatten_changes, group_changes_by_descriptor};
