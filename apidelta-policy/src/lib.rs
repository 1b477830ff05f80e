//! apidelta policy - release verdicts for API changes.
//!
//! Maps each [`ApiChange`](apidelta_core::ApiChange) produced by the
//! differ to a release type by evaluating an ordered list of rules (first
//! match wins), then reduces all verdicts to the most severe one.
//!
//! # Usage
//!
//! ```
//! use apidelta_core::{diff, ApiSnapshot, DeclarationNode, DiffOptions, NodeKind};
//! use apidelta_policy::{presets, ReleaseSummary, ReleaseType};
//!
//! let old = ApiSnapshot::new(vec![DeclarationNode::new("legacy", NodeKind::Function)]);
//! let new = ApiSnapshot::default();
//!
//! let changes = diff(&old, &new, &DiffOptions::default());
//! let summary = ReleaseSummary::evaluate(&changes, &presets::semver());
//! assert_eq!(summary.overall(), ReleaseType::Major);
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod presets;
pub mod rules;

pub use config::{MatchConfig, PolicyConfig, RuleConfig};
pub use engine::{
    classify_change, classify_changes, determine_overall_release, highest, ClassifiedChange,
    MatchedRule, ReleaseSummary,
};
pub use error::{PolicyError, Result};
pub use rules::{ChangeMatcher, ChangePredicate, Policy, PolicyRule, ReleaseType};
