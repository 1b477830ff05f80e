//! Error types for apidelta-policy.

use thiserror::Error;

/// Result type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Errors raised while loading or validating a policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two rules in one policy share a name.
    #[error("Duplicate rule name: {name}")]
    DuplicateRule {
        /// The repeated name.
        name: String,
    },

    /// A rule has an empty or blank name.
    #[error("Rule at position {index} has no name")]
    EmptyRuleName {
        /// Zero-based position of the rule.
        index: usize,
    },

    #[error("Policy name must not be empty")]
    EmptyPolicyName,
}
