//! Error types for apidelta-core.
//!
//! Diffing itself is total; errors only arise when decoding snapshots or
//! options handed over by callers.

use thiserror::Error;

/// Result type alias for apidelta-core operations.
pub type Result<T> = std::result::Result<T, DeltaError>;

/// Errors raised at the snapshot and configuration boundary.
#[derive(Error, Debug)]
pub enum DeltaError {
    /// Snapshot JSON could not be decoded.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Options TOML could not be decoded.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A diff option holds a value outside its accepted range.
    #[error("Invalid option '{field}': {message}")]
    InvalidOption {
        /// Name of the offending option.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// Two nodes in one snapshot share a path.
    #[error("Duplicate declaration path: {path}")]
    DuplicatePath {
        /// The repeated path.
        path: String,
    },

    /// A node's path does not extend its parent's path by its name.
    #[error("Inconsistent path '{path}', expected '{expected}'")]
    InconsistentPath {
        /// Path found on the node.
        path: String,
        /// Path derived from the parent and the node name.
        expected: String,
    },

    /// Any other structural defect in a snapshot.
    #[error("Invalid snapshot: {message}")]
    InvalidTree {
        /// Description of the defect.
        message: String,
    },
}
