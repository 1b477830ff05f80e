//! Diff options.
//!
//! Every option is independently defaultable, so an empty document yields
//! the defaults. Options can be decoded from a flat TOML table:
//!
//! ```toml
//! rename_threshold = 0.9
//! include_nested_changes = true
//! max_nesting_depth = 4
//! detect_parameter_reordering = false
//! ```
//!
//! camelCase spellings (`renameThreshold`, ...) are accepted as aliases and
//! unrecognized keys are ignored.

use serde::{Deserialize, Serialize};

use crate::error::{DeltaError, Result};

pub const DEFAULT_RENAME_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 10;

/// Options controlling one diff run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiffOptions {
    /// Minimum confidence for a removed/added pair to be reported as a rename.
    #[serde(default = "default_rename_threshold", alias = "renameThreshold")]
    pub rename_threshold: f64,

    /// Whether matched pairs are recursively diffed into their members.
    #[serde(default = "default_true", alias = "includeNestedChanges")]
    pub include_nested_changes: bool,

    /// Deepest member level that is still diffed. Top-level exports are level 0.
    #[serde(default = "default_max_nesting_depth", alias = "maxNestingDepth")]
    pub max_nesting_depth: usize,

    /// Whether swapped parameters are reported as a single reorder.
    #[serde(default = "default_true", alias = "detectParameterReordering")]
    pub detect_parameter_reordering: bool,
}

fn default_rename_threshold() -> f64 {
    DEFAULT_RENAME_THRESHOLD
}

fn default_max_nesting_depth() -> usize {
    DEFAULT_MAX_NESTING_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            rename_threshold: DEFAULT_RENAME_THRESHOLD,
            include_nested_changes: true,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            detect_parameter_reordering: true,
        }
    }
}

impl DiffOptions {
    /// Decode options from a TOML document and validate them.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let options: DiffOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Decode options from a JSON object and validate them.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let options: DiffOptions = serde_json::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rename_threshold.is_finite() || !(0.0..=1.0).contains(&self.rename_threshold) {
            return Err(DeltaError::InvalidOption {
                field: "rename_threshold".to_string(),
                message: format!("must be between 0.0 and 1.0, got {}", self.rename_threshold),
            });
        }
        Ok(())
    }

    /// Bring a directly built threshold back into range. A non-finite value
    /// falls back to the default, anything else is clamped to `0.0..=1.0`.
    pub fn sanitized(mut self) -> Self {
        let threshold = self.rename_threshold;
        if !threshold.is_finite() {
            tracing::warn!(threshold, "Non-finite rename threshold, using default");
            self.rename_threshold = DEFAULT_RENAME_THRESHOLD;
        } else if !(0.0..=1.0).contains(&threshold) {
            tracing::warn!(threshold, "Rename threshold out of range, clamping");
            self.rename_threshold = threshold.clamp(0.0, 1.0);
        }
        self
    }

    pub fn with_rename_threshold(mut self, threshold: f64) -> Self {
        self.rename_threshold = threshold;
        self
    }

    pub fn with_nested_changes(mut self, include: bool) -> Self {
        self.include_nested_changes = include;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_parameter_reordering(mut self, detect: bool) -> Self {
        self.detect_parameter_reordering = detect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DiffOptions::default();
        assert_eq!(options.rename_threshold, 0.8);
        assert!(options.include_nested_changes);
        assert_eq!(options.max_nesting_depth, 10);
        assert!(options.detect_parameter_reordering);
    }

    #[test]
    fn test_sanitized_threshold() {
        let nan = DiffOptions::default().with_rename_threshold(f64::NAN).sanitized();
        assert_eq!(nan.rename_threshold, DEFAULT_RENAME_THRESHOLD);
        let high = DiffOptions::default().with_rename_threshold(3.0).sanitized();
        assert_eq!(high.rename_threshold, 1.0);
        let low = DiffOptions::default().with_rename_threshold(-0.5).sanitized();
        assert_eq!(low.rename_threshold, 0.0);
        let valid = DiffOptions::default().with_rename_threshold(0.6).sanitized();
        assert_eq!(valid.rename_threshold, 0.6);
    }

    #[test]
    fn test_empty_toml_yields_defaults() {
        let options = DiffOptions::from_toml_str("").unwrap();
        assert_eq!(options, DiffOptions::default());
    }

    #[test]
    fn test_parse_partial_toml() {
        let options = DiffOptions::from_toml_str(
            r#"
rename_threshold = 0.5
max_nesting_depth = 2
"#,
        )
        .unwrap();
        assert_eq!(options.rename_threshold, 0.5);
        assert_eq!(options.max_nesting_depth, 2);
        assert!(options.include_nested_changes);
    }

    #[test]
    fn test_camel_case_aliases_and_unknown_keys() {
        let options = DiffOptions::from_json_str(
            r#"{"renameThreshold": 0.6, "detectParameterReordering": false, "colour": "blue"}"#,
        )
        .unwrap();
        assert_eq!(options.rename_threshold, 0.6);
        assert!(!options.detect_parameter_reordering);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let err = DiffOptions::from_toml_str("rename_threshold = 1.5").unwrap_err();
        assert!(matches!(err, DeltaError::InvalidOption { .. }));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = DiffOptions::from_toml_str("rename_threshold = ").unwrap_err();
        assert!(matches!(err, DeltaError::Toml(_)));
    }
}
