//! Matcher configuration.
//!
//! Defaults reproduce the stock matcher behaviour; a config only needs to be
//! built when a test suite wants different failure-message limits or extra
//! CSS passthrough keywords.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::result::{ShouldError, ShouldResult};

/// Default cap on elements rendered in failure messages
pub const DEFAULT_MAX_INSPECT_ELEMENTS: usize = 10;

/// Configuration shared by every matcher evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShouldConfig {
    /// Expected CSS values that also pass when the raw inline style requests
    /// the same keyword, whatever the engine computed
    pub css_passthrough_keywords: Vec<String>,
    /// Maximum number of elements listed when a collection is inspected
    pub max_inspect_elements: usize,
    /// Trim rendered text before text comparisons
    pub trim_text: bool,
}

impl Default for ShouldConfig {
    fn default() -> Self {
        Self {
            css_passthrough_keywords: vec!["auto".to_string()],
            max_inspect_elements: DEFAULT_MAX_INSPECT_ELEMENTS,
            trim_text: true,
        }
    }
}

impl ShouldConfig {
    /// Create a new config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a CSS passthrough keyword
    #[must_use]
    pub fn with_css_passthrough(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !self.css_passthrough_keywords.contains(&keyword) {
            self.css_passthrough_keywords.push(keyword);
        }
        self
    }

    /// Set the inspection cap
    #[must_use]
    pub const fn with_max_inspect_elements(mut self, max: usize) -> Self {
        self.max_inspect_elements = max;
        self
    }

    /// Enable or disable text trimming
    #[must_use]
    pub const fn with_trim_text(mut self, trim: bool) -> Self {
        self.trim_text = trim;
        self
    }

    /// Whether `expected` is a passthrough keyword
    #[must_use]
    pub fn is_css_passthrough(&self, expected: &str) -> bool {
        self.css_passthrough_keywords.iter().any(|k| k == expected)
    }

    /// Parse a YAML document
    ///
    /// # Errors
    ///
    /// Returns [`ShouldError::Config`] if the YAML is invalid
    pub fn from_yaml_str(yaml: &str) -> ShouldResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ShouldError::Config {
            message: e.to_string(),
        })
    }

    /// Load a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_path(path: impl AsRef<Path>) -> ShouldResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns [`ShouldError::Config`] if serialization fails
    pub fn to_yaml(&self) -> ShouldResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| ShouldError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ShouldConfig::default();
        assert_eq!(config.css_passthrough_keywords, vec!["auto"]);
        assert_eq!(config.max_inspect_elements, DEFAULT_MAX_INSPECT_ELEMENTS);
        assert!(config.trim_text);
        assert!(config.is_css_passthrough("auto"));
        assert!(!config.is_css_passthrough("inherit"));
    }

    #[test]
    fn test_builder() {
        let config = ShouldConfig::new()
            .with_css_passthrough("inherit")
            .with_css_passthrough("auto")
            .with_max_inspect_elements(2)
            .with_trim_text(false);
        assert_eq!(config.css_passthrough_keywords, vec!["auto", "inherit"]);
        assert_eq!(config.max_inspect_elements, 2);
        assert!(!config.trim_text);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ShouldConfig::from_yaml_str("max_inspect_elements: 3\n").unwrap();
        assert_eq!(config.max_inspect_elements, 3);
        assert!(config.trim_text);
        assert!(config.is_css_passthrough("auto"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ShouldConfig::from_yaml_str("max_inspect_elements: [").unwrap_err();
        assert!(matches!(err, ShouldError::Config { .. }));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ShouldConfig::new().with_css_passthrough("normal");
        let yaml = config.to_yaml().unwrap();
        assert_eq!(ShouldConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "css_passthrough_keywords: [auto, normal]").unwrap();
        writeln!(file, "trim_text: false").unwrap();
        let config = ShouldConfig::from_path(file.path()).unwrap();
        assert!(config.is_css_passthrough("normal"));
        assert!(!config.trim_text);
    }

    #[test]
    fn test_from_missing_path() {
        let err = ShouldConfig::from_path("/nonexistent/dom-should.yaml").unwrap_err();
        assert!(matches!(err, ShouldError::Io(_)));
    }
}
