//! # Validation Configuration
//!
//! Tunables for document-content validation, loaded from YAML or JSON.
//!
//! ```yaml
//! num_to_recall: 2
//! min_chunks_to_process: 3
//! heuristic:
//!   keywords: ["water right", "groundwater"]
//!   acronyms: ["gcd"]
//!   phrases: ["well permit"]
//!   excluded_phrases: ["right of way"]
//!   threshold: 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default recall window size.
pub const DEFAULT_NUM_TO_RECALL: usize = 2;

/// Default number of chunks examined before a negative verdict is allowed.
pub const DEFAULT_MIN_CHUNKS_TO_PROCESS: usize = 3;

/// Configuration for one document-content validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Size of the trailing recall window used by the chunk classifier.
    pub num_to_recall: usize,
    /// Chunks that must be examined before the scan may conclude negative.
    pub min_chunks_to_process: usize,
    /// Keyword pre-filter; absent means every chunk is judged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<KeywordHeuristicConfig>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            num_to_recall: DEFAULT_NUM_TO_RECALL,
            min_chunks_to_process: DEFAULT_MIN_CHUNKS_TO_PROCESS,
            heuristic: None,
        }
    }
}

impl ValidationConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading validation config");
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        }
    }

    /// Reject values the classifier and scan cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_to_recall == 0 {
            return Err(ConfigError::Invalid(
                "num_to_recall must be at least 1".to_string(),
            ));
        }
        if self.min_chunks_to_process == 0 {
            return Err(ConfigError::Invalid(
                "min_chunks_to_process must be at least 1".to_string(),
            ));
        }
        if let Some(heuristic) = &self.heuristic {
            heuristic.validate()?;
        }
        Ok(())
    }
}

/// Word lists for the keyword pre-filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeywordHeuristicConfig {
    /// Counted once each when found anywhere in the lowercased text.
    pub keywords: Vec<String>,
    /// Counted once each when found as a whole word.
    pub acronyms: Vec<String>,
    /// Counted once each when every word of the phrase appears.
    pub phrases: Vec<String>,
    /// Removed from the text before any counting.
    pub excluded_phrases: Vec<String>,
    /// Minimum total count for a chunk to pass.
    pub threshold: usize,
}

impl Default for KeywordHeuristicConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            acronyms: Vec::new(),
            phrases: Vec::new(),
            excluded_phrases: Vec::new(),
            threshold: 1,
        }
    }
}

impl KeywordHeuristicConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::Invalid(
                "heuristic threshold must be at least 1".to_string(),
            ));
        }
        if self.keywords.is_empty() && self.acronyms.is_empty() && self.phrases.is_empty() {
            return Err(ConfigError::Invalid(
                "heuristic needs at least one keyword, acronym, or phrase".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ValidationConfig::default();
        assert_eq!(config.num_to_recall, 2);
        assert_eq!(config.min_chunks_to_process, 3);
        assert!(config.heuristic.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_with_heuristic() {
        let yaml = r#"
num_to_recall: 3
heuristic:
  keywords: ["groundwater"]
  acronyms: ["gcd"]
"#;
        let config = ValidationConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.num_to_recall, 3);
        assert_eq!(config.min_chunks_to_process, 3);
        let heuristic = config.heuristic.unwrap();
        assert_eq!(heuristic.keywords, vec!["groundwater"]);
        assert_eq!(heuristic.threshold, 1);
    }

    #[test]
    fn rejects_zero_window() {
        let err = ValidationConfig::from_json_str(r#"{"num_to_recall": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_min_chunks() {
        let err = ValidationConfig::from_yaml_str("min_chunks_to_process: 0").unwrap_err();
        assert!(format!("{err}").contains("min_chunks_to_process"));
    }

    #[test]
    fn rejects_empty_heuristic() {
        let err = ValidationConfig::from_yaml_str("heuristic: {threshold: 2}").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(matches!(
            ValidationConfig::from_yaml_str("num_to_recal: 2"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn loads_from_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("validation.json");
        std::fs::write(&json_path, r#"{"min_chunks_to_process": 5}"#).unwrap();
        assert_eq!(
            ValidationConfig::from_path(&json_path).unwrap().min_chunks_to_process,
            5
        );

        let yaml_path = dir.path().join("validation.yaml");
        std::fs::write(&yaml_path, "num_to_recall: 4\n").unwrap();
        assert_eq!(ValidationConfig::from_path(&yaml_path).unwrap().num_to_recall, 4);

        assert!(matches!(
            ValidationConfig::from_path(&dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
