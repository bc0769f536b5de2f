use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::rules::RuleConfig;

/// Threshold document as written on disk.
///
/// Top-level keys are threshold names; an optional `version` labels the
/// document for logs. Keys that are not thresholds are ignored.
///
/// ```yaml
/// version: "2026-10-01"
/// min_account_age_days: 14
/// max_url_ratio: 0.6
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleConfigDocument {
    #[serde(default)]
    pub version: Option<String>,

    #[serde(flatten)]
    pub entries: BTreeMap<String, serde_yaml::Value>,
}

impl RuleConfigDocument {
    /// Parse a YAML threshold document. An empty document has no entries.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(RuleConfigDocument::default());
        }
        serde_yaml::from_str(content)
    }

    /// Numeric overrides for recognized keys.
    ///
    /// Returns the name of the first recognized key whose value is not a
    /// number.
    pub fn overrides(&self) -> Result<HashMap<String, f64>, String> {
        let mut overrides = HashMap::new();
        for (key, value) in &self.entries {
            if !RuleConfig::KEYS.contains(&key.as_str()) {
                continue;
            }
            match value.as_f64() {
                Some(v) => {
                    overrides.insert(key.clone(), v);
                }
                None => return Err(key.clone()),
            }
        }
        Ok(overrides)
    }

    /// Keys present in the document that are not thresholds.
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| !RuleConfig::KEYS.contains(k))
            .collect()
    }
}

/// Load a threshold document and merge it over the defaults.
pub fn load_rule_config(path: impl AsRef<Path>) -> Result<RuleConfig, ConfigError> {
    RuleConfigLoader::new(path.as_ref()).load()
}

/// Reads threshold documents from a fixed path.
#[derive(Debug, Clone)]
pub struct RuleConfigLoader {
    path: PathBuf,
}

impl RuleConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RuleConfigLoader { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document without applying it.
    pub fn load_document(&self) -> Result<RuleConfigDocument, ConfigError> {
        let content = fs::read_to_string(&self.path).map_err(|source| ConfigError::RuleConfigIo {
            path: self.path.clone(),
            source,
        })?;

        RuleConfigDocument::parse(&content).map_err(|source| ConfigError::RuleConfigParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Build a validated config from the document, defaults filling gaps.
    pub fn load(&self) -> Result<RuleConfig, ConfigError> {
        let document = self.load_document()?;
        self.resolve(&document)
    }

    /// Merge a parsed document over the defaults and validate it.
    pub fn resolve(&self, document: &RuleConfigDocument) -> Result<RuleConfig, ConfigError> {
        let overrides = document
            .overrides()
            .map_err(|key| ConfigError::RuleConfigValue {
                path: self.path.clone(),
                key,
            })?;

        let (config, _) = RuleConfig::default().merged(&overrides);
        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let file = write_yaml(
            r#"
version: "v2"
min_account_age_days: 14
max_url_ratio: 0.6
"#,
        );

        let config = load_rule_config(file.path()).unwrap();

        assert_eq!(config.min_account_age_days, 14.0);
        assert_eq!(config.max_url_ratio, 0.6);
        assert_eq!(config.max_post_frequency, 50.0);
        assert_eq!(config.bot_score_threshold, 0.6);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let file = write_yaml(
            r#"
max_duplicate_ratio: 0.3
notes: "tuned for spring campaign"
weights:
  r1: 0.5
"#,
        );

        let loader = RuleConfigLoader::new(file.path());
        let document = loader.load_document().unwrap();
        let config = loader.resolve(&document).unwrap();

        assert_eq!(config.max_duplicate_ratio, 0.3);
        assert_eq!(document.unknown_keys(), vec!["notes", "weights"]);
    }

    #[test]
    fn test_empty_document_is_defaults() {
        let file = write_yaml("");
        assert_eq!(load_rule_config(file.path()).unwrap(), RuleConfig::default());
    }

    #[test]
    fn test_non_numeric_threshold_rejected() {
        let file = write_yaml("min_bio_length: short\n");

        let err = load_rule_config(file.path()).unwrap_err();

        assert!(matches!(err, ConfigError::RuleConfigValue { ref key, .. } if key == "min_bio_length"));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let file = write_yaml("bot_score_threshold: 1.5\n");
        assert!(matches!(
            load_rule_config(file.path()),
            Err(ConfigError::InvalidRuleConfig(_))
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        let file = write_yaml("min_bio_length: [1, 2\n");
        assert!(matches!(
            load_rule_config(file.path()),
            Err(ConfigError::RuleConfigParse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_rule_config("/nonexistent/rules.yaml"),
            Err(ConfigError::RuleConfigIo { .. })
        ));
    }
}
