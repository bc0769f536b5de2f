use std::path::PathBuf;
use thiserror::Error;

use crate::classifier::ArtifactError;
use crate::rules::RuleConfigError;

/// Errors raised while constructing a detector or loading its configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load classifier artifact {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },

    #[error("failed to read rule config {}: {source}", path.display())]
    RuleConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule config {}: {source}", path.display())]
    RuleConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("rule config {}: '{key}' must be a number", path.display())]
    RuleConfigValue { path: PathBuf, key: String },

    #[error("invalid rule config: {0}")]
    InvalidRuleConfig(#[from] RuleConfigError),
}
