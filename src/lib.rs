pub mod api;
pub mod classifier;
pub mod config;
pub mod detector;
pub mod domain;
pub mod error;
pub mod features;
pub mod observability;
pub mod policy;
pub mod rules;

pub use classifier::{BotClassifier, ClassifierAdapter, HeuristicClassifier, LogisticModel};
pub use config::Config;
pub use detector::{BotDetector, DetectorBuilder};
pub use domain::{AccountRecord, DetectionMethod, DetectionResult, Feature, FeatureVector, MethodSet};
pub use error::ConfigError;
pub use features::FeatureExtractor;
pub use rules::{RuleConfig, RuleEngine, RuleSet};
