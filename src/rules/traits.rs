use std::fmt::Debug;

use crate::domain::{FeatureVector, RuleResult};

use super::config::RuleConfig;

/// A fixed boolean heuristic over the feature vector.
///
/// Rules are stateless: the outcome depends only on the features and the
/// threshold table passed in. Each rule contributes its weight to the bot
/// score when it fires.
pub trait Rule: Send + Sync + Debug {
    /// Unique identifier for this rule.
    fn id(&self) -> &str;

    /// Human-readable description used in fired-rule lists.
    fn description(&self) -> &str;

    /// Fixed contribution to the bot score.
    fn weight(&self) -> f64;

    /// Evaluate the rule against a feature vector.
    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult;
}
