use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use thiserror::Error;

use crate::domain::Feature;

/// Class predicted by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Bot,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Legitimate => write!(f, "legitimate"),
            Label::Bot => write!(f, "bot"),
        }
    }
}

/// Per-class probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelProbabilities {
    pub legitimate: f64,
    pub bot: f64,
}

impl LabelProbabilities {
    /// Probabilities from the bot-class probability.
    pub fn from_bot(bot: f64) -> Self {
        LabelProbabilities {
            legitimate: 1.0 - bot,
            bot,
        }
    }

    /// Probability associated with `label`.
    pub fn of(&self, label: Label) -> f64 {
        match label {
            Label::Legitimate => self.legitimate,
            Label::Bot => self.bot,
        }
    }
}

/// Failures raised by a classifier at inference time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("feature vector has {actual} values, classifier expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("classifier produced a non-finite output")]
    NonFinite,

    #[error("classifier failure: {0}")]
    Internal(String),
}

/// Capability exposed by an externally trained classifier artifact.
///
/// Input is the feature vector in canonical schema order. Implementations
/// must be immutable after loading so one instance can serve concurrent
/// detections.
pub trait BotClassifier: Send + Sync + Debug {
    /// Short identifier for logs and health output.
    fn name(&self) -> &str;

    /// Predicted class for an ordered feature vector.
    fn predict_label(&self, input: &[f64]) -> Result<Label, ClassifierError>;

    /// Class probabilities for an ordered feature vector.
    fn predict_confidence(&self, input: &[f64]) -> Result<LabelProbabilities, ClassifierError>;

    /// Relative importance per feature, when the model can report it.
    fn feature_importance(&self) -> Vec<(Feature, f64)> {
        Vec::new()
    }
}
