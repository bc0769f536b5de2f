use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{ClassifierVerdict, Feature, FeatureVector, VerdictSource};
use crate::error::ConfigError;

use super::heuristic::HeuristicClassifier;
use super::logistic::LogisticModel;
use super::traits::{BotClassifier, ClassifierError, Label};

/// Single entry point for statistical scoring.
///
/// Uses the loaded artifact when there is one and falls back to the
/// heuristic when there is none or when the artifact fails on an input.
/// Inference errors never reach the caller.
#[derive(Debug, Clone, Default)]
pub struct ClassifierAdapter {
    model: Option<Arc<dyn BotClassifier>>,
    heuristic: HeuristicClassifier,
}

impl ClassifierAdapter {
    /// Heuristic-only adapter.
    pub fn new() -> Self {
        ClassifierAdapter::default()
    }

    /// Adapter backed by an artifact loaded from `path`.
    ///
    /// Fails fast: a missing or invalid artifact is a configuration error.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let model = LogisticModel::load(path).map_err(|source| ConfigError::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), "Loaded classifier artifact");

        Ok(ClassifierAdapter::with_model(Arc::new(model)))
    }

    /// Adapter backed by an already constructed classifier.
    pub fn with_model(model: Arc<dyn BotClassifier>) -> Self {
        ClassifierAdapter {
            model: Some(model),
            heuristic: HeuristicClassifier,
        }
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Name of the active scorer.
    pub fn scorer_name(&self) -> &str {
        match &self.model {
            Some(model) => model.name(),
            None => "heuristic",
        }
    }

    /// Classify a feature vector.
    pub fn detect(&self, features: &FeatureVector) -> ClassifierVerdict {
        let Some(model) = &self.model else {
            return self.heuristic.detect(features);
        };

        match predict(model.as_ref(), &features.to_ordered()) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(model = model.name(), error = %e, "Classifier failed, using heuristic");
                self.heuristic.detect(features)
            }
        }
    }

    /// Per-feature importance reported by the artifact, if any.
    pub fn feature_importance(&self) -> Vec<(Feature, f64)> {
        self.model
            .as_ref()
            .map(|m| m.feature_importance())
            .unwrap_or_default()
    }
}

fn predict(model: &dyn BotClassifier, input: &[f64]) -> Result<ClassifierVerdict, ClassifierError> {
    let label = model.predict_label(input)?;
    let confidence = model.predict_confidence(input)?.of(label);
    if !confidence.is_finite() {
        return Err(ClassifierError::NonFinite);
    }

    Ok(ClassifierVerdict {
        is_bot: label == Label::Bot,
        confidence: confidence.clamp(0.0, 1.0),
        source: VerdictSource::Model,
    })
}
