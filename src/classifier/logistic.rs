use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::{Feature, FEATURE_COUNT, FEATURE_SCHEMA_VERSION};

use super::traits::{BotClassifier, ClassifierError, Label, LabelProbabilities};

/// Format tag written into every artifact.
pub const ARTIFACT_FORMAT: &str = "botwatch-logistic";

/// Errors that can occur while loading or saving a classifier artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported artifact format '{0}'")]
    Format(String),

    #[error("artifact schema version {found} does not match feature schema version {expected}")]
    SchemaVersion { expected: u32, found: u32 },

    #[error("artifact feature names do not match the feature schema")]
    FeatureNames,

    #[error("'{field}' has {actual} entries, expected {expected}")]
    Length {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("'{0}' contains a non-finite value")]
    NonFinite(&'static str),
}

/// On-disk representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Artifact {
    format: String,
    schema_version: u32,
    feature_names: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    means: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scales: Option<Vec<f64>>,
}

/// Binary logistic regression over the canonical feature vector.
///
/// Inputs are optionally standardized with per-feature mean and scale
/// before the linear term. A scale of zero leaves the centred value as is.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    weights: Vec<f64>,
    intercept: f64,
    means: Option<Vec<f64>>,
    scales: Option<Vec<f64>>,
}

impl LogisticModel {
    /// Model from raw coefficients, one weight per feature.
    pub fn new(weights: Vec<f64>, intercept: f64) -> Result<Self, ArtifactError> {
        check_vector("weights", &weights)?;
        if !intercept.is_finite() {
            return Err(ArtifactError::NonFinite("intercept"));
        }
        Ok(LogisticModel {
            weights,
            intercept,
            means: None,
            scales: None,
        })
    }

    /// Attach standardization parameters.
    pub fn with_standardization(
        mut self,
        means: Vec<f64>,
        scales: Vec<f64>,
    ) -> Result<Self, ArtifactError> {
        check_vector("means", &means)?;
        check_vector("scales", &scales)?;
        self.means = Some(means);
        self.scales = Some(scales);
        Ok(self)
    }

    /// Load and validate an artifact from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate an artifact from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, ArtifactError> {
        let artifact: Artifact = serde_json::from_str(content)?;

        if artifact.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::Format(artifact.format));
        }
        if artifact.schema_version != FEATURE_SCHEMA_VERSION {
            return Err(ArtifactError::SchemaVersion {
                expected: FEATURE_SCHEMA_VERSION,
                found: artifact.schema_version,
            });
        }
        if !artifact.feature_names.iter().map(String::as_str).eq(Feature::names()) {
            return Err(ArtifactError::FeatureNames);
        }

        let model = LogisticModel::new(artifact.weights, artifact.intercept)?;
        match (artifact.means, artifact.scales) {
            (Some(means), Some(scales)) => model.with_standardization(means, scales),
            (None, None) => Ok(model),
            (Some(_), None) => Err(ArtifactError::Length {
                field: "scales",
                expected: FEATURE_COUNT,
                actual: 0,
            }),
            (None, Some(_)) => Err(ArtifactError::Length {
                field: "means",
                expected: FEATURE_COUNT,
                actual: 0,
            }),
        }
    }

    /// Write the artifact as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ArtifactError> {
        let artifact = Artifact {
            format: ARTIFACT_FORMAT.to_string(),
            schema_version: FEATURE_SCHEMA_VERSION,
            feature_names: Feature::names().map(str::to_string).collect(),
            weights: self.weights.clone(),
            intercept: self.intercept,
            means: self.means.clone(),
            scales: self.scales.clone(),
        };
        Ok(serde_json::to_string_pretty(&artifact)?)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Bot-class probability for an ordered feature vector.
    pub fn probability(&self, input: &[f64]) -> Result<f64, ClassifierError> {
        if input.len() != self.weights.len() {
            return Err(ClassifierError::ShapeMismatch {
                expected: self.weights.len(),
                actual: input.len(),
            });
        }

        let mut z = self.intercept;
        for (i, (&x, &w)) in input.iter().zip(self.weights.iter()).enumerate() {
            z += w * self.standardize(i, x);
        }

        let p = 1.0 / (1.0 + (-z).exp());
        if !p.is_finite() {
            return Err(ClassifierError::NonFinite);
        }
        Ok(p)
    }

    fn standardize(&self, index: usize, x: f64) -> f64 {
        let mean = self.means.as_ref().map_or(0.0, |m| m[index]);
        let scale = match self.scales.as_ref().map(|s| s[index]) {
            Some(s) if s != 0.0 => s,
            _ => 1.0,
        };
        (x - mean) / scale
    }
}

fn check_vector(field: &'static str, values: &[f64]) -> Result<(), ArtifactError> {
    if values.len() != FEATURE_COUNT {
        return Err(ArtifactError::Length {
            field,
            expected: FEATURE_COUNT,
            actual: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ArtifactError::NonFinite(field));
    }
    Ok(())
}

impl BotClassifier for LogisticModel {
    fn name(&self) -> &str {
        ARTIFACT_FORMAT
    }

    fn predict_label(&self, input: &[f64]) -> Result<Label, ClassifierError> {
        let p = self.probability(input)?;
        Ok(if p >= 0.5 { Label::Bot } else { Label::Legitimate })
    }

    fn predict_confidence(&self, input: &[f64]) -> Result<LabelProbabilities, ClassifierError> {
        Ok(LabelProbabilities::from_bot(self.probability(input)?))
    }

    fn feature_importance(&self) -> Vec<(Feature, f64)> {
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        if total == 0.0 {
            return Vec::new();
        }
        Feature::ALL
            .iter()
            .zip(self.weights.iter())
            .map(|(&feature, w)| (feature, w.abs() / total))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn duplicate_detector() -> LogisticModel {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[Feature::DuplicateContentRatio.index()] = 8.0;
        LogisticModel::new(weights, -4.0).unwrap()
    }

    fn input_with(feature: Feature, value: f64) -> Vec<f64> {
        let mut input = vec![0.0; FEATURE_COUNT];
        input[feature.index()] = value;
        input
    }

    #[test]
    fn test_prediction() {
        let model = duplicate_detector();

        let spam = input_with(Feature::DuplicateContentRatio, 1.0);
        assert_eq!(model.predict_label(&spam).unwrap(), Label::Bot);
        let probs = model.predict_confidence(&spam).unwrap();
        assert!((probs.bot - 1.0 / (1.0 + (-4.0f64).exp())).abs() < 1e-12);

        let clean = vec![0.0; FEATURE_COUNT];
        assert_eq!(model.predict_label(&clean).unwrap(), Label::Legitimate);
    }

    #[test]
    fn test_zero_logit_is_bot() {
        let model = LogisticModel::new(vec![0.0; FEATURE_COUNT], 0.0).unwrap();
        assert_eq!(model.predict_label(&[0.0; FEATURE_COUNT]).unwrap(), Label::Bot);
    }

    #[test]
    fn test_shape_mismatch() {
        let model = duplicate_detector();
        let err = model.predict_label(&[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: 2
            }
        );
    }

    #[test]
    fn test_standardization_with_zero_scale() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[0] = 1.0;
        weights[1] = 1.0;
        let mut means = vec![0.0; FEATURE_COUNT];
        means[0] = 10.0;
        let mut scales = vec![1.0; FEATURE_COUNT];
        scales[0] = 2.0;
        scales[1] = 0.0;

        let model = LogisticModel::new(weights, 0.0)
            .unwrap()
            .with_standardization(means, scales)
            .unwrap();

        let mut input = vec![0.0; FEATURE_COUNT];
        input[0] = 14.0; // (14 - 10) / 2 = 2
        input[1] = 3.0; // scale 0 treated as 1
        let p = model.probability(&input).unwrap();
        assert!((p - 1.0 / (1.0 + (-5.0f64).exp())).abs() < 1e-12);
    }

    #[test]
    fn test_feature_importance_normalized() {
        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[0] = -3.0;
        weights[5] = 1.0;
        let model = LogisticModel::new(weights, 0.0).unwrap();

        let importance = model.feature_importance();
        assert_eq!(importance.len(), FEATURE_COUNT);
        assert_eq!(importance[0], (Feature::AccountAgeDays, 0.75));
        assert_eq!(importance[5].1, 0.25);

        let flat = LogisticModel::new(vec![0.0; FEATURE_COUNT], 1.0).unwrap();
        assert!(flat.feature_importance().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let model = duplicate_detector();
        let file = NamedTempFile::new().unwrap();

        model.save(file.path()).unwrap();
        let loaded = LogisticModel::load(file.path()).unwrap();

        assert_eq!(loaded, model);
    }

    #[test]
    fn test_load_rejects_wrong_format() {
        let mut file = NamedTempFile::new().unwrap();
        let json = duplicate_detector()
            .to_json()
            .unwrap()
            .replace(ARTIFACT_FORMAT, "pickle");
        file.write_all(json.as_bytes()).unwrap();

        let err = LogisticModel::load(file.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Format(f) if f == "pickle"));
    }

    #[test]
    fn test_load_rejects_reordered_features() {
        let json = duplicate_detector()
            .to_json()
            .unwrap()
            .replacen("account_age_days", "tmp_name", 1)
            .replacen("has_profile_image", "account_age_days", 1)
            .replacen("tmp_name", "has_profile_image", 1);

        assert!(matches!(
            LogisticModel::from_json(&json),
            Err(ArtifactError::FeatureNames)
        ));
    }

    #[test]
    fn test_load_rejects_short_weights() {
        let json = serde_json::json!({
            "format": ARTIFACT_FORMAT,
            "schema_version": FEATURE_SCHEMA_VERSION,
            "feature_names": Feature::names().collect::<Vec<_>>(),
            "weights": [1.0, 2.0],
            "intercept": 0.0
        })
        .to_string();

        assert!(matches!(
            LogisticModel::from_json(&json),
            Err(ArtifactError::Length { field: "weights", .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = LogisticModel::load("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, ArtifactError::Io(_)));
    }
}
