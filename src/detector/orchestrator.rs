use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

use crate::classifier::{BotClassifier, ClassifierAdapter};
use crate::domain::{
    AccountRecord, ClassifierVerdict, DetectionDetails, DetectionMethod, DetectionResult,
    FeatureVector, MethodSet, RuleVerdict,
};
use crate::error::ConfigError;
use crate::features::FeatureExtractor;
use crate::rules::{ConfigUpdate, RuleConfig, RuleConfigError, RuleEngine};

use super::explain;

/// Weight of the classifier confidence in a combined result.
pub const ML_WEIGHT: f64 = 0.6;

/// Weight of the rule score in a combined result.
pub const RULES_WEIGHT: f64 = 0.4;

/// Combined confidences above this are bots.
pub const COMBINED_BOT_THRESHOLD: f64 = 0.5;

/// Builder for [`BotDetector`].
#[derive(Debug, Default)]
pub struct DetectorBuilder {
    methods: MethodSet,
    model_path: Option<PathBuf>,
    model: Option<Arc<dyn BotClassifier>>,
    rule_config: RuleConfig,
    batch_workers: Option<usize>,
}

impl DetectorBuilder {
    /// Methods enabled for every detection.
    pub fn methods(mut self, methods: MethodSet) -> Self {
        self.methods = methods;
        self
    }

    /// Load a classifier artifact from disk at build time.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Use an already constructed classifier.
    pub fn model(mut self, model: Arc<dyn BotClassifier>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn rule_config(mut self, config: RuleConfig) -> Self {
        self.rule_config = config;
        self
    }

    /// Worker threads used by batch detection.
    pub fn batch_workers(mut self, workers: usize) -> Self {
        self.batch_workers = Some(workers.max(1));
        self
    }

    pub fn build(self) -> Result<BotDetector, ConfigError> {
        self.rule_config.validate()?;

        let classifier = match (self.model, self.model_path) {
            (Some(model), _) => ClassifierAdapter::with_model(model),
            (None, Some(path)) => ClassifierAdapter::from_path(path)?,
            (None, None) => ClassifierAdapter::new(),
        };

        let batch_workers = self.batch_workers.unwrap_or_else(default_batch_workers);

        info!(
            rules = self.methods.rules,
            ml = self.methods.ml,
            scorer = classifier.scorer_name(),
            batch_workers,
            "Detector initialized"
        );

        Ok(BotDetector {
            extractor: FeatureExtractor::new(),
            rules: RuleEngine::new(self.rule_config),
            classifier,
            methods: self.methods,
            batch_workers,
        })
    }
}

/// Composes feature extraction, the rule engine and the classifier.
///
/// Detection takes `&self`; a single detector can be shared across threads
/// and tasks behind an `Arc`.
#[derive(Debug)]
pub struct BotDetector {
    extractor: FeatureExtractor,
    rules: RuleEngine,
    classifier: ClassifierAdapter,
    methods: MethodSet,
    batch_workers: usize,
}

impl BotDetector {
    pub fn builder() -> DetectorBuilder {
        DetectorBuilder::default()
    }

    /// Both methods, default thresholds, heuristic classifier.
    pub fn new() -> Self {
        BotDetector {
            extractor: FeatureExtractor::new(),
            rules: RuleEngine::default(),
            classifier: ClassifierAdapter::new(),
            methods: MethodSet::ALL,
            batch_workers: default_batch_workers(),
        }
    }

    /// Methods enabled at construction.
    pub fn methods(&self) -> MethodSet {
        self.methods
    }

    /// Worker threads used by batch detection.
    pub fn batch_workers(&self) -> usize {
        self.batch_workers
    }

    pub fn rule_engine(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    /// Classify one account with every enabled method.
    pub fn detect(&self, record: &AccountRecord) -> DetectionResult {
        self.detect_with(record, MethodSet::ALL)
    }

    /// Classify one account with the requested subset of enabled methods.
    pub fn detect_with(&self, record: &AccountRecord, requested: MethodSet) -> DetectionResult {
        let features = self.extractor.extract(record);
        self.detect_features(features, requested)
    }

    /// Like [`detect_with`](Self::detect_with) with an explicit reference time.
    pub fn detect_at(
        &self,
        record: &AccountRecord,
        requested: MethodSet,
        now: DateTime<Utc>,
    ) -> DetectionResult {
        let features = self.extractor.extract_at(record, now);
        self.detect_features(features, requested)
    }

    /// Score an already extracted feature vector.
    pub fn detect_features(&self, features: FeatureVector, requested: MethodSet) -> DetectionResult {
        let methods = self.methods.intersect(requested);

        let ml = methods.ml.then(|| self.classifier.detect(&features));
        let rules = methods.rules.then(|| self.rules.evaluate(&features));

        let result = combine(rules, ml, features);
        debug!(
            is_bot = result.is_bot,
            confidence = result.confidence,
            method = %result.method,
            "Detection complete"
        );
        result
    }

    /// Classify many accounts; results are in input order.
    ///
    /// Records are split into contiguous chunks scored on scoped worker
    /// threads.
    pub fn detect_batch(&self, records: &[AccountRecord]) -> Vec<DetectionResult> {
        self.detect_batch_with(records, MethodSet::ALL)
    }

    pub fn detect_batch_with(
        &self,
        records: &[AccountRecord],
        requested: MethodSet,
    ) -> Vec<DetectionResult> {
        let workers = self.batch_workers.min(records.len());
        if workers <= 1 {
            return records
                .iter()
                .map(|r| self.detect_with(r, requested))
                .collect();
        }

        let chunk_size = records.len().div_ceil(workers);
        thread::scope(|scope| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|r| self.detect_with(r, requested))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }

    /// Feature vector for inspection.
    pub fn features(&self, record: &AccountRecord) -> FeatureVector {
        self.extractor.extract(record)
    }

    /// Merge threshold overrides into the live rule config.
    pub fn update_rule_config(
        &self,
        overrides: &HashMap<String, f64>,
    ) -> Result<ConfigUpdate, RuleConfigError> {
        self.rules.update_config(overrides)
    }

    /// Human-readable report for one account.
    pub fn explain(&self, record: &AccountRecord) -> String {
        let result = self.detect(record);
        explain::render(record.username(), &result)
    }
}

impl Default for BotDetector {
    fn default() -> Self {
        BotDetector::new()
    }
}

fn default_batch_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Merge per-method verdicts into one result.
///
/// Both present: `0.6 * ml + 0.4 * rules`, bot above 0.5. One present:
/// passthrough. Neither: undetermined.
pub fn combine(
    rules: Option<RuleVerdict>,
    ml: Option<ClassifierVerdict>,
    features: FeatureVector,
) -> DetectionResult {
    let (is_bot, confidence, method) = match (&rules, &ml) {
        (Some(r), Some(m)) => {
            let confidence = ML_WEIGHT * m.confidence + RULES_WEIGHT * r.score;
            (
                confidence > COMBINED_BOT_THRESHOLD,
                confidence,
                DetectionMethod::Combined,
            )
        }
        (None, Some(m)) => (m.is_bot, m.confidence, DetectionMethod::Ml),
        (Some(r), None) => (r.is_bot, r.score, DetectionMethod::Rules),
        (None, None) => return DetectionResult::undetermined(features),
    };

    DetectionResult {
        is_bot,
        confidence,
        method,
        details: DetectionDetails { rules, ml },
        features,
    }
}
