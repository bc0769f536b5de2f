use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::domain::{DetectionMethod, DetectionResult, VerdictSource};

/// Metrics registry for the service.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Accounts scored
    pub detections_total: AtomicU64,

    /// Accounts scored by verdict
    pub detections_bot: AtomicU64,
    pub detections_legitimate: AtomicU64,

    /// Accounts scored by method
    pub method_rules: AtomicU64,
    pub method_ml: AtomicU64,
    pub method_combined: AtomicU64,
    pub method_none: AtomicU64,

    /// Detection latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_50_100ms: AtomicU64,
    pub latency_over_100ms: AtomicU64,

    /// Rule activity
    pub rules_evaluated_total: AtomicU64,
    pub rules_fired_total: AtomicU64,

    /// Classifier artifact failures answered by the heuristic
    pub classifier_fallbacks_total: AtomicU64,

    /// Batch requests
    pub batches_total: AtomicU64,

    /// Rule config reloads
    pub config_reloads_total: AtomicU64,
    pub config_reload_errors: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record one detection.
    ///
    /// `model_loaded` says whether an artifact was configured, so a
    /// heuristic classifier verdict counts as a fallback.
    pub fn record_detection(&self, result: &DetectionResult, model_loaded: bool) {
        self.detections_total.fetch_add(1, Ordering::Relaxed);

        if result.is_bot {
            self.detections_bot.fetch_add(1, Ordering::Relaxed);
        } else {
            self.detections_legitimate.fetch_add(1, Ordering::Relaxed);
        }

        match result.method {
            DetectionMethod::Rules => self.method_rules.fetch_add(1, Ordering::Relaxed),
            DetectionMethod::Ml => self.method_ml.fetch_add(1, Ordering::Relaxed),
            DetectionMethod::Combined => self.method_combined.fetch_add(1, Ordering::Relaxed),
            DetectionMethod::None => self.method_none.fetch_add(1, Ordering::Relaxed),
        };

        if let Some(rules) = &result.details.rules {
            self.record_rule_evaluation(rules.fired_rules.len());
        }

        if let Some(ml) = &result.details.ml {
            if model_loaded && ml.source == VerdictSource::Heuristic {
                self.classifier_fallbacks_total.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record detection latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 1000 {
            self.latency_under_1ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 5000 {
            self.latency_1_5ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 10000 {
            self.latency_5_10ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 50000 {
            self.latency_10_50ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 100000 {
            self.latency_50_100ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_100ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one rule engine pass.
    pub fn record_rule_evaluation(&self, fired: usize) {
        self.rules_evaluated_total.fetch_add(1, Ordering::Relaxed);
        self.rules_fired_total
            .fetch_add(fired as u64, Ordering::Relaxed);
    }

    pub fn record_batch(&self) {
        self.batches_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rule config reload.
    pub fn record_config_reload(&self, success: bool) {
        self.config_reloads_total.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.config_reload_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Export metrics in Prometheus format.
    pub fn to_prometheus(&self) -> String {
        format!(
            r#"# HELP botwatch_detections_total Total number of accounts scored
# TYPE botwatch_detections_total counter
botwatch_detections_total {}

# HELP botwatch_detections Accounts scored by verdict
# TYPE botwatch_detections counter
botwatch_detections{{verdict="bot"}} {}
botwatch_detections{{verdict="legitimate"}} {}

# HELP botwatch_detections_by_method Accounts scored by detection method
# TYPE botwatch_detections_by_method counter
botwatch_detections_by_method{{method="rules"}} {}
botwatch_detections_by_method{{method="ml"}} {}
botwatch_detections_by_method{{method="combined"}} {}
botwatch_detections_by_method{{method="none"}} {}

# HELP botwatch_detection_latency_bucket Detection latency histogram
# TYPE botwatch_detection_latency_bucket counter
botwatch_detection_latency_bucket{{le="0.001"}} {}
botwatch_detection_latency_bucket{{le="0.005"}} {}
botwatch_detection_latency_bucket{{le="0.01"}} {}
botwatch_detection_latency_bucket{{le="0.05"}} {}
botwatch_detection_latency_bucket{{le="0.1"}} {}
botwatch_detection_latency_bucket{{le="+Inf"}} {}

# HELP botwatch_rules_evaluated_total Rule engine passes
# TYPE botwatch_rules_evaluated_total counter
botwatch_rules_evaluated_total {}

# HELP botwatch_rules_fired_total Rules that fired
# TYPE botwatch_rules_fired_total counter
botwatch_rules_fired_total {}

# HELP botwatch_classifier_fallbacks_total Artifact failures answered by the heuristic
# TYPE botwatch_classifier_fallbacks_total counter
botwatch_classifier_fallbacks_total {}

# HELP botwatch_batches_total Batch detection requests
# TYPE botwatch_batches_total counter
botwatch_batches_total {}

# HELP botwatch_config_reloads_total Rule config reload operations
# TYPE botwatch_config_reloads_total counter
botwatch_config_reloads_total {}

# HELP botwatch_config_reload_errors_total Rule config reload errors
# TYPE botwatch_config_reload_errors_total counter
botwatch_config_reload_errors_total {}
"#,
            self.detections_total.load(Ordering::Relaxed),
            self.detections_bot.load(Ordering::Relaxed),
            self.detections_legitimate.load(Ordering::Relaxed),
            self.method_rules.load(Ordering::Relaxed),
            self.method_ml.load(Ordering::Relaxed),
            self.method_combined.load(Ordering::Relaxed),
            self.method_none.load(Ordering::Relaxed),
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_50_100ms.load(Ordering::Relaxed),
            self.latency_over_100ms.load(Ordering::Relaxed),
            self.rules_evaluated_total.load(Ordering::Relaxed),
            self.rules_fired_total.load(Ordering::Relaxed),
            self.classifier_fallbacks_total.load(Ordering::Relaxed),
            self.batches_total.load(Ordering::Relaxed),
            self.config_reloads_total.load(Ordering::Relaxed),
            self.config_reload_errors.load(Ordering::Relaxed),
        )
    }
}

/// Records latency when dropped.
pub struct TimingGuard<'a> {
    registry: &'a MetricsRegistry,
    start: Instant,
}

impl<'a> TimingGuard<'a> {
    pub fn new(registry: &'a MetricsRegistry) -> Self {
        TimingGuard {
            registry,
            start: Instant::now(),
        }
    }
}

impl<'a> Drop for TimingGuard<'a> {
    fn drop(&mut self) {
        self.registry.record_latency(self.start);
    }
}
