use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::detector::BotDetector;
use crate::error::ConfigError;
use crate::observability::MetricsRegistry;
use crate::rules::RuleConfig;

use super::loader::RuleConfigLoader;

/// Polls a threshold document and applies changes to a running detector.
///
/// A reload only happens when the resolved thresholds differ from the last
/// ones applied from the file, so runtime overrides made through the API
/// survive until the file itself changes.
pub struct RuleConfigWatcher {
    loader: RuleConfigLoader,
    detector: Arc<BotDetector>,
    check_interval: Duration,
    metrics: Option<Arc<MetricsRegistry>>,
    last_applied: Option<RuleConfig>,
}

impl RuleConfigWatcher {
    pub fn new(
        loader: RuleConfigLoader,
        detector: Arc<BotDetector>,
        check_interval: Duration,
    ) -> Self {
        RuleConfigWatcher {
            loader,
            detector,
            check_interval,
            metrics: None,
            last_applied: None,
        }
    }

    /// Count reloads and reload failures.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Apply the current document and start polling.
    ///
    /// The receiver observes every config applied from the file. If the
    /// initial load fails, the detector keeps its current thresholds.
    pub fn start(
        mut self,
    ) -> (
        watch::Receiver<Arc<RuleConfig>>,
        tokio::task::JoinHandle<()>,
    ) {
        match self.check_for_updates() {
            Ok(_) => info!(path = %self.loader.path().display(), "Loaded initial rule config"),
            Err(e) => error!(error = %e, "Failed to load initial rule config"),
        }

        let (tx, rx) = watch::channel(self.detector.rule_engine().config());

        let handle = tokio::spawn(async move {
            let mut interval = interval(self.check_interval);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;

                match self.check_for_updates() {
                    Ok(Some(config)) => {
                        info!("Rule config reloaded");
                        self.record(true);
                        let _ = tx.send(config);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, "Error checking for rule config updates");
                        self.record(false);
                    }
                }
            }
        });

        (rx, handle)
    }

    /// Load the document and apply it if it changed.
    ///
    /// Returns the new snapshot when thresholds were replaced.
    pub fn check_for_updates(&mut self) -> Result<Option<Arc<RuleConfig>>, ConfigError> {
        let document = self.loader.load_document()?;
        let config = self.loader.resolve(&document)?;

        if self.last_applied.as_ref() == Some(&config) {
            return Ok(None);
        }

        let ignored = document.unknown_keys();
        if !ignored.is_empty() {
            debug!(keys = ?ignored, "Ignoring unknown rule config keys");
        }

        self.detector.rule_engine().replace_config(config.clone())?;
        info!(
            version = document.version.as_deref().unwrap_or("unversioned"),
            "Applied rule config"
        );

        self.last_applied = Some(config);
        Ok(Some(self.detector.rule_engine().config()))
    }

    fn record(&self, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_config_reload(success);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::tracing::init_test_tracing;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::Ordering;
    use tempfile::NamedTempFile;

    fn create_rule_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
version: "v1"
min_account_age_days: 14
"#
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_watcher_initial_load() {
        init_test_tracing();
        let file = create_rule_file();
        let detector = Arc::new(BotDetector::new());

        let watcher = RuleConfigWatcher::new(
            RuleConfigLoader::new(file.path()),
            detector.clone(),
            Duration::from_secs(60),
        );
        let (rx, handle) = watcher.start();

        assert_eq!(rx.borrow().min_account_age_days, 14.0);
        assert_eq!(detector.rule_engine().config().min_account_age_days, 14.0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_watcher_keeps_config_when_initial_load_fails() {
        let detector = Arc::new(BotDetector::new());

        let watcher = RuleConfigWatcher::new(
            RuleConfigLoader::new("/nonexistent/rules.yaml"),
            detector.clone(),
            Duration::from_secs(60),
        );
        let (rx, handle) = watcher.start();

        assert_eq!(**rx.borrow(), RuleConfig::default());

        handle.abort();
    }

    #[tokio::test]
    async fn test_watcher_detects_changes() {
        let file = create_rule_file();
        let path = file.path().to_path_buf();
        let detector = Arc::new(BotDetector::new());
        let metrics = Arc::new(MetricsRegistry::new());

        let watcher = RuleConfigWatcher::new(
            RuleConfigLoader::new(&path),
            detector.clone(),
            Duration::from_millis(50),
        )
        .with_metrics(metrics.clone());
        let (mut rx, handle) = watcher.start();

        assert_eq!(rx.borrow().min_account_age_days, 14.0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        std::fs::write(
            &path,
            r#"
version: "v2"
min_account_age_days: 30
max_url_ratio: 0.5
"#,
        )
        .unwrap();

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("Timeout waiting for rule config change")
            .unwrap();

        assert_eq!(rx.borrow().min_account_age_days, 30.0);
        assert_eq!(detector.rule_engine().config().max_url_ratio, 0.5);
        assert!(metrics.config_reloads_total.load(Ordering::Relaxed) >= 1);

        handle.abort();
    }

    #[test]
    fn test_unchanged_file_preserves_runtime_overrides() {
        let file = create_rule_file();
        let detector = Arc::new(BotDetector::new());
        let mut watcher = RuleConfigWatcher::new(
            RuleConfigLoader::new(file.path()),
            detector.clone(),
            Duration::from_secs(60),
        );

        assert!(watcher.check_for_updates().unwrap().is_some());

        detector
            .update_rule_config(&HashMap::from([("min_bio_length".to_string(), 2.0)]))
            .unwrap();

        assert!(watcher.check_for_updates().unwrap().is_none());
        assert_eq!(detector.rule_engine().config().min_bio_length, 2.0);
    }

    #[test]
    fn test_invalid_update_leaves_detector_untouched() {
        let mut file = create_rule_file();
        let detector = Arc::new(BotDetector::new());
        let mut watcher = RuleConfigWatcher::new(
            RuleConfigLoader::new(file.path()),
            detector.clone(),
            Duration::from_secs(60),
        );
        watcher.check_for_updates().unwrap();

        writeln!(file, "bot_score_threshold: 7").unwrap();

        assert!(watcher.check_for_updates().is_err());
        assert_eq!(detector.rule_engine().config().bot_score_threshold, 0.6);
        assert_eq!(detector.rule_engine().config().min_account_age_days, 14.0);
    }
}
