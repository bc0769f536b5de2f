use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{FeatureVector, RuleVerdict};

use super::activity::{DuplicateContentRule, ExtremeFrequencyRule, NewAccountBurstRule, UrlSpamRule};
use super::config::{RuleConfig, RuleConfigError};
use super::network::{FastReplyRule, LowFollowerRatioRule, LowInteractionDiversityRule};
use super::profile::{NoProfileImageRule, RandomUsernameRule, ShortBioRule};
use super::traits::Rule;

/// Ordered collection of rules.
///
/// Declaration order is the order fired rules are reported in.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleSet {
    /// The standard ten-rule set.
    pub fn standard() -> Self {
        RuleSet {
            rules: vec![
                Arc::new(NewAccountBurstRule),
                Arc::new(LowFollowerRatioRule),
                Arc::new(NoProfileImageRule),
                Arc::new(ShortBioRule),
                Arc::new(RandomUsernameRule),
                Arc::new(ExtremeFrequencyRule),
                Arc::new(DuplicateContentRule),
                Arc::new(UrlSpamRule),
                Arc::new(FastReplyRule),
                Arc::new(LowInteractionDiversityRule),
            ],
        }
    }

    /// Build from an explicit list of rules.
    pub fn from_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        RuleSet { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.iter()
    }

    /// Sum of all rule weights; the normalization constant.
    pub fn total_weight(&self) -> f64 {
        self.rules.iter().map(|r| r.weight()).sum()
    }

    /// Score a feature vector against this rule set.
    ///
    /// Every rule's weight counts toward the maximum whether or not it
    /// fires, so the score is always fired weight over total weight.
    pub fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleVerdict {
        let mut bot_score = 0.0;
        let mut max_score = 0.0;
        let mut fired_rules = Vec::new();
        let mut evidence = Vec::new();

        for rule in &self.rules {
            let result = rule.evaluate(features, config);
            if result.hit {
                bot_score += rule.weight();
                fired_rules.push(rule.description().to_string());
                if let Some(ev) = result.evidence {
                    evidence.push(ev);
                }
            }
            max_score += rule.weight();
        }

        let score = if max_score > 0.0 {
            (bot_score / max_score).clamp(0.0, 1.0)
        } else {
            0.0
        };

        RuleVerdict {
            is_bot: score >= config.bot_score_threshold,
            score,
            fired_rules,
            evidence,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::standard()
    }
}

/// Score features with the standard rule set and an explicit config.
pub fn evaluate(features: &FeatureVector, config: &RuleConfig) -> RuleVerdict {
    RuleSet::standard().evaluate(features, config)
}

/// Outcome of a threshold update.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigUpdate {
    /// Config now in effect
    pub config: Arc<RuleConfig>,

    /// Keys that were not recognized and were skipped
    pub ignored_keys: Vec<String>,
}

/// Rule set plus its live threshold table.
///
/// The config is swapped as a whole on update: each evaluation takes one
/// snapshot, so concurrent readers see either the old or the new table.
#[derive(Debug)]
pub struct RuleEngine {
    rules: RuleSet,
    config: RwLock<Arc<RuleConfig>>,
}

impl RuleEngine {
    /// Standard rules with the given thresholds.
    pub fn new(config: RuleConfig) -> Self {
        RuleEngine::with_rules(RuleSet::standard(), config)
    }

    pub fn with_rules(rules: RuleSet, config: RuleConfig) -> Self {
        RuleEngine {
            rules,
            config: RwLock::new(Arc::new(config)),
        }
    }

    /// Current threshold snapshot.
    pub fn config(&self) -> Arc<RuleConfig> {
        self.config.read().clone()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Score a feature vector with the current thresholds.
    pub fn evaluate(&self, features: &FeatureVector) -> RuleVerdict {
        let config = self.config();
        let verdict = self.rules.evaluate(features, &config);

        debug!(
            score = verdict.score,
            fired = verdict.fired_rules.len(),
            is_bot = verdict.is_bot,
            "Rules evaluated"
        );

        verdict
    }

    /// Merge threshold overrides into the current config.
    ///
    /// Unknown keys are ignored and reported back. The merged table is
    /// validated before it replaces the current one.
    pub fn update_config(
        &self,
        overrides: &HashMap<String, f64>,
    ) -> Result<ConfigUpdate, RuleConfigError> {
        let mut guard = self.config.write();
        let (next, ignored_keys) = guard.merged(overrides);
        next.validate()?;

        if !ignored_keys.is_empty() {
            debug!(keys = ?ignored_keys, "Ignoring unknown rule config keys");
        }

        let next = Arc::new(next);
        *guard = next.clone();
        info!(applied = overrides.len() - ignored_keys.len(), "Rule config updated");

        Ok(ConfigUpdate {
            config: next,
            ignored_keys,
        })
    }

    /// Replace the whole threshold table.
    pub fn replace_config(&self, config: RuleConfig) -> Result<(), RuleConfigError> {
        config.validate()?;
        *self.config.write() = Arc::new(config);
        Ok(())
    }

    /// Rule-only rationale for a feature vector.
    pub fn explain(&self, features: &FeatureVector) -> String {
        let verdict = self.evaluate(features);
        let mut out = String::new();

        if verdict.is_bot {
            let _ = writeln!(out, "Bot detected with confidence {:.2}%.", verdict.score * 100.0);
            out.push_str("Triggered rules:\n");
        } else {
            let _ = writeln!(
                out,
                "Likely legitimate user (bot score: {:.2}%).",
                verdict.score * 100.0
            );
            if !verdict.fired_rules.is_empty() {
                out.push_str("Minor concerns:\n");
            }
        }
        for rule in &verdict.fired_rules {
            let _ = writeln!(out, "  - {}", rule);
        }

        out
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        RuleEngine::new(RuleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Feature;

    fn legitimate() -> FeatureVector {
        FeatureVector::zeroed()
            .with(Feature::AccountAgeDays, 365.0)
            .with(Feature::HasProfileImage, 1.0)
            .with(Feature::HasBio, 1.0)
            .with(Feature::BioLength, 50.0)
            .with(Feature::PostFrequency, 2.0)
            .with(Feature::DuplicateContentRatio, 0.1)
            .with(Feature::UrlRatio, 0.2)
            .with(Feature::FollowerFollowingRatio, 1.5)
            .with(Feature::AvgReplyTime, 120.0)
            .with(Feature::InteractionDiversity, 0.8)
    }

    fn bot() -> FeatureVector {
        FeatureVector::zeroed()
            .with(Feature::AccountAgeDays, 2.0)
            .with(Feature::UsernameRandomPattern, 1.0)
            .with(Feature::PostFrequency, 100.0)
            .with(Feature::DuplicateContentRatio, 0.9)
            .with(Feature::UrlRatio, 0.9)
            .with(Feature::FollowerFollowingRatio, 0.01)
            .with(Feature::AvgReplyTime, 2.0)
            .with(Feature::InteractionDiversity, 0.05)
    }

    #[test]
    fn test_standard_rule_set() {
        let rules = RuleSet::standard();
        assert_eq!(rules.len(), 10);
        assert!((rules.total_weight() - 1.80).abs() < 1e-12);
    }

    #[test]
    fn test_legitimate_user() {
        let verdict = evaluate(&legitimate(), &RuleConfig::default());

        assert!(!verdict.is_bot);
        assert_eq!(verdict.score, 0.0);
        assert!(verdict.fired_rules.is_empty());
    }

    #[test]
    fn test_bot_user() {
        let verdict = evaluate(&bot(), &RuleConfig::default());

        assert!(verdict.is_bot);
        assert!((verdict.score - 1.0).abs() < 1e-12);
        assert_eq!(verdict.fired_rules.len(), 10);
        assert_eq!(verdict.evidence.len(), 10);
    }

    #[test]
    fn test_fired_rules_in_declaration_order() {
        let features = legitimate()
            .with(Feature::InteractionDiversity, 0.0)
            .with(Feature::HasProfileImage, 0.0)
            .with(Feature::UrlRatio, 0.95);

        let verdict = evaluate(&features, &RuleConfig::default());

        assert_eq!(
            verdict.fired_rules,
            vec![
                "No profile image".to_string(),
                "Excessive URL posting".to_string(),
                "Low interaction diversity".to_string(),
            ]
        );
        let expected = (0.10 + 0.15 + 0.15) / RuleSet::standard().total_weight();
        assert!((verdict.score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_score_bounded_for_any_subset() {
        let config = RuleConfig::default();
        for vector in [FeatureVector::zeroed(), FeatureVector::empty(), legitimate(), bot()] {
            let verdict = evaluate(&vector, &config);
            assert!((0.0..=1.0).contains(&verdict.score));
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Rules 2, 3, 4, 5, 10 fire: 0.7 / 1.80
        let features = FeatureVector::zeroed()
            .with(Feature::AccountAgeDays, 365.0)
            .with(Feature::UsernameRandomPattern, 1.0);
        let verdict = evaluate(&features, &RuleConfig::default());
        let score = verdict.score;

        let config = RuleConfig {
            bot_score_threshold: score,
            ..Default::default()
        };
        assert!(evaluate(&features, &config).is_bot);
    }

    #[test]
    fn test_update_config_merges() {
        let engine = RuleEngine::default();
        let overrides = HashMap::from([
            ("max_post_frequency".to_string(), 30.0),
            ("nonsense".to_string(), 1.0),
        ]);

        let update = engine.update_config(&overrides).unwrap();

        assert_eq!(update.config.max_post_frequency, 30.0);
        assert_eq!(update.config.min_bio_length, 10.0);
        assert_eq!(update.ignored_keys, vec!["nonsense".to_string()]);
        assert_eq!(engine.config().max_post_frequency, 30.0);
    }

    #[test]
    fn test_update_config_rejects_invalid_and_keeps_old() {
        let engine = RuleEngine::default();
        let overrides = HashMap::from([("bot_score_threshold".to_string(), 2.0)]);

        assert!(engine.update_config(&overrides).is_err());
        assert_eq!(engine.config().bot_score_threshold, 0.6);
    }

    #[test]
    fn test_snapshot_survives_update() {
        let engine = RuleEngine::default();
        let before = engine.config();

        engine
            .update_config(&HashMap::from([("min_bio_length".to_string(), 3.0)]))
            .unwrap();

        assert_eq!(before.min_bio_length, 10.0);
        assert_eq!(engine.config().min_bio_length, 3.0);
    }

    #[test]
    fn test_explain() {
        let engine = RuleEngine::default();

        let text = engine.explain(&bot());
        assert!(text.starts_with("Bot detected with confidence 100.00%."));
        assert!(text.contains("  - Random username pattern"));

        let text = engine.explain(&legitimate());
        assert!(text.starts_with("Likely legitimate user"));
        assert!(!text.contains("Minor concerns"));
    }
}
