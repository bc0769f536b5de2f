use crate::domain::{Evidence, Feature, FeatureVector, RuleResult};
use crate::rules::config::RuleConfig;
use crate::rules::traits::Rule;

/// Young account posting at a suspicious rate.
#[derive(Debug, Default)]
pub struct NewAccountBurstRule;

impl NewAccountBurstRule {
    pub const ID: &'static str = "R1_NEW_ACCOUNT_BURST";
}

impl Rule for NewAccountBurstRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "New account with suspicious posting frequency"
    }

    fn weight(&self) -> f64 {
        0.30
    }

    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult {
        let age = features.get(Feature::AccountAgeDays);
        let frequency = features.get(Feature::PostFrequency);

        if age < config.min_account_age_days && frequency > config.suspicious_post_frequency {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::PostFrequency.name(),
                frequency,
                config.suspicious_post_frequency,
            ));
        }
        RuleResult::pass()
    }
}

/// Posting rate beyond what any human sustains.
#[derive(Debug, Default)]
pub struct ExtremeFrequencyRule;

impl ExtremeFrequencyRule {
    pub const ID: &'static str = "R6_EXTREME_FREQUENCY";
}

impl Rule for ExtremeFrequencyRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Extremely high posting frequency"
    }

    fn weight(&self) -> f64 {
        0.25
    }

    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult {
        let frequency = features.get(Feature::PostFrequency);
        if frequency > config.max_post_frequency {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::PostFrequency.name(),
                frequency,
                config.max_post_frequency,
            ));
        }
        RuleResult::pass()
    }
}

/// Large share of recent posts are exact repeats.
#[derive(Debug, Default)]
pub struct DuplicateContentRule;

impl DuplicateContentRule {
    pub const ID: &'static str = "R7_DUPLICATE_CONTENT";
}

impl Rule for DuplicateContentRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "High duplicate content ratio"
    }

    fn weight(&self) -> f64 {
        0.20
    }

    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult {
        let ratio = features.get(Feature::DuplicateContentRatio);
        if ratio > config.max_duplicate_ratio {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::DuplicateContentRatio.name(),
                ratio,
                config.max_duplicate_ratio,
            ));
        }
        RuleResult::pass()
    }
}

/// Nearly every post carries a link.
#[derive(Debug, Default)]
pub struct UrlSpamRule;

impl UrlSpamRule {
    pub const ID: &'static str = "R8_URL_SPAM";
}

impl Rule for UrlSpamRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Excessive URL posting"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult {
        let ratio = features.get(Feature::UrlRatio);
        if ratio > config.max_url_ratio {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::UrlRatio.name(),
                ratio,
                config.max_url_ratio,
            ));
        }
        RuleResult::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(age: f64, frequency: f64) -> FeatureVector {
        FeatureVector::zeroed()
            .with(Feature::AccountAgeDays, age)
            .with(Feature::PostFrequency, frequency)
    }

    #[test]
    fn test_new_account_burst() {
        let config = RuleConfig::default();

        assert!(NewAccountBurstRule.evaluate(&features(2.0, 25.0), &config).hit);
        // Old account posting the same amount
        assert!(!NewAccountBurstRule.evaluate(&features(30.0, 25.0), &config).hit);
        // New account posting quietly
        assert!(!NewAccountBurstRule.evaluate(&features(2.0, 20.0), &config).hit);
    }

    #[test]
    fn test_new_account_burst_age_boundary() {
        let config = RuleConfig::default();
        assert!(!NewAccountBurstRule.evaluate(&features(7.0, 100.0), &config).hit);
        assert!(NewAccountBurstRule.evaluate(&features(6.0, 100.0), &config).hit);
    }

    #[test]
    fn test_extreme_frequency() {
        let config = RuleConfig::default();

        assert!(!ExtremeFrequencyRule.evaluate(&features(400.0, 50.0), &config).hit);

        let result = ExtremeFrequencyRule.evaluate(&features(400.0, 50.5), &config);
        assert!(result.hit);
        assert_eq!(result.evidence.unwrap().limit, Some(50.0));
    }

    #[test]
    fn test_duplicate_content() {
        let config = RuleConfig::default();
        let f = FeatureVector::zeroed().with(Feature::DuplicateContentRatio, 0.5);
        assert!(!DuplicateContentRule.evaluate(&f, &config).hit);

        let f = f.with(Feature::DuplicateContentRatio, 0.67);
        assert!(DuplicateContentRule.evaluate(&f, &config).hit);
    }

    #[test]
    fn test_url_spam() {
        let config = RuleConfig::default();
        let f = FeatureVector::zeroed().with(Feature::UrlRatio, 0.8);
        assert!(!UrlSpamRule.evaluate(&f, &config).hit);

        let f = f.with(Feature::UrlRatio, 1.0);
        let result = UrlSpamRule.evaluate(&f, &config);
        assert!(result.hit);
        assert_eq!(result.evidence.unwrap().key, "url_ratio");
    }
}
