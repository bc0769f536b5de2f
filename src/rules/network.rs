use crate::domain::{Evidence, Feature, FeatureVector, RuleResult};
use crate::rules::config::RuleConfig;
use crate::rules::traits::Rule;

/// Replies faster than this (seconds) look automated.
pub const FAST_REPLY_SECONDS: f64 = 5.0;

/// Interaction diversity below this means the account talks to the same few counterparts.
pub const MIN_INTERACTION_DIVERSITY: f64 = 0.1;

/// Follows far more accounts than follow it back.
#[derive(Debug, Default)]
pub struct LowFollowerRatioRule;

impl LowFollowerRatioRule {
    pub const ID: &'static str = "R2_LOW_FOLLOWER_RATIO";
}

impl Rule for LowFollowerRatioRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Low follower to following ratio"
    }

    fn weight(&self) -> f64 {
        0.20
    }

    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult {
        let ratio = features.get(Feature::FollowerFollowingRatio);
        if ratio < config.min_follower_following_ratio {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::FollowerFollowingRatio.name(),
                ratio,
                config.min_follower_following_ratio,
            ));
        }
        RuleResult::pass()
    }
}

/// Average reply time under a few seconds.
///
/// A zero reply time is treated as missing data and never fires.
#[derive(Debug, Default)]
pub struct FastReplyRule;

impl FastReplyRule {
    pub const ID: &'static str = "R9_FAST_REPLIES";
}

impl Rule for FastReplyRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Suspiciously fast reply times"
    }

    fn weight(&self) -> f64 {
        0.20
    }

    fn evaluate(&self, features: &FeatureVector, _config: &RuleConfig) -> RuleResult {
        let reply_time = features.get(Feature::AvgReplyTime);
        if reply_time > 0.0 && reply_time < FAST_REPLY_SECONDS {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::AvgReplyTime.name(),
                reply_time,
                FAST_REPLY_SECONDS,
            ));
        }
        RuleResult::pass()
    }
}

/// Interactions concentrated on very few counterparts.
#[derive(Debug, Default)]
pub struct LowInteractionDiversityRule;

impl LowInteractionDiversityRule {
    pub const ID: &'static str = "R10_LOW_INTERACTION_DIVERSITY";
}

impl Rule for LowInteractionDiversityRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Low interaction diversity"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn evaluate(&self, features: &FeatureVector, _config: &RuleConfig) -> RuleResult {
        // Partial vectors without the feature are not penalized.
        let diversity = features.get_or(Feature::InteractionDiversity, 1.0);
        if diversity < MIN_INTERACTION_DIVERSITY {
            return RuleResult::fire(Evidence::with_limit(
                Self::ID,
                Feature::InteractionDiversity.name(),
                diversity,
                MIN_INTERACTION_DIVERSITY,
            ));
        }
        RuleResult::pass()
    }
}
