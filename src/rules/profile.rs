use crate::domain::{Evidence, Feature, FeatureVector, RuleResult};
use crate::rules::config::RuleConfig;
use crate::rules::traits::Rule;

/// Account has no profile image.
#[derive(Debug, Default)]
pub struct NoProfileImageRule;

impl NoProfileImageRule {
    pub const ID: &'static str = "R3_NO_PROFILE_IMAGE";
}

impl Rule for NoProfileImageRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "No profile image"
    }

    fn weight(&self) -> f64 {
        0.10
    }

    fn evaluate(&self, features: &FeatureVector, _config: &RuleConfig) -> RuleResult {
        if features.flag(Feature::HasProfileImage) {
            return RuleResult::pass();
        }
        RuleResult::fire(Evidence::new(
            Self::ID,
            Feature::HasProfileImage.name(),
            features.get(Feature::HasProfileImage),
        ))
    }
}

/// Bio is missing or shorter than `min_bio_length`.
#[derive(Debug, Default)]
pub struct ShortBioRule;

impl ShortBioRule {
    pub const ID: &'static str = "R4_SHORT_BIO";
}

impl Rule for ShortBioRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Missing or very short bio"
    }

    fn weight(&self) -> f64 {
        0.10
    }

    fn evaluate(&self, features: &FeatureVector, config: &RuleConfig) -> RuleResult {
        let bio_length = features.get(Feature::BioLength);
        if features.flag(Feature::HasBio) && bio_length >= config.min_bio_length {
            return RuleResult::pass();
        }
        RuleResult::fire(Evidence::with_limit(
            Self::ID,
            Feature::BioLength.name(),
            bio_length,
            config.min_bio_length,
        ))
    }
}

/// Username looks machine-generated.
#[derive(Debug, Default)]
pub struct RandomUsernameRule;

impl RandomUsernameRule {
    pub const ID: &'static str = "R5_RANDOM_USERNAME";
}

impl Rule for RandomUsernameRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Random username pattern"
    }

    fn weight(&self) -> f64 {
        0.15
    }

    fn evaluate(&self, features: &FeatureVector, _config: &RuleConfig) -> RuleResult {
        if !features.flag(Feature::UsernameRandomPattern) {
            return RuleResult::pass();
        }
        RuleResult::fire(Evidence::new(
            Self::ID,
            Feature::UsernameRandomPattern.name(),
            1.0,
        ))
    }
}
