use crate::domain::{ClassifierVerdict, Feature, FeatureVector, VerdictSource};

/// Normalized scores above this are classified as bots.
pub const HEURISTIC_BOT_THRESHOLD: f64 = 0.6;

/// Closed-form scorer used when no classifier artifact is available or
/// the artifact fails.
///
/// Starts at zero, applies fixed deltas for trust and abuse signals, then
/// shifts by 0.5 and clamps to [0, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        HeuristicClassifier
    }

    /// Normalized bot score in [0, 1].
    pub fn score(&self, features: &FeatureVector) -> f64 {
        let mut score = 0.0;

        // Trust signals
        if features.flag(Feature::HasProfileImage) {
            score -= 0.10;
        }
        if features.flag(Feature::HasBio) {
            score -= 0.10;
        }
        if features.flag(Feature::HasVerifiedBadge) {
            score -= 0.30;
        }
        if features.get(Feature::AccountAgeDays) > 30.0 {
            score -= 0.15;
        }

        // Abuse signals
        if features.flag(Feature::UsernameRandomPattern) {
            score += 0.20;
        }
        if features.get(Feature::PostFrequency) > 20.0 {
            score += 0.20;
        }
        if features.get(Feature::DuplicateContentRatio) > 0.5 {
            score += 0.25;
        }
        if features.get(Feature::UrlRatio) > 0.7 {
            score += 0.20;
        }
        if features.get_or(Feature::FollowerFollowingRatio, 1.0) < 0.1 {
            score += 0.15;
        }

        let normalized: f64 = score + 0.5;
        normalized.clamp(0.0, 1.0)
    }

    /// Verdict whose confidence is the normalized score.
    pub fn detect(&self, features: &FeatureVector) -> ClassifierVerdict {
        let confidence = self.score(features);
        ClassifierVerdict {
            is_bot: confidence > HEURISTIC_BOT_THRESHOLD,
            confidence,
            source: VerdictSource::Heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legitimate_profile() {
        let features = FeatureVector::empty()
            .with(Feature::HasProfileImage, 1.0)
            .with(Feature::HasBio, 1.0)
            .with(Feature::HasVerifiedBadge, 0.0)
            .with(Feature::AccountAgeDays, 100.0)
            .with(Feature::PostFrequency, 2.0)
            .with(Feature::DuplicateContentRatio, 0.1)
            .with(Feature::UrlRatio, 0.2)
            .with(Feature::FollowerFollowingRatio, 1.2);

        let verdict = HeuristicClassifier.detect(&features);

        // 0.5 - 0.1 - 0.1 - 0.15
        assert!(!verdict.is_bot);
        assert!((verdict.confidence - 0.15).abs() < 1e-12);
        assert_eq!(verdict.source, VerdictSource::Heuristic);
    }

    #[test]
    fn test_spam_profile_clamps_to_one() {
        let features = FeatureVector::zeroed()
            .with(Feature::UsernameRandomPattern, 1.0)
            .with(Feature::PostFrequency, 80.0)
            .with(Feature::DuplicateContentRatio, 0.9)
            .with(Feature::UrlRatio, 1.0)
            .with(Feature::FollowerFollowingRatio, 0.01);

        let verdict = HeuristicClassifier.detect(&features);

        assert!(verdict.is_bot);
        assert_eq!(verdict.confidence, 1.0);
    }

    #[test]
    fn test_verified_veteran_clamps_to_zero() {
        let features = FeatureVector::zeroed()
            .with(Feature::HasProfileImage, 1.0)
            .with(Feature::HasBio, 1.0)
            .with(Feature::HasVerifiedBadge, 1.0)
            .with(Feature::AccountAgeDays, 2000.0)
            .with(Feature::FollowerFollowingRatio, 2000.0);

        assert_eq!(HeuristicClassifier.score(&features), 0.0);
    }

    #[test]
    fn test_all_zero_input() {
        // Zero follower ratio is present, so it counts as low.
        let verdict = HeuristicClassifier.detect(&FeatureVector::zeroed());
        assert!((verdict.confidence - 0.65).abs() < 1e-12);
        assert!(verdict.is_bot);
    }

    #[test]
    fn test_missing_follower_ratio_does_not_count() {
        let verdict = HeuristicClassifier.detect(&FeatureVector::empty());
        assert_eq!(verdict.confidence, 0.5);
        assert!(!verdict.is_bot);
    }

    #[test]
    fn test_single_abuse_signal() {
        let features = FeatureVector::empty().with(Feature::UsernameRandomPattern, 1.0);
        let verdict = HeuristicClassifier.detect(&features);
        assert!((verdict.confidence - 0.7).abs() < 1e-12);
        assert!(verdict.is_bot);

        let features = FeatureVector::empty().with(Feature::UrlRatio, 0.7);
        assert!(!HeuristicClassifier.detect(&features).is_bot);
    }
}
