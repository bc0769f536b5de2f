use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Version of the feature schema shared by the extractor and both scorers.
///
/// Bump whenever a feature is added, removed or changes meaning. Classifier
/// artifacts record the version they were trained against.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Number of features in the schema.
pub const FEATURE_COUNT: usize = 20;

/// A named feature of the account schema.
///
/// Variants are declared in canonical order; that order is the layout of the
/// ordered vector handed to classifier artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Feature {
    AccountAgeDays = 0,
    HasProfileImage,
    HasBio,
    BioLength,
    HasVerifiedBadge,
    UsernameHasNumbers,
    UsernameLength,
    UsernameRandomPattern,
    PostCount,
    FollowerCount,
    FollowingCount,
    FollowerFollowingRatio,
    PostFollowerRatio,
    AvgPostLength,
    PostFrequency,
    DuplicateContentRatio,
    UrlRatio,
    HashtagRatio,
    AvgReplyTime,
    InteractionDiversity,
}

impl Feature {
    /// All features in canonical order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::AccountAgeDays,
        Feature::HasProfileImage,
        Feature::HasBio,
        Feature::BioLength,
        Feature::HasVerifiedBadge,
        Feature::UsernameHasNumbers,
        Feature::UsernameLength,
        Feature::UsernameRandomPattern,
        Feature::PostCount,
        Feature::FollowerCount,
        Feature::FollowingCount,
        Feature::FollowerFollowingRatio,
        Feature::PostFollowerRatio,
        Feature::AvgPostLength,
        Feature::PostFrequency,
        Feature::DuplicateContentRatio,
        Feature::UrlRatio,
        Feature::HashtagRatio,
        Feature::AvgReplyTime,
        Feature::InteractionDiversity,
    ];

    /// Position of this feature in the ordered vector.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable wire name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::AccountAgeDays => "account_age_days",
            Feature::HasProfileImage => "has_profile_image",
            Feature::HasBio => "has_bio",
            Feature::BioLength => "bio_length",
            Feature::HasVerifiedBadge => "has_verified_badge",
            Feature::UsernameHasNumbers => "username_has_numbers",
            Feature::UsernameLength => "username_length",
            Feature::UsernameRandomPattern => "username_random_pattern",
            Feature::PostCount => "post_count",
            Feature::FollowerCount => "follower_count",
            Feature::FollowingCount => "following_count",
            Feature::FollowerFollowingRatio => "follower_following_ratio",
            Feature::PostFollowerRatio => "post_follower_ratio",
            Feature::AvgPostLength => "avg_post_length",
            Feature::PostFrequency => "post_frequency",
            Feature::DuplicateContentRatio => "duplicate_content_ratio",
            Feature::UrlRatio => "url_ratio",
            Feature::HashtagRatio => "hashtag_ratio",
            Feature::AvgReplyTime => "avg_reply_time",
            Feature::InteractionDiversity => "interaction_diversity",
        }
    }

    /// Look a feature up by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Feature::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Canonical ordered list of feature names.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Feature::ALL.iter().map(|f| f.name())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-schema numeric summary of an account.
///
/// Vectors produced by the extractor are complete: every feature is present
/// and finite. Vectors built from partial maps remember which features were
/// supplied so consumers can apply their own defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [Option<f64>; FEATURE_COUNT],
}

impl FeatureVector {
    /// A vector with no features present.
    pub fn empty() -> Self {
        FeatureVector {
            values: [None; FEATURE_COUNT],
        }
    }

    /// A complete vector with every feature set to 0.0.
    pub fn zeroed() -> Self {
        FeatureVector {
            values: [Some(0.0); FEATURE_COUNT],
        }
    }

    /// Build a complete vector from values in canonical order.
    ///
    /// Returns `None` when the slice length does not match the schema.
    pub fn from_ordered(values: &[f64]) -> Option<Self> {
        if values.len() != FEATURE_COUNT {
            return None;
        }
        let mut vector = FeatureVector::empty();
        for (feature, &value) in Feature::ALL.iter().zip(values) {
            vector.set(*feature, value);
        }
        Some(vector)
    }

    /// Set a feature. Non-finite values are stored as 0.0.
    #[inline]
    pub fn set(&mut self, feature: Feature, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.values[feature.index()] = Some(value);
    }

    /// Builder-style setter.
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }

    /// Value of a feature, 0.0 when absent.
    #[inline]
    pub fn get(&self, feature: Feature) -> f64 {
        self.get_or(feature, 0.0)
    }

    /// Value of a feature, or `default` when absent.
    #[inline]
    pub fn get_or(&self, feature: Feature, default: f64) -> f64 {
        self.values[feature.index()].unwrap_or(default)
    }

    /// Truthiness of a 0/1 feature.
    #[inline]
    pub fn flag(&self, feature: Feature) -> bool {
        self.get(feature) != 0.0
    }

    /// Whether the feature was supplied.
    #[inline]
    pub fn contains(&self, feature: Feature) -> bool {
        self.values[feature.index()].is_some()
    }

    /// Whether every schema feature is present.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    /// Value by wire name. Unknown names return `None`.
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        Feature::from_name(name).and_then(|f| self.values[f.index()])
    }

    /// Values in canonical order, absent features as 0.0.
    pub fn to_ordered(&self) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (slot, value) in out.iter_mut().zip(self.values.iter()) {
            *slot = value.unwrap_or(0.0);
        }
        out
    }

    /// Iterate over present features in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL
            .iter()
            .filter_map(move |f| self.values[f.index()].map(|v| (*f, v)))
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        FeatureVector::zeroed()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.values.iter().filter(|v| v.is_some()).count();
        let mut map = serializer.serialize_map(Some(present))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FeatureMapVisitor;

        impl<'de> Visitor<'de> for FeatureMapVisitor {
            type Value = FeatureVector;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FeatureVector, A::Error> {
                let mut vector = FeatureVector::empty();
                while let Some(key) = access.next_key::<String>()? {
                    // Unknown keys are skipped so newer producers stay readable.
                    match Feature::from_name(&key) {
                        Some(feature) => {
                            let value: f64 = access.next_value()?;
                            vector.set(feature, value);
                        }
                        None => {
                            access.next_value::<serde::de::IgnoredAny>()?;
                        }
                    }
                }
                Ok(vector)
            }
        }

        deserializer.deserialize_map(FeatureMapVisitor)
    }
}
