use ahash::AHashSet;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::record::keys;
use crate::domain::{AccountRecord, Feature, FeatureVector};

use super::timestamp::parse_timestamp;

const SECONDS_PER_DAY: f64 = 86_400.0;

static ANY_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").expect("valid digit pattern"));
static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{5,}").expect("valid digit-run pattern"));
static ALTERNATING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z]{2}\d{2,}[a-z]{2}\d{2,}").expect("valid alternating pattern")
});
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url pattern"));
static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("valid hashtag pattern"));

/// One entry of `recent_posts` after lenient decoding.
#[derive(Debug)]
struct Post<'a> {
    content: &'a str,
    timestamp: Option<DateTime<Utc>>,
}

/// Turns raw account records into fixed-schema feature vectors.
///
/// Extraction is total: malformed or missing fields fall back to their
/// defaults and every schema feature is always present in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        FeatureExtractor
    }

    /// Extract features relative to the current time.
    pub fn extract(&self, record: &AccountRecord) -> FeatureVector {
        self.extract_at(record, Utc::now())
    }

    /// Extract features relative to `now` (used for account age).
    pub fn extract_at(&self, record: &AccountRecord, now: DateTime<Utc>) -> FeatureVector {
        let mut v = FeatureVector::zeroed();

        v.set(Feature::AccountAgeDays, account_age_days(record, now));

        // Profile
        v.set(Feature::HasProfileImage, flag(record.get(keys::HAS_PROFILE_IMAGE)));
        v.set(Feature::HasVerifiedBadge, flag(record.get(keys::VERIFIED)));
        let bio = text(record.get(keys::BIO));
        v.set(Feature::HasBio, bool_to_f64(!bio.is_empty()));
        v.set(Feature::BioLength, bio.chars().count() as f64);

        // Username
        let username = text(record.get(keys::USERNAME));
        v.set(Feature::UsernameHasNumbers, bool_to_f64(ANY_DIGIT.is_match(username)));
        v.set(Feature::UsernameLength, username.chars().count() as f64);
        v.set(Feature::UsernameRandomPattern, bool_to_f64(is_random_username(username)));

        // Counts and ratios
        let posts_total = number(record.get(keys::POST_COUNT));
        let followers = number(record.get(keys::FOLLOWER_COUNT));
        let following = number(record.get(keys::FOLLOWING_COUNT));
        v.set(Feature::PostCount, posts_total);
        v.set(Feature::FollowerCount, followers);
        v.set(Feature::FollowingCount, following);
        v.set(Feature::FollowerFollowingRatio, safe_ratio(followers, following));
        v.set(Feature::PostFollowerRatio, safe_ratio(posts_total, followers));

        // Posting behavior
        let posts = recent_posts(record);
        v.set(Feature::AvgPostLength, avg_post_length(&posts));
        v.set(Feature::PostFrequency, post_frequency(&posts));
        v.set(Feature::DuplicateContentRatio, duplicate_ratio(&posts));
        v.set(Feature::UrlRatio, url_ratio(&posts));
        v.set(Feature::HashtagRatio, hashtag_ratio(&posts));

        // Interaction patterns
        v.set(Feature::AvgReplyTime, number(record.get(keys::AVG_REPLY_TIME_SECONDS)));
        v.set(
            Feature::InteractionDiversity,
            interaction_diversity(record.get(keys::INTERACTIONS)),
        );

        v
    }
}

#[inline]
fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Truthiness of a field: booleans as-is, non-zero numbers true.
fn flag(value: Option<&Value>) -> f64 {
    let truthy = match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|x| x != 0.0),
        _ => false,
    };
    bool_to_f64(truthy)
}

fn text(value: Option<&Value>) -> &str {
    value.and_then(Value::as_str).unwrap_or("")
}

/// Numeric field; numeric strings are accepted, anything else is 0.
fn number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite()).unwrap_or(0.0)
}

/// Division that yields 0.0 for a zero denominator.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn account_age_days(record: &AccountRecord, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = record.get(keys::CREATED_AT).and_then(parse_timestamp) else {
        return 0.0;
    };
    (now - created_at).num_days().max(0) as f64
}

/// Fixed lexical check for machine-generated usernames.
pub fn is_random_username(username: &str) -> bool {
    DIGIT_RUN.is_match(username) || ALTERNATING.is_match(&username.to_lowercase())
}

fn recent_posts(record: &AccountRecord) -> Vec<Post<'_>> {
    let Some(Value::Array(entries)) = record.get(keys::RECENT_POSTS) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(post) => Some(Post {
                content: text(post.get(keys::POST_CONTENT)),
                timestamp: post.get(keys::POST_TIMESTAMP).and_then(parse_timestamp),
            }),
            Value::String(content) => Some(Post {
                content,
                timestamp: None,
            }),
            _ => None,
        })
        .collect()
}

fn avg_post_length(posts: &[Post<'_>]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let total: usize = posts.iter().map(|p| p.content.chars().count()).sum();
    total as f64 / posts.len() as f64
}

/// Posts per day across the span of parseable timestamps.
fn post_frequency(posts: &[Post<'_>]) -> f64 {
    if posts.len() < 2 {
        return 0.0;
    }

    let mut earliest: Option<DateTime<Utc>> = None;
    let mut latest: Option<DateTime<Utc>> = None;
    let mut parsed = 0usize;
    for ts in posts.iter().filter_map(|p| p.timestamp) {
        parsed += 1;
        earliest = Some(earliest.map_or(ts, |e| e.min(ts)));
        latest = Some(latest.map_or(ts, |l| l.max(ts)));
    }

    let (Some(earliest), Some(latest)) = (earliest, latest) else {
        return 0.0;
    };
    if parsed < 2 {
        return 0.0;
    }

    let span_secs = (latest - earliest).num_milliseconds() as f64 / 1000.0;
    if span_secs == 0.0 {
        // Everything landed at the same instant: count as a single day.
        return posts.len() as f64;
    }
    posts.len() as f64 / (span_secs / SECONDS_PER_DAY)
}

fn duplicate_ratio(posts: &[Post<'_>]) -> f64 {
    if posts.len() < 2 {
        return 0.0;
    }
    let distinct: AHashSet<&str> = posts.iter().map(|p| p.content).collect();
    1.0 - distinct.len() as f64 / posts.len() as f64
}

fn url_ratio(posts: &[Post<'_>]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let with_urls = posts.iter().filter(|p| URL.is_match(p.content)).count();
    with_urls as f64 / posts.len() as f64
}

/// Mean hashtag count per post (not bounded by 1).
fn hashtag_ratio(posts: &[Post<'_>]) -> f64 {
    if posts.is_empty() {
        return 0.0;
    }
    let tags: usize = posts.iter().map(|p| HASHTAG.find_iter(p.content).count()).sum();
    tags as f64 / posts.len() as f64
}

/// Distinct counterparts over total interactions across all kinds.
///
/// Repeat interactions with the same counterpart dilute diversity.
fn interaction_diversity(value: Option<&Value>) -> f64 {
    let Some(Value::Object(kinds)) = value else {
        return 0.0;
    };

    let mut distinct: AHashSet<String> = AHashSet::new();
    let mut total = 0usize;
    for counterparts in kinds.values().filter_map(Value::as_array) {
        total += counterparts.len();
        // Keyed on serialized JSON so 1 and "1" stay distinct.
        distinct.extend(counterparts.iter().map(Value::to_string));
    }

    safe_ratio(distinct.len() as f64, total as f64)
}
