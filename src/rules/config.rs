use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Threshold table consulted by the rule set.
///
/// Tuning only changes thresholds; the rules themselves and their weights
/// are fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Accounts younger than this (days) are "new"
    pub min_account_age_days: f64,

    /// Reserved: following/follower ceiling, not consulted by any rule
    pub max_following_ratio: f64,

    /// Follower/following ratio floor
    pub min_follower_following_ratio: f64,

    /// Posts per day considered extreme for any account
    pub max_post_frequency: f64,

    /// Duplicate content ratio ceiling
    pub max_duplicate_ratio: f64,

    /// Fraction of posts with URLs ceiling
    pub max_url_ratio: f64,

    /// Reserved: username length ceiling, not consulted by any rule
    pub max_username_length: f64,

    /// Bios shorter than this (characters) count as missing
    pub min_bio_length: f64,

    /// Posts per day considered suspicious for a new account
    pub suspicious_post_frequency: f64,

    /// Normalized score at or above which the verdict is "bot"
    pub bot_score_threshold: f64,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            min_account_age_days: 7.0,
            max_following_ratio: 10.0,
            min_follower_following_ratio: 0.1,
            max_post_frequency: 50.0,
            max_duplicate_ratio: 0.5,
            max_url_ratio: 0.8,
            max_username_length: 20.0,
            min_bio_length: 10.0,
            suspicious_post_frequency: 20.0,
            bot_score_threshold: 0.6,
        }
    }
}

/// Errors from validating a threshold table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleConfigError {
    #[error("threshold {key} must be a finite, non-negative number (got {value})")]
    OutOfRange { key: &'static str, value: f64 },

    #[error("bot_score_threshold must be within [0, 1] (got {0})")]
    ScoreThreshold(f64),
}

impl RuleConfig {
    /// Recognized keys, in documentation order.
    pub const KEYS: [&'static str; 10] = [
        "min_account_age_days",
        "max_following_ratio",
        "min_follower_following_ratio",
        "max_post_frequency",
        "max_duplicate_ratio",
        "max_url_ratio",
        "max_username_length",
        "min_bio_length",
        "suspicious_post_frequency",
        "bot_score_threshold",
    ];

    fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
        let slot = match key {
            "min_account_age_days" => &mut self.min_account_age_days,
            "max_following_ratio" => &mut self.max_following_ratio,
            "min_follower_following_ratio" => &mut self.min_follower_following_ratio,
            "max_post_frequency" => &mut self.max_post_frequency,
            "max_duplicate_ratio" => &mut self.max_duplicate_ratio,
            "max_url_ratio" => &mut self.max_url_ratio,
            "max_username_length" => &mut self.max_username_length,
            "min_bio_length" => &mut self.min_bio_length,
            "suspicious_post_frequency" => &mut self.suspicious_post_frequency,
            "bot_score_threshold" => &mut self.bot_score_threshold,
            _ => return None,
        };
        Some(slot)
    }

    /// Threshold by key.
    pub fn get(&self, key: &str) -> Option<f64> {
        let value = match key {
            "min_account_age_days" => self.min_account_age_days,
            "max_following_ratio" => self.max_following_ratio,
            "min_follower_following_ratio" => self.min_follower_following_ratio,
            "max_post_frequency" => self.max_post_frequency,
            "max_duplicate_ratio" => self.max_duplicate_ratio,
            "max_url_ratio" => self.max_url_ratio,
            "max_username_length" => self.max_username_length,
            "min_bio_length" => self.min_bio_length,
            "suspicious_post_frequency" => self.suspicious_post_frequency,
            "bot_score_threshold" => self.bot_score_threshold,
            _ => return None,
        };
        Some(value)
    }

    /// Set a threshold by key. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: f64) -> bool {
        match self.slot_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of this config with `overrides` merged in.
    ///
    /// Unknown keys are skipped and returned so callers can report them.
    pub fn merged<'a, I>(&self, overrides: I) -> (RuleConfig, Vec<String>)
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let mut next = self.clone();
        let mut ignored = Vec::new();
        for (key, value) in overrides {
            if !next.set(key, *value) {
                ignored.push(key.clone());
            }
        }
        (next, ignored)
    }

    /// Check every threshold is usable.
    pub fn validate(&self) -> Result<(), RuleConfigError> {
        for key in RuleConfig::KEYS {
            if let Some(value) = self.get(key) {
                if !value.is_finite() || value < 0.0 {
                    return Err(RuleConfigError::OutOfRange { key, value });
                }
            }
        }
        if self.bot_score_threshold > 1.0 {
            return Err(RuleConfigError::ScoreThreshold(self.bot_score_threshold));
        }
        Ok(())
    }
}
