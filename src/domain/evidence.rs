use serde::{Deserialize, Serialize};

/// Evidence captured when a rule fires.
///
/// Provides the audit trail behind a fired-rule description: which feature
/// was checked, what it held and which threshold it crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// The rule that fired
    pub rule_id: String,

    /// Feature that was checked (e.g., "post_frequency", "url_ratio")
    pub key: String,

    /// Observed feature value
    pub value: f64,

    /// Threshold that was crossed (absent for boolean checks)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl Evidence {
    /// Evidence for a boolean check.
    pub fn new(rule_id: impl Into<String>, key: impl Into<String>, value: f64) -> Self {
        Evidence {
            rule_id: rule_id.into(),
            key: key.into(),
            value,
            limit: None,
        }
    }

    /// Evidence for a threshold check.
    pub fn with_limit(
        rule_id: impl Into<String>,
        key: impl Into<String>,
        value: f64,
        limit: f64,
    ) -> Self {
        Evidence {
            rule_id: rule_id.into(),
            key: key.into(),
            value,
            limit: Some(limit),
        }
    }
}

/// Result of evaluating a single rule.
#[derive(Debug, Clone, Default)]
pub struct RuleResult {
    /// Whether the rule fired
    pub hit: bool,

    /// Evidence if the rule fired
    pub evidence: Option<Evidence>,
}

impl RuleResult {
    /// A rule that did not fire.
    #[inline]
    pub fn pass() -> Self {
        RuleResult {
            hit: false,
            evidence: None,
        }
    }

    /// A rule that fired, with evidence.
    pub fn fire(evidence: Evidence) -> Self {
        RuleResult {
            hit: true,
            evidence: Some(evidence),
        }
    }
}
