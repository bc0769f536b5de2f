use serde::{Deserialize, Serialize};
use std::fmt;

use super::evidence::Evidence;
use super::features::FeatureVector;

/// Which subsystem(s) produced a detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    /// Rule engine only
    Rules,
    /// Classifier only
    Ml,
    /// Weighted blend of both
    Combined,
    /// No method enabled
    None,
}

impl DetectionMethod {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Rules => "rules",
            DetectionMethod::Ml => "ml",
            DetectionMethod::Combined => "combined",
            DetectionMethod::None => "none",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of scorers to run for a detection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSet {
    pub rules: bool,
    pub ml: bool,
}

impl MethodSet {
    pub const ALL: MethodSet = MethodSet {
        rules: true,
        ml: true,
    };
    pub const RULES_ONLY: MethodSet = MethodSet {
        rules: true,
        ml: false,
    };
    pub const ML_ONLY: MethodSet = MethodSet {
        rules: false,
        ml: true,
    };
    pub const NONE: MethodSet = MethodSet {
        rules: false,
        ml: false,
    };

    /// Parse method names ("rules", "ml"). Unknown names are ignored.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut set = MethodSet::NONE;
        for name in names {
            match name.trim().to_lowercase().as_str() {
                "rules" => set.rules = true,
                "ml" => set.ml = true,
                _ => {}
            }
        }
        set
    }

    /// Methods enabled in both sets.
    pub fn intersect(self, other: MethodSet) -> MethodSet {
        MethodSet {
            rules: self.rules && other.rules,
            ml: self.ml && other.ml,
        }
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        MethodSet::ALL
    }
}

/// Outcome of the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleVerdict {
    pub is_bot: bool,

    /// Fired weight over total weight, in [0, 1]
    pub score: f64,

    /// Descriptions of fired rules, in rule declaration order
    pub fired_rules: Vec<String>,

    /// Audit detail for each fired rule, same order as `fired_rules`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

/// Which scorer produced a classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictSource {
    /// Loaded classifier artifact
    Model,
    /// Built-in closed-form heuristic
    Heuristic,
}

/// Outcome of the classifier adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub is_bot: bool,

    /// Confidence in [0, 1]
    pub confidence: f64,

    pub source: VerdictSource,
}

/// Per-method breakdown of a detection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<RuleVerdict>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<ClassifierVerdict>,
}

/// Final per-account decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub is_bot: bool,

    /// Confidence in [0, 1]
    pub confidence: f64,

    pub method: DetectionMethod,

    pub details: DetectionDetails,

    /// Feature vector both scorers consumed
    pub features: FeatureVector,
}

impl DetectionResult {
    /// Result when no method is enabled.
    pub fn undetermined(features: FeatureVector) -> Self {
        DetectionResult {
            is_bot: false,
            confidence: 0.0,
            method: DetectionMethod::None,
            details: DetectionDetails::default(),
            features,
        }
    }
}
