use serde::Serialize;

use crate::domain::{DetectionResult, FeatureVector, MethodSet};
use crate::rules::RuleConfig;

/// Result for one account.
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(flatten)]
    pub result: DetectionResult,
}

/// Results for a batch, in request order.
#[derive(Debug, Serialize)]
pub struct BatchDetectResponse {
    pub count: usize,
    pub results: Vec<DetectResponse>,
}

/// Extracted features for inspection.
#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub schema_version: u32,
    pub features: FeatureVector,
}

/// Thresholds in effect.
#[derive(Debug, Serialize)]
pub struct RuleConfigResponse {
    pub config: RuleConfig,

    /// Keys from the request that were not recognized
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_keys: Vec<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub scorer: String,
    pub uptime_secs: u64,
}

/// Readiness check response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub methods: MethodSet,
    pub rules: usize,
    pub model_loaded: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "BAD_REQUEST")
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ErrorResponse::new(message, "INTERNAL_ERROR")
    }
}
