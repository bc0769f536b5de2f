use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::detector::BotDetector;
use crate::domain::FEATURE_SCHEMA_VERSION;
use crate::observability::{MetricsRegistry, TimingGuard};
use crate::rules::RuleConfig;

use super::request::{AccountRequest, BatchDetectRequest, DetectRequest};
use super::response::{
    BatchDetectResponse, DetectResponse, ErrorResponse, FeaturesResponse, HealthResponse,
    ReadyResponse, RuleConfigResponse,
};

/// Shared application state.
pub struct AppState {
    pub detector: Arc<BotDetector>,

    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Latency budget in milliseconds
    pub latency_budget_ms: u64,

    /// Maximum accounts per batch request
    pub max_batch_size: usize,
}

/// Create the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/detect", post(handle_detect))
        .route("/v1/detect/batch", post(handle_detect_batch))
        .route("/v1/features", post(handle_features))
        .route("/v1/explain", post(handle_explain))
        .route(
            "/v1/config/rules",
            get(handle_get_rule_config).patch(handle_patch_rule_config),
        )
        .route("/health", get(handle_health))
        .route("/ready", get(handle_ready))
        .route("/metrics", get(handle_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

/// Score one account.
async fn handle_detect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DetectRequest>,
) -> impl IntoResponse {
    let start = Instant::now();
    let result = {
        let _timer = TimingGuard::new(&state.metrics);
        state.detector.detect_with(&req.account, req.methods())
    };

    state
        .metrics
        .record_detection(&result, state.detector.classifier().has_model());

    let username = req.account.username().map(str::to_string);
    check_latency(&state, start, username.as_deref());

    info!(
        username = username.as_deref().unwrap_or("unknown"),
        is_bot = result.is_bot,
        confidence = result.confidence,
        method = %result.method,
        latency_us = start.elapsed().as_micros() as u64,
        "Detection completed"
    );

    (StatusCode::OK, Json(DetectResponse { username, result }))
}

/// Score many accounts. Results are returned in request order.
async fn handle_detect_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchDetectRequest>,
) -> Response {
    if req.accounts.len() > state.max_batch_size {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::bad_request(format!(
                "batch of {} accounts exceeds limit of {}",
                req.accounts.len(),
                state.max_batch_size
            ))),
        )
            .into_response();
    }

    let start = Instant::now();
    let methods = req.methods();
    let detector = state.detector.clone();
    let accounts = req.accounts;

    // Batch scoring fans out onto scoped threads; keep it off the runtime.
    let joined = tokio::task::spawn_blocking(move || {
        let results = detector.detect_batch_with(&accounts, methods);
        (accounts, results)
    })
    .await;

    let (accounts, results) = match joined {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "Batch detection task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal_error("batch detection failed")),
            )
                .into_response();
        }
    };

    state.metrics.record_batch();
    let model_loaded = state.detector.classifier().has_model();
    for result in &results {
        state.metrics.record_detection(result, model_loaded);
    }
    state.metrics.record_latency(start);

    let results: Vec<DetectResponse> = accounts
        .iter()
        .zip(results)
        .map(|(account, result)| DetectResponse {
            username: account.username().map(str::to_string),
            result,
        })
        .collect();

    info!(
        count = results.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Batch detection completed"
    );

    (
        StatusCode::OK,
        Json(BatchDetectResponse {
            count: results.len(),
            results,
        }),
    )
        .into_response()
}

/// Extracted feature vector for one account.
async fn handle_features(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> impl IntoResponse {
    Json(FeaturesResponse {
        schema_version: FEATURE_SCHEMA_VERSION,
        features: state.detector.features(&req.account),
    })
}

/// Plain-text report for one account.
async fn handle_explain(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AccountRequest>,
) -> impl IntoResponse {
    let report = state.detector.explain(&req.account);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report,
    )
}

async fn handle_get_rule_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(RuleConfigResponse {
        config: (*state.detector.rule_engine().config()).clone(),
        ignored_keys: Vec::new(),
    })
}

/// Merge threshold overrides into the live config.
///
/// Keys that are not thresholds are skipped whatever their value; a
/// recognized key with a non-numeric value rejects the whole update.
async fn handle_patch_rule_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Map<String, Value>>,
) -> Response {
    let mut overrides = HashMap::new();
    let mut skipped = Vec::new();
    for (key, value) in body {
        if !RuleConfig::KEYS.contains(&key.as_str()) {
            skipped.push(key);
            continue;
        }
        match value.as_f64() {
            Some(v) => {
                overrides.insert(key, v);
            }
            None => {
                warn!(key = %key, "Rejected non-numeric rule threshold");
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ErrorResponse::new(
                        format!("threshold {key} must be a number"),
                        "INVALID_RULE_CONFIG",
                    )),
                )
                    .into_response();
            }
        }
    }

    match state.detector.update_rule_config(&overrides) {
        Ok(update) => {
            let mut ignored_keys = skipped;
            ignored_keys.extend(update.ignored_keys);
            ignored_keys.sort();
            (
                StatusCode::OK,
                Json(RuleConfigResponse {
                    config: (*update.config).clone(),
                    ignored_keys,
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Rejected rule config update");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse::new(e.to_string(), "INVALID_RULE_CONFIG")),
            )
                .into_response()
        }
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        scorer: state.detector.classifier().scorer_name().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Readiness check endpoint.
async fn handle_ready(State(state): State<Arc<AppState>>) -> Response {
    let methods = state.detector.methods();

    if !methods.rules && !methods.ml {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::new("No detection method enabled", "NOT_READY")),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            ready: true,
            methods,
            rules: state.detector.rule_engine().rules().len(),
            model_loaded: state.detector.classifier().has_model(),
        }),
    )
        .into_response()
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = format!(
        r#"# HELP botwatch_uptime_seconds Application uptime in seconds
# TYPE botwatch_uptime_seconds counter
botwatch_uptime_seconds {}

{}"#,
        state.start_time.elapsed().as_secs(),
        state.metrics.to_prometheus(),
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        metrics,
    )
}

fn check_latency(state: &AppState, start: Instant, username: Option<&str>) {
    let elapsed = start.elapsed();
    if elapsed.as_millis() > state.latency_budget_ms as u128 {
        warn!(
            username = username.unwrap_or("unknown"),
            latency_ms = elapsed.as_millis() as u64,
            budget_ms = state.latency_budget_ms,
            "Detection latency exceeded budget"
        );
    }
}
