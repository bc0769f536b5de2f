use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use botwatch::api::routes::{create_router, AppState};
use botwatch::config::Config;
use botwatch::detector::BotDetector;
use botwatch::observability::{init_tracing, MetricsRegistry};
use botwatch::policy::{load_rule_config, RuleConfigLoader, RuleConfigWatcher};
use botwatch::rules::RuleConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting botwatch detection service"
    );

    // Initial thresholds; a bad file at startup is fatal
    let rule_config = match &config.rule_config_path {
        Some(path) => load_rule_config(path)?,
        None => {
            info!("No rule config path set, using default thresholds");
            RuleConfig::default()
        }
    };

    let mut builder = BotDetector::builder()
        .methods(config.methods())
        .rule_config(rule_config);
    if let Some(path) = &config.model_path {
        builder = builder.model_path(path);
    } else {
        info!("No classifier artifact configured, using heuristic scoring");
    }
    if config.batch_workers > 0 {
        builder = builder.batch_workers(config.batch_workers);
    }
    let detector = Arc::new(builder.build()?);

    let metrics = Arc::new(MetricsRegistry::new());

    // Start rule config watcher
    let watcher_handle = config.rule_config_path.as_ref().map(|path| {
        let watcher = RuleConfigWatcher::new(
            RuleConfigLoader::new(path),
            detector.clone(),
            config.rule_reload_interval(),
        )
        .with_metrics(metrics.clone());
        let (_rx, handle) = watcher.start();
        handle
    });

    // Create application state
    let state = Arc::new(AppState {
        detector,
        metrics,
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        latency_budget_ms: config.latency_budget_ms,
        max_batch_size: config.max_batch_size,
    });

    // Create router
    let app = create_router(state);

    // Parse listen address
    let addr: SocketAddr = config.listen_addr.parse()?;

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run server with graceful shutdown
    if config.graceful_shutdown {
        let timeout = config.shutdown_timeout();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();
        tokio::select! {
            result = server => result?,
            _ = drain_deadline(timeout) => {
                warn!(timeout_secs = timeout.as_secs(), "Shutdown timeout elapsed, dropping open connections");
            }
        }
    } else {
        axum::serve(listener, app).await?;
    }

    // Cleanup
    info!("Shutting down...");
    if let Some(handle) = watcher_handle {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}

/// Resolves `timeout` after a shutdown signal arrives.
async fn drain_deadline(timeout: std::time::Duration) {
    shutdown_signal().await;
    tokio::time::sleep(timeout).await;
}
