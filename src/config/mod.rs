use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::domain::MethodSet;

/// Bot detection service configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "botwatch")]
#[command(about = "Social account bot detection service")]
pub struct Config {
    /// HTTP server listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "BOTWATCH_LISTEN_ADDR")]
    pub listen_addr: String,

    /// Path to a classifier artifact (heuristic scoring if not set)
    #[arg(long, env = "BOTWATCH_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// Path to rule threshold YAML (defaults if not set)
    #[arg(long, env = "BOTWATCH_RULE_CONFIG_PATH")]
    pub rule_config_path: Option<PathBuf>,

    /// Rule config reload check interval in seconds
    #[arg(long, default_value = "30", env = "BOTWATCH_RULE_RELOAD_SECS")]
    pub rule_reload_secs: u64,

    /// Disable the rule engine
    #[arg(long, env = "BOTWATCH_DISABLE_RULES")]
    pub disable_rules: bool,

    /// Disable the classifier
    #[arg(long, env = "BOTWATCH_DISABLE_ML")]
    pub disable_ml: bool,

    /// Maximum accounts per batch request
    #[arg(long, default_value = "1000", env = "BOTWATCH_MAX_BATCH_SIZE")]
    pub max_batch_size: usize,

    /// Worker threads for batch scoring (0 = available parallelism)
    #[arg(long, default_value = "0", env = "BOTWATCH_BATCH_WORKERS")]
    pub batch_workers: usize,

    /// Latency budget in milliseconds for detection endpoints
    #[arg(long, default_value = "250", env = "BOTWATCH_LATENCY_BUDGET_MS")]
    pub latency_budget_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "BOTWATCH_LOG_JSON")]
    pub log_json: bool,

    /// Enable graceful shutdown
    #[arg(long, default_value = "true", env = "BOTWATCH_GRACEFUL_SHUTDOWN")]
    pub graceful_shutdown: bool,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value = "30", env = "BOTWATCH_SHUTDOWN_TIMEOUT_SECS")]
    pub shutdown_timeout_secs: u64,
}

impl Config {
    /// Detection methods left enabled by the disable flags.
    pub fn methods(&self) -> MethodSet {
        MethodSet {
            rules: !self.disable_rules,
            ml: !self.disable_ml,
        }
    }

    pub fn rule_reload_interval(&self) -> Duration {
        Duration::from_secs(self.rule_reload_secs.max(1))
    }

    pub fn latency_budget(&self) -> Duration {
        Duration::from_millis(self.latency_budget_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: "0.0.0.0:8080".to_string(),
            model_path: None,
            rule_config_path: None,
            rule_reload_secs: 30,
            disable_rules: false,
            disable_ml: false,
            max_batch_size: 1000,
            batch_workers: 0,
            latency_budget_ms: 250,
            log_level: "info".to_string(),
            log_json: false,
            graceful_shutdown: true,
            shutdown_timeout_secs: 30,
        }
    }
}
