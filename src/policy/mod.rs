pub mod hot_reload;
pub mod loader;

pub use hot_reload::RuleConfigWatcher;
pub use loader::{load_rule_config, RuleConfigDocument, RuleConfigLoader};
