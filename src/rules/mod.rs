pub mod activity;
pub mod config;
pub mod engine;
pub mod network;
pub mod profile;
pub mod traits;

pub use activity::{DuplicateContentRule, ExtremeFrequencyRule, NewAccountBurstRule, UrlSpamRule};
pub use config::{RuleConfig, RuleConfigError};
pub use engine::{evaluate, ConfigUpdate, RuleEngine, RuleSet};
pub use network::{FastReplyRule, LowFollowerRatioRule, LowInteractionDiversityRule};
pub use profile::{NoProfileImageRule, RandomUsernameRule, ShortBioRule};
pub use traits::Rule;
