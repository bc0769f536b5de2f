pub mod explain;
pub mod orchestrator;

pub use explain::render as render_explanation;
pub use orchestrator::{
    combine, BotDetector, DetectorBuilder, COMBINED_BOT_THRESHOLD, ML_WEIGHT, RULES_WEIGHT,
};
