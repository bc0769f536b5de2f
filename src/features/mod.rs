pub mod extractor;
pub mod timestamp;

pub use extractor::{is_random_username, safe_ratio, FeatureExtractor};
pub use timestamp::parse_timestamp;
