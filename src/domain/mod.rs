pub mod evidence;
pub mod features;
pub mod record;
pub mod verdict;

pub use evidence::{Evidence, RuleResult};
pub use features::{Feature, FeatureVector, FEATURE_COUNT, FEATURE_SCHEMA_VERSION};
pub use record::AccountRecord;
pub use verdict::{
    ClassifierVerdict, DetectionDetails, DetectionMethod, DetectionResult, MethodSet,
    RuleVerdict, VerdictSource,
};
