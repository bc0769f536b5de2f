pub mod adapter;
pub mod heuristic;
pub mod logistic;
pub mod traits;

pub use adapter::ClassifierAdapter;
pub use heuristic::{HeuristicClassifier, HEURISTIC_BOT_THRESHOLD};
pub use logistic::{ArtifactError, LogisticModel, ARTIFACT_FORMAT};
pub use traits::{BotClassifier, ClassifierError, Label, LabelProbabilities};
