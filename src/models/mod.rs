//! Fraud classifier: training, evaluation, inference and persistence on
//! the aprender random forest and standard scaler

pub mod evaluation;
pub mod inference;
pub mod loader;
pub mod split;
pub mod training;

pub use evaluation::{ClassMetrics, ClassificationReport};
pub use inference::{FraudClassifier, FRAUD_THRESHOLD};
pub use loader::{ModelLoader, ARTIFACT_VERSION};
pub use training::{ModelTrainer, TrainingOutcome};
