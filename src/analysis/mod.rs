// src/analysis/mod.rs
pub mod classifier;
pub mod error;
pub mod session;
pub use classifier::{decode_response, Classifier, HttpClassifier};
pub use error::{ClassifierError, UserError};
pub use session::{AnalysisSession, AnalysisTicket, FailurePolicy, Resolution};
