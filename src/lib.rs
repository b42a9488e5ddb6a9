//! Live ECG monitoring client: a simulated Lead II trace on a fixed clock and an
//! upload-and-classify session that always lands on something displayable.
pub mod analysis;
pub mod config;
pub mod controller;
pub mod presenter;
pub mod stream;
pub mod types;
pub use analysis::{AnalysisSession, Classifier, ClassifierError, FailurePolicy, HttpClassifier, UserError};
pub use config::{ConfigError, FailureMode, MonitorConfig};
pub use controller::{MonitorController, MonitorEvent};
pub use presenter::{present, DiagnosisCard, ResultPanel, Severity, ViewModel};
pub use stream::{SignalStreamBuffer, SignalWindow, StreamError, TickerHandle};
pub use types::{DerivedMetrics, DiagnosisResult, RecordingFile, RequestId, RequestStatus, SamplePoint};
