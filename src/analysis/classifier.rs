use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::Value;

use crate::analysis::ClassifierError;
use crate::config::MonitorConfig;
use crate::types::{DerivedMetrics, DiagnosisResult, RecordingFile};

/// Remote (or fake) rhythm classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, file: &RecordingFile) -> Result<DiagnosisResult, ClassifierError>;
}

/// Body of a successful `POST /analyze`. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    diagnosis: String,
    confidence: f64,
    alert: bool,
    // Optional extras; a bad value here never fails the decode.
    #[serde(default)]
    avg_bpm: Option<Value>,
    #[serde(default, rename = "avgBPM")]
    avg_bpm_camel: Option<Value>,
}

/// Non-negative number rounded to whole beats; anything else is ignored.
fn bpm_from_value(value: &Value) -> Option<u32> {
    let bpm = value.as_f64()?;
    if !bpm.is_finite() || bpm < 0.0 || bpm > u32::MAX as f64 {
        return None;
    }
    Some(bpm.round() as u32)
}

/// Parses and validates a classifier success body.
pub fn decode_response(body: &[u8]) -> Result<DiagnosisResult, ClassifierError> {
    let parsed: AnalyzeResponse = serde_json::from_slice(body)
        .map_err(|e| ClassifierError::MalformedBody(e.to_string()))?;
    if !(0.0..=1.0).contains(&parsed.confidence) {
        return Err(ClassifierError::InvalidConfidence(parsed.confidence));
    }
    let derived_metrics = parsed
        .avg_bpm
        .as_ref()
        .and_then(bpm_from_value)
        .or_else(|| parsed.avg_bpm_camel.as_ref().and_then(bpm_from_value))
        .map(|avg_bpm| DerivedMetrics { avg_bpm })
        .unwrap_or_default();
    Ok(DiagnosisResult {
        diagnosis: parsed.diagnosis,
        confidence: parsed.confidence,
        alert: parsed.alert,
        derived_metrics,
    })
}

/// Classifier reached over HTTP with a multipart upload.
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    timeout_secs: u64,
}

impl HttpClassifier {
    pub fn new(config: &MonitorConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: analyze_url(&config.base_url),
            timeout_secs: config.request_timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_send_error(&self, err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout(self.timeout_secs)
        } else if err.is_connect() {
            ClassifierError::Unreachable(err.to_string())
        } else {
            ClassifierError::Transport(err.to_string())
        }
    }
}

fn analyze_url(base_url: &str) -> String {
    format!("{}/analyze", base_url.trim_end_matches('/'))
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, file: &RecordingFile) -> Result<DiagnosisResult, ClassifierError> {
        log::info!(
            "uploading {} ({} bytes) to {}",
            file.name,
            file.len(),
            self.endpoint
        );
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        log::debug!("classifier responded with {}", status);
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_owned());
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        decode_response(&body)
    }
}
