// src/presenter.rs
use serde::Serialize;

use crate::analysis::AnalysisSession;
use crate::types::{DiagnosisResult, RequestStatus};

pub const ALERT_BANNER: &str = "ARRHYTHMIA DETECTED";
pub const NORMAL_BANNER: &str = "NORMAL RHYTHM";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    Alert,
    Normal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiagnosisCard {
    pub banner: String,
    pub severity: Severity,
    pub diagnosis: String,
    pub confidence_text: String,
    pub bpm_text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ResultPanel {
    Empty,
    Diagnosis(DiagnosisCard),
    /// Only reachable when the session surfaces failures instead of masking them.
    Unavailable { reason: String },
}

/// Everything the result pane needs to draw itself.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewModel {
    pub busy: bool,
    pub panel: ResultPanel,
}

impl ViewModel {
    pub fn empty() -> Self {
        Self {
            busy: false,
            panel: ResultPanel::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    pub fn card(&self) -> Option<&DiagnosisCard> {
        match &self.panel {
            ResultPanel::Diagnosis(card) => Some(card),
            _ => None,
        }
    }
}

impl Default for ViewModel {
    fn default() -> Self {
        Self::empty()
    }
}

pub fn present(session: &AnalysisSession) -> ViewModel {
    let busy = session.status() == RequestStatus::Pending;
    let panel = match (session.result(), session.last_failure()) {
        (Some(result), _) => ResultPanel::Diagnosis(present_result(result)),
        (None, Some(reason)) => ResultPanel::Unavailable {
            reason: reason.to_owned(),
        },
        (None, None) => ResultPanel::Empty,
    };
    ViewModel { busy, panel }
}

pub fn present_result(result: &DiagnosisResult) -> DiagnosisCard {
    let (banner, severity) = if result.alert {
        (ALERT_BANNER, Severity::Alert)
    } else {
        (NORMAL_BANNER, Severity::Normal)
    };
    DiagnosisCard {
        banner: banner.to_owned(),
        severity,
        diagnosis: result.diagnosis.clone(),
        confidence_text: format_confidence(result.confidence),
        bpm_text: result.derived_metrics.avg_bpm.to_string(),
    }
}

/// `0.943` -> `"94.3%"`. Rounds half away from zero at one decimal place.
pub fn format_confidence(confidence: f64) -> String {
    let tenths = (confidence * 1000.0).round() / 10.0;
    format!("{:.1}%", tenths)
}
