// src/controller.rs
//
// Owns the signal stream and the analysis session for one monitoring view.
// Background work (the sample timer, the classifier request) never touches either
// entity directly; it posts a MonitorEvent and the owner applies it in pump().

use std::sync::Arc;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::analysis::{
    AnalysisSession, AnalysisTicket, Classifier, ClassifierError, Resolution, UserError,
};
use crate::config::MonitorConfig;
use crate::presenter::{present, ViewModel};
use crate::stream::{SignalStreamBuffer, StreamError, TickerHandle};
use crate::types::{DiagnosisResult, RecordingFile, RequestId};

/// Completions posted back to the controller by its background tasks.
#[derive(Debug)]
pub enum MonitorEvent {
    Tick,
    AnalysisFinished {
        id: RequestId,
        outcome: Result<DiagnosisResult, ClassifierError>,
    },
}

pub struct MonitorController {
    stream: SignalStreamBuffer,
    session: AnalysisSession,
    classifier: Arc<dyn Classifier>,
    events_tx: UnboundedSender<MonitorEvent>,
    events_rx: UnboundedReceiver<MonitorEvent>,
    ticker: Option<TickerHandle>,
    request_cancel: Option<CancellationToken>,
}

impl MonitorController {
    pub fn new(config: &MonitorConfig, classifier: Arc<dyn Classifier>) -> Result<Self, StreamError> {
        let stream = SignalStreamBuffer::initialize(config.window_capacity, config.tick_interval())?;
        let session = AnalysisSession::new(config.failure_policy.policy());
        Ok(Self::with_parts(stream, session, classifier))
    }

    pub fn with_parts(
        stream: SignalStreamBuffer,
        session: AnalysisSession,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            stream,
            session,
            classifier,
            events_tx,
            events_rx,
            ticker: None,
            request_cancel: None,
        }
    }

    /// Starts the sample timer. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        if self.ticker.is_some() || !self.stream.is_running() {
            return;
        }
        let tx = self.events_tx.clone();
        let period = self.stream.tick_interval();
        log::info!("signal stream started, one sample every {:?}", period);
        self.ticker = Some(TickerHandle::spawn(period, move || {
            tx.send(MonitorEvent::Tick).is_ok()
        }));
    }

    pub fn attach_file(&mut self, file: RecordingFile) {
        self.session.attach_file(file);
    }

    /// Issues the classifier request in the background. Must run inside a tokio runtime.
    pub fn submit(&mut self) -> Result<RequestId, UserError> {
        let ticket = self.session.submit()?;
        let token = CancellationToken::new();
        self.request_cancel = Some(token.clone());
        let classifier = Arc::clone(&self.classifier);
        let tx = self.events_tx.clone();
        let AnalysisTicket { id, file } = ticket;
        // a panicking classifier still has to land the session in a terminal state
        let request = tokio::spawn(async move { classifier.classify(&file).await });
        let abort = request.abort_handle();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    abort.abort();
                    log::debug!("analysis {} cancelled before completion", id);
                }
                joined = request => {
                    let outcome = joined.unwrap_or_else(|err| {
                        log::error!("analysis {} task failed: {}", id, err);
                        Err(ClassifierError::Transport(format!("classifier task failed: {}", err)))
                    });
                    // receiver only goes away with the controller
                    let _ = tx.send(MonitorEvent::AnalysisFinished { id, outcome });
                }
            }
        });
        Ok(id)
    }

    pub fn clear(&mut self) {
        if let Some(token) = self.request_cancel.take() {
            token.cancel();
        }
        self.session.clear();
    }

    /// Applies every event queued so far. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the in-flight analysis to land, applying ticks that arrive meanwhile.
    /// Returns `None` straight away when nothing is in flight.
    pub async fn wait_for_analysis(&mut self) -> Option<Resolution> {
        while self.session.in_flight().is_some() {
            let event = self.events_rx.recv().await?;
            if let Some(resolution) = self.apply(event) {
                return Some(resolution);
            }
        }
        None
    }

    fn apply(&mut self, event: MonitorEvent) -> Option<Resolution> {
        match event {
            MonitorEvent::Tick => {
                self.stream.tick();
                None
            }
            MonitorEvent::AnalysisFinished { id, outcome } => {
                let resolution = self.session.resolve(id, outcome);
                if resolution == Resolution::Applied {
                    self.request_cancel = None;
                }
                Some(resolution)
            }
        }
    }

    pub fn view(&self) -> ViewModel {
        present(&self.session)
    }

    pub fn stream(&self) -> &SignalStreamBuffer {
        &self.stream
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    /// Stops the timer and abandons any request. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.stream.stop();
        if let Some(token) = self.request_cancel.take() {
            token.cancel();
        }
    }
}

impl Drop for MonitorController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
