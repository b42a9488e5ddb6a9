use crate::analysis::{Classifier, ClassifierError, UserError};
use crate::types::{DiagnosisResult, RecordingFile, RequestId, RequestStatus};

/// What a session does when the classifier cannot produce a result.
#[derive(Clone, Debug, PartialEq)]
pub enum FailurePolicy {
    /// Surface the failure; no diagnosis is shown.
    Fail,
    /// Show the given diagnosis as if the classifier had returned it.
    Fallback(DiagnosisResult),
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Fallback(DiagnosisResult::fallback())
    }
}

/// The single request a successful `submit()` asks the caller to issue.
#[derive(Clone, Debug)]
pub struct AnalysisTicket {
    pub id: RequestId,
    pub file: RecordingFile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The completion belonged to a cleared or superseded submission.
    Stale,
}

/// Upload-and-classify lifecycle: Idle -> Pending -> Succeeded | Failed.
///
/// The session never talks to the network itself. `submit()` hands out a ticket,
/// whoever owns the session issues the request, and the outcome comes back through
/// `resolve()`. Outcomes whose id no longer matches the in-flight request are dropped,
/// so a late response can't bring back a cleared session.
#[derive(Debug)]
pub struct AnalysisSession {
    policy: FailurePolicy,
    status: RequestStatus,
    attached: Option<RecordingFile>,
    in_flight: Option<RequestId>,
    result: Option<DiagnosisResult>,
    last_failure: Option<String>,
    next_id: u64,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}

impl AnalysisSession {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            status: RequestStatus::Idle,
            attached: None,
            in_flight: None,
            result: None,
            last_failure: None,
            next_id: 1,
        }
    }

    /// Replaces the candidate recording. Status is untouched.
    pub fn attach_file(&mut self, file: RecordingFile) {
        log::debug!("attached {:?}", file);
        self.attached = Some(file);
    }

    pub fn submit(&mut self) -> Result<AnalysisTicket, UserError> {
        if self.status == RequestStatus::Pending {
            return Err(UserError::RequestInFlight);
        }
        let Some(file) = self.attached.clone() else {
            return Err(UserError::NoFileSelected);
        };
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.status = RequestStatus::Pending;
        self.in_flight = Some(id);
        self.result = None;
        self.last_failure = None;
        log::info!("analysis {} submitted for {}", id, file.name);
        Ok(AnalysisTicket { id, file })
    }

    pub fn resolve(
        &mut self,
        id: RequestId,
        outcome: Result<DiagnosisResult, ClassifierError>,
    ) -> Resolution {
        if self.status != RequestStatus::Pending || self.in_flight != Some(id) {
            log::debug!("dropping stale outcome for analysis {}", id);
            return Resolution::Stale;
        }
        self.in_flight = None;
        match outcome {
            Ok(result) => {
                log::info!("analysis {} succeeded: {}", id, result.diagnosis);
                self.status = RequestStatus::Succeeded;
                self.result = Some(result);
            }
            Err(err) => {
                self.status = RequestStatus::Failed;
                match &self.policy {
                    FailurePolicy::Fallback(fallback) => {
                        log::warn!(
                            "analysis {} failed ({}); substituting fallback diagnosis",
                            id,
                            err
                        );
                        self.result = Some(fallback.clone());
                    }
                    FailurePolicy::Fail => {
                        log::warn!("analysis {} failed: {}", id, err);
                        self.last_failure = Some(err.to_string());
                    }
                }
            }
        }
        Resolution::Applied
    }

    /// Back to Idle from any state. Returns the request that was abandoned, if any.
    pub fn clear(&mut self) -> Option<RequestId> {
        let abandoned = self.in_flight.take();
        if let Some(id) = abandoned {
            log::debug!("analysis {} abandoned by clear", id);
        }
        self.status = RequestStatus::Idle;
        self.attached = None;
        self.result = None;
        self.last_failure = None;
        abandoned
    }

    /// Submits and waits for the classifier in one go.
    pub async fn run(&mut self, classifier: &dyn Classifier) -> Result<RequestStatus, UserError> {
        let ticket = self.submit()?;
        let outcome = classifier.classify(&ticket.file).await;
        self.resolve(ticket.id, outcome);
        Ok(self.status)
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn result(&self) -> Option<&DiagnosisResult> {
        self.result.as_ref()
    }

    pub fn attached_file(&self) -> Option<&RecordingFile> {
        self.attached.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn policy(&self) -> &FailurePolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::present;
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn recording() -> RecordingFile {
        RecordingFile::new("00001_hr.dat", vec![0, 1, 2, 3])
    }

    fn normal() -> DiagnosisResult {
        DiagnosisResult {
            diagnosis: "Normal Sinus Rhythm".to_owned(),
            confidence: 0.88,
            alert: false,
            derived_metrics: Default::default(),
        }
    }

    fn unreachable() -> ClassifierError {
        ClassifierError::Unreachable("connection refused".to_owned())
    }

    #[test]
    fn submit_without_file_stays_idle() {
        let mut session = AnalysisSession::default();
        assert_eq!(session.submit().unwrap_err(), UserError::NoFileSelected);
        assert_eq!(session.status(), RequestStatus::Idle);
        assert_eq!(session.in_flight(), None);
    }

    #[test]
    fn attach_does_not_change_status() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        session.attach_file(RecordingFile::new("other.csv", vec![9]));
        assert_eq!(session.status(), RequestStatus::Idle);
        assert_eq!(session.attached_file().unwrap().name, "other.csv");
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        let first = session.submit().unwrap();
        assert_eq!(session.submit().unwrap_err(), UserError::RequestInFlight);
        assert_eq!(session.in_flight(), Some(first.id));
    }

    #[test]
    fn success_moves_to_succeeded() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        let ticket = session.submit().unwrap();
        assert_eq!(session.resolve(ticket.id, Ok(normal())), Resolution::Applied);
        assert_eq!(session.status(), RequestStatus::Succeeded);
        assert_eq!(session.result(), Some(&normal()));
    }

    #[test]
    fn failure_with_fallback_policy_yields_fixed_result() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        let ticket = session.submit().unwrap();
        session.resolve(ticket.id, Err(unreachable()));
        assert_eq!(session.status(), RequestStatus::Failed);
        assert_eq!(session.result(), Some(&DiagnosisResult::fallback()));
        assert_eq!(session.last_failure(), None);
    }

    #[test]
    fn failure_with_fail_policy_keeps_reason() {
        let mut session = AnalysisSession::new(FailurePolicy::Fail);
        session.attach_file(recording());
        let ticket = session.submit().unwrap();
        session.resolve(ticket.id, Err(ClassifierError::Timeout(30)));
        assert_eq!(session.status(), RequestStatus::Failed);
        assert_eq!(session.result(), None);
        assert!(session.last_failure().unwrap().contains("30 seconds"));
    }

    #[test]
    fn clear_mid_flight_ignores_late_response() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        let ticket = session.submit().unwrap();
        assert_eq!(session.clear(), Some(ticket.id));
        assert_eq!(session.resolve(ticket.id, Ok(normal())), Resolution::Stale);
        assert_eq!(session.status(), RequestStatus::Idle);
        assert_eq!(session.result(), None);
    }

    #[test]
    fn superseded_response_is_stale() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        let old = session.submit().unwrap();
        session.clear();
        session.attach_file(recording());
        let new = session.submit().unwrap();
        assert_ne!(old.id, new.id);
        assert_eq!(session.resolve(old.id, Ok(normal())), Resolution::Stale);
        assert_eq!(session.status(), RequestStatus::Pending);
        assert_eq!(session.resolve(new.id, Ok(normal())), Resolution::Applied);
    }

    #[test]
    fn resubmit_from_terminal_state_drops_old_result() {
        let mut session = AnalysisSession::default();
        session.attach_file(recording());
        let ticket = session.submit().unwrap();
        session.resolve(ticket.id, Ok(normal()));
        let again = session.submit().unwrap();
        assert_eq!(session.status(), RequestStatus::Pending);
        assert_eq!(session.result(), None);
        assert_eq!(again.file, recording());
    }

    #[test]
    fn clear_from_every_state_returns_to_idle() {
        let mut idle = AnalysisSession::default();

        let mut pending = AnalysisSession::default();
        pending.attach_file(recording());
        pending.submit().unwrap();
        assert_eq!(pending.status(), RequestStatus::Pending);

        let mut succeeded = AnalysisSession::default();
        succeeded.attach_file(recording());
        let t = succeeded.submit().unwrap();
        succeeded.resolve(t.id, Ok(normal()));
        assert_eq!(succeeded.status(), RequestStatus::Succeeded);

        let mut failed = AnalysisSession::default();
        failed.attach_file(recording());
        let t = failed.submit().unwrap();
        failed.resolve(t.id, Err(unreachable()));
        assert_eq!(failed.status(), RequestStatus::Failed);

        for session in [&mut idle, &mut pending, &mut succeeded, &mut failed] {
            session.clear();
            assert_eq!(session.status(), RequestStatus::Idle);
            assert_eq!(session.result(), None);
            assert_eq!(session.in_flight(), None);
            assert_eq!(session.attached_file(), None);
            assert!(present(session).is_empty());
        }
    }

    /// Answers every request with a fixed outcome and records what it was sent.
    struct Fixed {
        outcome: Result<DiagnosisResult, ClassifierError>,
        seen: Mutex<Vec<String>>,
    }

    impl Fixed {
        fn new(outcome: Result<DiagnosisResult, ClassifierError>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Classifier for Fixed {
        async fn classify(&self, file: &RecordingFile) -> Result<DiagnosisResult, ClassifierError> {
            self.seen.lock().unwrap().push(file.name.clone());
            self.outcome.clone()
        }
    }

    #[tokio::test]
    async fn run_applies_classifier_success() {
        let classifier = Fixed::new(Ok(normal()));
        let mut session = AnalysisSession::default();
        session.attach_file(recording());

        assert_eq!(session.run(&classifier).await, Ok(RequestStatus::Succeeded));
        assert_eq!(session.result(), Some(&normal()));
        assert_eq!(session.in_flight(), None);
        assert_eq!(*classifier.seen.lock().unwrap(), vec!["00001_hr.dat".to_owned()]);
    }

    #[tokio::test]
    async fn run_falls_back_when_classifier_fails() {
        let classifier = Fixed::new(Err(unreachable()));
        let mut session = AnalysisSession::default();
        session.attach_file(recording());

        assert_eq!(session.run(&classifier).await, Ok(RequestStatus::Failed));
        assert_eq!(session.result(), Some(&DiagnosisResult::fallback()));
        assert_eq!(session.in_flight(), None);
    }

    #[tokio::test]
    async fn run_without_file_never_calls_classifier() {
        let classifier = Fixed::new(Ok(normal()));
        let mut session = AnalysisSession::default();

        assert_eq!(session.run(&classifier).await, Err(UserError::NoFileSelected));
        assert_eq!(session.status(), RequestStatus::Idle);
        assert!(classifier.seen.lock().unwrap().is_empty());
    }
}
