use thiserror::Error;

/// Operator mistakes. Recoverable, and they never change session state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UserError {
    #[error("please select a recording before analyzing")]
    NoFileSelected,
    #[error("an analysis is already in progress")]
    RequestInFlight,
}

/// Anything that went wrong between issuing the request and holding a usable result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("classifier unreachable: {0}")]
    Unreachable(String),
    #[error("classifier did not answer within {0} seconds")]
    Timeout(u64),
    #[error("classifier returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed classifier response: {0}")]
    MalformedBody(String),
    #[error("confidence {0} is outside [0, 1]")]
    InvalidConfidence(f64),
    #[error("transport error: {0}")]
    Transport(String),
}
