use thiserror::Error;
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("signal window capacity must be greater than zero")]
    ZeroCapacity,
    #[error("tick interval must be at least one millisecond")]
    ZeroInterval,
}
