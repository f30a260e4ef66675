//! Errors produced while configuring a status repeater.
use http::StatusCode;
use thiserror::Error;

/// Configuration rejected by [`StatusRepeaterBuilder::build`](crate::StatusRepeaterBuilder::build).
///
/// The running middleware has no error of its own; requests fail only with the inner
/// service's error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The suppression window must be non-zero.
    #[error("window must be > 0")]
    ZeroWindow,
    /// The trigger must be usable as a final response status.
    #[error("trigger status must not be informational (got {0})")]
    InformationalTrigger(StatusCode),
}
