use thiserror::Error;

/// Returned by every call-through helper when the breaker refuses the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("circuit breaker is open")]
pub struct BreakerOpen;

#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error(transparent)]
    Open(#[from] BreakerOpen),

    #[error("guarded operation failed: {0}")]
    Operation(E),
}

impl<E> CallError<E> {
    pub fn is_open(&self) -> bool {
        matches!(self, CallError::Open(_))
    }

    /// The guarded operation's own error, if it was attempted and failed.
    pub fn into_operation(self) -> Option<E> {
        match self {
            CallError::Operation(e) => Some(e),
            CallError::Open(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("failure rate threshold must be within [0, 1], got {0}")]
    InvalidFailureRate(f64),
}
