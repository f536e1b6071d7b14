//! Errors returned by the manager.

use crate::core::State;
use thiserror::Error;

/// Errors that can be returned to a caller of the manager.
///
/// `InvalidTransition` and `ShuttingDown` are the steady-state outcomes of
/// a submission. The remaining variants report misuse of the lifecycle or a
/// rejected configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("invalid transition: state={state}, event={event}")]
    InvalidTransition { state: State, event: String },

    #[error("state manager is shutting down")]
    ShuttingDown,

    #[error("state manager has not been started. Call .start() before submitting events")]
    NotStarted,

    #[error("state manager was already started")]
    AlreadyStarted,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FsmError {
    /// Check if this error reports a programmer error rather than a normal
    /// runtime outcome.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::NotStarted | Self::AlreadyStarted)
    }
}
