//! Mechanism error types.

use thiserror::Error;

use crate::auth::CallbackError;

#[derive(Debug, Error)]
pub enum MechanismError {
    /// This provider cannot produce a client for the mechanism (missing credentials,
    /// policy refusal, unsupported options). Negotiation moves on to the next candidate.
    #[error("mechanism unavailable: {0}")]
    Unavailable(String),

    /// The challenge/response exchange failed.
    #[error("authentication exchange failed: {0}")]
    Exchange(String),

    /// Unexpected provider fault. Negotiation aborts and reports it.
    #[error("internal mechanism fault: {0}")]
    Internal(String),
}

impl MechanismError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn exchange(message: impl Into<String>) -> Self {
        Self::Exchange(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether negotiation may continue with the next candidate.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MechanismError::Unavailable(_))
    }
}

impl From<CallbackError> for MechanismError {
    fn from(err: CallbackError) -> Self {
        MechanismError::Unavailable(err.to_string())
    }
}
