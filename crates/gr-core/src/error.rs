//! Application error taxonomy.
//!
//! Every failure crossing the adapter boundary is translated into one of
//! these variants, so store logic can match exhaustively instead of
//! inspecting error shapes at runtime.

use thiserror::Error;

/// Closed set of application-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// A payload or response failed schema validation. Never retried.
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    /// Transport-level or backend failure. Retryable.
    #[error("network error: {0}")]
    Network(String),

    /// The requested row does not exist. Call sites that expect optional
    /// rows translate this to a valid empty result.
    #[error("not found")]
    NotFound,

    /// Anything that does not fit the other variants.
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn validation_message(message: impl Into<String>) -> Self {
        AppError::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Whether a bounded retry is worth attempting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Unknown(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
