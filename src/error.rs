//! Error types surfaced by the site.
//!
//! The first three variants are the user-facing taxonomy: every one of them
//! is shown at the point of the failed action and none is retried
//! automatically. The rest are infrastructure failures.

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Error, Debug)]
pub enum Error {
    /// A backend fetch failed. Pages show the message with a retry link.
    #[error("data unavailable: {message}")]
    DataUnavailable { message: String },

    /// A form field constraint was not met. Nothing was submitted.
    #[error("{message}")]
    ValidationFailure {
        field: &'static str,
        message: String,
    },

    /// Bad credentials or a signup conflict.
    #[error("{message}")]
    AuthFailure { message: String },

    #[error("session token error: {0}")]
    Session(#[from] jsonwebtoken::errors::Error),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    #[must_use]
    pub fn data_unavailable(message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::AuthFailure {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps a failed backend read as `DataUnavailable`.
    #[must_use]
    pub fn from_fetch(err: BackendError) -> Self {
        Self::data_unavailable(err.user_message())
    }

    /// Wraps a rejected auth call as `AuthFailure`, keeping the backend's
    /// message when it sent one.
    #[must_use]
    pub fn from_auth(err: BackendError, fallback: &str) -> Self {
        match err {
            BackendError::Status { message, .. } if !message.is_empty() => {
                Self::auth_failure(message)
            }
            BackendError::ConfirmationPending => {
                Self::auth_failure(BackendError::ConfirmationPending.user_message())
            }
            other => {
                tracing::warn!("auth call failed without a message: {}", other);
                Self::auth_failure(fallback)
            }
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailure { .. })
    }
}
