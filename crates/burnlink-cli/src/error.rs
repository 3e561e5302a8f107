//! CLI error type.

use burnlink_core::{BurnError, StoreError};
use thiserror::Error;

/// Errors that end a CLI command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Protocol failure (validation, entropy, link)
    #[error(transparent)]
    Burn(#[from] BurnError),

    /// State database failure
    #[error("state store: {0}")]
    Store(#[from] StoreError),

    /// Terminal or filesystem I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(String),
}

impl CliError {
    /// Text for the terminal.
    ///
    /// Protocol errors use their end-user wording, so a recipient never
    /// learns which check failed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Burn(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for CliError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use burnlink_core::{ValidationError, error::GENERIC_FAILURE_MESSAGE};

    use super::*;

    #[test]
    fn protocol_errors_use_user_wording() {
        let err = CliError::from(BurnError::AuthenticationFailure);
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = CliError::from(BurnError::Validation(ValidationError::EmptyMessage));
        assert_eq!(err.user_message(), "message cannot be empty");
    }

    #[test]
    fn store_errors_are_descriptive() {
        let err = CliError::from(StoreError::Io("disk full".into()));
        assert!(err.user_message().contains("disk full"));
    }
}
