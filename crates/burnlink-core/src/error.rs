//! Error taxonomy for the burnlink protocol.
//!
//! A closed set of kinds so callers branch on [`ErrorKind`] instead of
//! matching message text. `Expired` and `Destroyed` are not errors; they are
//! terminal [`crate::ReadStatus`] values.

use burnlink_crypto::CryptoError;
use thiserror::Error;

use crate::{link::LinkError, payload::PayloadError, policy::ValidationError, store::StoreError};

/// Generic text shown to a recipient for any link or crypto failure.
///
/// Deliberately identical for a wrong key, a corrupted blob and a mangled
/// link.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "This message could not be opened. Check that the link is complete and correct.";

/// Errors surfaced by burnlink operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BurnError {
    /// Platform lacks a secure random source
    #[error("secure random source unavailable")]
    CryptoUnavailable,

    /// Malformed hex, wrong length, or an undecodable payload
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Authentication tag did not verify
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Link fragment missing or malformed parameters
    #[error("invalid link: {0}")]
    InvalidLink(#[from] LinkError),

    /// Sender input out of policy (message, ttl, password)
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Consumption ledger storage failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Discriminant of [`BurnError`], for branching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`BurnError::CryptoUnavailable`]
    CryptoUnavailable,
    /// See [`BurnError::InvalidEncoding`]
    InvalidEncoding,
    /// See [`BurnError::AuthenticationFailure`]
    AuthenticationFailure,
    /// See [`BurnError::InvalidLink`]
    InvalidLink,
    /// See [`BurnError::Validation`]
    Validation,
    /// See [`BurnError::Storage`]
    Storage,
}

impl BurnError {
    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CryptoUnavailable => ErrorKind::CryptoUnavailable,
            Self::InvalidEncoding(_) => ErrorKind::InvalidEncoding,
            Self::AuthenticationFailure => ErrorKind::AuthenticationFailure,
            Self::InvalidLink(_) => ErrorKind::InvalidLink,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns true if the sender can fix this by editing input.
    ///
    /// Nothing is ever retried automatically; every other failure is
    /// terminal for the link.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Text safe to show an end user.
    ///
    /// Validation errors are specific (the sender needs to know what to
    /// fix). Everything a recipient can hit collapses to
    /// [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::CryptoUnavailable => {
                "Secure random numbers are unavailable on this device.".to_string()
            },
            Self::InvalidEncoding(_)
            | Self::AuthenticationFailure
            | Self::InvalidLink(_)
            | Self::Storage(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<CryptoError> for BurnError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::CryptoUnavailable => Self::CryptoUnavailable,
            CryptoError::InvalidEncoding { .. } => Self::InvalidEncoding(err.to_string()),
            CryptoError::AuthenticationFailure => Self::AuthenticationFailure,
        }
    }
}

impl From<PayloadError> for BurnError {
    fn from(err: PayloadError) -> Self {
        Self::InvalidEncoding(err.to_string())
    }
}
