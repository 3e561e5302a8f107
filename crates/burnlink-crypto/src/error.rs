//! Error types for cryptographic operations

use thiserror::Error;

/// Errors from key handling, sealing and opening.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The platform's secure random source could not produce bytes
    #[error("secure random source unavailable")]
    CryptoUnavailable,

    /// Input was not well-formed hex, or had the wrong length
    #[error("invalid encoding for {field}: {reason}")]
    InvalidEncoding {
        /// Which input was rejected (e.g. "key", "ciphertext")
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Authentication tag did not verify (wrong key, tampered or truncated
    /// blob, or mismatched mode tag)
    #[error("authentication failed")]
    AuthenticationFailure,
}

impl CryptoError {
    /// Returns true if this error is fatal (unrecoverable).
    ///
    /// Every cryptographic failure is terminal for the link it came from.
    /// The only recovery is a freshly created message.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::CryptoUnavailable | Self::InvalidEncoding { .. } | Self::AuthenticationFailure => {
                true
            },
        }
    }

    pub(crate) fn encoding(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding { field, reason: reason.into() }
    }
}
