//! The plaintext message envelope and its byte form.
//!
//! The envelope only ever exists in memory between encoding and sealing, or
//! between opening and revealing. It is never written to any store.
//!
//! Encoded as CBOR with camelCase keys:
//!
//! ```text
//! { "text": tstr, "createdAt": tstr (RFC 3339), "ttl": uint, "maxViews": uint }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Errors from encoding or decoding a payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// CBOR encoding failed
    #[error("payload encoding failed: {0}")]
    Encode(String),

    /// Bytes are not a CBOR payload
    #[error("payload decoding failed: {0}")]
    Decode(String),

    /// A field decoded but is out of range
    #[error("invalid payload field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: &'static str,
    },
}

/// Sender-authored message plus its consumption policy.
///
/// The text is zeroized on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    /// Sanitized message text.
    pub text: String,
    /// When the message was sealed.
    pub created_at: DateTime<Utc>,
    /// Seconds the message stays readable; 0 disables expiry.
    pub ttl: u64,
    /// Views allowed before the message counts as consumed.
    pub max_views: u32,
}

impl MessagePayload {
    /// Create a payload.
    pub fn new(text: String, created_at: DateTime<Utc>, ttl: u64, max_views: u32) -> Self {
        Self { text, created_at, ttl, max_views }
    }

    /// Serialize to CBOR bytes in a buffer that is wiped on drop.
    pub fn encode(&self) -> Result<Zeroizing<Vec<u8>>, PayloadError> {
        // Pre-size so the buffer never reallocates and leaves stale copies
        let mut bytes = Zeroizing::new(Vec::with_capacity(self.text.len() + 96));
        ciborium::into_writer(self, &mut *bytes)
            .map_err(|e| PayloadError::Encode(e.to_string()))?;
        Ok(bytes)
    }

    /// Deserialize from CBOR bytes.
    ///
    /// # Errors
    ///
    /// - `Decode`: not a CBOR map with the expected fields
    /// - `InvalidField`: `maxViews` is zero
    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let payload: Self =
            ciborium::from_reader(bytes).map_err(|e| PayloadError::Decode(e.to_string()))?;

        if payload.max_views == 0 {
            return Err(PayloadError::InvalidField {
                field: "maxViews",
                reason: "must be at least 1",
            });
        }

        Ok(payload)
    }

    /// Move the text out, leaving an empty string behind.
    pub fn take_text(&mut self) -> Zeroizing<String> {
        Zeroizing::new(std::mem::take(&mut self.text))
    }
}

impl Drop for MessagePayload {
    fn drop(&mut self) {
        self.text.zeroize();
    }
}

impl std::fmt::Debug for MessagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePayload")
            .field("text_len", &self.text.len())
            .field("created_at", &self.created_at)
            .field("ttl", &self.ttl)
            .field("max_views", &self.max_views)
            .finish()
    }
}
