//! Key and salt material.
//!
//! Both types are plain byte wrappers. Random generation lives with the
//! caller's environment; this module only converts and wipes.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use crate::{error::CryptoError, hex_input};

/// Symmetric key size (256 bits)
pub const KEY_SIZE: usize = 32;

/// Password salt size (128 bits, 32 hex characters in a link)
pub const SALT_SIZE: usize = 16;

/// A 256-bit symmetric key.
///
/// Zeroized when dropped. `Debug` never prints the key bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    bytes: [u8; KEY_SIZE],
}

impl SecretKey {
    /// Wrap raw key bytes.
    ///
    /// Production callers MUST fill `bytes` from a cryptographically secure
    /// source.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parse a 64-character hex key.
    ///
    /// # Errors
    ///
    /// - `InvalidEncoding`: wrong length or non-hex characters
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        hex_input::decode_array::<KEY_SIZE>("key", input).map(Self::from_bytes)
    }

    /// Lowercase hex form (64 characters), wiped on drop.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Random per-message salt for password-derived keys.
///
/// Not secret: it travels in the link next to the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Wrap raw salt bytes.
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Parse a 32-character hex salt.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        hex_input::decode_array::<SALT_SIZE>("salt", input).map(Self::from_bytes)
    }

    /// Lowercase hex form (32 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Raw salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }
}
