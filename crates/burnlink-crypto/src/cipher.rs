//! Message sealing using `ChaCha20-Poly1305`
//!
//! All functions are pure - the nonce must be provided by the caller.
//!
//! Blob layout (hex-encoded as one opaque string in links):
//!
//! ```text
//! ┌──────────────┬──────────────────────┬────────────────┐
//! │ nonce (12 B) │ ciphertext (N bytes) │ Poly1305 (16 B)│
//! └──────────────┴──────────────────────┴────────────────┘
//! ```

use chacha20poly1305::{
    ChaCha20Poly1305, Nonce,
    aead::{Aead, KeyInit, Payload},
};
use zeroize::Zeroizing;

use crate::{error::CryptoError, hex_input, keys::SecretKey};

/// Nonce size (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size (128 bits)
pub const TAG_SIZE: usize = 16;

/// Seal `plaintext` under `key`, returning `nonce ‖ ciphertext ‖ tag`.
///
/// `aad` is authenticated but not encrypted; opening with different
/// associated data fails.
///
/// # Security
///
/// - Caller MUST provide a fresh random nonce for every call under the same
///   key; reuse breaks both confidentiality and authenticity
pub fn seal(plaintext: &[u8], key: &SecretKey, nonce: [u8; NONCE_SIZE], aad: &[u8]) -> Vec<u8> {
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
    else {
        unreachable!("ChaCha20-Poly1305 encryption cannot fail below the 256 GiB message limit");
    };

    let mut blob = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    blob
}

/// Open a `nonce ‖ ciphertext ‖ tag` blob.
///
/// # Errors
///
/// - `AuthenticationFailure`: truncated blob, wrong key, tampered bytes, or
///   mismatched associated data. These cases are deliberately
///   indistinguishable.
pub fn open(blob: &[u8], key: &SecretKey, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    // Shorter than a nonce: reject before touching the cipher
    if blob.len() < NONCE_SIZE {
        return Err(CryptoError::AuthenticationFailure);
    }

    let (nonce, sealed) = blob.split_at(NONCE_SIZE);
    let cipher = ChaCha20Poly1305::new(key.as_bytes().into());

    cipher
        .decrypt(Nonce::from_slice(nonce), Payload { msg: sealed, aad })
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::AuthenticationFailure)
}

/// [`seal`], hex-encoded.
pub fn seal_hex(plaintext: &[u8], key: &SecretKey, nonce: [u8; NONCE_SIZE], aad: &[u8]) -> String {
    hex::encode(seal(plaintext, key, nonce, aad))
}

/// [`open`] for a hex-encoded blob.
///
/// # Errors
///
/// - `InvalidEncoding`: blob is not even-length hex (checked before the
///   cipher runs)
/// - `AuthenticationFailure`: as for [`open`]
pub fn open_hex(
    blob_hex: &str,
    key: &SecretKey,
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let blob = hex_input::decode("ciphertext", blob_hex)?;
    open(&blob, key, aad)
}
