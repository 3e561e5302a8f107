//! burnlink Cryptographic Primitives
//!
//! Cryptographic building blocks for burnlink one-time messages. Pure
//! functions with deterministic outputs. Callers provide random bytes (keys,
//! salts, nonces) so tests stay reproducible.
//!
//! # Key Sources
//!
//! A message is sealed under exactly one 256-bit key. The key either travels
//! inside the link itself, or is stretched from a password the recipient
//! learns out of band.
//!
//! ```text
//!  random 32 bytes ─────────────┐
//!                               ├──► SecretKey ──► ChaCha20-Poly1305 ──► nonce ‖ ciphertext ‖ tag
//!  password + 16-byte salt ─────┘        ▲                 ▲
//!        (PBKDF2-HMAC-SHA256)            │                 │
//!                                   link `key=`      mode tag as AAD
//! ```
//!
//! # Security
//!
//! Confidentiality and integrity:
//! - ChaCha20-Poly1305 with a fresh 96-bit nonce per seal
//! - The link mode tag is bound as associated data, so a blob cannot be
//!   replayed under the other key source
//! - Any flipped bit in nonce, ciphertext or tag fails authentication
//!
//! Key hygiene (best effort):
//! - [`SecretKey`] zeroizes on drop
//! - Decrypted plaintext is returned in a [`zeroize::Zeroizing`] buffer
//! - Password-derived intermediate buffers are wiped after use

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cipher;
pub mod error;
pub mod hex_input;
pub mod kdf;
pub mod keys;

pub use cipher::{NONCE_SIZE, TAG_SIZE, open, open_hex, seal, seal_hex};
pub use error::CryptoError;
pub use kdf::{PBKDF2_ROUNDS, derive_key};
pub use keys::{KEY_SIZE, SALT_SIZE, Salt, SecretKey};
