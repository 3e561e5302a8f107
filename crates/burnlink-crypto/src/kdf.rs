//! Password-derived keys using PBKDF2-HMAC-SHA256

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::keys::{KEY_SIZE, Salt, SecretKey};

/// PBKDF2 iteration count.
///
/// Fixed by the link format: links carry only the salt, so sender and
/// recipient must agree on the work factor out of band.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Derive a 256-bit key from a password and a per-message salt.
///
/// # Security
///
/// - Deterministic: same (password, salt) always produce the same key
/// - Different salts produce unrelated keys for the same password
/// - Weak passwords stay weak; the work factor only slows guessing
pub fn derive_key(password: &str, salt: &Salt) -> SecretKey {
    derive_key_with_rounds(password, salt, PBKDF2_ROUNDS)
}

pub(crate) fn derive_key_with_rounds(password: &str, salt: &Salt, rounds: u32) -> SecretKey {
    let mut out = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), rounds, &mut out);

    let key = SecretKey::from_bytes(out);
    out.zeroize();
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SALT_SIZE;

    #[test]
    fn derive_is_deterministic() {
        let salt = Salt::from_bytes([7; SALT_SIZE]);

        let a = derive_key("correct horse battery", &salt);
        let b = derive_key("correct horse battery", &salt);

        assert_eq!(a, b, "same inputs must produce same key");
    }

    #[test]
    fn different_salts_produce_different_keys() {
        let a = derive_key("correct horse battery", &Salt::from_bytes([1; SALT_SIZE]));
        let b = derive_key("correct horse battery", &Salt::from_bytes([2; SALT_SIZE]));

        assert_ne!(a, b);
    }

    #[test]
    fn different_passwords_produce_different_keys() {
        let salt = Salt::from_bytes([3; SALT_SIZE]);

        let a = derive_key("password-one", &salt);
        let b = derive_key("password-two", &salt);

        assert_ne!(a, b);
    }

    #[test]
    fn matches_rfc7914_pbkdf2_sha256_vector() {
        // RFC 7914 section 11: P="passwd", S="salt", c=1, dkLen=64 (first 32 bytes)
        let mut salt_bytes = [0u8; SALT_SIZE];
        salt_bytes[..4].copy_from_slice(b"salt");
        let mut out = [0u8; 64];
        pbkdf2_hmac::<Sha256>(b"passwd", b"salt", 1, &mut out);

        assert_eq!(
            hex::encode(&out[..32]),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );

        // The padded salt is a different input and must not collide
        let padded = derive_key_with_rounds("passwd", &Salt::from_bytes(salt_bytes), 1);
        assert_ne!(hex::encode(padded.as_bytes()), hex::encode(&out[..32]));
    }

    #[test]
    fn empty_password_still_derives() {
        let key = derive_key_with_rounds("", &Salt::from_bytes([0; SALT_SIZE]), 1);
        assert_eq!(key.as_bytes().len(), KEY_SIZE);
    }
}
