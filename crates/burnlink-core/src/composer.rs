//! Sender side: text in, one-time link out.

use burnlink_crypto::{KEY_SIZE, NONCE_SIZE, SALT_SIZE, Salt, SecretKey, derive_key, seal_hex};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    env::Environment,
    error::BurnError,
    link::{LinkMode, LinkParams, SecretLink},
    payload::MessagePayload,
    policy::{Policy, sanitize},
};

/// Where the message key comes from.
#[derive(Clone, Copy)]
pub enum KeySource<'a> {
    /// Fresh random key, embedded in the link
    Direct,
    /// Key stretched from this password; only the salt goes in the link
    Password(&'a str),
}

impl KeySource<'_> {
    fn mode(&self) -> LinkMode {
        match self {
            Self::Direct => LinkMode::Direct,
            Self::Password(_) => LinkMode::Password,
        }
    }
}

impl std::fmt::Debug for KeySource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct => f.write_str("Direct"),
            Self::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

/// Builds secret links.
///
/// Input is sanitized and validated against the [`Policy`] before any random
/// bytes are drawn. Password mode runs the full KDF on the calling thread;
/// async callers should move the call onto a blocking pool.
#[derive(Debug, Clone)]
pub struct Composer<E> {
    env: E,
    policy: Policy,
    base_url: String,
}

impl<E: Environment> Composer<E> {
    /// Composer producing links under `base_url`, with the default policy.
    pub fn new(env: E, base_url: impl Into<String>) -> Self {
        Self { env, policy: Policy::default(), base_url: base_url.into() }
    }

    /// Replace the input policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Active input policy.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Seal `text` into a one-time link.
    ///
    /// `ttl_secs == 0` disables expiry.
    ///
    /// # Errors
    ///
    /// - `Validation`: empty or oversized text, TTL out of range, short
    ///   password. Nothing random has been consumed.
    /// - `CryptoUnavailable`: the environment has no entropy source
    pub fn create_link(
        &self,
        text: &str,
        ttl_secs: u64,
        source: KeySource<'_>,
    ) -> Result<SecretLink, BurnError> {
        let mut text = Zeroizing::new(sanitize(text));
        self.policy.validate_message(&text)?;
        self.policy.validate_ttl(ttl_secs)?;
        if let KeySource::Password(password) = source {
            self.policy.validate_password(password)?;
        }

        let mode = source.mode();
        let (key, salt) = self.key_material(source).inspect_err(|_| {
            tracing::error!("secure random source unavailable");
        })?;
        let nonce = self.env.random_array::<NONCE_SIZE>()?;

        let payload = MessagePayload::new(
            std::mem::take(&mut *text),
            self.env.now(),
            ttl_secs,
            self.policy.max_views,
        );
        let plaintext = payload.encode()?;
        drop(payload);

        let ciphertext = seal_hex(&plaintext, &key, nonce, mode.aad());

        let params = match salt {
            None => LinkParams::Direct { ciphertext, key: key.to_hex() },
            Some(salt) => LinkParams::Password { ciphertext, salt: salt.to_hex() },
        };

        tracing::debug!(message_id = %params.message_id(), ?mode, ttl_secs, "link created");
        Ok(SecretLink::build(&self.base_url, &params))
    }

    fn key_material(&self, source: KeySource<'_>) -> Result<(SecretKey, Option<Salt>), BurnError> {
        match source {
            KeySource::Direct => {
                let mut bytes = self.env.random_array::<KEY_SIZE>()?;
                let key = SecretKey::from_bytes(bytes);
                bytes.zeroize();
                Ok((key, None))
            },
            KeySource::Password(password) => {
                let salt = Salt::from_bytes(self.env.random_array::<SALT_SIZE>()?);
                Ok((derive_key(password, &salt), Some(salt)))
            },
        }
    }
}
