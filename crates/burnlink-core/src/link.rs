//! Secret link codec.
//!
//! A link is `<origin><path>#<fragment>` where the fragment carries
//! everything the recipient needs. Fragments are never sent to a server.
//!
//! ```text
//! direct key:   #msg=<hex blob>&key=<64 hex>
//! password:     #msg=<hex blob>&salt=<32 hex>&pwd=1
//! ```
//!
//! Parameters are validated here, before any decryption is attempted.
//! Unknown parameters are ignored; repeated ones are rejected.

use std::fmt;

use burnlink_crypto::{KEY_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE, hex_input};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Shortest possible blob: nonce and tag around an empty ciphertext.
const MIN_BLOB_HEX: usize = (NONCE_SIZE + TAG_SIZE) * 2;

/// Longest blob accepted from a link (64 KiB of bytes).
const MAX_BLOB_HEX: usize = 64 * 1024 * 2;

/// Associated data binding a blob to direct-key mode.
const DIRECT_MODE_TAG: &[u8] = b"burnlink:v1:key";

/// Associated data binding a blob to password mode.
const PASSWORD_MODE_TAG: &[u8] = b"burnlink:v1:pwd";

/// Errors from parsing a link fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// A required parameter is absent
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter appears more than once
    #[error("duplicate parameter: {0}")]
    DuplicateParameter(String),

    /// Both `key` and password parameters are present
    #[error("link carries both a key and password parameters")]
    ConflictingModes,

    /// A parameter is present but malformed
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What was wrong
        reason: String,
    },
}

/// How the recipient obtains the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Key is embedded in the link
    Direct,
    /// Key is derived from a password plus the embedded salt
    Password,
}

impl LinkMode {
    /// Associated data sealed alongside the payload for this mode.
    pub fn aad(self) -> &'static [u8] {
        match self {
            Self::Direct => DIRECT_MODE_TAG,
            Self::Password => PASSWORD_MODE_TAG,
        }
    }
}

/// Stable per-message identifier keying the consumption ledger.
///
/// First 16 bytes of SHA-256 over the lowercase ciphertext hex, as 32 hex
/// characters. Short enough for storage keys; no server assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    /// Derive the identifier from a ciphertext hex string.
    pub fn from_ciphertext(ciphertext_hex: &str) -> Self {
        let digest = Sha256::digest(ciphertext_hex.to_ascii_lowercase().as_bytes());
        Self(hex::encode(&digest[..16]))
    }

    /// Identifier as hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated fragment parameters.
///
/// Holds the key when present, so the strings are wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub enum LinkParams {
    /// `msg` + `key`
    Direct {
        /// Lowercase ciphertext hex
        ciphertext: String,
        /// Lowercase 64-character key hex
        key: Zeroizing<String>,
    },
    /// `msg` + `salt` + `pwd=1`
    Password {
        /// Lowercase ciphertext hex
        ciphertext: String,
        /// Lowercase 32-character salt hex
        salt: String,
    },
}

impl LinkParams {
    /// Parse a full link or a bare fragment (with or without `#`).
    ///
    /// # Errors
    ///
    /// Any missing, repeated, conflicting or malformed parameter. Nothing
    /// here touches a cipher.
    pub fn parse(input: &str) -> Result<Self, LinkError> {
        let fragment = input.split_once('#').map_or(input, |(_, fragment)| fragment);

        let mut msg = None;
        let mut key = None;
        let mut salt = None;
        let mut pwd = None;

        for pair in fragment.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match name {
                "msg" => &mut msg,
                "key" => &mut key,
                "salt" => &mut salt,
                "pwd" => &mut pwd,
                _ => {
                    tracing::trace!(parameter = name, "ignoring unknown link parameter");
                    continue;
                },
            };
            if slot.replace(value).is_some() {
                return Err(LinkError::DuplicateParameter(name.to_string()));
            }
        }

        let ciphertext = validate_blob(msg.ok_or(LinkError::MissingParameter("msg"))?)?;

        match (key, salt, pwd) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(LinkError::ConflictingModes),
            (Some(key), None, None) => {
                validate_fixed("key", key, KEY_SIZE)?;
                Ok(Self::Direct { ciphertext, key: Zeroizing::new(key.to_ascii_lowercase()) })
            },
            (None, salt, Some(pwd)) => {
                if pwd != "1" {
                    return Err(LinkError::InvalidParameter {
                        name: "pwd",
                        reason: format!("expected 1, got {pwd:?}"),
                    });
                }
                let salt = salt.ok_or(LinkError::MissingParameter("salt"))?;
                validate_fixed("salt", salt, SALT_SIZE)?;
                Ok(Self::Password { ciphertext, salt: salt.to_ascii_lowercase() })
            },
            (None, Some(_), None) => Err(LinkError::MissingParameter("pwd")),
            (None, None, None) => Err(LinkError::MissingParameter("key")),
        }
    }

    /// Key source of this link.
    pub fn mode(&self) -> LinkMode {
        match self {
            Self::Direct { .. } => LinkMode::Direct,
            Self::Password { .. } => LinkMode::Password,
        }
    }

    /// Ciphertext hex.
    pub fn ciphertext(&self) -> &str {
        match self {
            Self::Direct { ciphertext, .. } | Self::Password { ciphertext, .. } => ciphertext,
        }
    }

    /// Ledger identifier for this message.
    pub fn message_id(&self) -> MessageId {
        MessageId::from_ciphertext(self.ciphertext())
    }

    /// Render as a fragment (without `#`), parameters in canonical order.
    pub fn to_fragment(&self) -> Zeroizing<String> {
        Zeroizing::new(match self {
            Self::Direct { ciphertext, key } => format!("msg={ciphertext}&key={}", key.as_str()),
            Self::Password { ciphertext, salt } => format!("msg={ciphertext}&salt={salt}&pwd=1"),
        })
    }
}

impl fmt::Debug for LinkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkParams")
            .field("mode", &self.mode())
            .field("message_id", &self.message_id())
            .finish_non_exhaustive()
    }
}

fn validate_blob(value: &str) -> Result<String, LinkError> {
    hex_input::validate("msg", value).map_err(|e| LinkError::InvalidParameter {
        name: "msg",
        reason: e.to_string(),
    })?;
    if value.len() < MIN_BLOB_HEX {
        return Err(LinkError::InvalidParameter {
            name: "msg",
            reason: format!("blob too short: {} hex characters", value.len()),
        });
    }
    if value.len() > MAX_BLOB_HEX {
        return Err(LinkError::InvalidParameter {
            name: "msg",
            reason: format!("blob too long: {} hex characters", value.len()),
        });
    }
    Ok(value.to_ascii_lowercase())
}

fn validate_fixed(name: &'static str, value: &str, bytes: usize) -> Result<(), LinkError> {
    if value.len() != bytes * 2 {
        return Err(LinkError::InvalidParameter {
            name,
            reason: format!("expected {} hex characters, got {}", bytes * 2, value.len()),
        });
    }
    hex_input::validate(name, value)
        .map_err(|e| LinkError::InvalidParameter { name, reason: e.to_string() })
}

/// A complete shareable link.
///
/// Direct-mode links contain the key, so the text is wiped on drop and
/// `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretLink(String);

impl SecretLink {
    /// Build `<base>#<fragment>`. Any fragment already on `base` is replaced.
    pub fn build(base_url: &str, params: &LinkParams) -> Self {
        let base = base_url.split_once('#').map_or(base_url, |(base, _)| base);
        Self(format!("{base}#{}", params.to_fragment().as_str()))
    }

    /// Link text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the fragment back into parameters.
    pub fn params(&self) -> Result<LinkParams, LinkError> {
        LinkParams::parse(&self.0)
    }
}

impl Drop for SecretLink {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SecretLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretLink(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> String {
        "ab".repeat(NONCE_SIZE + TAG_SIZE + 4)
    }

    fn key() -> String {
        "0f".repeat(KEY_SIZE)
    }

    fn salt() -> String {
        "a1".repeat(SALT_SIZE)
    }

    #[test]
    fn parses_direct_link() {
        let link = format!("https://example.test/app#msg={}&key={}", blob(), key());
        let params = LinkParams::parse(&link).unwrap();

        assert_eq!(params.mode(), LinkMode::Direct);
        assert_eq!(params.ciphertext(), blob());
    }

    #[test]
    fn parses_password_link() {
        let fragment = format!("#msg={}&salt={}&pwd=1", blob(), salt());
        let params = LinkParams::parse(&fragment).unwrap();

        assert_eq!(params, LinkParams::Password { ciphertext: blob(), salt: salt() });
    }

    #[test]
    fn accepts_bare_fragment_and_any_order() {
        let fragment = format!("key={}&msg={}", key(), blob());
        assert_eq!(LinkParams::parse(&fragment).unwrap().mode(), LinkMode::Direct);
    }

    #[test]
    fn uppercase_hex_is_normalized() {
        let upper = blob().to_ascii_uppercase();
        let params = LinkParams::parse(&format!("msg={upper}&key={}", key())).unwrap();

        assert_eq!(params.ciphertext(), blob());
        assert_eq!(params.message_id(), MessageId::from_ciphertext(&blob()));
    }

    #[test]
    fn unknown_parameters_are_ignored() {
        let fragment = format!("msg={}&utm=x&key={}", blob(), key());
        assert!(LinkParams::parse(&fragment).is_ok());
    }

    #[test]
    fn missing_msg() {
        let err = LinkParams::parse(&format!("#key={}", key())).unwrap_err();
        assert_eq!(err, LinkError::MissingParameter("msg"));
    }

    #[test]
    fn missing_key() {
        let err = LinkParams::parse(&format!("#msg={}", blob())).unwrap_err();
        assert_eq!(err, LinkError::MissingParameter("key"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(LinkParams::parse("").unwrap_err(), LinkError::MissingParameter("msg"));
        assert_eq!(
            LinkParams::parse("https://example.test/").unwrap_err(),
            LinkError::MissingParameter("msg")
        );
    }

    #[test]
    fn salt_without_pwd_flag() {
        let err = LinkParams::parse(&format!("msg={}&salt={}", blob(), salt())).unwrap_err();
        assert_eq!(err, LinkError::MissingParameter("pwd"));
    }

    #[test]
    fn pwd_flag_without_salt() {
        let err = LinkParams::parse(&format!("msg={}&pwd=1", blob())).unwrap_err();
        assert_eq!(err, LinkError::MissingParameter("salt"));
    }

    #[test]
    fn pwd_flag_must_be_one() {
        let err =
            LinkParams::parse(&format!("msg={}&salt={}&pwd=yes", blob(), salt())).unwrap_err();
        assert!(matches!(err, LinkError::InvalidParameter { name: "pwd", .. }));
    }

    #[test]
    fn key_and_password_conflict() {
        let fragment = format!("msg={}&key={}&salt={}&pwd=1", blob(), key(), salt());
        assert_eq!(LinkParams::parse(&fragment).unwrap_err(), LinkError::ConflictingModes);
    }

    #[test]
    fn duplicate_parameter() {
        let fragment = format!("msg={}&msg={}&key={}", blob(), blob(), key());
        assert_eq!(
            LinkParams::parse(&fragment).unwrap_err(),
            LinkError::DuplicateParameter("msg".to_string())
        );
    }

    #[test]
    fn malformed_values() {
        let short_key = format!("msg={}&key=abcd", blob());
        assert!(matches!(
            LinkParams::parse(&short_key),
            Err(LinkError::InvalidParameter { name: "key", .. })
        ));

        let non_hex_key = format!("msg={}&key={}", blob(), "zz".repeat(KEY_SIZE));
        assert!(matches!(
            LinkParams::parse(&non_hex_key),
            Err(LinkError::InvalidParameter { name: "key", .. })
        ));

        let odd_blob = format!("msg={}a&key={}", blob(), key());
        assert!(matches!(
            LinkParams::parse(&odd_blob),
            Err(LinkError::InvalidParameter { name: "msg", .. })
        ));

        let tiny_blob = format!("msg=abcd&key={}", key());
        assert!(matches!(
            LinkParams::parse(&tiny_blob),
            Err(LinkError::InvalidParameter { name: "msg", .. })
        ));
    }

    #[test]
    fn oversized_blob_is_rejected() {
        let huge = "00".repeat(MAX_BLOB_HEX / 2 + 1);
        let err = LinkParams::parse(&format!("msg={huge}&key={}", key())).unwrap_err();
        assert!(matches!(err, LinkError::InvalidParameter { name: "msg", .. }));
    }

    #[test]
    fn build_replaces_existing_fragment() {
        let params = LinkParams::Password { ciphertext: blob(), salt: salt() };
        let link = SecretLink::build("https://example.test/read#stale", &params);

        assert_eq!(
            link.as_str(),
            format!("https://example.test/read#msg={}&salt={}&pwd=1", blob(), salt())
        );
        assert_eq!(link.params().unwrap(), params);
    }

    #[test]
    fn password_link_never_contains_key_parameter() {
        let params = LinkParams::Password { ciphertext: blob(), salt: salt() };
        let link = SecretLink::build("https://example.test/", &params);

        assert!(!link.as_str().contains("key="));
    }

    #[test]
    fn message_id_is_stable_and_short() {
        let a = MessageId::from_ciphertext(&blob());
        let b = MessageId::from_ciphertext(&blob());

        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert_ne!(a, MessageId::from_ciphertext(&"cd".repeat(NONCE_SIZE + TAG_SIZE)));
    }

    #[test]
    fn debug_output_is_redacted() {
        let params = LinkParams::Direct { ciphertext: blob(), key: Zeroizing::new(key()) };
        let link = SecretLink::build("https://example.test/", &params);

        assert!(!format!("{params:?}").contains(&key()));
        assert!(!format!("{link:?}").contains(&key()));
    }

    #[test]
    fn mode_tags_differ() {
        assert_ne!(LinkMode::Direct.aad(), LinkMode::Password.aad());
    }
}
