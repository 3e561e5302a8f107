//! Sender-side input policy.
//!
//! Markup stripping and bounds checks run before any key is generated, so a
//! rejected input never costs entropy or CPU and is always recoverable by
//! editing.

use thiserror::Error;

/// Maximum message size in UTF-8 bytes (10 KiB).
pub const MAX_MESSAGE_BYTES: usize = 10 * 1024;

/// Shortest non-zero time-to-live.
pub const MIN_TTL_SECS: u64 = 30;

/// Longest time-to-live (24 hours).
pub const MAX_TTL_SECS: u64 = 86_400;

/// Minimum password length in characters.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// Elements whose text content is dropped along with the tags.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Input rejected before any cryptography runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Message is empty or whitespace only (after sanitizing)
    #[error("message cannot be empty")]
    EmptyMessage,

    /// Message exceeds the byte limit
    #[error("message too long: {actual} bytes, maximum is {max}")]
    MessageTooLong {
        /// Configured maximum
        max: usize,
        /// Actual size
        actual: usize,
    },

    /// Non-zero TTL below the minimum
    #[error("time-to-live too short: minimum is {min} seconds")]
    TtlTooShort {
        /// Configured minimum
        min: u64,
    },

    /// TTL above the maximum
    #[error("time-to-live too long: maximum is {max} seconds")]
    TtlTooLong {
        /// Configured maximum
        max: u64,
    },

    /// Password shorter than the minimum
    #[error("password too short: use at least {min} characters")]
    PasswordTooShort {
        /// Configured minimum
        min: usize,
    },

    /// A password-protected link was opened without a password
    #[error("this link requires a password")]
    PasswordRequired,
}

/// Bounds applied to sender input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Maximum message size in UTF-8 bytes
    pub max_message_bytes: usize,
    /// Shortest non-zero TTL in seconds
    pub min_ttl_secs: u64,
    /// Longest TTL in seconds
    pub max_ttl_secs: u64,
    /// Minimum password length in characters
    pub min_password_chars: usize,
    /// Views allowed per message
    pub max_views: u32,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            max_message_bytes: MAX_MESSAGE_BYTES,
            min_ttl_secs: MIN_TTL_SECS,
            max_ttl_secs: MAX_TTL_SECS,
            min_password_chars: MIN_PASSWORD_CHARS,
            max_views: 1,
        }
    }
}

impl Policy {
    /// Check an already sanitized message.
    pub fn validate_message(&self, text: &str) -> Result<(), ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if text.len() > self.max_message_bytes {
            return Err(ValidationError::MessageTooLong {
                max: self.max_message_bytes,
                actual: text.len(),
            });
        }
        Ok(())
    }

    /// Check a time-to-live. Zero means "never expires" and is always valid.
    pub fn validate_ttl(&self, ttl_secs: u64) -> Result<(), ValidationError> {
        if ttl_secs == 0 {
            return Ok(());
        }
        if ttl_secs < self.min_ttl_secs {
            return Err(ValidationError::TtlTooShort { min: self.min_ttl_secs });
        }
        if ttl_secs > self.max_ttl_secs {
            return Err(ValidationError::TtlTooLong { max: self.max_ttl_secs });
        }
        Ok(())
    }

    /// Check a password's length. Entropy is not measured.
    pub fn validate_password(&self, password: &str) -> Result<(), ValidationError> {
        if password.chars().count() < self.min_password_chars {
            return Err(ValidationError::PasswordTooShort { min: self.min_password_chars });
        }
        Ok(())
    }
}

/// Strip markup from sender text.
///
/// Tags, comments and processing instructions are removed; the text between
/// tags is kept. `script` and `style` lose their content too. A `<` that does
/// not open a tag (`a < b`) is kept as-is. Output is plain text, not HTML, so
/// nothing is entity-escaped.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if !opens_markup(tail) {
            out.push('<');
            rest = &tail[1..];
            continue;
        }

        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }

        // Unterminated tag: everything after it is inside the tag
        let Some(end) = tag_end(tail) else {
            rest = "";
            break;
        };

        let inner = &tail[1..end];
        rest = &tail[end + 1..];

        if !inner.starts_with('/') {
            let name = tag_name(inner);
            if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                rest = skip_raw_text(rest, &name);
            }
        }
    }

    out.push_str(rest);
    out
}

fn opens_markup(tail: &str) -> bool {
    tail.as_bytes()
        .get(1)
        .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

/// Index of the `>` closing the tag at the start of `tail`, skipping quoted
/// attribute values.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (i, b) in tail.bytes().enumerate().skip(1) {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {},
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i),
            (None, _) => {},
        }
    }
    None
}

fn tag_name(inner: &str) -> String {
    inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn skip_raw_text<'a>(rest: &'a str, name: &str) -> &'a str {
    // ASCII lowercasing keeps byte offsets aligned with `rest`
    let lower = rest.to_ascii_lowercase();
    let Some(close) = lower.find(&format!("</{name}")) else {
        return "";
    };
    rest[close..].find('>').map_or("", |end| &rest[close + end + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(sanitize("meet me at 5, bring the keys"), "meet me at 5, bring the keys");
    }

    #[test]
    fn tags_are_stripped_text_kept() {
        assert_eq!(sanitize("<b>bold</b> and <i>italic</i>"), "bold and italic");
    }

    #[test]
    fn script_content_is_removed() {
        assert_eq!(sanitize("hi<script>alert('x')</script>there"), "hithere");
        assert_eq!(sanitize("a<SCRIPT type=\"x\">evil()</Script >b"), "ab");
    }

    #[test]
    fn style_content_is_removed() {
        assert_eq!(sanitize("<style>body{}</style>visible"), "visible");
    }

    #[test]
    fn attributes_with_gt_inside_quotes() {
        assert_eq!(sanitize("<a title=\"x>y\" href='#'>link</a>"), "link");
    }

    #[test]
    fn comments_are_removed() {
        assert_eq!(sanitize("keep<!-- <b>hidden</b> -->this"), "keepthis");
    }

    #[test]
    fn lone_angle_bracket_is_kept() {
        assert_eq!(sanitize("a < b and 3<4"), "a < b and 3<4");
    }

    #[test]
    fn unterminated_tag_drops_the_tail() {
        assert_eq!(sanitize("safe<img src=x onerror=alert(1)"), "safe");
    }

    #[test]
    fn unterminated_script_drops_the_tail() {
        assert_eq!(sanitize("x<script>never closed"), "x");
    }

    #[test]
    fn multibyte_text_survives() {
        assert_eq!(sanitize("olá <em>mundo</em> 🔥"), "olá mundo 🔥");
    }

    #[test]
    fn empty_and_whitespace_rejected() {
        let policy = Policy::default();
        assert_eq!(policy.validate_message(""), Err(ValidationError::EmptyMessage));
        assert_eq!(policy.validate_message(" \n\t "), Err(ValidationError::EmptyMessage));
    }

    #[test]
    fn message_limit_is_inclusive() {
        let policy = Policy::default();
        assert!(policy.validate_message(&"a".repeat(MAX_MESSAGE_BYTES)).is_ok());
        assert_eq!(
            policy.validate_message(&"a".repeat(MAX_MESSAGE_BYTES + 1)),
            Err(ValidationError::MessageTooLong {
                max: MAX_MESSAGE_BYTES,
                actual: MAX_MESSAGE_BYTES + 1
            })
        );
    }

    #[test]
    fn message_limit_counts_bytes() {
        let policy = Policy { max_message_bytes: 4, ..Policy::default() };
        // two characters, eight bytes
        assert!(policy.validate_message("🔥🔥").is_err());
    }

    #[test]
    fn ttl_bounds() {
        let policy = Policy::default();
        assert!(policy.validate_ttl(0).is_ok());
        assert!(policy.validate_ttl(30).is_ok());
        assert!(policy.validate_ttl(86_400).is_ok());
        assert_eq!(policy.validate_ttl(29), Err(ValidationError::TtlTooShort { min: 30 }));
        assert_eq!(policy.validate_ttl(86_401), Err(ValidationError::TtlTooLong { max: 86_400 }));
    }

    #[test]
    fn password_length_counts_characters() {
        let policy = Policy::default();
        assert!(policy.validate_password("12345678").is_ok());
        assert!(policy.validate_password("ççççççç").is_err());
        assert_eq!(
            policy.validate_password("short"),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
    }
}
