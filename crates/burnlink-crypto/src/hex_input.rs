//! Strict hex validation for untrusted inputs.
//!
//! Link parameters arrive as free text. They are checked here before any
//! byte reaches a cipher: non-empty, even length, hex digits only, and the
//! exact length where one is expected.

use zeroize::Zeroizing;

use crate::error::CryptoError;

/// Check that `input` is non-empty, even-length hexadecimal.
///
/// Accepts upper and lower case digits.
pub fn validate(field: &'static str, input: &str) -> Result<(), CryptoError> {
    if input.is_empty() {
        return Err(CryptoError::encoding(field, "empty"));
    }
    if input.len() % 2 != 0 {
        return Err(CryptoError::encoding(field, format!("odd length {}", input.len())));
    }
    if let Some(pos) = input.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(CryptoError::encoding(field, format!("non-hex character at offset {pos}")));
    }
    Ok(())
}

/// Decode hex of any (validated) length.
pub fn decode(field: &'static str, input: &str) -> Result<Vec<u8>, CryptoError> {
    validate(field, input)?;
    hex::decode(input).map_err(|e| CryptoError::encoding(field, e.to_string()))
}

/// Decode hex into a fixed-size array, wiping the intermediate buffer.
pub fn decode_array<const N: usize>(
    field: &'static str,
    input: &str,
) -> Result<[u8; N], CryptoError> {
    if input.len() != N * 2 {
        return Err(CryptoError::encoding(
            field,
            format!("expected {} hex characters, got {}", N * 2, input.len()),
        ));
    }
    let bytes = Zeroizing::new(decode(field, input)?);
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}
