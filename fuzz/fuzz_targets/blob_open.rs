//! Fuzz target for cipher::open
//!
//! The first 32 bytes are used as the key, the rest as `nonce ‖ ct ‖ tag`.
//! Random blobs must fail authentication under both mode tags without
//! panicking, whatever their length.

#![no_main]

use burnlink_core::LinkMode;
use burnlink_crypto::{KEY_SIZE, SecretKey, open};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < KEY_SIZE {
        return;
    }
    let (key, blob) = data.split_at(KEY_SIZE);
    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(key);
    let key = SecretKey::from_bytes(bytes);

    for mode in [LinkMode::Direct, LinkMode::Password] {
        let _ = open(blob, &key, mode.aad());
    }
});
