//! Fuzz target for MessagePayload::decode
//!
//! Decoding only ever sees authenticated plaintext, but a sender controls
//! that plaintext completely. Malformed CBOR, wrong field types and huge
//! length prefixes must all come back as errors.

#![no_main]

use burnlink_core::MessagePayload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(payload) = MessagePayload::decode(data) {
        let _ = payload.encode();
    }
});
