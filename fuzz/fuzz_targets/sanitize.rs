//! Fuzz target for policy::sanitize
//!
//! Unterminated tags, stray quotes and unclosed comments must not panic on
//! a char boundary, and stripping never adds text.

#![no_main]

use burnlink_core::policy::sanitize;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &str| {
    let out = sanitize(input);
    assert!(out.len() <= input.len());
});
