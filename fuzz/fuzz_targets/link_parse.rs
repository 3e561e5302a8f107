//! Fuzz target for LinkParams::parse
//!
//! Links arrive from anywhere: pasted, truncated, hand-edited. Parsing must
//! reject garbage with an error and never panic. Anything that parses must
//! render back to a fragment that parses to the same message.

#![no_main]

use burnlink_core::LinkParams;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(params) = LinkParams::parse(input) {
        let fragment = params.to_fragment();
        let again = LinkParams::parse(&fragment).expect("canonical fragment must parse");
        assert_eq!(again.message_id(), params.message_id());
        assert_eq!(again.mode(), params.mode());
    }
});
