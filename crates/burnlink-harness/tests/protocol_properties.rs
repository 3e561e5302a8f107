//! Property-based tests for the create/open protocol.
//!
//! Every case runs on a fresh simulated browser seeded from the strategy, so
//! failures shrink to a reproducible seed.

use std::time::Duration;

use burnlink_core::{KeySource, LinkParams, ReadStatus};
use burnlink_harness::{SimBrowser, SimEnv};
use proptest::prelude::*;

/// Message text the sanitizer leaves unchanged.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?'()\\-]{0,200}[a-zA-Z0-9]"
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .map(|rt| rt.block_on(future))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// What goes in comes out, once.
    #[test]
    fn create_then_open_roundtrip(seed in any::<u64>(), text in plain_text()) {
        let browser = SimBrowser::new(SimEnv::with_seed(seed));
        let link = browser.composer().create_link(&text, 0, KeySource::Direct).unwrap();

        let opened = block_on(browser.tab().open(link.as_str(), None));
        prop_assert_eq!(opened.status, ReadStatus::Success);
        prop_assert_eq!(opened.text.as_ref().map(|t| t.as_str()), Some(text.as_str()));

        let again = block_on(browser.tab().open(link.as_str(), None));
        prop_assert_eq!(again.status, ReadStatus::Destroyed);
    }

    /// Readable at any point inside the window, expired at any point after.
    #[test]
    fn ttl_window(
        seed in any::<u64>(),
        ttl in 30u64..=86_400,
        offset in 0u64..=86_400,
    ) {
        let env = SimEnv::with_seed(seed);
        let browser = SimBrowser::new(env.clone());
        let link = browser.composer().create_link("ttl probe", ttl, KeySource::Direct).unwrap();

        env.advance(Duration::from_secs(offset));
        let opened = block_on(browser.tab().open(link.as_str(), None));

        // The decrypt delay lands strictly between whole seconds
        if offset < ttl {
            prop_assert_eq!(opened.status, ReadStatus::Success);
        } else {
            prop_assert_eq!(opened.status, ReadStatus::Expired);
        }
    }

    /// Flipping any hex digit of the blob never reveals anything.
    #[test]
    fn tampering_never_reveals(seed in any::<u64>(), position in any::<prop::sample::Index>()) {
        let browser = SimBrowser::new(SimEnv::with_seed(seed));
        let link = browser.composer().create_link("tamper probe", 0, KeySource::Direct).unwrap();
        let LinkParams::Direct { ciphertext, key } = link.params().unwrap() else {
            panic!("expected a direct link");
        };

        let mut bytes = ciphertext.into_bytes();
        let i = position.index(bytes.len());
        bytes[i] = if bytes[i] == b'f' { b'e' } else { b'f' };
        let tampered = format!("msg={}&key={}", String::from_utf8(bytes).unwrap(), key.as_str());

        let opened = block_on(browser.tab().open(&tampered, None));
        prop_assert!(matches!(opened.status, ReadStatus::Error(_)));
        prop_assert!(opened.text.is_none());
    }

    /// Arbitrary input never panics the reader and never touches the ledger
    /// unless it parses.
    #[test]
    fn arbitrary_links_are_handled(input in ".{0,300}") {
        let browser = SimBrowser::default();
        let mut tab = browser.tab();
        let opened = block_on(tab.open(&input, None));

        prop_assert!(opened.text.is_none());
        if LinkParams::parse(&input).is_err() {
            prop_assert!(browser.store().is_empty().unwrap());
        }
    }

    /// Two links from one environment never share key or nonce.
    #[test]
    fn links_are_unique(seed in any::<u64>()) {
        let browser = SimBrowser::new(SimEnv::with_seed(seed));
        let composer = browser.composer();
        let a = composer.create_link("same text", 0, KeySource::Direct).unwrap();
        let b = composer.create_link("same text", 0, KeySource::Direct).unwrap();

        prop_assert_ne!(a.as_str(), b.as_str());
        prop_assert_ne!(a.params().unwrap().message_id(), b.params().unwrap().message_id());
    }
}

proptest! {
    // Each case runs PBKDF2 several times
    #![proptest_config(ProptestConfig::with_cases(4))]

    /// Password links never carry the password or a key.
    #[test]
    fn password_links_hide_secrets(seed in any::<u64>(), password in "[a-z]{8,16}") {
        let browser = SimBrowser::new(SimEnv::with_seed(seed));
        let link = browser
            .composer()
            .create_link("password probe", 0, KeySource::Password(&password))
            .unwrap();

        prop_assert!(!link.as_str().contains(&password));
        prop_assert!(!link.as_str().contains("key="));

        let opened = block_on(browser.tab().open(link.as_str(), Some(&password)));
        prop_assert_eq!(opened.status, ReadStatus::Success);
    }
}
