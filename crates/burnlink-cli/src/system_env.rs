//! Production Environment implementation using the system clock and OS RNG.
//!
//! Wall-clock time comes from `chrono::Utc::now()`, sleeping from tokio, and
//! randomness from getrandom. Behavior is non-deterministic by nature.

use std::time::Duration;

use burnlink_core::env::Environment;
use burnlink_crypto::CryptoError;
use chrono::{DateTime, Utc};

/// Production environment using system time and cryptographic RNG.
///
/// # Security
///
/// getrandom draws from the OS source (`getrandom(2)` or `/dev/urandom` on
/// Linux, `BCryptGenRandom` on Windows). A failing source is reported as
/// [`CryptoError::CryptoUnavailable`] so link creation stops instead of
/// sealing under weak keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn fill_random(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::fill(buffer).map_err(|err| {
            tracing::error!(error = %err, "OS random source failed");
            CryptoError::CryptoUnavailable
        })
    }
}
