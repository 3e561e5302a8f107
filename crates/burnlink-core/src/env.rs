//! Environment abstraction for deterministic testing.
//!
//! Decouples protocol logic from system resources (wall clock, randomness,
//! sleeping). Enables deterministic simulation (virtual clock, seeded RNG)
//! and production use with real system resources.

use std::time::Duration;

use burnlink_crypto::CryptoError;
use chrono::{DateTime, Utc};

/// Abstract environment providing time, randomness, and async sleep.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `fill_random()` uses cryptographically secure entropy in production
/// - `fill_random()` reports an absent entropy source as
///   [`CryptoError::CryptoUnavailable`] instead of returning weak bytes
pub trait Environment: Clone + Send + Sync + 'static {
    /// Current wall-clock time.
    ///
    /// Expiry compares this against timestamps embedded in payloads that
    /// were produced on another machine, so a monotonic clock is not enough.
    fn now(&self) -> DateTime<Utc>;

    /// Sleeps for the specified duration.
    ///
    /// The only async method in the trait. Used for the randomized delay
    /// around decryption and by countdown drivers.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    fn fill_random(&self, buffer: &mut [u8]) -> Result<(), CryptoError>;

    /// Generates a random `u64`.
    fn random_u64(&self) -> Result<u64, CryptoError> {
        let mut bytes = [0u8; 8];
        self.fill_random(&mut bytes)?;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Generates a fixed-size random array (keys, salts, nonces).
    fn random_array<const N: usize>(&self) -> Result<[u8; N], CryptoError> {
        let mut bytes = [0u8; N];
        self.fill_random(&mut bytes)?;
        Ok(bytes)
    }
}
