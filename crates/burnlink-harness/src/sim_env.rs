//! Simulated environment with a virtual clock and seeded randomness.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use burnlink_core::env::Environment;
use burnlink_crypto::CryptoError;
use chrono::{DateTime, TimeDelta, Utc};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// 2026-01-01T00:00:00Z
const DEFAULT_EPOCH_SECS: i64 = 1_767_225_600;

/// Environment for deterministic simulation.
///
/// Clones share one clock and one RNG stream. `sleep` advances the clock by
/// the requested duration and completes immediately.
#[derive(Clone)]
pub struct SimEnv {
    state: Arc<Mutex<SimState>>,
}

struct SimState {
    now: DateTime<Utc>,
    rng: ChaCha20Rng,
    entropy_available: bool,
    slept: Duration,
}

impl SimEnv {
    /// Seed 0, clock at 2026-01-01T00:00:00Z.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Clock at 2026-01-01T00:00:00Z with the given RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let start = DateTime::from_timestamp(DEFAULT_EPOCH_SECS, 0).unwrap_or(DateTime::UNIX_EPOCH);
        Self::starting_at(seed, start)
    }

    /// Clock at `now` with the given RNG seed.
    pub fn starting_at(seed: u64, now: DateTime<Utc>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                now,
                rng: ChaCha20Rng::seed_from_u64(seed),
                entropy_available: true,
                slept: Duration::ZERO,
            })),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.lock();
        state.now = forward(state.now, by);
    }

    /// Set the clock. May move it backwards.
    pub fn set_now(&self, now: DateTime<Utc>) {
        self.lock().now = now;
    }

    /// Make `fill_random` fail with `CryptoUnavailable`.
    pub fn disable_entropy(&self) {
        self.lock().entropy_available = false;
    }

    /// Undo [`SimEnv::disable_entropy`].
    pub fn enable_entropy(&self) {
        self.lock().entropy_available = true;
    }

    /// Total time spent in `sleep`.
    pub fn total_slept(&self) -> Duration {
        self.lock().slept
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        // Harness state stays consistent across a panicking test thread
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("SimEnv")
            .field("now", &state.now)
            .field("entropy_available", &state.entropy_available)
            .finish_non_exhaustive()
    }
}

impl Environment for SimEnv {
    fn now(&self) -> DateTime<Utc> {
        self.lock().now
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        {
            let mut state = self.lock();
            state.now = forward(state.now, duration);
            state.slept += duration;
        }
        std::future::ready(())
    }

    fn fill_random(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        let mut state = self.lock();
        if !state.entropy_available {
            tracing::trace!(len = buffer.len(), "simulated entropy failure");
            return Err(CryptoError::CryptoUnavailable);
        }
        state.rng.fill_bytes(buffer);
        Ok(())
    }
}

fn forward(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    let delta = TimeDelta::from_std(by).unwrap_or(TimeDelta::MAX);
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_bytes() {
        let a = SimEnv::with_seed(7);
        let b = SimEnv::with_seed(7);

        assert_eq!(a.random_array::<32>().unwrap(), b.random_array::<32>().unwrap());
        assert_ne!(
            SimEnv::with_seed(8).random_array::<32>().unwrap(),
            SimEnv::with_seed(7).random_array::<32>().unwrap()
        );
    }

    #[test]
    fn clock_only_moves_when_told() {
        let env = SimEnv::new();
        let start = env.now();
        assert_eq!(env.now(), start);

        env.advance(Duration::from_secs(30));
        assert_eq!(env.now(), start + TimeDelta::seconds(30));
    }

    #[test]
    fn clones_share_clock() {
        let env = SimEnv::new();
        let clone = env.clone();
        clone.advance(Duration::from_secs(5));
        assert_eq!(env.now(), clone.now());
    }

    #[tokio::test]
    async fn sleep_advances_clock() {
        let env = SimEnv::new();
        let start = env.now();

        env.sleep(Duration::from_millis(120)).await;

        assert_eq!(env.now(), start + TimeDelta::milliseconds(120));
        assert_eq!(env.total_slept(), Duration::from_millis(120));
    }

    #[test]
    fn disabled_entropy_fails() {
        let env = SimEnv::new();
        env.disable_entropy();
        assert_eq!(env.random_u64(), Err(CryptoError::CryptoUnavailable));

        env.enable_entropy();
        assert!(env.random_u64().is_ok());
    }

    #[test]
    fn default_epoch() {
        assert_eq!(SimEnv::new().now().to_rfc3339(), "2026-01-01T00:00:00+00:00");
    }
}
