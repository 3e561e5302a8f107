//! Deterministic simulation harness for burnlink.
//!
//! [`SimEnv`] implements the core `Environment` with a virtual wall clock and
//! a seeded ChaCha RNG, so every key, nonce and decrypt delay is
//! reproducible from a seed and time only moves when a test moves it.
//!
//! [`SimBrowser`] models one browser profile: a shared store whose durable
//! scope outlives restarts, a session scope that a restart clears, and tabs
//! that each run a fresh reader against that store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod browser;
pub mod sim_env;

pub use browser::SimBrowser;
pub use sim_env::SimEnv;

/// Base URL used for links created in simulation.
pub const SIM_BASE_URL: &str = "https://burnlink.test/read";
