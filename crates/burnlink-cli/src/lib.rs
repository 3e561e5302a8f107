//! Burnlink command-line front end.
//!
//! Production glue around [`burnlink_core`]: the [`Reader`] state machine
//! emits actions, and this crate executes them against a terminal, a Redb
//! state file and the operating system's clock and RNG.
//!
//! # Components
//!
//! - [`Cli`]: argument parsing (clap)
//! - [`commands`]: `create`, `open`, `forget` and `end-session`
//! - [`countdown`]: live countdown driver for `open --watch`
//! - [`RedbStore`]: on-disk [`KvStore`] for both storage scopes
//! - [`SystemEnv`]: real time, tokio sleep, OS randomness
//!
//! [`Reader`]: burnlink_core::Reader
//! [`KvStore`]: burnlink_core::KvStore

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod countdown;
mod error;
mod store;
mod system_env;

pub use cli::{AnchorArg, Cli, Command};
pub use commands::run;
pub use error::CliError;
pub use store::RedbStore;
pub use system_env::SystemEnv;
