//! Command-line arguments.

use std::path::PathBuf;

use burnlink_core::ExpiryAnchor;
use clap::{Parser, Subcommand, ValueEnum};

/// File name of the state database inside `--state-dir`.
pub const STATE_FILE: &str = "state.redb";

/// One-time secret links
#[derive(Parser, Debug)]
#[command(name = "burnlink")]
#[command(about = "Create and open one-time secret links")]
#[command(version)]
pub struct Cli {
    /// Directory holding the consumption ledger
    #[arg(long, global = true, env = "BURNLINK_STATE_DIR", default_value = ".burnlink")]
    pub state_dir: PathBuf,

    /// Origin and path that links are built on
    #[arg(long, global = true, env = "BURNLINK_BASE_URL", default_value = "https://burnlink.local/")]
    pub base_url: String,

    /// What starts the time-to-live clock when opening
    #[arg(
        long,
        global = true,
        env = "BURNLINK_EXPIRY_ANCHOR",
        value_enum,
        default_value_t = AnchorArg::Creation
    )]
    pub expiry_anchor: AnchorArg,

    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins if set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Path of the state database.
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join(STATE_FILE)
    }
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seal a message into a one-time link
    Create {
        /// Message text; read from stdin when omitted
        #[arg(short, long)]
        message: Option<String>,

        /// Seconds the message stays readable, 0 for no limit
        #[arg(short, long, default_value_t = 0)]
        ttl: u64,

        /// Derive the key from this password instead of embedding it
        #[arg(long, env = "BURNLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Open a link and print the message
    Open {
        /// Full link or bare fragment
        link: String,

        /// Password for password-protected links
        #[arg(long, env = "BURNLINK_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Keep the message on screen with a live countdown; Enter destroys it
        #[arg(short, long)]
        watch: bool,
    },

    /// Remove all tracking data (view counts, destroyed flags)
    Forget,

    /// End the current session, clearing destroyed flags
    EndSession,
}

/// Expiry anchor on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorArg {
    /// `createdAt + ttl`
    Creation,
    /// `firstViewedAt + ttl`
    FirstView,
}

impl From<AnchorArg> for ExpiryAnchor {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::Creation => Self::Creation,
            AnchorArg::FirstView => Self::FirstView,
        }
    }
}
