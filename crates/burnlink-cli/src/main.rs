//! Burnlink binary.
//!
//! # Usage
//!
//! ```bash
//! # Seal a message that can be read once within ten minutes
//! burnlink create -m "door code 4711" --ttl 600
//!
//! # Read it, keeping it on screen under a live countdown
//! burnlink open 'https://burnlink.local/#msg=...&key=...' --watch
//!
//! # Password mode: the key never appears in the link
//! BURNLINK_PASSWORD=hunter2 burnlink create -m "secret"
//! ```

use std::process::ExitCode;

use burnlink_cli::{Cli, run};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // stdout carries the link or the message, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            tracing::error!(error = %err, "cannot start runtime");
            return ExitCode::FAILURE;
        },
    };

    let code = runtime.block_on(run(cli));

    // A pending stdin read from `--watch` must not keep the process alive
    runtime.shutdown_background();
    code
}
