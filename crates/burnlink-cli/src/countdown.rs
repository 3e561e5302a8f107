//! Live countdown driver.
//!
//! Executes [`ReaderAction`]s against a terminal: ticks once per second
//! until the reader stops the countdown or the user asks to destroy. The
//! interval is dropped on return, so no timer outlives the view.

use std::{future::Future, io::Write, time::Duration};

use burnlink_core::{
    Environment, KvStore, ReadStatus, Reader, ReaderAction, expiry::format_remaining,
};
use tokio::time::MissedTickBehavior;

use crate::error::CliError;

/// Countdown refresh interval.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Text shown for a terminal state.
pub fn status_message(status: ReadStatus) -> &'static str {
    match status {
        ReadStatus::Expired => "This message has expired and can no longer be read.",
        ReadStatus::Destroyed => "This message was already read and has been destroyed.",
        ReadStatus::Loading | ReadStatus::Success | ReadStatus::Error(_) => "",
    }
}

/// Run the countdown until expiry or `destroy` resolves.
///
/// Returns the reader's final state.
pub async fn watch<E, S, W>(
    reader: &mut Reader<E, S>,
    destroy: impl Future<Output = ()>,
    out: &mut W,
) -> Result<ReadStatus, CliError>
where
    E: Environment,
    S: KvStore,
    W: Write,
{
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(destroy);

    loop {
        tokio::select! {
            biased;

            () = &mut destroy => {
                apply(reader.destroy_now(), out)?;
                break;
            }
            _ = interval.tick() => {
                if apply(reader.tick(), out)? {
                    break;
                }
            }
        }
    }

    Ok(reader.status())
}

/// Execute actions. Returns true once the countdown is stopped.
fn apply<W: Write>(actions: Vec<ReaderAction>, out: &mut W) -> Result<bool, CliError> {
    let mut stopped = false;
    for action in actions {
        match action {
            ReaderAction::UpdateCountdown { remaining_secs } => {
                write!(out, "\rexpires in {:<10}", format_remaining(remaining_secs))?;
                out.flush()?;
            },
            ReaderAction::StopCountdown => stopped = true,
            ReaderAction::HideMessage { status } => {
                writeln!(out)?;
                writeln!(out, "{}", status_message(status))?;
            },
            ReaderAction::ClearFragment => {
                tracing::debug!("link invalidated for this session");
            },
        }
    }
    Ok(stopped)
}
