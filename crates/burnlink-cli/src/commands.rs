//! Subcommand implementations.
//!
//! Each command takes its environment, store and output explicitly so tests
//! can run them against the simulation harness and an in-memory buffer.

use std::{
    future::Future,
    io::{BufRead, Read, Write},
    process::ExitCode,
};

use burnlink_core::{
    Composer, ConsumptionLedger, Environment, KeySource, KvStore, Opened, ReadStatus, Reader,
    ReaderConfig, SecretLink,
};
use zeroize::Zeroizing;

use crate::{
    cli::{Cli, Command},
    countdown::{self, status_message},
    error::CliError,
    store::RedbStore,
    system_env::SystemEnv,
};

/// Exit code for an expired or destroyed message.
const EXIT_UNAVAILABLE: u8 = 2;

/// Parse-independent entry point used by the binary.
pub async fn run(cli: Cli) -> ExitCode {
    match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => report(&err, &mut std::io::stderr().lock()),
    }
}

/// Print a failed command's message. Always returns [`ExitCode::FAILURE`].
fn report<W: Write>(err: &CliError, out: &mut W) -> ExitCode {
    tracing::debug!(error = %err, "command failed");
    if let Err(write_err) = writeln!(out, "error: {}", err.user_message()) {
        tracing::warn!(error = %write_err, "failed to print error");
    }
    ExitCode::FAILURE
}

async fn dispatch(cli: Cli) -> Result<ExitCode, CliError> {
    let env = SystemEnv::new();
    let config = ReaderConfig { expiry_anchor: cli.expiry_anchor.into() };
    let state_file = cli.state_file();

    match cli.command {
        Command::Create { message, ttl, password } => {
            let text = match message {
                Some(text) => Zeroizing::new(text),
                None => read_stdin()?,
            };
            let link = create(env, cli.base_url, text, ttl, password.map(Zeroizing::new)).await?;
            writeln!(std::io::stdout().lock(), "{}", link.as_str())?;
            Ok(ExitCode::SUCCESS)
        },
        Command::Open { link, password, watch } => {
            let store = open_store(&cli.state_dir, &state_file)?;
            let password = password.map(Zeroizing::new);
            let destroy = watch.then_some(destroy_requested());
            let status = open(
                env,
                store,
                config,
                &link,
                password.as_ref().map(|p| p.as_str()),
                destroy,
                &mut std::io::stdout().lock(),
            )
            .await?;
            Ok(exit_code(status))
        },
        Command::Forget => {
            let store = open_store(&cli.state_dir, &state_file)?;
            let removed = forget(&store)?;
            writeln!(std::io::stdout().lock(), "removed {removed} tracking entries")?;
            Ok(ExitCode::SUCCESS)
        },
        Command::EndSession => {
            let store = open_store(&cli.state_dir, &state_file)?;
            store.end_session()?;
            writeln!(std::io::stdout().lock(), "session ended")?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Seal `text` on a blocking thread (password mode runs the full KDF).
pub async fn create<E: Environment>(
    env: E,
    base_url: String,
    text: Zeroizing<String>,
    ttl_secs: u64,
    password: Option<Zeroizing<String>>,
) -> Result<SecretLink, CliError> {
    let link = tokio::task::spawn_blocking(move || {
        let source = match &password {
            Some(password) => KeySource::Password(password.as_str()),
            None => KeySource::Direct,
        };
        Composer::new(env, base_url).create_link(&text, ttl_secs, source)
    })
    .await??;
    Ok(link)
}

/// Open `link` and write the outcome to `out`.
///
/// With `destroy` set, a revealed message stays under a live countdown until
/// it expires or `destroy` resolves.
pub async fn open<E, S, W, D>(
    env: E,
    store: S,
    config: ReaderConfig,
    link: &str,
    password: Option<&str>,
    destroy: Option<D>,
    out: &mut W,
) -> Result<ReadStatus, CliError>
where
    E: Environment,
    S: KvStore,
    W: Write,
    D: Future<Output = ()>,
{
    // Password links run PBKDF2, so the whole open happens off the workers
    let link = Zeroizing::new(link.to_owned());
    let password = password.map(|p| Zeroizing::new(p.to_owned()));
    let handle = tokio::runtime::Handle::current();
    let (mut reader, opened) = tokio::task::spawn_blocking(move || {
        let mut reader = Reader::new(env, store, config);
        let opened = handle.block_on(reader.open(&link, password.as_ref().map(|p| p.as_str())));
        (reader, opened)
    })
    .await?;
    let Opened { status, text, error, .. } = opened;

    match (status, text) {
        (ReadStatus::Success, Some(text)) => {
            writeln!(out, "{}", text.as_str())?;
            drop(text);
            match destroy {
                Some(destroy) => {
                    writeln!(out, "(press Enter to destroy)")?;
                    countdown::watch(&mut reader, destroy, out).await
                },
                None => Ok(ReadStatus::Success),
            }
        },
        (ReadStatus::Error(_), _) => {
            let message = error.map(|err| err.user_message()).unwrap_or_default();
            writeln!(out, "{message}")?;
            Ok(status)
        },
        (status, _) => {
            writeln!(out, "{}", status_message(status))?;
            Ok(status)
        },
    }
}

/// Remove all tracking data. Returns the number of entries removed.
pub fn forget<S: KvStore>(store: &S) -> Result<usize, CliError> {
    Ok(ConsumptionLedger::new(store.clone()).forget_all()?)
}

/// Process exit code for a final reader state.
pub fn exit_code(status: ReadStatus) -> ExitCode {
    match status {
        ReadStatus::Success => ExitCode::SUCCESS,
        ReadStatus::Expired | ReadStatus::Destroyed => ExitCode::from(EXIT_UNAVAILABLE),
        ReadStatus::Loading | ReadStatus::Error(_) => ExitCode::FAILURE,
    }
}

fn open_store(dir: &std::path::Path, file: &std::path::Path) -> Result<RedbStore, CliError> {
    std::fs::create_dir_all(dir)?;
    Ok(RedbStore::open(file)?)
}

fn read_stdin() -> Result<Zeroizing<String>, CliError> {
    let mut text = Zeroizing::new(String::new());
    std::io::stdin().lock().read_to_string(&mut text)?;
    Ok(text)
}

/// Resolves when the user presses Enter or Ctrl-C.
///
/// A closed stdin never counts as Enter.
async fn destroy_requested() {
    let enter = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).is_ok_and(|n| n > 0)
    });

    tokio::select! {
        Ok(true) = enter => {},
        _ = tokio::signal::ctrl_c() => {},
    }
}
