//! Recipient side: the consumption state machine.
//!
//! One [`Reader`] corresponds to one page load. It opens a link at most once
//! and then only reacts to clock ticks and the destroy action. Like the rest
//! of the crate it performs no I/O itself: the countdown and fragment
//! clearing come back as [`ReaderAction`]s for the driver to execute.
//!
//! # State Machine
//!
//! ```text
//! ┌─────────┐  checks pass   ┌─────────┐  destroy_now   ┌───────────┐
//! │ Loading │───────────────>│ Success │───────────────>│ Destroyed │
//! └─────────┘                └─────────┘                └───────────┘
//!   │  │  │                       │ tick at deadline          ▲
//!   │  │  │                       ↓                           │
//!   │  │  │  past deadline   ┌─────────┐                      │
//!   │  │  └─────────────────>│ Expired │                      │
//!   │  │                     └─────────┘                      │
//!   │  │  destroyed flag, views exhausted                     │
//!   │  └──────────────────────────────────────────────────────┘
//!   │  bad link, wrong key  ┌───────┐
//!   └──────────────────────>│ Error │
//!                           └───────┘
//! ```
//!
//! # Check Order
//!
//! 1. Parse the link (no message id, no ledger access on failure). A bad
//!    link still waits out the decrypt delay
//! 2. Destroyed flag set for this session: `Destroyed`, decryption skipped
//! 3. Derive or decode the key, open the blob, decode the payload
//! 4. Past the deadline: `Expired`
//! 5. View count at or above `maxViews`: `Destroyed`
//! 6. Record the view (and first view time) and reveal: `Success`. The
//!    last allowed view also sets the session destroyed flag

use std::time::Duration;

use burnlink_crypto::{Salt, SecretKey, derive_key, open_hex};
use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::{
    env::Environment,
    error::{BurnError, ErrorKind},
    expiry::{self, Expiry, ExpiryAnchor},
    ledger::ConsumptionLedger,
    link::{LinkParams, MessageId},
    payload::MessagePayload,
    policy::ValidationError,
    store::KvStore,
};

/// Shortest randomized pause after a decryption attempt.
const MIN_DECRYPT_DELAY_MS: u64 = 50;

/// Longest randomized pause after a decryption attempt.
const MAX_DECRYPT_DELAY_MS: u64 = 150;

/// Reader configuration.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// What starts the time-to-live clock
    pub expiry_anchor: ExpiryAnchor,
}

/// Reader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Not opened yet
    Loading,
    /// Plaintext revealed
    Success,
    /// Past its deadline
    Expired,
    /// Consumed or destroyed
    Destroyed,
    /// Link or decryption failure
    Error(ErrorKind),
}

impl ReadStatus {
    /// Returns true for every state except `Loading` and `Success`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading | Self::Success)
    }
}

/// Actions returned by the reader for the driver to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderAction {
    /// Redraw the countdown
    UpdateCountdown {
        /// Whole seconds left, rounded up
        remaining_secs: u64,
    },
    /// Cancel the recurring countdown timer
    StopCountdown,
    /// Remove the revealed text and show the terminal state
    HideMessage {
        /// State to show instead
        status: ReadStatus,
    },
    /// Remove the fragment from the address so a reload cannot reopen it
    ClearFragment,
}

/// Outcome of [`Reader::open`].
pub struct Opened {
    /// Resulting state
    pub status: ReadStatus,
    /// Plaintext, only on `Success`
    pub text: Option<Zeroizing<String>>,
    /// Deadline, when the message has a TTL and was revealed
    pub expires_at: Option<DateTime<Utc>>,
    /// Cause, only on `Error`
    pub error: Option<BurnError>,
}

impl Opened {
    fn status(status: ReadStatus) -> Self {
        Self { status, text: None, expires_at: None, error: None }
    }

    fn failed(error: BurnError) -> Self {
        Self {
            status: ReadStatus::Error(error.kind()),
            text: None,
            expires_at: None,
            error: Some(error),
        }
    }
}

impl std::fmt::Debug for Opened {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opened")
            .field("status", &self.status)
            .field("text", &self.text.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("error", &self.error)
            .finish()
    }
}

/// Consumption state machine for one page load.
pub struct Reader<E, S> {
    env: E,
    ledger: ConsumptionLedger<S>,
    config: ReaderConfig,
    status: ReadStatus,
    opened: bool,
    message_id: Option<MessageId>,
    deadline: Option<DateTime<Utc>>,
    fragment_cleared: bool,
}

impl<E: Environment, S: KvStore> Reader<E, S> {
    /// Create a reader in [`ReadStatus::Loading`].
    pub fn new(env: E, store: S, config: ReaderConfig) -> Self {
        Self {
            env,
            ledger: ConsumptionLedger::new(store),
            config,
            status: ReadStatus::Loading,
            opened: false,
            message_id: None,
            deadline: None,
            fragment_cleared: false,
        }
    }

    /// Current state.
    pub fn status(&self) -> ReadStatus {
        self.status
    }

    /// Identifier of the opened message, once the link parsed.
    pub fn message_id(&self) -> Option<&MessageId> {
        self.message_id.as_ref()
    }

    /// Deadline of the revealed message, if it has a TTL.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Ledger this reader records into.
    pub fn ledger(&self) -> &ConsumptionLedger<S> {
        &self.ledger
    }

    /// Open `link` (full URL or fragment).
    ///
    /// Runs the whole check sequence at most once per reader. Later calls
    /// return the current state without touching the ledger or the cipher.
    pub async fn open(&mut self, link: &str, password: Option<&str>) -> Opened {
        if self.opened {
            return Opened::status(self.status);
        }
        self.opened = true;

        let outcome = self.open_once(link, password).await;
        self.status = outcome.status;
        tracing::debug!(
            message_id = ?self.message_id.as_ref().map(MessageId::as_str),
            status = ?self.status,
            "link opened"
        );
        outcome
    }

    async fn open_once(&mut self, link: &str, password: Option<&str>) -> Opened {
        let params = match LinkParams::parse(link) {
            Ok(params) => params,
            Err(err) => {
                // Same pause as a failed decryption
                self.decrypt_delay().await;
                return Opened::failed(err.into());
            },
        };
        let id = params.message_id();
        self.message_id = Some(id.clone());

        match self.ledger.is_destroyed(&id) {
            Ok(true) => return Opened::status(ReadStatus::Destroyed),
            Ok(false) => {},
            Err(err) => return Opened::failed(err.into()),
        }

        let decrypted = decrypt(&params, password);
        self.decrypt_delay().await;
        let mut payload = match decrypted {
            Ok(payload) => payload,
            Err(err) => return Opened::failed(err),
        };

        match self.consume(&id, &payload) {
            Ok(ReadStatus::Success) => Opened {
                status: ReadStatus::Success,
                text: Some(payload.take_text()),
                expires_at: self.deadline,
                error: None,
            },
            Ok(status) => Opened::status(status),
            Err(err) => Opened::failed(err),
        }
    }

    /// Expiry and view-count checks, then record the view.
    fn consume(
        &mut self,
        id: &MessageId,
        payload: &MessagePayload,
    ) -> Result<ReadStatus, BurnError> {
        let now = self.env.now();
        let anchor = self.config.expiry_anchor;
        let first_view = match anchor {
            ExpiryAnchor::Creation => None,
            ExpiryAnchor::FirstView => self.ledger.first_viewed_at(id)?,
        };
        let deadline = Expiry::deadline(anchor, payload.created_at, first_view, payload.ttl, now);

        if Expiry::evaluate(deadline, now).is_expired() {
            return Ok(ReadStatus::Expired);
        }

        if self.ledger.view_count(id)? >= payload.max_views {
            return Ok(ReadStatus::Destroyed);
        }

        let views = self.ledger.record_view(id)?;
        if views >= payload.max_views {
            // Later loads in this session stop before decrypting
            self.ledger.mark_destroyed(id)?;
        }
        if anchor == ExpiryAnchor::FirstView {
            self.ledger.mark_first_view(id, now)?;
        }
        self.deadline = deadline;
        Ok(ReadStatus::Success)
    }

    async fn decrypt_delay(&self) {
        let span = MAX_DECRYPT_DELAY_MS - MIN_DECRYPT_DELAY_MS + 1;
        let jitter = self.env.random_u64().map_or_else(
            |_| {
                tracing::warn!("no entropy for decrypt delay, using maximum");
                span - 1
            },
            |r| r % span,
        );
        self.env.sleep(Duration::from_millis(MIN_DECRYPT_DELAY_MS + jitter)).await;
    }

    /// Advance the countdown.
    ///
    /// Only a revealed message with a TTL produces actions. When the
    /// remaining time reaches zero the message is hidden as `Expired` and
    /// the countdown stops; later ticks return nothing.
    pub fn tick(&mut self) -> Vec<ReaderAction> {
        let (ReadStatus::Success, Some(deadline)) = (self.status, self.deadline) else {
            return Vec::new();
        };

        let remaining_secs = expiry::remaining_secs(deadline, self.env.now());
        if remaining_secs > 0 {
            return vec![ReaderAction::UpdateCountdown { remaining_secs }];
        }

        self.status = ReadStatus::Expired;
        if let Some(id) = &self.message_id {
            tracing::debug!(message_id = %id, "message expired");
        }
        vec![
            ReaderAction::UpdateCountdown { remaining_secs: 0 },
            ReaderAction::StopCountdown,
            ReaderAction::HideMessage { status: ReadStatus::Expired },
        ]
    }

    /// Destroy the message now, regardless of remaining views.
    ///
    /// Sets the session destroyed flag and asks the driver to hide the text
    /// and clear the fragment. Idempotent: a second call leaves the reader
    /// `Destroyed` and returns no actions. A store failure is logged, not
    /// returned; the reader still ends `Destroyed`.
    pub fn destroy_now(&mut self) -> Vec<ReaderAction> {
        let mut actions = Vec::new();

        if let Some(id) = &self.message_id
            && let Err(err) = self.ledger.mark_destroyed(id)
        {
            tracing::warn!(message_id = %id, error = %err, "failed to persist destroyed flag");
        }

        if self.status == ReadStatus::Success {
            actions.push(ReaderAction::StopCountdown);
        }
        if self.status != ReadStatus::Destroyed {
            self.status = ReadStatus::Destroyed;
            actions.push(ReaderAction::HideMessage { status: ReadStatus::Destroyed });
        }
        if !self.fragment_cleared {
            self.fragment_cleared = true;
            actions.push(ReaderAction::ClearFragment);
        }
        // A reader destroyed before opening never opens
        self.opened = true;

        actions
    }
}

/// Recover the key, open the blob and decode the payload.
fn decrypt(params: &LinkParams, password: Option<&str>) -> Result<MessagePayload, BurnError> {
    let key = match params {
        LinkParams::Direct { key, .. } => SecretKey::from_hex(key)?,
        LinkParams::Password { salt, .. } => {
            let password = password
                .filter(|p| !p.is_empty())
                .ok_or(ValidationError::PasswordRequired)?;
            derive_key(password, &Salt::from_hex(salt)?)
        },
    };

    let plaintext = open_hex(params.ciphertext(), &key, params.mode().aad())?;
    Ok(MessagePayload::decode(&plaintext)?)
}
