//! burnlink protocol core
//!
//! Everything needed to create and consume a one-time secret link, with no
//! I/O of its own. Time, randomness and sleeping come from an
//! [`Environment`]; persistence comes from a two-scope [`KvStore`]. The same
//! code runs against the system clock and a redb file in the CLI, and against
//! a virtual clock and an in-memory store in simulation.
//!
//! # Flow
//!
//! ```text
//! sender:    text ─► sanitize ─► validate ─► MessagePayload ─► CBOR ─► seal ─► SecretLink
//!
//! recipient: link ─► LinkParams ─► ledger.destroyed? ─► open ─► decode ─► expiry ─► ledger.views
//!                         │                │                 │                │            │
//!                         ▼                ▼                 ▼                ▼            ▼
//!                       Error          Destroyed           Error           Expired   Destroyed / Success
//! ```
//!
//! # Components
//!
//! - [`Composer`]: sender side (`create_link`)
//! - [`Reader`]: recipient state machine (`open`, `tick`, `destroy_now`)
//! - [`ConsumptionLedger`]: per-message view count, destroyed flag and first
//!   view time on top of a [`KvStore`]
//! - [`expiry`]: deadline evaluation and countdown formatting
//! - [`LinkParams`] / [`SecretLink`]: URL fragment codec
//! - [`MessagePayload`]: the plaintext envelope
//!
//! # Limits
//!
//! Enforcement is advisory and local to one store. Two readers sharing a
//! store can both pass the view-count check before either increments it;
//! nothing here serializes them, and a serverless design cannot.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod composer;
pub mod env;
pub mod error;
pub mod expiry;
pub mod ledger;
pub mod link;
pub mod payload;
pub mod policy;
mod reader;
pub mod store;

pub use composer::{Composer, KeySource};
pub use env::Environment;
pub use error::{BurnError, ErrorKind};
pub use expiry::{Expiry, ExpiryAnchor};
pub use ledger::{ConsumptionLedger, ConsumptionRecord};
pub use link::{LinkError, LinkMode, LinkParams, MessageId, SecretLink};
pub use payload::{MessagePayload, PayloadError};
pub use policy::{Policy, ValidationError};
pub use reader::{Opened, ReadStatus, Reader, ReaderAction, ReaderConfig};
pub use store::{KvStore, MemoryStore, Scope, StoreError};
