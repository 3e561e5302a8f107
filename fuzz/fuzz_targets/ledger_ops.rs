//! Fuzz target for ConsumptionLedger state transitions
//!
//! # Invariants
//!
//! - View counts only grow until `forget_all`
//! - The first-view time, once written, never changes until `forget_all`
//! - `end_session` clears destroyed flags and nothing else

#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use burnlink_core::{ConsumptionLedger, KvStore, MemoryStore, MessageId, Scope};
use chrono::{DateTime, TimeDelta, Utc};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum LedgerOp {
    RecordView { msg: u8 },
    MarkDestroyed { msg: u8 },
    MarkFirstView { msg: u8, secs: u32 },
    EndSession,
    ForgetAll,
}

fn at(secs: u32) -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + TimeDelta::seconds(i64::from(secs))
}

fuzz_target!(|ops: Vec<LedgerOp>| {
    let store = MemoryStore::new();
    let ledger = ConsumptionLedger::new(store.clone());
    let ids: Vec<MessageId> =
        (0..4u8).map(|i| MessageId::from_ciphertext(&format!("{i:02x}"))).collect();

    let mut views: HashMap<u8, u32> = HashMap::new();
    let mut first: HashMap<u8, DateTime<Utc>> = HashMap::new();

    for op in ops {
        match op {
            LedgerOp::RecordView { msg } => {
                let msg = msg % 4;
                let before = views.get(&msg).copied().unwrap_or(0);
                let after = ledger.record_view(&ids[msg as usize]).expect("memory store");
                assert!(after >= before);
                views.insert(msg, after);
            },
            LedgerOp::MarkDestroyed { msg } => {
                let id = &ids[(msg % 4) as usize];
                ledger.mark_destroyed(id).expect("memory store");
                assert!(ledger.is_destroyed(id).expect("memory store"));
            },
            LedgerOp::MarkFirstView { msg, secs } => {
                let msg = msg % 4;
                let effective =
                    ledger.mark_first_view(&ids[msg as usize], at(secs)).expect("memory store");
                let expected = *first.entry(msg).or_insert(effective);
                assert_eq!(effective, expected);
            },
            LedgerOp::EndSession => {
                store.end_session().expect("memory store");
                for (msg, count) in &views {
                    let id = &ids[*msg as usize];
                    assert!(!ledger.is_destroyed(id).expect("memory store"));
                    assert_eq!(ledger.view_count(id).expect("memory store"), *count);
                }
            },
            LedgerOp::ForgetAll => {
                ledger.forget_all().expect("memory store");
                views.clear();
                first.clear();
                for scope in Scope::ALL {
                    assert!(store.keys(scope, "burnlink.").expect("memory store").is_empty());
                }
            },
        }
    }
});
