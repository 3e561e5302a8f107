//! Consumption state survives process restarts.
//!
//! Each block opens the state file afresh, the way separate `burnlink`
//! invocations do.

use std::future::Ready;

use burnlink_cli::{RedbStore, commands};
use burnlink_core::{
    ConsumptionLedger, KeySource, KvStore, ReadStatus, ReaderConfig, Scope, SecretLink,
};
use burnlink_harness::{SIM_BASE_URL, SimBrowser, SimEnv};
use tempfile::tempdir;

async fn open(env: &SimEnv, store: RedbStore, link: &SecretLink) -> ReadStatus {
    let mut out = Vec::new();
    commands::open(
        env.clone(),
        store,
        ReaderConfig::default(),
        link.as_str(),
        None,
        None::<Ready<()>>,
        &mut out,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn read_once_across_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.redb");
    let browser = SimBrowser::default();
    let link = browser.composer().create_link("only once", 0, KeySource::Direct).unwrap();

    {
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(open(browser.env(), store, &link).await, ReadStatus::Success);
    }

    {
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(open(browser.env(), store, &link).await, ReadStatus::Destroyed);
    }
}

#[tokio::test]
async fn view_count_outlives_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.redb");
    let browser = SimBrowser::default();
    let link = browser.composer().create_link("only once", 0, KeySource::Direct).unwrap();
    let id = link.params().unwrap().message_id();

    {
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(open(browser.env(), store, &link).await, ReadStatus::Success);
    }

    {
        let store = RedbStore::open(&path).unwrap();
        store.end_session().unwrap();

        let ledger = ConsumptionLedger::new(store.clone());
        assert!(!ledger.is_destroyed(&id).unwrap());
        assert_eq!(ledger.view_count(&id).unwrap(), 1);

        assert_eq!(open(browser.env(), store, &link).await, ReadStatus::Destroyed);
    }
}

#[tokio::test]
async fn forget_clears_state_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.redb");
    let env = SimEnv::new();
    let link = commands::create(
        env.clone(),
        SIM_BASE_URL.to_string(),
        "forget me".to_string().into(),
        0,
        None,
    )
    .await
    .unwrap();

    {
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(open(&env, store, &link).await, ReadStatus::Success);
    }

    {
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(commands::forget(&store).unwrap(), 2);
        for scope in Scope::ALL {
            assert!(store.keys(scope, "burnlink.").unwrap().is_empty());
        }
    }

    {
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(open(&env, store, &link).await, ReadStatus::Success);
    }
}
