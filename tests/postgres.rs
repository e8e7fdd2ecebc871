//! Postgres storage tests; need a live database at `DATABASE_URL`.
//!
//! Run with `cargo test --features postgres -- --ignored`.

#![cfg(feature = "postgres")]

use chrono::NaiveDate;
use envelope_ledger::{postgres::PgLedgerStorage, Ledger, LedgerError, NewTransaction, PgStorageConfig};

async fn ledger() -> Ledger<PgLedgerStorage> {
    let config = PgStorageConfig::from_env().unwrap();
    let storage = PgLedgerStorage::connect(&config).await.unwrap();
    storage.migrate().await.unwrap();
    Ledger::new(storage)
}

fn unique_account() -> String {
    format!("acct-{}", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn test_pg_round_trip_and_ordering() {
    let ledger = ledger().await;
    let account = unique_account();
    ledger
        .create_account(account.clone(), "Checking".to_string())
        .await
        .unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let first = ledger
        .create_transaction(NewTransaction::new(account.clone(), day, "Rent".to_string(), -1000))
        .await
        .unwrap();
    let second = ledger
        .create_transaction(NewTransaction::new(account.clone(), day, "Refund".to_string(), 400))
        .await
        .unwrap();
    assert!(!first.reconciled);

    let rows = ledger.list_transactions(&account).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].uuid, first.uuid);
    assert_eq!(rows[0].rolling_total, Some(-1000));
    assert_eq!(rows[1].uuid, second.uuid);
    assert_eq!(rows[1].rolling_total, Some(-600));
}

#[tokio::test]
#[ignore]
async fn test_pg_foreign_key_maps_to_not_found() {
    let ledger = ledger().await;
    let account = unique_account();

    let err = ledger
        .create_transaction(NewTransaction::new(
            account.clone(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Rent".to_string(),
            -1000,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound(ref id) if *id == account));

    assert!(ledger.list_transactions(&account).await.unwrap_err().is_not_found());
}
