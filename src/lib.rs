//! # Envelope Ledger
//!
//! A per-account transaction ledger: records money movements against accounts
//! and serves each account's transactions in order with a running balance.
//!
//! ## Features
//!
//! - **Ordered ledger**: transactions ordered by occurrence date, then creation time
//! - **Running balance**: prefix sums recomputed on every read, never stored
//! - **Referential integrity**: a transaction can only reference an existing account
//! - **Error taxonomy**: unknown accounts are reported apart from storage failures
//! - **Storage abstraction**: in-memory store built in, Postgres behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use envelope_ledger::{Ledger, TransactionBuilder, utils::MemoryStorage};
//! use chrono::NaiveDate;
//!
//! async fn record() -> envelope_ledger::LedgerResult<i64> {
//!     let ledger = Ledger::new(MemoryStorage::new());
//!     ledger.create_account("A1".to_string(), "Checking".to_string()).await?;
//!
//!     let rent = TransactionBuilder::new(
//!         "A1".to_string(),
//!         NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!         "Rent".to_string(),
//!         -1000,
//!     )
//!     .cleared(true)
//!     .build()?;
//!     ledger.create_transaction(rent).await?;
//!
//!     ledger.get_account_balance("A1").await
//! }
//! ```

pub mod config;
pub mod ledger;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use traits::*;
pub use types::*;
