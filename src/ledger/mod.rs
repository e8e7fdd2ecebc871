//! Ledger module containing the account registry and transaction processing

pub mod account;
pub mod core;
pub mod transaction;

pub use account::*;
pub use self::core::*;
pub use transaction::*;
