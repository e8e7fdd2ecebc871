//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// Errors raised by [`MemoryStorage`]
#[derive(Debug, thiserror::Error)]
pub enum MemoryStorageError {
    #[error("insert on transactions violates foreign key: account {0} is not present")]
    ForeignKey(String),
    #[error("duplicate key: {0} already exists")]
    DuplicateKey(String),
    #[error("storage lock poisoned")]
    Poisoned,
}

#[derive(Debug, Default)]
struct TransactionTable {
    uuids: HashSet<String>,
    by_account: HashMap<String, Vec<Transaction>>,
    /// Last insert timestamp handed out; keeps `created_at` strictly increasing
    clock: Option<NaiveDateTime>,
}

impl TransactionTable {
    fn next_timestamp(&mut self) -> NaiveDateTime {
        let now = chrono::Utc::now().naive_utc();
        let stamp = match self.clock {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.clock = Some(stamp);
        stamp
    }
}

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    transactions: Arc<RwLock<TransactionTable>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions across all accounts
    pub fn transaction_count(&self) -> Result<usize, MemoryStorageError> {
        let table = self
            .transactions
            .read()
            .map_err(|_| MemoryStorageError::Poisoned)?;
        Ok(table.uuids.len())
    }
}

impl ErrorClassifier for MemoryStorage {
    type Error = MemoryStorageError;

    fn classify(&self, error: &MemoryStorageError) -> ErrorKind {
        match error {
            MemoryStorageError::ForeignKey(_) => ErrorKind::ForeignKeyViolation,
            _ => ErrorKind::Other,
        }
    }
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn save_account(&self, account: &Account) -> Result<(), MemoryStorageError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| MemoryStorageError::Poisoned)?;
        if accounts.contains_key(&account.account_uuid) {
            return Err(MemoryStorageError::DuplicateKey(account.account_uuid.clone()));
        }
        accounts.insert(account.account_uuid.clone(), account.clone());
        Ok(())
    }

    async fn get_account(&self, account_uuid: &str) -> Result<Option<Account>, MemoryStorageError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| MemoryStorageError::Poisoned)?;
        Ok(accounts.get(account_uuid).cloned())
    }

    async fn account_exists(&self, account_uuid: &str) -> Result<bool, MemoryStorageError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| MemoryStorageError::Poisoned)?;
        Ok(accounts.contains_key(account_uuid))
    }

    async fn insert_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Transaction, MemoryStorageError> {
        // Lock order: accounts, then transactions.
        let accounts = self
            .accounts
            .read()
            .map_err(|_| MemoryStorageError::Poisoned)?;
        let mut table = self
            .transactions
            .write()
            .map_err(|_| MemoryStorageError::Poisoned)?;

        if !accounts.contains_key(&transaction.account_uuid) {
            return Err(MemoryStorageError::ForeignKey(transaction.account_uuid.clone()));
        }
        if table.uuids.contains(&transaction.uuid) {
            return Err(MemoryStorageError::DuplicateKey(transaction.uuid.clone()));
        }

        let stamp = table.next_timestamp();
        let stored = Transaction {
            created_at: stamp,
            updated_at: stamp,
            reconciled: false,
            rolling_total: None,
            ..transaction.clone()
        };

        table.uuids.insert(stored.uuid.clone());
        table
            .by_account
            .entry(stored.account_uuid.clone())
            .or_default()
            .push(stored.clone());

        Ok(stored)
    }

    async fn account_transactions(
        &self,
        account_uuid: &str,
    ) -> Result<Vec<Transaction>, MemoryStorageError> {
        let table = self
            .transactions
            .read()
            .map_err(|_| MemoryStorageError::Poisoned)?;
        let mut rows = table.by_account.get(account_uuid).cloned().unwrap_or_default();
        rows.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        Ok(rows)
    }
}
