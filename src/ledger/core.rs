//! Main ledger orchestrator that coordinates accounts and transactions

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::config::LedgerConfig;
use crate::ledger::{AccountManager, TransactionManager};
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::EnhancedAccountValidator;

/// Main ledger system: the entry point for creating and listing transactions
///
/// Cloning is cheap; clones share the store and validators, so a ledger can be
/// handed to concurrent tasks.
#[derive(Clone)]
pub struct Ledger<S: LedgerStorage> {
    account_manager: AccountManager<S>,
    transaction_manager: TransactionManager<S>,
    validator: Arc<dyn TransactionValidator>,
}

impl<S: LedgerStorage + Clone> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, &LedgerConfig::default())
    }

    /// Create a new ledger whose default validators follow `config`
    pub fn with_config(storage: S, config: &LedgerConfig) -> Self {
        Self {
            account_manager: AccountManager::with_validator(
                storage.clone(),
                Arc::new(EnhancedAccountValidator::from_config(config)),
            ),
            transaction_manager: TransactionManager::new(storage),
            validator: Arc::new(DefaultTransactionValidator::from_config(config)),
        }
    }

    /// Create a new ledger with custom validators
    pub fn with_validators(
        storage: S,
        account_validator: Arc<dyn AccountValidator>,
        transaction_validator: Arc<dyn TransactionValidator>,
    ) -> Self {
        Self {
            account_manager: AccountManager::with_validator(storage.clone(), account_validator),
            transaction_manager: TransactionManager::new(storage),
            validator: transaction_validator,
        }
    }
}

impl<S: LedgerStorage> Ledger<S> {
    // Account operations
    /// Register a new account
    pub async fn create_account(&self, account_uuid: String, name: String) -> LedgerResult<Account> {
        self.account_manager.create_account(account_uuid, name).await
    }

    /// Get an account by its identifier
    pub async fn get_account(&self, account_uuid: &str) -> LedgerResult<Option<Account>> {
        self.account_manager.get_account(account_uuid).await
    }

    // Transaction operations
    /// Validate a candidate, assign its uuid and persist it.
    ///
    /// The returned transaction carries the store-assigned timestamps and
    /// `reconciled == false`; `rolling_total` is left unset.
    #[instrument(
        skip(self, candidate),
        fields(account_uuid = %candidate.account_uuid, occurred_at = %candidate.occurred_at)
    )]
    pub async fn create_transaction(&self, candidate: NewTransaction) -> LedgerResult<Transaction> {
        if let Err(err) = self.validator.validate_transaction(&candidate) {
            warn!(error = %err, "transaction rejected");
            return Err(err);
        }

        let uuid = candidate
            .uuid
            .clone()
            .filter(|uuid| !uuid.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        debug!(transaction_uuid = %uuid, "creating transaction");

        self.transaction_manager
            .append(&candidate.into_record(uuid))
            .await
    }

    /// The account's ledger: every transaction in order with its running balance
    pub async fn list_transactions(&self, account_uuid: &str) -> LedgerResult<Vec<Transaction>> {
        if account_uuid.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account ID cannot be empty".to_string(),
            ));
        }
        self.transaction_manager.list_by_account(account_uuid).await
    }

    /// Current balance of an account: the last running total, zero when empty
    pub async fn get_account_balance(&self, account_uuid: &str) -> LedgerResult<i64> {
        let rows = self.list_transactions(account_uuid).await?;
        Ok(rows.last().and_then(|t| t.rolling_total).unwrap_or(0))
    }
}
