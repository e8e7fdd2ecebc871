//! Account registry

use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::traits::*;
use crate::types::*;

/// Account manager for registering and looking up accounts
#[derive(Clone)]
pub struct AccountManager<S: LedgerStorage> {
    storage: S,
    validator: Arc<dyn AccountValidator>,
}

impl<S: LedgerStorage> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Arc::new(DefaultAccountValidator),
        }
    }

    /// Create a new account manager with custom validator
    pub fn with_validator(storage: S, validator: Arc<dyn AccountValidator>) -> Self {
        Self { storage, validator }
    }

    /// Register a new account
    #[instrument(skip(self, name))]
    pub async fn create_account(&self, account_uuid: String, name: String) -> LedgerResult<Account> {
        let account = Account::new(account_uuid, name);

        self.validator.validate_account(&account)?;

        if self.account_exists(&account.account_uuid).await? {
            return Err(LedgerError::Validation(format!(
                "Account with ID '{}' already exists",
                account.account_uuid
            )));
        }

        self.storage.save_account(&account).await.map_err(|err| {
            error!(error = %err, "failed to save account");
            LedgerError::persistence("saving account", account.account_uuid.clone(), err)
        })?;

        info!("account registered");
        Ok(account)
    }

    /// Get an account by its identifier
    pub async fn get_account(&self, account_uuid: &str) -> LedgerResult<Option<Account>> {
        self.storage
            .get_account(account_uuid)
            .await
            .map_err(|err| LedgerError::persistence("getting account", account_uuid, err))
    }

    /// Get an account, returning an error if it does not exist
    pub async fn get_account_required(&self, account_uuid: &str) -> LedgerResult<Account> {
        self.get_account(account_uuid)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_uuid.to_string()))
    }

    /// Check whether an account exists
    pub async fn account_exists(&self, account_uuid: &str) -> LedgerResult<bool> {
        self.storage
            .account_exists(account_uuid)
            .await
            .map_err(|err| LedgerError::persistence("looking up account", account_uuid, err))
    }
}
