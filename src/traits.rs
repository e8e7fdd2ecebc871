//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::config::LedgerConfig;
use crate::types::*;

/// How the engine should treat a storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The write referenced an account that does not exist
    ForeignKeyViolation,
    /// Anything else: connectivity, decoding, other constraints
    Other,
}

/// Store capability that maps driver errors onto [`ErrorKind`]
///
/// The ledger never looks inside a driver error; it only asks the store
/// that produced it.
pub trait ErrorClassifier {
    type Error: std::error::Error + Send + Sync + 'static;

    fn classify(&self, error: &Self::Error) -> ErrorKind;
}

/// Storage abstraction for the ledger system
///
/// This trait allows the ledger to work with any storage backend
/// (PostgreSQL, in-memory, etc.) by implementing these methods. Every method
/// must be safe to call concurrently from several tasks.
#[async_trait]
pub trait LedgerStorage: ErrorClassifier + Send + Sync {
    /// Save an account to storage
    async fn save_account(&self, account: &Account) -> Result<(), Self::Error>;

    /// Get an account by its identifier
    async fn get_account(&self, account_uuid: &str) -> Result<Option<Account>, Self::Error>;

    /// Check whether an account exists
    async fn account_exists(&self, account_uuid: &str) -> Result<bool, Self::Error>;

    /// Insert one transaction atomically and return the row as persisted.
    ///
    /// The store assigns `created_at`/`updated_at` and must reject a missing
    /// account with an error that classifies as [`ErrorKind::ForeignKeyViolation`].
    async fn insert_transaction(&self, transaction: &Transaction)
        -> Result<Transaction, Self::Error>;

    /// All transactions of one account, ordered by (`occurred_at`, `created_at`)
    async fn account_transactions(&self, account_uuid: &str)
        -> Result<Vec<Transaction>, Self::Error>;
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before saving
    fn validate_account(&self, account: &Account) -> LedgerResult<()>;
}

/// Trait for implementing custom transaction validation rules
pub trait TransactionValidator: Send + Sync {
    /// Validate a candidate before it reaches the store
    fn validate_transaction(&self, transaction: &NewTransaction) -> LedgerResult<()>;
}

/// Default account validator with basic rules
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        if account.account_uuid.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account ID cannot be empty".to_string(),
            ));
        }

        if account.name.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default transaction validator: requires an account reference and bounds the payee
pub struct DefaultTransactionValidator {
    max_payee_length: usize,
}

impl DefaultTransactionValidator {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            max_payee_length: config.max_payee_length,
        }
    }
}

impl Default for DefaultTransactionValidator {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &NewTransaction) -> LedgerResult<()> {
        if transaction.account_uuid.trim().is_empty() {
            return Err(LedgerError::Validation(
                "Transaction account cannot be empty".to_string(),
            ));
        }

        if transaction.payee.chars().count() > self.max_payee_length {
            return Err(LedgerError::Validation(format!(
                "Payee cannot exceed {} characters",
                self.max_payee_length
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candidate(account_uuid: &str, payee: &str) -> NewTransaction {
        NewTransaction::new(
            account_uuid.to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            payee.to_string(),
            100,
        )
    }

    #[test]
    fn test_default_validator_rejects_blank_account() {
        let validator = DefaultTransactionValidator::default();
        let err = validator
            .validate_transaction(&candidate("  ", "Rent"))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_default_validator_bounds_payee() {
        let validator =
            DefaultTransactionValidator::from_config(&LedgerConfig::default().with_max_payee_length(4));
        assert!(validator.validate_transaction(&candidate("A1", "Rent")).is_ok());
        assert!(validator.validate_transaction(&candidate("A1", "Rental")).is_err());
    }

    #[test]
    fn test_default_validator_allows_empty_payee() {
        let validator = DefaultTransactionValidator::default();
        assert!(validator.validate_transaction(&candidate("A1", "")).is_ok());
    }

    #[test]
    fn test_default_account_validator() {
        let validator = DefaultAccountValidator;
        assert!(validator
            .validate_account(&Account::new("A1".to_string(), "Checking".to_string()))
            .is_ok());
        assert!(validator
            .validate_account(&Account::new("A1".to_string(), " ".to_string()))
            .is_err());
    }
}
