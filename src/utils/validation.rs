//! Validation utilities

use crate::config::LedgerConfig;
use crate::traits::*;
use crate::types::*;

/// Validate that an account identifier is valid
pub fn validate_account_uuid(account_uuid: &str, max_length: usize) -> LedgerResult<()> {
    if account_uuid.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account ID cannot be empty".to_string(),
        ));
    }

    if account_uuid.chars().count() > max_length {
        return Err(LedgerError::Validation(format!(
            "Account ID cannot exceed {} characters",
            max_length
        )));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !account_uuid
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LedgerError::Validation(
            "Account ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that an account name is valid
pub fn validate_account_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > 100 {
        return Err(LedgerError::Validation(
            "Account name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an optional identifier, when present, is a well-formed uuid
pub fn validate_uuid_syntax(field: &str, value: Option<&str>) -> LedgerResult<()> {
    match value {
        Some(raw) if uuid::Uuid::parse_str(raw).is_err() => Err(LedgerError::Validation(format!(
            "{} '{}' is not a valid uuid",
            field, raw
        ))),
        _ => Ok(()),
    }
}

/// Transaction validator that also checks identifier syntax
pub struct EnhancedTransactionValidator {
    base: DefaultTransactionValidator,
}

impl EnhancedTransactionValidator {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            base: DefaultTransactionValidator::from_config(config),
        }
    }
}

impl Default for EnhancedTransactionValidator {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(&self, transaction: &NewTransaction) -> LedgerResult<()> {
        self.base.validate_transaction(transaction)?;

        validate_uuid_syntax("Transaction uuid", transaction.uuid.as_deref())?;
        validate_uuid_syntax("Envelope uuid", transaction.envelope_uuid.as_deref())?;

        Ok(())
    }
}

/// Account validator with character-set and length rules
pub struct EnhancedAccountValidator {
    max_account_uuid_length: usize,
}

impl EnhancedAccountValidator {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            max_account_uuid_length: config.max_account_uuid_length,
        }
    }
}

impl Default for EnhancedAccountValidator {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

impl AccountValidator for EnhancedAccountValidator {
    fn validate_account(&self, account: &Account) -> LedgerResult<()> {
        validate_account_uuid(&account.account_uuid, self.max_account_uuid_length)?;
        validate_account_name(&account.name)?;
        Ok(())
    }
}
