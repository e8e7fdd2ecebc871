//! Core types and data structures for the ledger

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// An account that transactions can be recorded against
///
/// The ledger only ever needs to know whether an account exists; the name and
/// timestamp are kept for the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub account_uuid: String,
    /// Human-readable account name
    pub name: String,
    /// When the account was registered
    pub created_at: NaiveDateTime,
}

impl Account {
    /// Create a new account
    pub fn new(account_uuid: String, name: String) -> Self {
        Self {
            account_uuid,
            name,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Candidate transaction submitted for creation
///
/// Store-assigned fields (`created_at`, `updated_at`, `reconciled`) and the
/// derived running balance are absent here; the caller cannot set them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Optional caller-chosen identifier; a fresh v4 uuid is assigned when absent
    #[serde(default)]
    pub uuid: Option<String>,
    /// Owning account
    pub account_uuid: String,
    /// Economic date of the transaction
    pub occurred_at: NaiveDate,
    /// Free-text payee description
    pub payee: String,
    /// Signed amount in minor currency units
    pub amount: i64,
    /// Whether the transaction has settled at the institution
    #[serde(default)]
    pub cleared: bool,
    /// Optional budgeting envelope
    #[serde(default)]
    pub envelope_uuid: Option<String>,
}

impl NewTransaction {
    /// Create a new uncleared candidate with no envelope
    pub fn new(account_uuid: String, occurred_at: NaiveDate, payee: String, amount: i64) -> Self {
        Self {
            uuid: None,
            account_uuid,
            occurred_at,
            payee,
            amount,
            cleared: false,
            envelope_uuid: None,
        }
    }

    /// Turn the candidate into a record ready for the store.
    ///
    /// Timestamps are placeholders until the store assigns its own on insert.
    pub(crate) fn into_record(self, uuid: String) -> Transaction {
        let now = chrono::Utc::now().naive_utc();
        Transaction {
            uuid,
            account_uuid: self.account_uuid,
            occurred_at: self.occurred_at,
            payee: self.payee,
            amount: self.amount,
            cleared: self.cleared,
            reconciled: false,
            envelope_uuid: self.envelope_uuid,
            created_at: now,
            updated_at: now,
            rolling_total: None,
        }
    }
}

/// A transaction as persisted in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ledger-wide unique identifier
    pub uuid: String,
    /// Owning account
    pub account_uuid: String,
    /// Economic date, primary ordering key
    pub occurred_at: NaiveDate,
    /// Free-text payee description
    pub payee: String,
    /// Signed amount in minor currency units
    pub amount: i64,
    /// Settled at the institution (caller-asserted)
    pub cleared: bool,
    /// Matched against an external statement; always false on creation
    pub reconciled: bool,
    /// Optional budgeting envelope
    pub envelope_uuid: Option<String>,
    /// Store insert time, secondary ordering key
    #[serde(skip)]
    pub created_at: NaiveDateTime,
    #[serde(skip)]
    pub updated_at: NaiveDateTime,
    /// Running balance of the account after this row; only set on listed rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_total: Option<i64>,
}

impl Transaction {
    /// Ledger ordering key: occurrence date, then insert time, then uuid
    pub fn ordering_key(&self) -> (NaiveDate, NaiveDateTime, &str) {
        (self.occurred_at, self.created_at, &self.uuid)
    }
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Account {0} not found")]
    AccountNotFound(String),
    /// Any other storage failure; the driver error is kept as the source for
    /// operators and never rendered in the message.
    #[error("error {operation} for {target}")]
    PersistenceFailure {
        operation: &'static str,
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Running balance overflowed for account {account_uuid}")]
    BalanceOverflow { account_uuid: String },
}

impl LedgerError {
    /// Wrap a store error as an opaque persistence failure
    pub fn persistence<E>(operation: &'static str, target: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        LedgerError::PersistenceFailure {
            operation,
            target: target.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error means the referenced account does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::AccountNotFound(_))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_persistence_failure_hides_driver_text() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "socket reset by peer");
        let err = LedgerError::persistence("writing transaction", "t-1", io);

        assert_eq!(err.to_string(), "error writing transaction for t-1");
        assert!(!err.is_not_found());
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "socket reset by peer");
    }

    #[test]
    fn test_new_transaction_record_defaults() {
        let candidate = NewTransaction::new(
            "A1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Rent".to_string(),
            -1000,
        );
        let record = candidate.into_record("t-1".to_string());

        assert_eq!(record.uuid, "t-1");
        assert!(!record.reconciled);
        assert!(!record.cleared);
        assert_eq!(record.rolling_total, None);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_transaction_wire_shape() {
        let mut record = NewTransaction::new(
            "A1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Rent".to_string(),
            -1000,
        )
        .into_record("t-1".to_string());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["uuid"], "t-1");
        assert_eq!(json["occurred_at"], "2024-01-01");
        assert_eq!(json["reconciled"], false);
        assert!(json.get("created_at").is_none());
        assert!(json.get("rolling_total").is_none());

        record.rolling_total = Some(-1000);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["rolling_total"], -1000);
    }

    #[test]
    fn test_new_transaction_decodes_with_defaults() {
        let candidate: NewTransaction = serde_json::from_str(
            r#"{"account_uuid":"A1","occurred_at":"2024-03-05","payee":"Grocer","amount":-2599}"#,
        )
        .unwrap();

        assert_eq!(candidate.uuid, None);
        assert!(!candidate.cleared);
        assert_eq!(candidate.envelope_uuid, None);
        assert_eq!(candidate.amount, -2599);
    }
}
