//! Transaction storage and ledger retrieval

use chrono::NaiveDate;
use tracing::{debug, error, instrument, warn};

use crate::traits::*;
use crate::types::*;

/// Append-only transaction store with ordered, running-balance reads
///
/// Wraps an injected [`LedgerStorage`] and turns its errors into the ledger's
/// error taxonomy.
#[derive(Debug, Clone)]
pub struct TransactionManager<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> TransactionManager<S> {
    /// Create a new transaction manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Persist one transaction and return it as stored.
    ///
    /// A missing account surfaces as [`LedgerError::AccountNotFound`]; every
    /// other store failure as [`LedgerError::PersistenceFailure`].
    #[instrument(
        skip(self, transaction),
        fields(
            transaction_uuid = %transaction.uuid,
            account_uuid = %transaction.account_uuid
        )
    )]
    pub async fn append(&self, transaction: &Transaction) -> LedgerResult<Transaction> {
        match self.storage.insert_transaction(transaction).await {
            Ok(stored) => {
                debug!(amount = stored.amount, "transaction appended");
                Ok(stored)
            }
            Err(err) => match self.storage.classify(&err) {
                ErrorKind::ForeignKeyViolation => {
                    warn!("append rejected, account not found");
                    Err(LedgerError::AccountNotFound(
                        transaction.account_uuid.clone(),
                    ))
                }
                ErrorKind::Other => {
                    error!(error = %err, "failed to write transaction");
                    Err(LedgerError::persistence(
                        "writing transaction",
                        transaction.uuid.clone(),
                        err,
                    ))
                }
            },
        }
    }

    /// All transactions of an account in ledger order with running balances.
    ///
    /// The account is looked up before any row is read, so an unknown account
    /// fails with [`LedgerError::AccountNotFound`] even when it has no rows.
    /// Any read failure discards whatever was fetched.
    #[instrument(skip(self))]
    pub async fn list_by_account(&self, account_uuid: &str) -> LedgerResult<Vec<Transaction>> {
        let exists = self
            .storage
            .account_exists(account_uuid)
            .await
            .map_err(|err| {
                error!(error = %err, "failed to look up account");
                LedgerError::persistence("looking up account", account_uuid, err)
            })?;
        if !exists {
            warn!("list rejected, account not found");
            return Err(LedgerError::AccountNotFound(account_uuid.to_string()));
        }

        let mut rows = self
            .storage
            .account_transactions(account_uuid)
            .await
            .map_err(|err| {
                error!(error = %err, "failed to read transactions");
                LedgerError::persistence("getting transactions", account_uuid, err)
            })?;

        rows.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
        apply_rolling_totals(account_uuid, &mut rows)?;

        debug!(count = rows.len(), "transactions listed");
        Ok(rows)
    }
}

/// Set each row's `rolling_total` to the prefix sum of `amount`.
///
/// Rows must already be in ledger order and belong to `account_uuid`.
pub fn apply_rolling_totals(account_uuid: &str, rows: &mut [Transaction]) -> LedgerResult<()> {
    let mut total: i64 = 0;
    for row in rows.iter_mut() {
        total = total
            .checked_add(row.amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account_uuid: account_uuid.to_string(),
            })?;
        row.rolling_total = Some(total);
    }
    Ok(())
}

/// Builder for transaction candidates
#[derive(Debug)]
pub struct TransactionBuilder {
    transaction: NewTransaction,
}

impl TransactionBuilder {
    /// Create a new transaction builder
    pub fn new(account_uuid: String, occurred_at: NaiveDate, payee: String, amount: i64) -> Self {
        Self {
            transaction: NewTransaction::new(account_uuid, occurred_at, payee, amount),
        }
    }

    /// Use a caller-chosen uuid instead of a generated one
    pub fn uuid(mut self, uuid: String) -> Self {
        self.transaction.uuid = Some(uuid);
        self
    }

    /// Mark the transaction as cleared
    pub fn cleared(mut self, cleared: bool) -> Self {
        self.transaction.cleared = cleared;
        self
    }

    /// File the transaction under a budgeting envelope
    pub fn envelope(mut self, envelope_uuid: String) -> Self {
        self.transaction.envelope_uuid = Some(envelope_uuid);
        self
    }

    /// Build the candidate, checking it against the default rules
    pub fn build(self) -> LedgerResult<NewTransaction> {
        DefaultTransactionValidator::default().validate_transaction(&self.transaction)?;
        Ok(self.transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    async fn storage_with_account(account_uuid: &str) -> MemoryStorage {
        let storage = MemoryStorage::new();
        storage
            .save_account(&Account::new(account_uuid.to_string(), "Checking".to_string()))
            .await
            .unwrap();
        storage
    }

    fn record(uuid: &str, account_uuid: &str, day: u32, amount: i64) -> Transaction {
        NewTransaction::new(account_uuid.to_string(), date(day), "Payee".to_string(), amount)
            .into_record(uuid.to_string())
    }

    #[test]
    fn test_rolling_totals_prefix_sum() {
        let mut rows = vec![
            record("t1", "A1", 1, 500),
            record("t2", "A1", 2, -200),
            record("t3", "A1", 3, 50),
        ];
        apply_rolling_totals("A1", &mut rows).unwrap();

        let totals: Vec<Option<i64>> = rows.iter().map(|t| t.rolling_total).collect();
        assert_eq!(totals, vec![Some(500), Some(300), Some(350)]);
    }

    #[test]
    fn test_rolling_totals_overflow() {
        let mut rows = vec![record("t1", "A1", 1, i64::MAX), record("t2", "A1", 2, 1)];
        let err = apply_rolling_totals("A1", &mut rows).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow { .. }));
    }

    #[tokio::test]
    async fn test_append_unknown_account_is_not_found() {
        let storage = MemoryStorage::new();
        let manager = TransactionManager::new(storage.clone());

        let err = manager
            .append(&record("t1", "ghost", 1, 10))
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::AccountNotFound(ref id) if id == "ghost"));
        assert_eq!(storage.transaction_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_duplicate_uuid_is_persistence_failure() {
        let manager = TransactionManager::new(storage_with_account("A1").await);
        manager.append(&record("t1", "A1", 1, 10)).await.unwrap();

        let err = manager.append(&record("t1", "A1", 2, 10)).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::PersistenceFailure { operation: "writing transaction", .. }
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_occurrence_then_creation() {
        let manager = TransactionManager::new(storage_with_account("A1").await);
        manager.append(&record("late", "A1", 20, 1)).await.unwrap();
        manager.append(&record("same-1", "A1", 5, 10)).await.unwrap();
        manager.append(&record("same-2", "A1", 5, 100)).await.unwrap();
        manager.append(&record("early", "A1", 1, 1000)).await.unwrap();

        let rows = manager.list_by_account("A1").await.unwrap();
        let order: Vec<(&str, Option<i64>)> = rows
            .iter()
            .map(|t| (t.uuid.as_str(), t.rolling_total))
            .collect();

        assert_eq!(
            order,
            vec![
                ("early", Some(1000)),
                ("same-1", Some(1010)),
                ("same-2", Some(1110)),
                ("late", Some(1111)),
            ]
        );
    }

    #[test]
    fn test_tied_rows_order_by_uuid() {
        let stamp = date(5).and_hms_opt(12, 0, 0).unwrap();
        let tied = |uuid: &str, amount: i64| {
            let mut row = record(uuid, "A1", 5, amount);
            row.created_at = stamp;
            row.updated_at = stamp;
            row
        };

        let mut forward = vec![tied("b", 10), tied("a", 100), tied("c", 1)];
        let mut backward = vec![tied("c", 1), tied("a", 100), tied("b", 10)];
        for rows in [&mut forward, &mut backward] {
            rows.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
            apply_rolling_totals("A1", rows).unwrap();
        }

        let listed: Vec<(&str, Option<i64>)> = forward
            .iter()
            .map(|t| (t.uuid.as_str(), t.rolling_total))
            .collect();
        assert_eq!(listed, vec![("a", Some(100)), ("b", Some(110)), ("c", Some(111))]);
        assert_eq!(forward, backward);
    }

    #[tokio::test]
    async fn test_list_empty_account() {
        let manager = TransactionManager::new(storage_with_account("A1").await);
        assert!(manager.list_by_account("A1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_unknown_account() {
        let manager = TransactionManager::new(MemoryStorage::new());
        let err = manager.list_by_account("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_builder() {
        let candidate = TransactionBuilder::new("A1".to_string(), date(1), "Rent".to_string(), -1000)
            .cleared(true)
            .envelope("housing".to_string())
            .build()
            .unwrap();

        assert!(candidate.cleared);
        assert_eq!(candidate.envelope_uuid.as_deref(), Some("housing"));
        assert_eq!(candidate.uuid, None);

        assert!(TransactionBuilder::new(String::new(), date(1), "Rent".to_string(), 1)
            .build()
            .is_err());
    }
}
