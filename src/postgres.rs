//! Postgres-backed ledger storage.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | ErrorKind | Scenario |
//! |------------|----------------------|-----------|----------|
//! | Database (foreign key violation on `transactions_account_uuid_fkey`) | `23503` | `ForeignKeyViolation` | Insert for an unknown account |
//! | Database (other) | Any other | `Other` | Duplicate uuid, check constraints, ... |
//! | PoolTimedOut / Io / Tls / ... | N/A | `Other` | Connectivity, acquire or statement timeout |
//!
//! ## Thread Safety
//!
//! `PgLedgerStorage` is `Send + Sync + Clone`; clones share one connection pool.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use tracing::instrument;

use crate::config::PgStorageConfig;
use crate::traits::*;
use crate::types::*;

const SCHEMA: &str = include_str!("../migrations/0001_create_ledger.sql");

/// Name of the only foreign key a transaction insert can violate
const ACCOUNT_FOREIGN_KEY: &str = "transactions_account_uuid_fkey";

const TRANSACTION_COLUMNS: &str = "transaction_uuid, account_uuid, occurred_at, payee, amount, \
     cleared, reconciled, created_at, updated_at, envelope_uuid";

/// Error raised by [`PgLedgerStorage`]
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct PgStorageError(#[from] sqlx::Error);

impl PgStorageError {
    pub fn as_sqlx(&self) -> &sqlx::Error {
        &self.0
    }
}

/// Ledger storage on a Postgres connection pool
#[derive(Debug, Clone)]
pub struct PgLedgerStorage {
    pool: PgPool,
}

impl PgLedgerStorage {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool from configuration.
    ///
    /// Every connection gets the configured `statement_timeout`, so a stuck
    /// query fails instead of blocking the caller.
    pub async fn connect(config: &PgStorageConfig) -> Result<Self, PgStorageError> {
        let options = PgConnectOptions::from_str(&config.database_url)?.options([(
            "statement_timeout",
            config.statement_timeout.as_millis().to_string(),
        )]);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Create the `accounts` and `transactions` relations if missing
    pub async fn migrate(&self) -> Result<(), PgStorageError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn transaction_from_row(row: &PgRow) -> Result<Transaction, sqlx::Error> {
    Ok(Transaction {
        uuid: row.try_get("transaction_uuid")?,
        account_uuid: row.try_get("account_uuid")?,
        occurred_at: row.try_get("occurred_at")?,
        payee: row.try_get("payee")?,
        amount: row.try_get("amount")?,
        cleared: row.try_get("cleared")?,
        reconciled: row.try_get("reconciled")?,
        envelope_uuid: row.try_get("envelope_uuid")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        rolling_total: None,
    })
}

impl ErrorClassifier for PgLedgerStorage {
    type Error = PgStorageError;

    fn classify(&self, error: &PgStorageError) -> ErrorKind {
        if let sqlx::Error::Database(db_err) = error.as_sqlx() {
            let is_fk = db_err.code().as_deref() == Some("23503");
            let on_account = db_err
                .constraint()
                .map_or(true, |name| name == ACCOUNT_FOREIGN_KEY);
            if is_fk && on_account {
                return ErrorKind::ForeignKeyViolation;
            }
        }
        ErrorKind::Other
    }
}

#[async_trait]
impl LedgerStorage for PgLedgerStorage {
    async fn save_account(&self, account: &Account) -> Result<(), PgStorageError> {
        sqlx::query("INSERT INTO accounts (account_uuid, name, created_at) VALUES ($1, $2, $3)")
            .bind(&account.account_uuid)
            .bind(&account.name)
            .bind(account.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_account(&self, account_uuid: &str) -> Result<Option<Account>, PgStorageError> {
        let row = sqlx::query(
            "SELECT account_uuid, name, created_at FROM accounts WHERE account_uuid = $1",
        )
        .bind(account_uuid)
        .fetch_optional(&self.pool)
        .await?;

        let account = match row {
            Some(row) => Some(Account {
                account_uuid: row.try_get("account_uuid")?,
                name: row.try_get("name")?,
                created_at: row.try_get("created_at")?,
            }),
            None => None,
        };
        Ok(account)
    }

    async fn account_exists(&self, account_uuid: &str) -> Result<bool, PgStorageError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM accounts WHERE account_uuid = $1)")
            .bind(account_uuid)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<bool, _>(0)?)
    }

    #[instrument(skip(self, transaction), fields(transaction_uuid = %transaction.uuid), err)]
    async fn insert_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Transaction, PgStorageError> {
        let sql = format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, FALSE, \
                     clock_timestamp() AT TIME ZONE 'utc', clock_timestamp() AT TIME ZONE 'utc', $7) \
             RETURNING {TRANSACTION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&transaction.uuid)
            .bind(&transaction.account_uuid)
            .bind(transaction.occurred_at)
            .bind(&transaction.payee)
            .bind(transaction.amount)
            .bind(transaction.cleared)
            .bind(&transaction.envelope_uuid)
            .fetch_one(&self.pool)
            .await?;

        Ok(transaction_from_row(&row)?)
    }

    #[instrument(skip(self), err)]
    async fn account_transactions(
        &self,
        account_uuid: &str,
    ) -> Result<Vec<Transaction>, PgStorageError> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE account_uuid = $1 \
             ORDER BY occurred_at, created_at, transaction_uuid"
        );
        let rows = sqlx::query(&sql)
            .bind(account_uuid)
            .fetch_all(&self.pool)
            .await?;

        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            transactions.push(transaction_from_row(row)?);
        }
        Ok(transactions)
    }
}
