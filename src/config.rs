//! Ledger and storage configuration

use serde::{Deserialize, Serialize};

/// Validation limits applied by the default validators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Longest payee text accepted on a new transaction
    pub max_payee_length: usize,
    /// Longest account identifier accepted by the registry
    pub max_account_uuid_length: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_payee_length: 500,
            max_account_uuid_length: 50,
        }
    }
}

impl LedgerConfig {
    pub fn with_max_payee_length(mut self, max_payee_length: usize) -> Self {
        self.max_payee_length = max_payee_length;
        self
    }

    pub fn with_max_account_uuid_length(mut self, max_account_uuid_length: usize) -> Self {
        self.max_account_uuid_length = max_account_uuid_length;
        self
    }
}

#[cfg(feature = "postgres")]
pub use pg::*;

#[cfg(feature = "postgres")]
mod pg {
    use serde::{Deserialize, Serialize};
    use std::str::FromStr;
    use std::time::Duration;

    use crate::types::{LedgerError, LedgerResult};

    /// Connection pool settings for the Postgres backend
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PgStorageConfig {
        pub database_url: String,
        pub max_connections: u32,
        /// How long to wait for a pooled connection
        pub acquire_timeout: Duration,
        /// Server-side `statement_timeout` set on every connection
        pub statement_timeout: Duration,
    }

    impl PgStorageConfig {
        pub fn new(database_url: impl Into<String>) -> Self {
            Self {
                database_url: database_url.into(),
                max_connections: 5,
                acquire_timeout: Duration::from_secs(5),
                statement_timeout: Duration::from_secs(30),
            }
        }

        /// Read settings from the environment.
        ///
        /// `DATABASE_URL` is required; `LEDGER_DB_MAX_CONNECTIONS`,
        /// `LEDGER_DB_ACQUIRE_TIMEOUT_SECS` and `LEDGER_DB_STATEMENT_TIMEOUT_SECS`
        /// override the defaults.
        pub fn from_env() -> LedgerResult<Self> {
            let database_url = std::env::var("DATABASE_URL")
                .map_err(|_| LedgerError::Validation("DATABASE_URL must be set".to_string()))?;
            let mut config = Self::new(database_url);

            if let Some(max) = env_number::<u32>("LEDGER_DB_MAX_CONNECTIONS")? {
                config.max_connections = max;
            }
            if let Some(secs) = env_number::<u64>("LEDGER_DB_ACQUIRE_TIMEOUT_SECS")? {
                config.acquire_timeout = Duration::from_secs(secs);
            }
            if let Some(secs) = env_number::<u64>("LEDGER_DB_STATEMENT_TIMEOUT_SECS")? {
                config.statement_timeout = Duration::from_secs(secs);
            }

            Ok(config)
        }

        pub fn with_max_connections(mut self, max_connections: u32) -> Self {
            self.max_connections = max_connections;
            self
        }

        pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
            self.acquire_timeout = acquire_timeout;
            self
        }

        pub fn with_statement_timeout(mut self, statement_timeout: Duration) -> Self {
            self.statement_timeout = statement_timeout;
            self
        }
    }

    fn env_number<T: FromStr>(key: &str) -> LedgerResult<Option<T>> {
        match std::env::var(key) {
            Ok(raw) => parse_number(key, &raw).map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Values that overflow `T` are rejected, never truncated.
    fn parse_number<T: FromStr>(key: &str, raw: &str) -> LedgerResult<T> {
        raw.trim().parse::<T>().map_err(|_| {
            LedgerError::Validation(format!("{key} must be a whole number in range, got '{raw}'"))
        })
    }

}
