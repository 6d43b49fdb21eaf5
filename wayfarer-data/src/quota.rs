//! SQLite persistence for the external-call quota log.

use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Error as SqliteError, params};
use thiserror::Error;
use wayfarer_core::{QuotaLog, QuotaLogError, QuotaRecord};

use crate::fs::ensure_parent_dir;

/// Errors raised when opening a [`SqliteQuotaLog`].
#[derive(Debug, Error)]
pub enum OpenQuotaLogError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `api_calls` table or its index failed.
    #[error("failed to create quota log schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// [`QuotaLog`] persisted in an `api_calls` SQLite table.
///
/// Rows are indexed on `(principal, api, called_at)` so the daily count is
/// an index range scan. Timestamps are stored as UTC milliseconds.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use serde_json::json;
/// use wayfarer_core::{QuotaLog, QuotaRecord};
/// use wayfarer_data::SqliteQuotaLog;
///
/// let log = SqliteQuotaLog::open_in_memory()?;
/// let now = Utc::now();
/// log.append(&QuotaRecord {
///     principal: "alice".into(),
///     api: "directions".into(),
///     endpoint: "/maps/api/directions/json".into(),
///     params: json!({"mode": "transit"}),
///     timestamp: now,
/// })?;
/// assert_eq!(log.count_since("alice", "directions", now)?, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SqliteQuotaLog {
    connection: Mutex<Connection>,
}

impl SqliteQuotaLog {
    /// Open or create the log at `path`, creating parent directories.
    ///
    /// # Errors
    /// Returns [`OpenQuotaLogError`] when the directory, database or schema
    /// cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, OpenQuotaLogError> {
        ensure_parent_dir(path).map_err(|source| OpenQuotaLogError::CreateDirectory {
            path: path.parent().unwrap_or(path).to_path_buf(),
            source,
        })?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| OpenQuotaLogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory log.
    ///
    /// # Errors
    /// Returns [`OpenQuotaLogError`] when SQLite cannot initialise.
    pub fn open_in_memory() -> Result<Self, OpenQuotaLogError> {
        let connection = Connection::open_in_memory().map_err(|source| OpenQuotaLogError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, OpenQuotaLogError> {
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS api_calls (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    principal TEXT NOT NULL,
                    api TEXT NOT NULL,
                    endpoint TEXT NOT NULL,
                    params TEXT NOT NULL,
                    called_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS api_calls_by_principal
                    ON api_calls (principal, api, called_at);",
            )
            .map_err(|source| OpenQuotaLogError::CreateSchema { source })?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, QuotaLogError> {
        self.connection
            .lock()
            .map_err(|_: PoisonError<_>| QuotaLogError::Poisoned)
    }
}

impl QuotaLog for SqliteQuotaLog {
    fn append(&self, record: &QuotaRecord) -> Result<(), QuotaLogError> {
        let params_json = serde_json::to_string(&record.params).map_err(QuotaLogError::backend)?;
        self.lock()?
            .execute(
                "INSERT INTO api_calls (principal, api, endpoint, params, called_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.principal,
                    record.api,
                    record.endpoint,
                    params_json,
                    record.timestamp.timestamp_millis()
                ],
            )
            .map(|_| ())
            .map_err(QuotaLogError::backend)
    }

    fn count_since(
        &self,
        principal: &str,
        api: &str,
        since: DateTime<Utc>,
    ) -> Result<u64, QuotaLogError> {
        let count: i64 = self
            .lock()?
            .query_row(
                "SELECT COUNT(*) FROM api_calls
                 WHERE principal = ?1 AND api = ?2 AND called_at >= ?3",
                params![principal, api, since.timestamp_millis()],
                |row| row.get(0),
            )
            .map_err(QuotaLogError::backend)?;
        u64::try_from(count).map_err(QuotaLogError::backend)
    }
}
