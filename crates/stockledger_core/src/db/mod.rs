//! Storage layer for the `stock_history` ledger file.
//!
//! # Responsibility
//! - Open ledger connections with a busy timeout for concurrent writers.
//! - Create the append-only `stock_history` table and its guards.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - A ledger written by a newer build is refused, never downgraded.
//! - Observations are read or appended only after migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open, migrate or write the ledger file.
#[derive(Debug)]
pub enum DbError {
    /// SQLite refused the operation. Includes `SQLITE_BUSY` after the busy
    /// timeout and constraint or trigger aborts on `stock_history`.
    Sqlite(rusqlite::Error),
    /// The ledger was migrated by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "ledger schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl DbError {
    /// Stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(err)
                if err.sqlite_error_code() == Some(rusqlite::ErrorCode::DatabaseBusy) =>
            {
                "ledger_busy"
            }
            Self::Sqlite(_) => "ledger_sqlite_error",
            Self::UnsupportedSchemaVersion { .. } => "ledger_schema_too_new",
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
