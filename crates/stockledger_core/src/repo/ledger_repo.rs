//! Ledger repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Append observations with storage-assigned sequence ids.
//! - Scan the full ledger for projection.
//!
//! # Invariants
//! - Append is one `INSERT ... RETURNING` inside an `IMMEDIATE` transaction:
//!   visible in full or not at all.
//! - `sequence_id` comes from `AUTOINCREMENT` and is never reused.
//! - No update or delete path exists; storage triggers reject both.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::observation::{
    format_record_date, parse_record_date, Observation, ObservationDraft, SequenceId,
    ValidationError,
};
use log::{debug, error, info};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const LEDGER_TABLE: &str = "stock_history";
const LEDGER_COLUMNS: &[&str] = &["id", "item_name", "quantity", "record_date"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for ledger persistence and scans.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted observation data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Append-only store of observations.
pub trait LedgerRepository {
    /// Durably stores one validated observation and returns it with its
    /// freshly assigned `sequence_id`.
    fn append(&self, draft: &ObservationDraft) -> RepoResult<Observation>;
    /// Returns every stored observation. Callers must not rely on order.
    fn scan_all(&self) -> RepoResult<Vec<Observation>>;
    /// Number of stored observations.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed ledger over a borrowed, migrated connection.
pub struct SqliteLedgerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerRepository<'conn> {
    /// Wraps a connection returned by `db::open_db` or `db::open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema was
    ///   tampered with.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_ledger_schema(conn)?;
        Ok(Self { conn })
    }
}

impl LedgerRepository for SqliteLedgerRepository<'_> {
    fn append(&self, draft: &ObservationDraft) -> RepoResult<Observation> {
        let started_at = Instant::now();
        match insert_observation(self.conn, draft) {
            Ok(sequence_id) => {
                info!(
                    "event=observation_append module=repo status=ok sequence_id={sequence_id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(draft.clone().into_observation(sequence_id))
            }
            Err(err) => {
                error!(
                    "event=observation_append module=repo status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn scan_all(&self) -> RepoResult<Vec<Observation>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_name, quantity, record_date
             FROM stock_history
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut observations = Vec::new();

        while let Some(row) = rows.next()? {
            observations.push(parse_observation_row(row)?);
        }

        debug!(
            "event=ledger_scan module=repo status=ok rows={}",
            observations.len()
        );
        Ok(observations)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM stock_history;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

// IMMEDIATE takes the write lock up front, so competing writers wait in the
// busy handler instead of failing a SHARED -> RESERVED upgrade.
fn insert_observation(conn: &Connection, draft: &ObservationDraft) -> RepoResult<SequenceId> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let sequence_id = tx.query_row(
        "INSERT INTO stock_history (item_name, quantity, record_date)
         VALUES (?1, ?2, ?3)
         RETURNING id;",
        params![
            draft.item_name(),
            draft.quantity(),
            format_record_date(draft.record_date()),
        ],
        |row| row.get::<_, SequenceId>(0),
    )?;
    tx.commit()?;
    Ok(sequence_id)
}

fn parse_observation_row(row: &Row<'_>) -> RepoResult<Observation> {
    let sequence_id: SequenceId = row.get("id")?;

    let item_name: String = row.get("item_name")?;
    if item_name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty item_name in stock_history.id={sequence_id}"
        )));
    }

    let quantity: i64 = row.get("quantity")?;
    if quantity < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative quantity `{quantity}` in stock_history.id={sequence_id}"
        )));
    }

    let date_text: String = row.get("record_date")?;
    let record_date = parse_record_date(&date_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid record_date `{date_text}` in stock_history.id={sequence_id}"
        ))
    })?;

    Ok(Observation {
        sequence_id,
        item_name,
        quantity,
        record_date,
    })
}

fn ensure_ledger_schema(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let columns = stmt
        .query_map([LEDGER_TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if columns.is_empty() {
        return Err(RepoError::MissingRequiredTable(LEDGER_TABLE));
    }
    for &column in LEDGER_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: LEDGER_TABLE,
                column,
            });
        }
    }

    Ok(())
}
