//! Date attribute repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one `submission_dates` row per owning resource.
//! - Keep read-modify-write of a record inside one write transaction.
//!
//! # Invariants
//! - A row is created implicitly by the first write that sets a field;
//!   clearing fields of a resource without a row writes nothing.
//! - Concurrent writers are serialized by an IMMEDIATE transaction, so a
//!   reader never observes half of another write.
//! - Read paths reject invalid persisted dates instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::logging::log_id;
use crate::model::submission_dates::{
    format_submission_date, parse_submission_date, DateAttributes, DateField, DateOrderPolicy,
    DateValidationError, FieldChange, ResourceId,
};
use chrono::NaiveDate;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATES_SELECT_SQL: &str = "SELECT
    resource_id,
    received,
    revised,
    accepted
FROM submission_dates";

const REQUIRED_COLUMNS: &[&str] = &[
    "resource_id",
    "received",
    "revised",
    "accepted",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for date attribute persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Input or merged record failed validation; nothing was written.
    Validation(DateValidationError),
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "date repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "date repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "date repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted date data: {message}"),
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

impl From<DateValidationError> for RepoError {
    fn from(value: DateValidationError) -> Self {
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

/// Repository interface for date attribute records.
pub trait SubmissionDatesRepository {
    /// Loads the stored record, or `None` when nothing was ever written.
    fn load_dates(&self, resource_id: &ResourceId) -> RepoResult<Option<DateAttributes>>;

    /// Applies `changes` atomically and returns the resulting record.
    ///
    /// The merged record is checked against `policy` before it is written;
    /// on failure the stored record is left unchanged.
    fn apply_changes(
        &self,
        resource_id: &ResourceId,
        changes: &[FieldChange],
        policy: DateOrderPolicy,
    ) -> RepoResult<DateAttributes>;

    /// Removes the record together with its owning resource.
    ///
    /// Returns whether a record existed.
    fn delete_dates(&self, resource_id: &ResourceId) -> RepoResult<bool>;
}

/// SQLite-backed date attribute repository.
pub struct SqliteSubmissionDatesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubmissionDatesRepository<'conn> {
    /// Wraps a connection after checking that migrations were applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_dates_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SubmissionDatesRepository for SqliteSubmissionDatesRepository<'_> {
    fn load_dates(&self, resource_id: &ResourceId) -> RepoResult<Option<DateAttributes>> {
        load_dates_with(self.conn, resource_id)
    }

    fn apply_changes(
        &self,
        resource_id: &ResourceId,
        changes: &[FieldChange],
        policy: DateOrderPolicy,
    ) -> RepoResult<DateAttributes> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let existing = load_dates_with(&tx, resource_id)?;
        let has_row = existing.is_some();
        let mut attrs = existing.unwrap_or_else(|| DateAttributes::empty(resource_id.clone()));
        attrs.apply(changes);
        attrs.check_order(policy)?;

        if !has_row && attrs.is_empty() {
            return Ok(attrs);
        }

        tx.execute(
            "INSERT INTO submission_dates (
                resource_id,
                received,
                revised,
                accepted
            ) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(resource_id) DO UPDATE SET
                received = excluded.received,
                revised = excluded.revised,
                accepted = excluded.accepted,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                resource_id.as_str(),
                attrs.received.map(format_submission_date),
                attrs.revised.map(format_submission_date),
                attrs.accepted.map(format_submission_date),
            ],
        )?;
        tx.commit()?;

        debug!(
            "event=dates_write module=repo status=ok resource_id={} changes={}",
            log_id(resource_id.as_str()),
            changes.len()
        );
        Ok(attrs)
    }

    fn delete_dates(&self, resource_id: &ResourceId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM submission_dates WHERE resource_id = ?1;",
            [resource_id.as_str()],
        )?;
        Ok(changed > 0)
    }
}

fn load_dates_with(
    conn: &Connection,
    resource_id: &ResourceId,
) -> RepoResult<Option<DateAttributes>> {
    let mut stmt = conn.prepare(&format!("{DATES_SELECT_SQL} WHERE resource_id = ?1;"))?;
    let raw = stmt
        .query_row([resource_id.as_str()], read_raw_row)
        .optional()?;

    raw.map(parse_dates_row).transpose()
}

struct RawDatesRow {
    resource_id: String,
    received: Option<String>,
    revised: Option<String>,
    accepted: Option<String>,
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawDatesRow> {
    Ok(RawDatesRow {
        resource_id: row.get("resource_id")?,
        received: row.get("received")?,
        revised: row.get("revised")?,
        accepted: row.get("accepted")?,
    })
}

fn parse_dates_row(raw: RawDatesRow) -> RepoResult<DateAttributes> {
    let resource_id = ResourceId::new(&raw.resource_id).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid resource id `{}` in submission_dates.resource_id",
            raw.resource_id
        ))
    })?;

    Ok(DateAttributes {
        resource_id,
        received: parse_stored_date(DateField::Received, raw.received)?,
        revised: parse_stored_date(DateField::Revised, raw.revised)?,
        accepted: parse_stored_date(DateField::Accepted, raw.accepted)?,
    })
}

fn parse_stored_date(field: DateField, value: Option<String>) -> RepoResult<Option<NaiveDate>> {
    let Some(value) = value else {
        return Ok(None);
    };
    parse_submission_date(field, &value)
        .map(Some)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{value}` in submission_dates.{field}"
            ))
        })
}

fn ensure_dates_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "submission_dates")? {
        return Err(RepoError::MissingRequiredTable("submission_dates"));
    }

    for &column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "submission_dates", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "submission_dates",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
