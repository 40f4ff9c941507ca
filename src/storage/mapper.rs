//! CRUD and query operations on the `todo_job` table.
//!
//! Every operation is async and runs on the blocking worker pool through the
//! shared [`Database`] handle. Failures are reported for the failing call
//! only; nothing is retried.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::database::Database;
use crate::core::{today, TodoRecord};
use crate::error::{Result, TodoError};

/// Page size used when the caller has no preference.
pub const DEFAULT_PAGE_LIMIT: u32 = 15;

const SELECT_COLUMNS: &str =
    "SELECT id, name, is_done, expected_end_date, actual_end_date FROM todo_job";

/// Substring filter on `name`; a NULL parameter matches every row.
const NAME_FILTER: &str = "(?1 IS NULL OR name LIKE '%' || ?1 || '%')";

/// Data access for todo records.
#[derive(Debug, Clone)]
pub struct TodoMapper {
    db: Database,
}

impl TodoMapper {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new record and return its generated id.
    ///
    /// Returns `None` if no row was inserted.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::InvalidArgument`] if the record already has an id,
    /// or [`TodoError::Statement`] if the insert fails.
    pub async fn insert(&self, record: &TodoRecord) -> Result<Option<i64>> {
        if let Some(id) = record.id {
            return Err(TodoError::InvalidArgument(format!(
                "cannot insert record that already has id {id}"
            )));
        }

        let record = record.clone();
        let id = self
            .db
            .call(move |conn| {
                let inserted = conn
                    .execute(
                        "INSERT INTO todo_job (name, is_done, expected_end_date, actual_end_date)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![
                            record.name,
                            record.done,
                            record.expected_end_date,
                            record.actual_end_date,
                        ],
                    )
                    .map_err(statement_error("insert"))?;
                Ok((inserted > 0).then(|| conn.last_insert_rowid()))
            })
            .await?;

        debug!(?id, "inserted todo");
        Ok(id)
    }

    /// Overwrite name, done flag and both dates of an existing record.
    ///
    /// Returns true if exactly one row was updated.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::InvalidArgument`] if the record has no id, or
    /// [`TodoError::Statement`] if the update fails.
    pub async fn update_by_id(&self, record: &TodoRecord) -> Result<bool> {
        let Some(id) = record.id else {
            return Err(TodoError::InvalidArgument(
                "cannot update record without an id".to_string(),
            ));
        };

        let record = record.clone();
        let updated = self
            .db
            .call(move |conn| {
                conn.execute(
                    "UPDATE todo_job SET
                       name = ?1,
                       is_done = ?2,
                       expected_end_date = ?3,
                       actual_end_date = ?4
                     WHERE id = ?5",
                    params![
                        record.name,
                        record.done,
                        record.expected_end_date,
                        record.actual_end_date,
                        id,
                    ],
                )
                .map_err(statement_error("update"))
            })
            .await?;

        debug!(id, updated, "updated todo");
        Ok(updated == 1)
    }

    /// Delete a record. Returns true if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] if the delete fails.
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let deleted = self
            .db
            .call(move |conn| {
                conn.execute("DELETE FROM todo_job WHERE id = ?1", [id])
                    .map_err(statement_error("delete"))
            })
            .await?;

        debug!(id, deleted, "deleted todo");
        Ok(deleted > 0)
    }

    /// Fetch a single record.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] if the query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<TodoRecord>> {
        self.db
            .call(move |conn| {
                conn.query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], row_to_record)
                    .optional()
                    .map_err(statement_error("find by id"))
            })
            .await
    }

    /// One page of records, open tasks first.
    ///
    /// Ordered by done flag, then actual end date (latest first), then
    /// expected end date (earliest first). `page` is 1-based.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::InvalidArgument`] if `page` or `limit` is zero,
    /// or [`TodoError::Statement`] if the query fails.
    pub async fn find_by_page(
        &self,
        name_filter: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<TodoRecord>> {
        if page < 1 {
            return Err(TodoError::InvalidArgument(format!("page must be >= 1, got {page}")));
        }
        if limit < 1 {
            return Err(TodoError::InvalidArgument(format!("limit must be >= 1, got {limit}")));
        }

        let filter = normalize_filter(name_filter);
        // Saturates past i64::MAX; such an offset is past the end of any table.
        let offset = i64::from(page - 1).saturating_mul(i64::from(limit));
        self.db
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "{SELECT_COLUMNS} WHERE {NAME_FILTER}
                         ORDER BY is_done ASC, actual_end_date DESC, expected_end_date ASC, id ASC
                         LIMIT ?2 OFFSET ?3"
                    ))
                    .map_err(statement_error("find by page"))?;
                let rows = stmt
                    .query_map(params![filter, limit, offset], row_to_record)
                    .map_err(statement_error("find by page"))?;
                collect_rows(rows, "find by page")
            })
            .await
    }

    /// Records whose expected end date falls in `[start, end]`.
    ///
    /// Ordered by expected end date (latest first), then done flag.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] if the query fails.
    pub async fn find_between_dates(
        &self,
        name_filter: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TodoRecord>> {
        let filter = normalize_filter(name_filter);
        self.db
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(&format!(
                        "{SELECT_COLUMNS} WHERE {NAME_FILTER}
                           AND expected_end_date BETWEEN ?2 AND ?3
                         ORDER BY expected_end_date DESC, is_done ASC, id ASC"
                    ))
                    .map_err(statement_error("find between dates"))?;
                let rows = stmt
                    .query_map(params![filter, start, end], row_to_record)
                    .map_err(statement_error("find between dates"))?;
                collect_rows(rows, "find between dates")
            })
            .await
    }

    /// Earliest expected end date, or today if there are no records.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] if the query fails.
    pub async fn find_earliest_date(&self) -> Result<NaiveDate> {
        self.scalar_date("SELECT MIN(expected_end_date) FROM todo_job", "find earliest date")
            .await
    }

    /// Latest expected end date, or today if there are no records.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] if the query fails.
    pub async fn find_latest_date(&self) -> Result<NaiveDate> {
        self.scalar_date("SELECT MAX(expected_end_date) FROM todo_job", "find latest date")
            .await
    }

    /// Number of records matching the name filter.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] if the query fails.
    pub async fn count(&self, name_filter: Option<&str>) -> Result<u64> {
        let filter = normalize_filter(name_filter);
        let count: i64 = self
            .db
            .call(move |conn| {
                conn.query_row(
                    &format!("SELECT COUNT(*) FROM todo_job WHERE {NAME_FILTER}"),
                    [filter],
                    |row| row.get(0),
                )
                .map_err(statement_error("count"))
            })
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn scalar_date(&self, sql: &'static str, op: &'static str) -> Result<NaiveDate> {
        let date: Option<NaiveDate> = self
            .db
            .call(move |conn| {
                conn.query_row(sql, [], |row| row.get(0))
                    .map_err(statement_error(op))
            })
            .await?;
        Ok(date.unwrap_or_else(today))
    }
}

/// Empty filters match everything.
fn normalize_filter(name_filter: Option<&str>) -> Option<String> {
    name_filter
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

fn statement_error(op: &'static str) -> impl Fn(rusqlite::Error) -> TodoError {
    move |e| TodoError::Statement(format!("{op}: {e}"))
}

fn collect_rows(
    rows: impl Iterator<Item = rusqlite::Result<TodoRecord>>,
    op: &'static str,
) -> Result<Vec<TodoRecord>> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row.map_err(statement_error(op))?);
    }
    Ok(records)
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TodoRecord> {
    Ok(TodoRecord {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        done: row.get(2)?,
        expected_end_date: row.get(3)?,
        actual_end_date: row.get(4)?,
    })
}
