//! Schema migration chain for the todo table.
//!
//! Migrations are declared as data and applied in order by [`run`]. There is
//! no recorded schema version: each step probes the live schema and decides
//! for itself whether it still has work to do, so running the chain again
//! against an up-to-date database executes no migration statements.
//!
//! Scripts are bundled at compile time and looked up by name through
//! [`load_script`].

use rusqlite::Connection;
use tracing::{debug, info};

use super::script::ScriptRunner;
use crate::error::{Result, TodoError};

/// Table every migration targets.
pub const TODO_TABLE: &str = "todo_job";

/// Bundled SQL resources, by name.
const SCRIPTS: &[(&str, &str)] = &[
    ("init", include_str!("sql/init.sql")),
    ("migrate-v2", include_str!("sql/migrate_v2.sql")),
    ("migrate-v2.1", include_str!("sql/migrate_v2_1.sql")),
];

/// When a migration step has to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Run every time; the script must be idempotent.
    Always,
    /// Run when any of `columns` is absent from `table`.
    MissingColumns {
        table: &'static str,
        columns: &'static [&'static str],
    },
    /// Run when `table` exists and still has any of `columns`.
    LegacyColumns {
        table: &'static str,
        columns: &'static [&'static str],
    },
}

/// A single migration step.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Step identifier used in logs and reports.
    pub id: &'static str,
    /// Schema probe deciding whether the step runs.
    pub predicate: Predicate,
    /// Name of the bundled script to execute.
    pub script: &'static str,
}

/// All migrations in the order they are applied.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        id: "init",
        predicate: Predicate::Always,
        script: "init",
    },
    Migration {
        id: "migrate-to-v2",
        predicate: Predicate::MissingColumns {
            table: TODO_TABLE,
            columns: &["expected_end_date", "actual_end_date"],
        },
        script: "migrate-v2",
    },
    Migration {
        id: "migrate-to-v2.1",
        predicate: Predicate::LegacyColumns {
            table: TODO_TABLE,
            columns: &["end_time"],
        },
        script: "migrate-v2.1",
    },
];

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The script ran.
    Applied { statements: usize },
    /// The probe found nothing to do.
    Skipped,
}

/// Outcome of a full chain run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub steps: Vec<(&'static str, StepOutcome)>,
}

impl MigrationReport {
    /// Number of steps whose script ran.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.steps
            .iter()
            .filter(|(_, outcome)| matches!(outcome, StepOutcome::Applied { .. }))
            .count()
    }

    /// Total statements executed across all steps.
    #[must_use]
    pub fn statements(&self) -> usize {
        self.steps
            .iter()
            .map(|(_, outcome)| match outcome {
                StepOutcome::Applied { statements } => *statements,
                StepOutcome::Skipped => 0,
            })
            .sum()
    }

    /// Outcome of the step named `id`, if it was part of the run.
    #[must_use]
    pub fn outcome(&self, id: &str) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|(step, _)| *step == id)
            .map(|(_, outcome)| *outcome)
    }
}

/// Look up a bundled script by name.
///
/// # Errors
///
/// Returns [`TodoError::ResourceUnavailable`] if no script has that name.
pub fn load_script(name: &str) -> Result<&'static str> {
    SCRIPTS
        .iter()
        .find(|(script, _)| *script == name)
        .map(|(_, sql)| *sql)
        .ok_or_else(|| TodoError::ResourceUnavailable(name.to_string()))
}

/// Run the full migration chain.
///
/// # Errors
///
/// Returns the first error raised by any step; later steps do not run.
pub fn run(conn: &Connection) -> Result<MigrationReport> {
    run_steps(conn, MIGRATIONS)
}

/// Run `steps` in order against `conn`.
///
/// # Errors
///
/// Returns the first error raised by any step; later steps do not run.
pub fn run_steps(conn: &Connection, steps: &[Migration]) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    for migration in steps {
        let outcome = apply_step(conn, migration)?;
        report.steps.push((migration.id, outcome));
    }

    if report.applied() > 0 {
        info!(
            applied = report.applied(),
            statements = report.statements(),
            "migrations complete"
        );
    }

    Ok(report)
}

/// Probe the schema and apply a single step if needed.
///
/// # Errors
///
/// Returns [`TodoError::SchemaProbe`] if introspection fails,
/// [`TodoError::ResourceUnavailable`] if the script is missing, or
/// [`TodoError::Statement`] if a statement fails.
pub fn apply_step(conn: &Connection, migration: &Migration) -> Result<StepOutcome> {
    if !should_run(conn, migration.predicate)? {
        debug!(migration = migration.id, "schema already current, skipping");
        return Ok(StepOutcome::Skipped);
    }

    let script = load_script(migration.script)?;
    info!(migration = migration.id, "applying migration");

    let statements = ScriptRunner.run(conn, Some(script)).map_err(|e| match e {
        TodoError::Statement(msg) => {
            TodoError::Statement(format!("migration {}, {msg}", migration.id))
        }
        other => other,
    })?;

    Ok(StepOutcome::Applied { statements })
}

/// Evaluate a predicate against the live schema.
///
/// # Errors
///
/// Returns [`TodoError::SchemaProbe`] if introspection fails.
pub fn should_run(conn: &Connection, predicate: Predicate) -> Result<bool> {
    match predicate {
        Predicate::Always => Ok(true),
        Predicate::MissingColumns { table, columns } => {
            let present = table_columns(conn, table)?;
            Ok(columns
                .iter()
                .any(|column| !present.iter().any(|p| p == column)))
        }
        Predicate::LegacyColumns { table, columns } => {
            if !table_exists(conn, table)? {
                debug!(table, "table absent, nothing to migrate");
                return Ok(false);
            }
            let present = table_columns(conn, table)?;
            Ok(columns
                .iter()
                .any(|column| present.iter().any(|p| p == column)))
        }
    }
}

/// Whether `table` exists.
///
/// # Errors
///
/// Returns [`TodoError::SchemaProbe`] if the catalog cannot be read.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )
    .map_err(|e| TodoError::SchemaProbe(format!("failed to look up table {table}: {e}")))
}

/// Column names of `table`, empty if the table does not exist.
///
/// # Errors
///
/// Returns [`TodoError::SchemaProbe`] if the table metadata cannot be read.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let probe_err =
        |e: rusqlite::Error| TodoError::SchemaProbe(format!("failed to read columns of {table}: {e}"));

    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1)")
        .map_err(probe_err)?;
    let rows = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .map_err(probe_err)?;

    let mut columns = Vec::new();
    for row in rows {
        columns.push(row.map_err(probe_err)?);
    }
    Ok(columns)
}
