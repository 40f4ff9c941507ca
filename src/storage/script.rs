//! Minimal SQL script runner.
//!
//! Scripts are plain SQL with optional `--` line comments and
//! semicolon-separated statements. Statements run one by one with no
//! surrounding transaction: a failure leaves earlier statements applied.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, TodoError};

/// Executes multi-statement SQL scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptRunner;

impl ScriptRunner {
    /// Split a script into individual statements.
    ///
    /// `--` comments are cut to the end of their line (outside string
    /// literals), the remaining lines are joined with single spaces, and the
    /// result is split on `;`.
    #[must_use]
    pub fn split(script: &str) -> Vec<String> {
        let joined = script
            .lines()
            .map(|line| strip_comment(line).trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        joined
            .split(';')
            .map(str::trim)
            .filter(|stmt| !stmt.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Execute every statement of `script` in order.
    ///
    /// Returns the number of statements executed. An absent or empty script
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Statement`] for the first statement that fails.
    pub fn run(self, conn: &Connection, script: Option<&str>) -> Result<usize> {
        let Some(script) = script else {
            return Ok(0);
        };

        let statements = Self::split(script);
        for (index, stmt) in statements.iter().enumerate() {
            conn.execute_batch(stmt).map_err(|e| {
                TodoError::Statement(format!("statement {} `{stmt}`: {e}", index + 1))
            })?;
        }

        debug!(statements = statements.len(), "script executed");
        Ok(statements.len())
    }
}

/// The part of `line` before a `--` comment. Quoted text is left alone.
fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut prev_dash = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '-' if !in_quote && prev_dash => return &line[..i - 1],
            _ => {}
        }
        prev_dash = c == '-' && !in_quote;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_strips_comments_and_joins_lines() {
        let script = "
            -- header comment
            CREATE TABLE a (
                id INTEGER
            );
              -- indented comment
            INSERT INTO a VALUES (1);
        ";

        assert_eq!(
            ScriptRunner::split(script),
            vec!["CREATE TABLE a ( id INTEGER )", "INSERT INTO a VALUES (1)"]
        );
    }

    #[test]
    fn test_split_strips_trailing_comments() {
        let script = "
            CREATE TABLE a (
                id INTEGER, -- primary key
                note TEXT DEFAULT 'a--b' -- keeps the literal
            );
            SELECT 1; -- done
        ";

        assert_eq!(
            ScriptRunner::split(script),
            vec!["CREATE TABLE a ( id INTEGER, note TEXT DEFAULT 'a--b' )", "SELECT 1"]
        );
    }

    #[test]
    fn test_run_with_trailing_comments() {
        let conn = Connection::open_in_memory().unwrap();
        let script = "CREATE TABLE t (\n  x INTEGER, -- first\n  y TEXT\n);\nINSERT INTO t VALUES (1, 'x--y');";

        assert_eq!(ScriptRunner.run(&conn, Some(script)).unwrap(), 2);
        let y: String = conn.query_row("SELECT y FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(y, "x--y");
    }

    #[test]
    fn test_split_ignores_empty_statements() {
        assert_eq!(ScriptRunner::split(";;  ;SELECT 1;"), vec!["SELECT 1"]);
        assert!(ScriptRunner::split("").is_empty());
        assert!(ScriptRunner::split("-- only a comment").is_empty());
    }

    #[test]
    fn test_run_executes_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        let script = "CREATE TABLE t (x INTEGER);\nINSERT INTO t VALUES (1);\nINSERT INTO t VALUES (2);";

        let executed = ScriptRunner.run(&conn, Some(script)).unwrap();
        assert_eq!(executed, 3);

        let sum: i64 = conn.query_row("SELECT SUM(x) FROM t", [], |row| row.get(0)).unwrap();
        assert_eq!(sum, 3);
    }

    #[test]
    fn test_run_empty_or_absent_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(ScriptRunner.run(&conn, None).unwrap(), 0);
        assert_eq!(ScriptRunner.run(&conn, Some("")).unwrap(), 0);
    }

    #[test]
    fn test_run_failure_keeps_earlier_statements() {
        let conn = Connection::open_in_memory().unwrap();
        let script = "CREATE TABLE kept (x INTEGER); INSERT INTO missing VALUES (1); CREATE TABLE never (x INTEGER);";

        let err = ScriptRunner.run(&conn, Some(script)).unwrap_err();
        assert!(matches!(err, TodoError::Statement(ref msg) if msg.starts_with("statement 2")));

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(tables, vec!["kept"]);
    }
}
