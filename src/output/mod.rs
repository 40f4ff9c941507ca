//! Output formatting for todolite.
//!
//! This module provides formatters for displaying todo records in various formats.

mod json;
mod pretty;

use chrono::NaiveDate;

use crate::cli::args::OutputFormat;
use crate::core::TodoRecord;
use crate::error::TodoError;

pub use json::*;
pub use pretty::*;

/// Format todos based on output format
///
/// # Errors
///
/// Returns `TodoError::Parse` if JSON serialization fails.
pub fn format_todos(
    renderer: &PrettyRenderer,
    todos: &[TodoRecord],
    title: &str,
    format: OutputFormat,
) -> Result<String, TodoError> {
    match format {
        OutputFormat::Pretty => Ok(renderer.todos(todos, title)),
        OutputFormat::Json => format_todos_json(todos, title),
    }
}

/// Format a single todo based on output format
///
/// # Errors
///
/// Returns `TodoError::Parse` if JSON serialization fails.
pub fn format_todo(
    renderer: &PrettyRenderer,
    todo: &TodoRecord,
    format: OutputFormat,
) -> Result<String, TodoError> {
    match format {
        OutputFormat::Pretty => Ok(renderer.todo(todo)),
        OutputFormat::Json => to_json(todo),
    }
}

/// Format the expected end date range based on output format
///
/// # Errors
///
/// Returns `TodoError::Parse` if JSON serialization fails.
pub fn format_range(
    earliest: NaiveDate,
    latest: NaiveDate,
    format: OutputFormat,
) -> Result<String, TodoError> {
    match format {
        OutputFormat::Pretty => Ok(format_range_pretty(earliest, latest)),
        OutputFormat::Json => format_range_json(earliest, latest),
    }
}
