//! JSON output formatting for todolite.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::core::TodoRecord;
use crate::error::TodoError;

/// Format todos as JSON
///
/// # Errors
///
/// Returns `TodoError::Parse` if JSON serialization fails.
pub fn format_todos_json(todos: &[TodoRecord], list_name: &str) -> Result<String, TodoError> {
    let output = json!({
        "list": list_name,
        "count": todos.len(),
        "items": todos
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format the date range as JSON
///
/// # Errors
///
/// Returns `TodoError::Parse` if JSON serialization fails.
pub fn format_range_json(earliest: NaiveDate, latest: NaiveDate) -> Result<String, TodoError> {
    to_json(&json!({ "earliest": earliest, "latest": latest }))
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `TodoError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, TodoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_todos_json() {
        let mut todo = TodoRecord::new("pack bags")
            .with_expected_end_date(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        todo.id = Some(9);

        let output = format_todos_json(&[todo], "Page 1").unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["list"], "Page 1");
        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["id"], 9);
        assert_eq!(value["items"][0]["name"], "pack bags");
        assert_eq!(value["items"][0]["expected_end_date"], "2024-07-01");
    }

    #[test]
    fn test_format_range_json() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&format_range_json(start, end).unwrap()).unwrap();
        assert_eq!(value["earliest"], "2024-01-01");
        assert_eq!(value["latest"], "2024-02-01");
    }
}
