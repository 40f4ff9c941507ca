//! The persisted todo record.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single task as stored in the `todo_job` table.
///
/// `id` is `None` only for a record that has not been inserted yet. Every
/// record read back from storage carries an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    /// Database-assigned primary key.
    pub id: Option<i64>,
    /// Task name; may be empty.
    pub name: String,
    /// Whether the task is finished.
    pub done: bool,
    /// Planned completion date.
    pub expected_end_date: NaiveDate,
    /// Date the task was actually completed.
    pub actual_end_date: Option<NaiveDate>,
}

impl TodoRecord {
    /// Create a transient record due today.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            done: false,
            expected_end_date: today(),
            actual_end_date: None,
        }
    }

    /// Set the planned completion date.
    #[must_use]
    pub const fn with_expected_end_date(mut self, date: NaiveDate) -> Self {
        self.expected_end_date = date;
        self
    }

    /// Set the done flag without touching the actual end date.
    #[must_use]
    pub const fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// Mark the task finished on `on`.
    pub fn complete(&mut self, on: NaiveDate) {
        self.done = true;
        self.actual_end_date = Some(on);
    }

    /// Mark the task open again.
    pub fn reopen(&mut self) {
        self.done = false;
        self.actual_end_date = None;
    }

    /// True once the record has been inserted.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Open and past its expected end date.
    #[must_use]
    pub fn is_overdue(&self) -> bool {
        !self.done && self.expected_end_date < today()
    }
}

/// Today's date in the local timezone.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = TodoRecord::new("Write report");

        assert_eq!(record.id, None);
        assert_eq!(record.name, "Write report");
        assert!(!record.done);
        assert_eq!(record.expected_end_date, today());
        assert_eq!(record.actual_end_date, None);
        assert!(!record.is_persisted());
    }

    #[test]
    fn test_complete_and_reopen() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut record = TodoRecord::new("Pay rent");

        record.complete(day);
        assert!(record.done);
        assert_eq!(record.actual_end_date, Some(day));

        record.reopen();
        assert!(!record.done);
        assert_eq!(record.actual_end_date, None);
    }

    #[test]
    fn test_is_overdue() {
        let past = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let record = TodoRecord::new("Old").with_expected_end_date(past);
        assert!(record.is_overdue());
        assert!(!record.clone().with_done(true).is_overdue());
        assert!(!TodoRecord::new("Fresh").is_overdue());
    }

    #[test]
    fn test_serializes_dates_as_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let record = TodoRecord::new("x").with_expected_end_date(date);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["expected_end_date"], "2024-01-15");
        assert!(json["actual_end_date"].is_null());
    }
}
