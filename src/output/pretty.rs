use colored::Colorize;

use crate::config::PoolConfig;
use crate::core::{ObjectPool, TodoRecord};

/// Renders records as colored text.
///
/// Line buffers are recycled through an [`ObjectPool`] so listing a page does
/// not allocate a fresh `String` per row.
#[derive(Debug)]
pub struct PrettyRenderer {
    lines: ObjectPool<String>,
}

impl PrettyRenderer {
    /// Create a renderer whose line pool follows `config`.
    #[must_use]
    pub fn new(config: &PoolConfig) -> Self {
        let mut lines = ObjectPool::resettable(|| String::with_capacity(96)).prefill(config.prefill);
        if let Some(limit) = config.max_idle {
            lines = lines.max_idle(limit);
        }
        Self { lines }
    }

    /// Format a list of todos as a table.
    #[must_use]
    pub fn todos(&self, todos: &[TodoRecord], title: &str) -> String {
        if todos.is_empty() {
            return format!("{title} (0 items)\n  No items");
        }

        let mut output = format!("{title} ({} items)\n", todos.len());
        output.push_str(&"─".repeat(60));
        output.push('\n');

        for todo in todos {
            let mut line = self.lines.lease();
            render_row(&mut line, todo);
            output.push_str(&line);
            output.push('\n');
        }

        output
    }

    /// Format a single todo with all of its fields.
    #[must_use]
    pub fn todo(&self, todo: &TodoRecord) -> String {
        let mut output = String::new();
        {
            let mut line = self.lines.lease();
            render_row(&mut line, todo);
            output.push_str(&line);
            output.push('\n');
        }

        if let Some(id) = todo.id {
            output.push_str(&format!("  {}: {id}\n", "ID".dimmed()));
        }
        output.push_str(&format!(
            "  {}: {}\n",
            "Status".dimmed(),
            if todo.done { "done" } else { "open" }
        ));
        output.push_str(&format!("  {}: {}\n", "Expected".dimmed(), todo.expected_end_date));
        if let Some(actual) = todo.actual_end_date {
            output.push_str(&format!("  {}: {actual}\n", "Finished".dimmed()));
        }

        output
    }

    /// Peak number of line buffers in use at once.
    #[must_use]
    pub fn buffers_created(&self) -> usize {
        self.lines.high_water_mark()
    }
}

fn render_row(line: &mut String, todo: &TodoRecord) {
    let status_icon = if todo.done { "[x]".green() } else { "[ ]".white() };
    let id = todo.id.map_or_else(|| "-".to_string(), |id| id.to_string());

    line.push_str(&format!("{status_icon} {:>4}  {}", id.dimmed(), todo.name.bold()));

    let due = todo.expected_end_date.to_string();
    if todo.is_overdue() {
        line.push_str(&format!("  {}", due.red()));
    } else if !todo.done {
        line.push_str(&format!("  {}", due.yellow()));
    }

    if let Some(actual) = todo.actual_end_date {
        line.push_str(&format!("  {}", format!("finished {actual}").dimmed()));
    }
}

/// Format the earliest and latest expected end dates.
#[must_use]
pub fn format_range_pretty(earliest: chrono::NaiveDate, latest: chrono::NaiveDate) -> String {
    format!(
        "{}: {earliest}\n{}: {latest}",
        "Earliest".dimmed(),
        "Latest".dimmed()
    )
}
