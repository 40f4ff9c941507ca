use chrono::{Duration, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::core::today;

#[derive(Parser)]
#[command(name = "todolite")]
#[command(about = "A small todo list backed by a local SQLite database")]
#[command(long_about = "todolite - a small todo list backed by a local SQLite database

Tasks are stored in ~/.todolite/todolite.db. The schema is migrated
automatically the first time any command runs.

QUICK START:
  todolite add \"Buy milk\" --due tomorrow   Add a task
  todolite list                            Show open tasks first
  todolite done 3                          Complete task 3

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Defaults to `general.default_output` from the config file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    ///
    /// # Examples
    ///
    ///   todolite add "write report"
    ///   todolite add "renew passport" --due 2025-03-01
    ///   todolite add "call back" --due +3
    #[command(alias = "a")]
    Add(AddArgs),

    /// List tasks one page at a time
    ///
    /// Open tasks come first, ordered by expected end date. Finished tasks
    /// follow, most recently finished first.
    #[command(alias = "ls")]
    List(ListArgs),

    /// List tasks whose expected end date falls in a range (inclusive)
    Between(BetweenArgs),

    /// Mark a task as done today
    Done {
        /// Task ID
        id: i64,
    },

    /// Mark a finished task as open again
    Reopen {
        /// Task ID
        id: i64,
    },

    /// Change the name of a task
    Rename {
        /// Task ID
        id: i64,
        /// New name
        name: String,
    },

    /// Change the expected end date of a task
    Due {
        /// Task ID
        id: i64,
        /// New date: YYYY-MM-DD, today, tomorrow, yesterday or +N days
        #[arg(value_parser = parse_date, allow_hyphen_values = true)]
        date: NaiveDate,
    },

    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// Task ID
        id: i64,
    },

    /// Show the earliest and latest expected end dates
    Range,

    /// Print the database file location
    Path,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task name
    pub name: String,

    /// Expected end date: YYYY-MM-DD, today, tomorrow, yesterday or +N days
    ///
    /// Defaults to today.
    #[arg(short, long, value_parser = parse_date, allow_hyphen_values = true)]
    pub due: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show tasks whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Tasks per page (defaults to `storage.page_size` from the config file)
    #[arg(short, long)]
    pub limit: Option<u32>,
}

#[derive(Args)]
pub struct BetweenArgs {
    /// First day of the range
    #[arg(value_parser = parse_date, allow_hyphen_values = true)]
    pub start: NaiveDate,

    /// Last day of the range
    #[arg(value_parser = parse_date, allow_hyphen_values = true)]
    pub end: NaiveDate,

    /// Only show tasks whose name contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Parse a date argument.
///
/// Accepts `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday`, or `+N` / `-N`
/// days relative to today.
///
/// # Errors
///
/// Returns a message suitable for clap if the input is not recognised.
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim().to_lowercase();
    let today = today();

    match input.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if input.starts_with('+') || input.starts_with('-') {
        if let Ok(days) = input.parse::<i64>() {
            return Ok(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&input, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{input}', expected YYYY-MM-DD, today, tomorrow or +N"))
}
