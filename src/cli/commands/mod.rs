//! Command implementations for todolite.
//!
//! Each command obtains a [`TodoMapper`] from the storage factory, runs its
//! query, and returns the formatted output.

use chrono::NaiveDate;

use crate::cli::args::{AddArgs, BetweenArgs, Commands, ListArgs, OutputFormat};
use crate::config::Config;
use crate::core::{today, TodoRecord};
use crate::error::TodoError;
use crate::output::{format_range, format_todo, format_todos, PrettyRenderer};
use crate::storage::{StorageFactory, TodoMapper};

/// Run a parsed command against the default database.
///
/// # Errors
///
/// Returns an error if storage cannot be opened or migrated, or if the
/// command itself fails.
pub async fn execute(
    command: Commands,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TodoError> {
    let factory = StorageFactory::open()?;
    run(&factory, command, config, format).await
}

/// Run a parsed command against `factory`.
///
/// # Errors
///
/// Returns an error if migrations failed or the command fails.
pub async fn run(
    factory: &StorageFactory,
    command: Commands,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TodoError> {
    if matches!(command, Commands::Path) {
        return Ok(path(factory));
    }

    let mapper = factory.mapper().await?;
    let renderer = PrettyRenderer::new(&config.pool);

    match command {
        Commands::Add(args) => add(&mapper, &renderer, args, format).await,
        Commands::List(args) => list(&mapper, &renderer, args, config, format).await,
        Commands::Between(args) => between(&mapper, &renderer, args, format).await,
        Commands::Done { id } => {
            edit(&mapper, &renderer, id, format, |todo| todo.complete(today())).await
        }
        Commands::Reopen { id } => edit(&mapper, &renderer, id, format, TodoRecord::reopen).await,
        Commands::Rename { id, name } => {
            edit(&mapper, &renderer, id, format, move |todo| todo.name = name).await
        }
        Commands::Due { id, date } => {
            edit(&mapper, &renderer, id, format, move |todo| {
                todo.expected_end_date = date;
            })
            .await
        }
        Commands::Delete { id } => delete(&mapper, id, format).await,
        Commands::Range => range(&mapper, format).await,
        Commands::Path => Ok(path(factory)),
    }
}

/// Execute add command
async fn add(
    mapper: &TodoMapper,
    renderer: &PrettyRenderer,
    args: AddArgs,
    format: OutputFormat,
) -> Result<String, TodoError> {
    let mut todo = TodoRecord::new(args.name);
    if let Some(due) = args.due {
        todo = todo.with_expected_end_date(due);
    }

    todo.id = mapper.insert(&todo).await?;
    if todo.id.is_none() {
        return Err(TodoError::Statement("insert did not create a row".to_string()));
    }
    format_todo(renderer, &todo, format)
}

/// Execute list command
async fn list(
    mapper: &TodoMapper,
    renderer: &PrettyRenderer,
    args: ListArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<String, TodoError> {
    let limit = args.limit.unwrap_or(config.storage.page_size);
    let filter = args.filter.as_deref();

    let todos = mapper.find_by_page(filter, args.page, limit).await?;
    let total = mapper.count(filter).await?;
    let pages = total.div_ceil(u64::from(limit)).max(1);

    let title = format!("Page {} of {pages}", args.page);
    format_todos(renderer, &todos, &title, format)
}

/// Execute between command
async fn between(
    mapper: &TodoMapper,
    renderer: &PrettyRenderer,
    args: BetweenArgs,
    format: OutputFormat,
) -> Result<String, TodoError> {
    let todos = mapper
        .find_between_dates(args.filter.as_deref(), args.start, args.end)
        .await?;
    let title = format!("{} to {}", args.start, args.end);
    format_todos(renderer, &todos, &title, format)
}

/// Load a todo, apply `change`, and write it back.
async fn edit(
    mapper: &TodoMapper,
    renderer: &PrettyRenderer,
    id: i64,
    format: OutputFormat,
    change: impl FnOnce(&mut TodoRecord),
) -> Result<String, TodoError> {
    let mut todo = find(mapper, id).await?;
    change(&mut todo);

    if !mapper.update_by_id(&todo).await? {
        return Err(not_found(id));
    }
    format_todo(renderer, &todo, format)
}

/// Execute delete command
async fn delete(mapper: &TodoMapper, id: i64, format: OutputFormat) -> Result<String, TodoError> {
    if !mapper.delete_by_id(id).await? {
        return Err(not_found(id));
    }

    Ok(match format {
        OutputFormat::Pretty => format!("Deleted todo {id}"),
        OutputFormat::Json => serde_json::json!({ "deleted": id }).to_string(),
    })
}

/// Execute range command
async fn range(mapper: &TodoMapper, format: OutputFormat) -> Result<String, TodoError> {
    let earliest: NaiveDate = mapper.find_earliest_date().await?;
    let latest = mapper.find_latest_date().await?;
    format_range(earliest, latest, format)
}

fn path(factory: &StorageFactory) -> String {
    factory
        .database_path()
        .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
}

async fn find(mapper: &TodoMapper, id: i64) -> Result<TodoRecord, TodoError> {
    mapper.find_by_id(id).await?.ok_or_else(|| not_found(id))
}

fn not_found(id: i64) -> TodoError {
    TodoError::NotFound(format!("todo {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn factory() -> StorageFactory {
        StorageFactory::new(Database::open_in_memory().unwrap())
    }

    async fn exec(factory: &StorageFactory, command: Commands) -> Result<String, TodoError> {
        run(factory, command, &Config::default(), OutputFormat::Json).await
    }

    fn add_cmd(name: &str, due: &str) -> Commands {
        Commands::Add(AddArgs {
            name: name.to_string(),
            due: Some(NaiveDate::parse_from_str(due, "%Y-%m-%d").unwrap()),
        })
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let factory = factory();
        exec(&factory, add_cmd("first", "2024-01-01")).await.unwrap();
        exec(&factory, add_cmd("second", "2024-01-02")).await.unwrap();

        let output = exec(
            &factory,
            Commands::List(ListArgs {
                filter: None,
                page: 1,
                limit: Some(1),
            }),
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["list"], "Page 1 of 2");
        assert_eq!(value["items"][0]["name"], "first");
    }

    #[tokio::test]
    async fn test_done_and_reopen() {
        let factory = factory();
        exec(&factory, add_cmd("task", "2024-01-01")).await.unwrap();

        let done = exec(&factory, Commands::Done { id: 1 }).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&done).unwrap();
        assert_eq!(value["done"], true);
        assert_eq!(value["actual_end_date"], today().to_string());

        let reopened = exec(&factory, Commands::Reopen { id: 1 }).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&reopened).unwrap();
        assert_eq!(value["done"], false);
        assert!(value["actual_end_date"].is_null());
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let factory = factory();

        let err = exec(&factory, Commands::Done { id: 42 }).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound(_)));

        let err = exec(&factory, Commands::Delete { id: 42 }).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_rejects_page_zero() {
        let factory = factory();
        let err = exec(
            &factory,
            Commands::List(ListArgs {
                filter: None,
                page: 0,
                limit: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TodoError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_path_of_in_memory_database() {
        let factory = factory();
        assert_eq!(exec(&factory, Commands::Path).await.unwrap(), ":memory:");
    }
}
