//! Storage bootstrap.
//!
//! [`StorageFactory`] owns the database handle, runs the migration chain once
//! in the background, and hands out [`TodoMapper`]s once the schema is ready.
//! Callers that ask for a mapper early wait on a watch channel until the
//! migration result is published.

use std::path::Path;

use tokio::sync::watch;
use tracing::{error, info};

use super::database::Database;
use super::mapper::TodoMapper;
use super::migrations::{self, Migration};
use crate::error::{Result, TodoError};

/// Progress of the one-time migration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationState {
    /// Migrations are still running.
    Pending,
    /// Schema is current; mappers can be handed out.
    Ready,
    /// Migrations failed; no mapper will ever be handed out.
    Failed(String),
}

/// Entry point to the storage layer.
#[derive(Debug)]
pub struct StorageFactory {
    db: Database,
    state: watch::Receiver<MigrationState>,
}

impl StorageFactory {
    /// Open the default database and start migrating it.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Database::open()?))
    }

    /// Start migrating `db` in the background.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self::with_migrations(db, migrations::MIGRATIONS)
    }

    /// Start running a custom migration chain against `db`.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_migrations(db: Database, steps: &'static [Migration]) -> Self {
        let (tx, rx) = watch::channel(MigrationState::Pending);

        let migrate_db = db.clone();
        tokio::spawn(async move {
            let state = match migrate_db
                .call(move |conn| migrations::run_steps(conn, steps))
                .await
            {
                Ok(report) => {
                    info!(
                        applied = report.applied(),
                        statements = report.statements(),
                        "storage ready"
                    );
                    MigrationState::Ready
                }
                Err(e) => {
                    error!(error = %e, "storage migration failed");
                    MigrationState::Failed(e.to_string())
                }
            };
            drop(tx.send_replace(state));
        });

        Self { db, state: rx }
    }

    /// Wait for migrations to finish and return a mapper.
    ///
    /// Any number of callers may wait concurrently; all are released together
    /// when the migration result is published.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::MigrationFailed`] if the migration chain failed.
    pub async fn mapper(&self) -> Result<TodoMapper> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(|state| *state != MigrationState::Pending)
            .await
            .map_err(|_| {
                TodoError::MigrationFailed("migration task stopped without reporting".to_string())
            })?
            .clone();

        match state {
            MigrationState::Ready => Ok(TodoMapper::new(self.db.clone())),
            MigrationState::Failed(message) => Err(TodoError::MigrationFailed(message)),
            MigrationState::Pending => unreachable!("wait_for only returns settled states"),
        }
    }

    /// Current migration state, without waiting.
    #[must_use]
    pub fn state(&self) -> MigrationState {
        self.state.borrow().clone()
    }

    /// True once migrations completed successfully.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.state.borrow() == MigrationState::Ready
    }

    /// Absolute path of the database file, available before migrations end.
    #[must_use]
    pub fn database_path(&self) -> Option<&Path> {
        self.db.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::migrations::Predicate;
    use std::time::Duration;

    #[tokio::test]
    async fn test_mapper_after_migration() {
        let factory = StorageFactory::new(Database::open_in_memory().unwrap());

        let mapper = factory.mapper().await.unwrap();
        assert!(factory.is_ready());
        assert_eq!(mapper.count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_database_path_available_immediately() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("todo.db");
        let db = Database::open_at(&db_path).unwrap();

        let guard = db.lock();
        let factory = StorageFactory::new(db.clone());
        assert!(factory.database_path().unwrap().ends_with("todo.db"));
        assert_eq!(factory.state(), MigrationState::Pending);
        drop(guard);

        factory.mapper().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_waiters_released_after_migration() {
        let db = Database::open_in_memory().unwrap();

        // Holding the connection keeps the migration task blocked.
        let guard = db.lock();
        let factory = std::sync::Arc::new(StorageFactory::new(db.clone()));

        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let factory = std::sync::Arc::clone(&factory);
                tokio::spawn(async move { factory.mapper().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(waiters.iter().all(|w| !w.is_finished()));
        assert!(!factory.is_ready());

        drop(guard);

        for waiter in waiters {
            let mapper = waiter.await.unwrap().unwrap();
            assert!(factory.is_ready());
            assert_eq!(mapper.count(None).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_failed_migration_rejects_all_waiters() {
        const BROKEN: &[Migration] = &[Migration {
            id: "broken",
            predicate: Predicate::Always,
            script: "no-such-script",
        }];
        let factory =
            StorageFactory::with_migrations(Database::open_in_memory().unwrap(), BROKEN);

        let (a, b) = tokio::join!(factory.mapper(), factory.mapper());
        assert!(matches!(a, Err(TodoError::MigrationFailed(_))));
        assert!(matches!(b, Err(TodoError::MigrationFailed(_))));
        assert!(matches!(factory.state(), MigrationState::Failed(msg) if msg.contains("no-such-script")));
    }
}
