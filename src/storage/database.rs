//! `SQLite` connection handle.
//!
//! The database is stored at `~/.todolite/todolite.db`. One connection is
//! opened per process and shared by cloning the [`Database`] handle. Every
//! statement runs while the handle's lock is held, so concurrent callers are
//! serialized onto the connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::debug;

use crate::config::Paths;
use crate::error::{Result, TodoError};

/// Shared handle to the single database connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the data directory if necessary. Migrations are not run here;
    /// that is the job of [`StorageFactory`](super::StorageFactory).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown or the database
    /// cannot be opened.
    pub fn open() -> Result<Self> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            TodoError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        debug!(path = %resolved.display(), "opened database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(resolved),
        })
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| TodoError::Database(format!("Failed to open in-memory database: {e}")))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Absolute path of the database file, `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` against the connection on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn with_connection<R>(&self, f: impl FnOnce(&Connection) -> Result<R>) -> Result<R> {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` against the connection on the blocking worker pool.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or [`TodoError::Database`] if the worker
    /// task panicked.
    pub async fn call<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&Connection) -> Result<R> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.with_connection(f)).await?
    }

    /// Hold the connection lock directly.
    #[cfg(test)]
    pub(crate) fn lock(&self) -> parking_lot::MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish_non_exhaustive()
    }
}
