//! Path resolution for todolite data files.
//!
//! All todolite data lives in `~/.todolite/`:
//! - `config.yaml` - Settings file
//! - `todolite.db` - SQLite database holding the todo table

use std::path::PathBuf;

use crate::error::TodoError;

/// Name of the per-user data directory.
const DATA_DIR: &str = ".todolite";

/// Name of the database file inside the data directory.
const DATABASE_FILE: &str = "todolite.db";

/// Paths to todolite configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.todolite/`
    pub root: PathBuf,
    /// Config file: `~/.todolite/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.todolite/todolite.db`
    pub database: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, TodoError> {
        let home = std::env::var("HOME")
            .map_err(|_| TodoError::Config("Could not determine home directory".to_string()))?;

        Ok(Self::with_root(PathBuf::from(home).join(DATA_DIR)))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join(DATABASE_FILE),
            root,
        }
    }

    /// Ensure the data directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), TodoError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                TodoError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
