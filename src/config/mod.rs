//! Configuration management for todolite.
//!
//! This module handles path resolution and settings stored in `~/.todolite/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ColorSetting, Config, GeneralConfig, PoolConfig, StorageConfig};
