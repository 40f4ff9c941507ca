//! Storage layer for todolite.
//!
//! This module provides SQLite-based persistence for todo records:
//! - A single shared connection ([`Database`])
//! - A script runner and probe-driven migration chain
//! - [`StorageFactory`], which migrates once and hands out mappers
//! - [`TodoMapper`], the async CRUD and query surface

mod database;
mod factory;
mod mapper;
pub mod migrations;
mod script;

pub use database::Database;
pub use factory::{MigrationState, StorageFactory};
pub use mapper::{TodoMapper, DEFAULT_PAGE_LIMIT};
pub use migrations::{Migration, MigrationReport, Predicate, StepOutcome};
pub use script::ScriptRunner;
