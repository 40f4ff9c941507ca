//! todolite - a small todo store on top of `SQLite`
//!
//! This crate provides the persistence core for a todo list: a single shared
//! connection, a probe-driven migration chain that runs once before any query,
//! an async mapper for CRUD and paginated queries, and a generic object pool
//! for recycling view objects. A small CLI sits on top.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod output;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use crate::core::{ObjectPool, Resettable, TodoRecord};
pub use error::TodoError;
pub use storage::{Database, StorageFactory, TodoMapper};
