//! Command-line interface for todolite.

pub mod args;
pub mod commands;
