//! Core types for todolite.
//!
//! The persisted record and the generic object pool used by the view layer.

mod pool;
mod todo;

pub use pool::{ObjectPool, Pooled, Resettable};
pub use todo::{today, TodoRecord};
