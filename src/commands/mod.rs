//! Command implementations
//!
//! - `plumbing`: Object-level commands (hash-object, cat-file)
//! - `porcelain`: The user-facing workflow (add, commit, log, merge, etc.)
//!
//! Porcelain commands only touch objects through the database area, so the
//! plumbing commands see exactly what the workflow stores.

pub mod plumbing;
pub mod porcelain;
