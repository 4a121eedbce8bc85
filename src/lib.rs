//! A small local version-control engine
//!
//! The crate is organized the same way the repository is laid out on disk:
//!
//! - `areas`: the storage areas of a repository (object database, staging index,
//!   references, working tree) and the `Repository` that ties them together
//! - `artifacts`: the data structures and algorithms that live in those areas
//!   (objects, branch bookkeeping, history traversal, checkout migrations, merge)
//! - `commands`: the operations exposed to the command line
//! - `errors`: the error taxonomy shared by every operation
//! - `logging`: tracing subscriber setup for the binary

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
pub mod logging;

/// Name of the repository metadata directory inside the working tree
pub const REPOSITORY_DIR: &str = ".twig";
