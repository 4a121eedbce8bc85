//! Core repository components
//!
//! This module contains the building blocks of a repository:
//!
//! - `database`: Content store for blobs and commits
//! - `index`: Staging area for the next commit
//! - `refs`: Branches, HEAD and the branch bookkeeping files
//! - `repository`: High-level repository operations and coordination
//! - `workspace`: Working directory file system operations

pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
