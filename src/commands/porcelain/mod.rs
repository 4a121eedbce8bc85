//! Porcelain commands (user-facing operations)
//!
//! Each command is a method on `Repository`, defined in its own file. Reports
//! go to the repository's writer; failures are returned as `TwigError`s
//! wrapped in `anyhow::Error`.
//!
//! ## Commands
//!
//! - `init`: Create a repository with the initial commit
//! - `add` / `rm`: Stage and unstage files
//! - `commit`: Snapshot the staged changes
//! - `log`: First-parent history, every commit, or commits by message
//! - `status`: Branches, staging area and working tree changes
//! - `checkout`: Restore files or switch branches
//! - `branch`: Create and delete branches
//! - `reset`: Move the current branch to another commit
//! - `merge`: Three-way merge of another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;
