//! Error taxonomy
//!
//! Every failure a command can report is a [`TwigError`]. Porcelain commands
//! return `anyhow::Result` so that I/O failures can carry context, but domain
//! failures are always raised as a `TwigError` and can be recovered with
//! `anyhow::Error::downcast_ref`.
//!
//! Errors fall into the groups described by [`ErrorKind`]:
//!
//! - user input errors abort the operation before any state changes
//! - obstruction errors are raised before the working tree is touched
//! - invariant violations mean the repository on disk is corrupt

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using twig's Error type.
pub type Result<T> = std::result::Result<T, TwigError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserInput,
    Obstruction,
    Invariant,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TwigError {
    #[error("A Twig version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("Not in an initialized Twig directory.")]
    NotARepository,

    #[error("File does not exist.")]
    FileNotFound { path: PathBuf },

    #[error("File names cannot contain line breaks: {path:?}")]
    UnsupportedPath { path: PathBuf },

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NoChanges,

    #[error("No changes added to the commit: the snapshot is identical to its parent.")]
    EmptyCommit,

    #[error("No reason to remove the file.")]
    NothingToRemove { path: PathBuf },

    #[error("No commit with that id exists.")]
    UnknownCommit { id: String },

    #[error("{}", abbreviation_message(.prefix, .matches))]
    AmbiguousOrUnknownId { prefix: String, matches: usize },

    #[error("File does not exist in that commit.")]
    FileNotInCommit { path: PathBuf },

    #[error("A branch with that name already exists.")]
    DuplicateBranch { name: String },

    #[error("A branch with that name does not exist.")]
    UnknownBranch { name: String },

    #[error("Invalid branch name: {name}")]
    InvalidBranchName { name: String },

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrent,

    #[error("No need to checkout the current branch.")]
    SameBranch,

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Found no commit with that message.")]
    FindNoMatch,

    #[error(
        "There is an untracked file in the way; delete it, or add and commit it first.\n{}",
        list_paths(.paths)
    )]
    UntrackedObstruction { paths: Vec<PathBuf> },

    #[error("Object not found: {id}")]
    ObjectNotFound { id: String },

    #[error("Repository invariant violated: {reason}")]
    InvariantViolation { reason: String },
}

impl TwigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TwigError::UntrackedObstruction { .. } => ErrorKind::Obstruction,
            TwigError::ObjectNotFound { .. } | TwigError::InvariantViolation { .. } => {
                ErrorKind::Invariant
            }
            _ => ErrorKind::UserInput,
        }
    }

    /// Create an InvariantViolation error.
    pub fn invariant(reason: impl Into<String>) -> Self {
        TwigError::InvariantViolation {
            reason: reason.into(),
        }
    }

    /// Create an UnknownBranch error.
    pub fn unknown_branch(name: impl Into<String>) -> Self {
        TwigError::UnknownBranch { name: name.into() }
    }
}

fn abbreviation_message(prefix: &str, matches: &usize) -> String {
    if *matches > 1 {
        format!("Commit id {prefix} is ambiguous: {matches} commits share that prefix.")
    } else {
        "No commit with that id exists.".to_string()
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("\t{}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
