#![allow(dead_code)]

pub mod command;
pub mod file;

/// Commit date every test commit is made with
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

/// `Date:` line of a commit made at [`COMMIT_DATE`]
pub const COMMIT_DATE_LINE: &str = "Date: Sun Jan 1 12:00:00 2023 +0000";
