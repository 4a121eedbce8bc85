//! Version-control data structures and algorithms
//!
//! - `branch`: Branch names, the children index and branch-name equivalence
//! - `checkout`: Working-tree migrations and untracked obstruction checks
//! - `core`: Shared utilities (pager wrapper)
//! - `diff`: Snapshot comparison
//! - `index`: Staging area file format
//! - `log`: Commit history traversal
//! - `merge`: Split point search and three-way file resolution
//! - `objects`: Object types (blob, commit)
//! - `status`: Working tree status inspection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod diff;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
