//! Branch naming and the bookkeeping the merge engine keeps about branches
//!
//! - `branch_name`: validated branch names and the `HEAD` symbolic ref
//! - `children`: which branches passed through each commit
//! - `equivalence`: which branch names have been folded into one another

pub mod branch_name;
pub mod children;
pub mod equivalence;

pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
