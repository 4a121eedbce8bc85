//! Plumbing commands (low-level object operations)
//!
//! - `hash-object`: Compute a file's blob ID and optionally store it
//! - `cat-file`: Print a stored object

pub mod cat_file;
pub mod hash_object;
