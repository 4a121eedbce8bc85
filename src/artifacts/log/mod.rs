//! Commit graph traversal
//!
//! - `rev_list`: first-parent history, as printed by `log`
//! - `ancestors`: breadth-first walk over every ancestor of a commit
//!
//! Both iterators load commits lazily and yield errors instead of stopping
//! silently on a commit that cannot be read.

pub mod ancestors;
pub mod rev_list;
