//! Whole-file comparison between snapshots
//!
//! Files are compared by blob ID only; there is no line-level diffing.

pub mod snapshot_diff;
