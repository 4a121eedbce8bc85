//! Merge algorithms
//!
//! - `bca_finder`: Best common ancestors of two commits
//! - `split_point`: Ranking of several best common ancestors into one split point
//! - `resolution`: Per-file three-way classification and conflict markers

pub mod bca_finder;
pub mod resolution;
pub mod split_point;
