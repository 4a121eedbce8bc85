//! Working-tree migrations
//!
//! Moving the working tree from one snapshot to another (branch switch,
//! reset, fast-forward, merge) goes through a [`migration::Migration`]:
//!
//! - compute the whole-file changes between the two snapshots
//! - check every path to be written against untracked files in the way
//! - abort before any write when something is obstructed
//! - delete, then create and overwrite files
//!
//! The obstruction rule is chosen per command through
//! [`conflict::ObstructionPolicy`].

pub mod conflict;
pub mod migration;
