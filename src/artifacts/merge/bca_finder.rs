//! Best common ancestor finder
//!
//! This module finds the best common ancestors of two commits, the candidates
//! for the split point of a three-way merge.
//!
//! ## Algorithm Overview
//!
//! The implementation uses a two-phase algorithm:
//!
//! ### Phase 1: Find All Common Ancestors
//!
//! A bidirectional graph traversal explores the commit history of both input commits:
//! - Process commits newest first (priority queue keyed by timestamp)
//! - Mark commits as visited from source or target side
//! - When a commit is visited from both sides, mark it as a common ancestor
//! - Mark the parents of common ancestors as STALE to prune the search space
//!
//! A commit whose visit state grows is queued again, so the traversal reaches
//! the same fixpoint whatever order equal timestamps are popped in.
//!
//! ### Phase 2: Filter to Best Common Ancestors
//!
//! > A best common ancestor of commits X and Y is any common ancestor of X and Y
//! > that is not an ancestor of any other common ancestor.
//!
//! Every candidate left by phase 1 that is reachable from another candidate is
//! dropped.
//!
//! ## Supported Scenarios
//!
//! - Linear histories (ancestor-descendant relationships)
//! - Simple two-way merges
//! - Criss-cross merges with multiple common ancestors
//! - Long parallel development branches
//! - Unrelated histories (no common ancestor)
//!
//! ## Debug Logging
//!
//! Traversal steps are logged with `tracing` at debug level under this
//! module's target. Build with `--features debug_merge` to have them enabled
//! by default.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
        const STALE = 0b100; // ancestor of a common ancestor
        const RESULT = 0b1000; // common ancestor
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if self.contains(VisitState::STALE) {
            flags.push("STALE");
        }
        if self.contains(VisitState::RESULT) {
            flags.push("RESULT");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Finds the best common ancestors of two commits
///
/// The commit loader abstracts over the storage backend (the content store
/// behind a [`CommitCache`](crate::areas::database::CommitCache), or an
/// in-memory graph in tests). It must fail for unknown commits.
pub struct BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Every best common ancestor of `source_commit_id` and `target_commit_id`
    ///
    /// Sorted by ID; empty when the histories share no commit.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// // Criss-cross merge with two best common ancestors:
    /// //     A
    /// //    / \
    /// //   B   C
    /// //   |\ /|
    /// //   | X |
    /// //   |/ \|
    /// //   D   E
    /// let bcas = finder.find_best_common_ancestors(&d, &e)?;
    /// // [B, C] in ID order
    /// ```
    pub fn find_best_common_ancestors(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<Vec<ObjectId>> {
        let common_ancestors = self.find_common_ancestors(source_commit_id, target_commit_id)?;

        debug!(
            candidates = %join_oids(common_ancestors.iter()),
            "found common ancestors"
        );

        let mut best_common_ancestors = Vec::new();
        for commit in &common_ancestors {
            let mut is_redundant = false;
            for other in common_ancestors.iter().filter(|other| *other != commit) {
                if self.is_ancestor_of(commit, other)? {
                    is_redundant = true;
                    break;
                }
            }

            if !is_redundant {
                best_common_ancestors.push(commit.clone());
            }
        }
        best_common_ancestors.sort();

        debug!(
            best = %join_oids(best_common_ancestors.iter()),
            "filtered redundant common ancestors"
        );

        Ok(best_common_ancestors)
    }

    /// Phase 1: common ancestors that are not parents of other common ancestors
    fn find_common_ancestors(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<HashSet<ObjectId>> {
        if source_commit_id == target_commit_id {
            return Ok(HashSet::from([source_commit_id.clone()]));
        }

        let mut ancestors_states = HashMap::<ObjectId, VisitState>::new();
        let mut priority_queue = BinaryHeap::new();

        for (commit_id, state) in [
            (source_commit_id, VisitState::VISITED_FROM_SOURCE),
            (target_commit_id, VisitState::VISITED_FROM_TARGET),
        ] {
            let commit = (self.commit_loader)(commit_id)?;
            ancestors_states.insert(commit.oid.clone(), state);
            priority_queue.push((commit.timestamp, commit.oid));
        }

        while let Some((_, commit_id)) = priority_queue.pop() {
            let current_state = ancestors_states
                .get(&commit_id)
                .copied()
                .unwrap_or(VisitState::NONE);

            debug!(commit = %commit_id, state = %current_state, "processing commit");

            if current_state.contains(VisitState::STALE) {
                continue;
            }

            let is_common_ancestor = current_state.contains(VisitState::VISITED_FROM_BOTH);
            if is_common_ancestor {
                ancestors_states
                    .entry(commit_id.clone())
                    .and_modify(|state| *state |= VisitState::RESULT);
            }

            let current_commit = (self.commit_loader)(&commit_id)?;
            let inherited = current_state & VisitState::VISITED_FROM_BOTH;

            for parent_id in &current_commit.parents {
                let parent_state = ancestors_states
                    .get(parent_id)
                    .copied()
                    .unwrap_or(VisitState::NONE);

                let mut new_state = parent_state | inherited;
                if is_common_ancestor {
                    new_state |= VisitState::STALE;
                }

                if new_state != parent_state {
                    let parent_commit = (self.commit_loader)(parent_id)?;
                    ancestors_states.insert(parent_id.clone(), new_state);
                    priority_queue.push((parent_commit.timestamp, parent_id.clone()));
                }
            }
        }

        Ok(ancestors_states
            .into_iter()
            .filter(|(_, state)| {
                !state.contains(VisitState::STALE) && state.contains(VisitState::RESULT)
            })
            .map(|(oid, _)| oid)
            .collect())
    }

    /// Whether `ancestor` is reachable from `descendant` through parent links
    fn is_ancestor_of(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([descendant.clone()]);

        while let Some(current) = queue.pop_front() {
            if &current == ancestor {
                return Ok(true);
            }
            if !visited.insert(current.clone()) {
                continue;
            }

            queue.extend((self.commit_loader)(&current)?.parents);
        }

        Ok(false)
    }
}

fn join_oids<'o>(oids: impl Iterator<Item = &'o ObjectId>) -> String {
    oids.map(|oid| oid.to_short_oid())
        .collect::<Vec<_>>()
        .join(", ")
}
