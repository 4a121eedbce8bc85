//! Split point selection
//!
//! The split point of a merge is the best common ancestor of the two branch
//! tips. Criss-cross histories have several; they are ranked by:
//!
//! 1. whether both branches passed through the candidate (children index)
//! 2. the smallest combined distance from the two tips
//! 3. the order in which a breadth-first walk from the current tip finds them
//!
//! Histories without a common commit fall back to the root of the current tip.

use crate::areas::database::{CommitCache, Database};
use crate::areas::refs::Refs;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::log::ancestors::Ancestors;
use crate::artifacts::merge::bca_finder::BCAFinder;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use derive_new::new;
use std::collections::HashMap;
use tracing::debug;

/// A best common ancestor with the facts used to rank it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCandidate {
    pub oid: ObjectId,
    pub records_both: bool,
    pub combined_distance: usize,
    pub discovery_order: usize,
}

impl SplitCandidate {
    fn rank(&self) -> (bool, usize, usize) {
        (
            !self.records_both,
            self.combined_distance,
            self.discovery_order,
        )
    }
}

/// Best ranked candidate, if any
pub fn choose(candidates: Vec<SplitCandidate>) -> Option<SplitCandidate> {
    candidates
        .into_iter()
        .min_by_key(|candidate| candidate.rank())
}

/// One side of a merge
#[derive(Debug, Clone, new)]
pub struct MergeSide<'a> {
    pub branch: &'a BranchName,
    pub tip: &'a ObjectId,
}

#[derive(new)]
pub struct SplitPointFinder<'r> {
    database: &'r Database,
    refs: &'r Refs,
}

impl SplitPointFinder<'_> {
    pub fn find(&self, head: &MergeSide, other: &MergeSide) -> anyhow::Result<ObjectId> {
        let cache = CommitCache::new();
        let finder = BCAFinder::new(|oid: &ObjectId| cache.load(self.database, oid));
        let mut best = finder.find_best_common_ancestors(head.tip, other.tip)?;

        match best.len() {
            0 => self.root_of(head.tip),
            1 => Ok(best.remove(0)),
            _ => self.rank(best, head, other),
        }
    }

    fn rank(
        &self,
        best: Vec<ObjectId>,
        head: &MergeSide,
        other: &MergeSide,
    ) -> anyhow::Result<ObjectId> {
        let head_distances = self.distances_from(head.tip)?;
        let other_distances = self.distances_from(other.tip)?;

        let mut candidates = Vec::with_capacity(best.len());
        for oid in best {
            let children = self.refs.children_of(&oid)?;
            let (head_distance, discovery_order) =
                head_distances.get(&oid).copied().unwrap_or((usize::MAX, usize::MAX));
            let other_distance = other_distances
                .get(&oid)
                .map(|(distance, _)| *distance)
                .unwrap_or(usize::MAX);

            candidates.push(SplitCandidate {
                records_both: children.contains(head.branch) && children.contains(other.branch),
                combined_distance: head_distance.saturating_add(other_distance),
                discovery_order,
                oid,
            });
        }

        debug!(?candidates, "ranking split point candidates");

        choose(candidates)
            .map(|candidate| candidate.oid)
            .ok_or_else(|| TwigError::invariant("no split point candidate").into())
    }

    /// Distance and breadth-first discovery order of every ancestor of `tip`
    fn distances_from(&self, tip: &ObjectId) -> anyhow::Result<HashMap<ObjectId, (usize, usize)>> {
        Ancestors::new(self.database, tip.clone())
            .enumerate()
            .map(|(order, ancestor)| {
                ancestor.map(|ancestor| (ancestor.oid, (ancestor.distance, order)))
            })
            .collect()
    }

    fn root_of(&self, tip: &ObjectId) -> anyhow::Result<ObjectId> {
        for ancestor in Ancestors::new(self.database, tip.clone()) {
            let ancestor = ancestor?;
            if ancestor.commit.parents().is_empty() {
                return Ok(ancestor.oid);
            }
        }

        Err(TwigError::invariant(format!("commit {tip} has no root")).into())
    }
}
