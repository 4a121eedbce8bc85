//! Branch-name equivalence
//!
//! Deleting a branch folds its name into the current branch, so history that
//! the deleted branch recorded in the children index still counts for the
//! branch that absorbed it. Lookups follow the chain to its representative
//! and compress the path they walked.
//!
//! ## File Format
//!
//! One line per folded name: `<name> <name it was folded into>`

use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchEquivalence {
    parents: BTreeMap<BranchName, BranchName>,
}

impl BranchEquivalence {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut parents = BTreeMap::new();

        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let (name, parent) = line
                .split_once(' ')
                .context("Invalid equivalence entry: missing representative")?;
            parents.insert(
                BranchName::try_parse(name.to_string())?,
                BranchName::try_parse(parent.to_string())?,
            );
        }

        Ok(Self { parents })
    }

    /// Representative of the class `name` belongs to
    pub fn find(&mut self, name: &BranchName) -> BranchName {
        let mut root = name.clone();
        let mut path = Vec::new();

        while let Some(parent) = self.parents.get(&root) {
            path.push(root.clone());
            root = parent.clone();
        }

        for visited in path {
            if visited != root {
                self.parents.insert(visited, root.clone());
            }
        }

        root
    }

    /// Fold `name`'s class into `into`'s class
    pub fn union(&mut self, name: &BranchName, into: &BranchName) {
        let from = self.find(name);
        let to = self.find(into);

        if from != to {
            self.parents.insert(from, to);
        }
    }

    /// Make `name` its own class again, keeping names folded into it with its
    /// former representative
    pub fn reset(&mut self, name: &BranchName) {
        let names = self.parents.keys().cloned().collect::<Vec<_>>();
        for other in names {
            self.find(&other);
        }

        self.parents.remove(name);
    }

    pub fn serialize(&self) -> String {
        self.parents
            .iter()
            .map(|(name, parent)| format!("{name} {parent}\n"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    #[test]
    fn folded_names_resolve_to_the_absorbing_branch() {
        let mut equivalence = BranchEquivalence::default();
        equivalence.union(&branch("a"), &branch("b"));
        equivalence.union(&branch("b"), &branch("c"));

        assert_eq!(equivalence.find(&branch("a")), branch("c"));
        assert_eq!(equivalence.find(&branch("c")), branch("c"));
        assert_eq!(equivalence.find(&branch("other")), branch("other"));
    }

    #[test]
    fn lookups_compress_the_chain() {
        let mut equivalence = BranchEquivalence::default();
        equivalence.union(&branch("a"), &branch("b"));
        equivalence.union(&branch("b"), &branch("c"));

        equivalence.find(&branch("a"));

        let parsed = BranchEquivalence::parse(&equivalence.serialize()).unwrap();
        assert_eq!(parsed.parents.get(&branch("a")), Some(&branch("c")));
    }

    #[test]
    fn reset_detaches_only_the_recreated_name() {
        let mut equivalence = BranchEquivalence::default();
        equivalence.union(&branch("old"), &branch("x"));
        equivalence.union(&branch("x"), &branch("master"));

        equivalence.reset(&branch("x"));

        assert_eq!(equivalence.find(&branch("x")), branch("x"));
        assert_eq!(equivalence.find(&branch("old")), branch("master"));
    }
}
