//! Children index
//!
//! Records, for every commit, the names of the branches that have passed
//! through it: the branch a commit was made on, branches created at it, and
//! branches reset to it. The merge engine uses it to rank split-point
//! candidates.
//!
//! ## File Format
//!
//! One line per commit: `<commit-id> <branch> <branch> ...`

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildrenIndex {
    entries: BTreeMap<ObjectId, BTreeSet<BranchName>>,
}

impl ChildrenIndex {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let mut entries = BTreeMap::new();

        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let mut fields = line.split(' ');
            let oid = fields
                .next()
                .context("Invalid children index: missing commit id")?;
            let oid = ObjectId::try_parse(oid.to_string())?;

            let names = fields
                .filter(|name| !name.is_empty())
                .map(|name| BranchName::try_parse(name.to_string()))
                .collect::<Result<BTreeSet<_>, _>>()?;
            entries.insert(oid, names);
        }

        Ok(Self { entries })
    }

    pub fn record(&mut self, oid: ObjectId, branch: BranchName) {
        self.entries.entry(oid).or_default().insert(branch);
    }

    pub fn names(&self, oid: &ObjectId) -> impl Iterator<Item = &BranchName> {
        self.entries.get(oid).into_iter().flatten()
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(oid, names)| {
                let names = names.iter().map(|name| name.as_ref()).collect::<Vec<_>>();
                format!("{} {}\n", oid, names.join(" "))
            })
            .collect()
    }
}
