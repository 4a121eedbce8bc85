use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::ObstructionPolicy;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::resolution::{self, MergeAction};
use crate::artifacts::merge::split_point::{MergeSide, SplitPointFinder};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, TrackedFiles};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

pub const ANCESTOR_NOTICE: &str = "Given branch is an ancestor of the current branch.";
pub const FAST_FORWARD_NOTICE: &str = "Current branch fast-forwarded.";
pub const CONFLICT_NOTICE: &str = "Encountered a merge conflict.";

impl Repository {
    /// Merge the given branch into the current one
    pub fn merge(&self, other_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let head_branch = self.refs().current_branch()?;
        let other_branch = BranchName::try_parse(other_name.to_string())
            .map_err(|_| TwigError::unknown_branch(other_name))?;
        if other_branch == head_branch {
            return Err(TwigError::SelfMerge.into());
        }
        let other_oid = self.refs().branch_tip(&other_branch)?;
        if !self.index().is_empty() {
            return Err(TwigError::UncommittedChanges.into());
        }

        let (head_oid, head) = self.head_commit()?;
        let split_oid = SplitPointFinder::new(self.database(), self.refs()).find(
            &MergeSide::new(&head_branch, &head_oid),
            &MergeSide::new(&other_branch, &other_oid),
        )?;
        debug!(head = %head_oid, other = %other_oid, split = %split_oid, "found split point");

        if split_oid == other_oid {
            writeln!(self.writer(), "{ANCESTOR_NOTICE}")?;
            return Ok(());
        }

        let other = self.database().load_commit(&other_oid)?;
        if split_oid == head_oid {
            return self.fast_forward(&head_branch, &head, &other_oid, &other);
        }

        let split = self.database().load_commit(&split_oid)?;
        let (merged, conflicts) = self.resolve_files(&split, &head, &other)?;

        let mut migration = Migration::new(self, head.files(), &merged, ObstructionPolicy::Strict);
        migration.apply_changes()?;

        let message = format!("Merged {other_branch} into {head_branch}.");
        let merge_oid = self.write_commit(vec![head_oid, other_oid], merged, message)?;

        if !conflicts.is_empty() {
            writeln!(self.writer(), "{CONFLICT_NOTICE}")?;
        }
        info!(oid = %merge_oid, conflicts = conflicts.len(), "merged {other_branch} into {head_branch}");

        Ok(())
    }

    fn fast_forward(
        &self,
        head_branch: &BranchName,
        head: &Commit,
        other_oid: &ObjectId,
        other: &Commit,
    ) -> anyhow::Result<()> {
        let mut migration = Migration::new(
            self,
            head.files(),
            other.files(),
            ObstructionPolicy::ContentSensitive,
        );
        migration.apply_changes()?;

        self.refs().update_branch(head_branch, other_oid)?;
        self.refs().record_child(other_oid, head_branch)?;

        let mut index = self.index();
        index.clear();
        index.write_updates()?;
        drop(index);

        writeln!(self.writer(), "{FAST_FORWARD_NOTICE}")?;
        info!(branch = %head_branch, oid = %other_oid, "fast-forwarded");

        Ok(())
    }

    /// Files of the merge commit and the paths left in conflict
    ///
    /// Conflict blobs are stored so the merge commit can reference them.
    fn resolve_files(
        &self,
        split: &Commit,
        head: &Commit,
        other: &Commit,
    ) -> anyhow::Result<(TrackedFiles, BTreeSet<PathBuf>)> {
        let paths = split
            .files()
            .keys()
            .chain(head.files().keys())
            .chain(other.files().keys())
            .collect::<BTreeSet<_>>();

        let mut merged = head.files().clone();
        let mut conflicts = BTreeSet::new();

        for path in paths {
            let action = resolution::classify(
                split.blob_for(path),
                head.blob_for(path),
                other.blob_for(path),
            );
            debug!(path = %path.display(), ?action, "classified path");

            match action {
                MergeAction::Keep => {}
                MergeAction::TakeOther(oid) => {
                    merged.insert(path.clone(), oid);
                }
                MergeAction::Remove => {
                    merged.remove(path);
                }
                MergeAction::Conflict {
                    head: head_blob,
                    other: other_blob,
                } => {
                    let content = resolution::conflict_content(
                        &self.blob_content(head_blob.as_ref())?,
                        &self.blob_content(other_blob.as_ref())?,
                    );
                    let conflict_oid = self.database().store(&Blob::new(content))?;

                    merged.insert(path.clone(), conflict_oid);
                    conflicts.insert(path.clone());
                }
            }
        }

        Ok((merged, conflicts))
    }

    fn blob_content(&self, oid: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match oid {
            Some(oid) => Ok(self.database().load_blob(oid)?.into_content()),
            None => Ok(Bytes::new()),
        }
    }
}
