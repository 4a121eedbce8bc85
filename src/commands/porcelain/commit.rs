use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Commit, TrackedFiles, commit_timestamp};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::TwigError;
use std::io::Write;
use tracing::info;

impl Repository {
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let message = message.trim();
        if message.is_empty() {
            return Err(TwigError::EmptyMessage.into());
        }

        let (head_oid, head) = self.head_commit()?;
        let files = self.index().build_next_snapshot(head.files())?;
        let commit_oid = self.write_commit(vec![head_oid], files, message.to_string())?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            self.refs().current_branch()?,
            commit_oid.to_short_oid(),
            message
        )?;

        Ok(())
    }

    /// Store a commit on the current branch and clear the staging area
    ///
    /// Every blob must already be stored. A single-parent commit must differ
    /// from its parent; merge commits may repeat their first parent's files.
    pub(crate) fn write_commit(
        &self,
        parents: Vec<ObjectId>,
        files: TrackedFiles,
        message: String,
    ) -> anyhow::Result<ObjectId> {
        if let Some((path, oid)) = files.iter().find(|(_, oid)| !self.database().contains(oid)) {
            return Err(TwigError::invariant(format!(
                "blob {oid} for {} is not stored",
                path.display()
            ))
            .into());
        }

        if let [parent] = parents.as_slice()
            && self.database().load_commit(parent)?.files() == &files
        {
            return Err(TwigError::EmptyCommit.into());
        }

        let commit = Commit::new(parents, commit_timestamp(), files, message);
        let commit_oid = self.database().store(&commit)?;

        let branch = self.refs().current_branch()?;
        self.refs().update_branch(&branch, &commit_oid)?;
        self.refs().record_commit(&commit_oid, &branch)?;

        let mut index = self.index();
        index.clear();
        index.write_updates()?;

        info!(branch = %branch, oid = %commit_oid, merge = commit.is_merge(), "created commit");

        Ok(commit_oid)
    }
}
