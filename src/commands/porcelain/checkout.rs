use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::conflict::ObstructionPolicy;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::commit::Commit;
use crate::errors::TwigError;
use std::path::Path;
use tracing::info;

impl Repository {
    /// Restore a file from the tip of the current branch
    pub fn checkout_file(&self, file: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (_, head) = self.head_commit()?;
        self.restore_file(&head, file)
    }

    /// Restore a file from the commit an ID abbreviation names
    pub fn checkout_commit_file(&self, commit_prefix: &str, file: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (_, commit) = self.resolve_commit(commit_prefix)?;
        self.restore_file(&commit, file)
    }

    /// Make `branch` the current branch and its tip the working tree
    pub fn checkout_branch(&self, branch: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let target = BranchName::try_parse(branch.to_string())
            .map_err(|_| TwigError::unknown_branch(branch))?;
        let current = self.refs().current_branch()?;
        if target == current {
            return Err(TwigError::SameBranch.into());
        }

        let target_oid = self.refs().branch_tip(&target)?;
        let target_commit = self.database().load_commit(&target_oid)?;
        let (_, head) = self.head_commit()?;

        let mut migration = Migration::new(
            self,
            head.files(),
            target_commit.files(),
            ObstructionPolicy::ContentSensitive,
        );
        migration.apply_changes()?;

        let mut index = self.index();
        index.clear();
        index.write_updates()?;
        self.refs().set_current_branch(&target)?;

        info!(from = %current, to = %target, "switched branch");

        Ok(())
    }

    fn restore_file(&self, commit: &Commit, file: &str) -> anyhow::Result<()> {
        let path = self.workspace().relative_path(Path::new(file));
        let blob_id = commit
            .blob_for(&path)
            .ok_or_else(|| TwigError::FileNotInCommit { path: path.clone() })?;
        if self.workspace().path().join(&path).is_dir() {
            return Err(TwigError::UntrackedObstruction { paths: vec![path] }.into());
        }

        let blob = self.database().load_blob(blob_id)?;
        self.workspace().write_file(&path, blob.content())?;

        info!(path = %path.display(), oid = %blob_id, "restored file");

        Ok(())
    }
}
