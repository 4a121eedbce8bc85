use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::ObstructionPolicy;
use crate::artifacts::checkout::migration::Migration;
use tracing::info;

impl Repository {
    /// Move the current branch to a commit and check its files out
    pub fn reset(&self, commit_prefix: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let (target_oid, target) = self.resolve_commit(commit_prefix)?;
        let (_, head) = self.head_commit()?;

        let mut migration = Migration::new(
            self,
            head.files(),
            target.files(),
            ObstructionPolicy::ContentSensitive,
        );
        migration.apply_changes()?;

        let branch = self.refs().current_branch()?;
        self.refs().update_branch(&branch, &target_oid)?;
        self.refs().record_child(&target_oid, &branch)?;

        let mut index = self.index();
        index.clear();
        index.write_updates()?;

        info!(branch = %branch, oid = %target_oid, "reset branch");

        Ok(())
    }
}
