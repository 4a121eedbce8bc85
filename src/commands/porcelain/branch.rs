use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::TwigError;
use tracing::info;

impl Repository {
    /// Create a branch at the tip of the current branch
    ///
    /// The current branch does not change.
    pub fn branch(&self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(branch_name.to_string())?;
        let source_oid = self.refs().head_oid()?;

        self.refs().create_branch(&branch_name, &source_oid)?;
        info!(branch = %branch_name, oid = %source_oid, "created branch");

        Ok(())
    }

    /// Delete a branch pointer; its commits stay
    pub fn delete_branch(&self, branch_name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let branch_name = BranchName::try_parse(branch_name.to_string())
            .map_err(|_| TwigError::unknown_branch(branch_name))?;

        let oid = self.refs().delete_branch(&branch_name)?;
        info!(branch = %branch_name, oid = %oid, "deleted branch");

        Ok(())
    }
}
