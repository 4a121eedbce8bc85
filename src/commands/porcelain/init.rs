use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::TwigError;
use anyhow::Context;
use std::fs;
use std::io::Write;
use tracing::info;

impl Repository {
    /// Create `.twig` with the initial commit on the default branch
    pub fn init(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(TwigError::AlreadyInitialized.into());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .twig/objects directory")?;
        self.refs()
            .init()
            .context("Failed to create the initial HEAD reference")?;

        let initial_oid = self.database().store(&Commit::initial())?;
        let default_branch = BranchName::default_branch();
        self.refs().update_branch(&default_branch, &initial_oid)?;
        self.refs().record_commit(&initial_oid, &default_branch)?;

        writeln!(
            self.writer(),
            "Initialized empty Twig repository in {}",
            self.twig_path().display()
        )?;
        info!(path = %self.path().display(), "initialized repository");

        Ok(())
    }
}
