use crate::areas::repository::Repository;
use crate::errors::TwigError;
use std::path::{Path, PathBuf};
use tracing::info;

impl Repository {
    /// Stage the current content of working-tree files
    ///
    /// Every path is checked before anything is stored, so a bad path leaves
    /// the staging area untouched. Content identical to the current tip's
    /// leaves nothing staged for the path.
    pub fn add(&self, files: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let paths = files
            .iter()
            .map(|file| self.stageable_path(file))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let (_, head) = self.head_commit()?;

        let mut index = self.index();
        for path in paths {
            let blob = self.workspace().parse_blob(&path)?;
            let blob_id = self.database().store(&blob)?;
            index.stage(path.clone(), blob_id.clone(), head.blob_for(&path));

            info!(path = %path.display(), oid = %blob_id, "staged file");
        }
        index.write_updates()?;

        Ok(())
    }

    fn stageable_path(&self, file: &str) -> anyhow::Result<PathBuf> {
        let path = self.workspace().relative_path(Path::new(file));
        if !self.workspace().is_file(&path) {
            return Err(TwigError::FileNotFound { path }.into());
        }
        // commit objects record one path per line
        if path.to_string_lossy().contains(['\n', '\r']) {
            return Err(TwigError::UnsupportedPath { path }.into());
        }

        Ok(path)
    }
}
