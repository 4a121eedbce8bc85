use crate::areas::repository::Repository;
use std::path::Path;
use tracing::info;

impl Repository {
    /// Unstage a file, and stop tracking it if the current tip does
    ///
    /// A tracked file is also deleted from the working tree.
    pub fn rm(&self, file: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let path = self.workspace().relative_path(Path::new(file));
        let (_, head) = self.head_commit()?;

        let mut index = self.index();
        let tracked = index.unstage(&path, head.tracks(&path))?;
        if tracked {
            self.workspace().remove_file(&path)?;
        }
        index.write_updates()?;

        info!(path = %path.display(), tracked, "unstaged file");

        Ok(())
    }
}
