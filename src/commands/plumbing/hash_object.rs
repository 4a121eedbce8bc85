use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::io::Write;
use std::path::Path;

impl Repository {
    pub fn hash_object(&self, file: &str, write: bool) -> anyhow::Result<()> {
        let path = self.workspace().relative_path(Path::new(file));
        let blob = self.workspace().parse_blob(&path)?;
        let object_id = blob.object_id()?;

        writeln!(self.writer(), "{object_id}")?;

        if write {
            self.ensure_initialized()?;
            self.database().store(&blob)?;
        }

        Ok(())
    }
}
