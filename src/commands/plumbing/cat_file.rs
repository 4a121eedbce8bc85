use crate::areas::repository::Repository;
use crate::errors::TwigError;
use std::io::Write;

impl Repository {
    /// Print the object an ID or ID prefix names
    pub fn cat_file(&self, object_prefix: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let mut matches = self.database().find_objects_by_prefix(object_prefix)?;
        if matches.len() != 1 {
            return Err(TwigError::ObjectNotFound {
                id: object_prefix.to_string(),
            }
            .into());
        }

        let object = self.database().parse_object(&matches.remove(0))?;
        write!(self.writer(), "{}", object.display())?;

        Ok(())
    }
}
