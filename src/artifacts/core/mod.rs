//! Shared output helpers

use derive_new::new;
use minus::Pager;
use std::io::{self, Write};

/// `Write` adapter feeding a `minus` pager
///
/// `log` and `global-log` write their blocks through this when stdout is a
/// terminal; the pager is shown once the command returns.
#[derive(new, Clone)]
pub struct PagerWriter {
    pager: Pager,
}

impl PagerWriter {
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Display everything written so far and wait for the user to quit
    pub fn page(self) -> anyhow::Result<()> {
        minus::page_all(self.pager)?;
        Ok(())
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.pager.push_str(text).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
