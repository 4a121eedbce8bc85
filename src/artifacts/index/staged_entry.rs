//! Staged entry representation
//!
//! Each entry of the index is either a pending addition (path and the blob
//! that will be committed for it) or a pending removal (path only).
//!
//! ## Entry Format
//!
//! ```text
//! kind        u8         1 = addition, 2 = removal
//! blob id     20 bytes   zeros for removals
//! path length u16        network byte order
//! path        UTF-8
//! ```

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::anyhow;
use byteorder::{ByteOrder, NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{BufRead, Read, Write};
use std::path::{Path, PathBuf};

/// Size of the fixed part of an entry (kind, blob id, path length)
pub const ENTRY_FIXED_SIZE: usize = 1 + 20 + 2;

const ADDITION: u8 = 1;
const REMOVAL: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedEntry {
    Addition { path: PathBuf, oid: ObjectId },
    Removal { path: PathBuf },
}

impl StagedEntry {
    pub fn path(&self) -> &Path {
        match self {
            StagedEntry::Addition { path, .. } | StagedEntry::Removal { path } => path,
        }
    }

    /// Length of the path that follows the fixed part of an entry
    pub fn path_length(fixed: &[u8]) -> anyhow::Result<usize> {
        if fixed.len() < ENTRY_FIXED_SIZE {
            return Err(anyhow!("Truncated index entry"));
        }
        Ok(NetworkEndian::read_u16(&fixed[ENTRY_FIXED_SIZE - 2..ENTRY_FIXED_SIZE]) as usize)
    }
}

impl Packable for StagedEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let path = self
            .path()
            .to_str()
            .ok_or_else(|| anyhow!("Non UTF-8 path: {}", self.path().display()))?;
        let path_length =
            u16::try_from(path.len()).map_err(|_| anyhow!("Path too long: {path}"))?;

        let mut bytes = Vec::with_capacity(ENTRY_FIXED_SIZE + path.len());
        match self {
            StagedEntry::Addition { oid, .. } => {
                bytes.write_u8(ADDITION)?;
                oid.write_h40_to(&mut bytes)?;
            }
            StagedEntry::Removal { .. } => {
                bytes.write_u8(REMOVAL)?;
                bytes.write_all(&[0u8; 20])?;
            }
        }
        bytes.write_u16::<NetworkEndian>(path_length)?;
        bytes.write_all(path.as_bytes())?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for StagedEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let kind = reader.read_u8()?;
        let oid = ObjectId::read_h40_from(&mut reader);
        let path_length = reader.read_u16::<NetworkEndian>()? as usize;

        let mut path = vec![0u8; path_length];
        reader.read_exact(&mut path)?;
        let path = PathBuf::from(String::from_utf8(path)?);

        match kind {
            ADDITION => Ok(StagedEntry::Addition { path, oid: oid? }),
            REMOVAL => Ok(StagedEntry::Removal { path }),
            _ => Err(anyhow!("Invalid index entry kind: {kind}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case(StagedEntry::Addition {
        path: PathBuf::from("dir/a file.txt"),
        oid: ObjectId::try_parse("ab".repeat(20)).unwrap(),
    })]
    #[case(StagedEntry::Removal { path: PathBuf::from("gone.txt") })]
    fn entries_are_read_back(#[case] entry: StagedEntry) {
        let bytes = entry.serialize().unwrap();

        assert_eq!(
            StagedEntry::path_length(&bytes).unwrap(),
            entry.path().as_os_str().len()
        );
        assert_eq!(StagedEntry::deserialize(Cursor::new(bytes)).unwrap(), entry);
    }

    #[test]
    fn removals_carry_a_zeroed_blob_id() {
        let bytes = StagedEntry::Removal {
            path: PathBuf::from("x"),
        }
        .serialize()
        .unwrap();

        assert_eq!(bytes[0], REMOVAL);
        assert!(bytes[1..21].iter().all(|byte| *byte == 0));
    }
}
