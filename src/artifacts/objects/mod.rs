//! Object types and operations
//!
//! Every piece of content is stored as an object identified by a SHA-1 hash:
//!
//! - **Blob**: File content (raw bytes)
//! - **Commit**: Snapshot of the tracked files with message, timestamp and parents
//!
//! All objects implement serialization/deserialization for the object format:
//! `<type> <size>\0<content>`

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of the abbreviated form printed in reports
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;
