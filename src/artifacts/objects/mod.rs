//! Stored object types
//!
//! - `object_id`: SHA-1 commit identifiers
//! - `branch`: branch metadata and status
//! - `commit`: commit graph nodes
//! - `record`: records, their content and edits
//! - `snapshot`: immutable per-commit captures of records and tags

pub mod branch;
pub mod commit;
pub mod object_id;
pub mod record;
pub mod snapshot;

pub const OBJECT_ID_LENGTH: usize = 40;
