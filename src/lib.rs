//! folio: version control for structured records
//!
//! A git-like substrate for a collection of documents ("records") and their
//! tag sets. Callers fork isolated editing branches off the trunk, edit records
//! independently and merge back with all-or-nothing conflict detection.
//!
//! ## Layout
//!
//! - `areas`: the stores (branches, commits, records, tags, snapshots), the
//!   whole-store file and the [`Repository`](areas::repository::Repository)
//!   that serializes access to them
//! - `artifacts`: value types and the pure algorithms (diff, merge planning,
//!   merge-base discovery, history traversal)
//! - `commands`: the operations exposed to callers, plus the single-session
//!   [`Session`](commands::session::Session) wrapper
//! - `errors`: the error taxonomy shared by every operation

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use areas::repository::Repository;
pub use commands::session::Session;
pub use errors::{ErrorKind, FolioError};
