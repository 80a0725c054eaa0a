//! Stores and the repository that owns them
//!
//! - `branches`: branch registry
//! - `commits`: append-only commit graph and trunk version allocation
//! - `records`: per-branch working copies of records
//! - `tags`: per-record tag membership
//! - `snapshots`: immutable per-commit captures
//! - `store`: all of the above as one lockable, serializable value
//! - `store_file`: whole-store JSON persistence
//! - `repository`: async, serialized access to the store

pub mod branches;
pub mod commits;
pub mod records;
pub mod repository;
pub mod snapshots;
pub mod store;
pub mod store_file;
pub mod tags;
