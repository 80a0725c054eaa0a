//! Versioning data structures and algorithms
//!
//! - `branch`: branch names, aliases and record slugs
//! - `diff`: content states and field-level record diffing
//! - `log`: commit history traversal
//! - `merge`: merge-base discovery, three-way planning and plan application
//! - `objects`: stored types (commits, branches, records, snapshots)

pub mod branch;
pub mod diff;
pub mod log;
pub mod merge;
pub mod objects;
