//! Operations exposed to callers
//!
//! Each operation exists twice: as a synchronous method on
//! [`Store`](crate::areas::store::Store), which does the work against a
//! borrowed store, and as an `async` method on
//! [`Repository`](crate::areas::repository::Repository), which locks the store
//! for the whole call and takes its branch context explicitly.
//!
//! ## Commands
//!
//! - `init`: write a fresh store file
//! - `branch`: create, list and relabel branches
//! - `record`: create, edit, tag and delete records on a branch
//! - `commit`: commit the trunk working copies
//! - `merge`: trunk-bound and explicit merges
//! - `diff`: what a branch changed since it forked
//! - `log`: per-record trunk history

pub mod branch;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod record;
