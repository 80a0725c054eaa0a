//! Commit history traversal
//!
//! - `rev_list`: first-parent walk from a head commit
//! - `history`: per-record history over trunk commits
//!
//! History is derived from snapshots alone, so it reflects what each commit
//! captured rather than the current working copies.

pub mod history;
pub mod rev_list;
