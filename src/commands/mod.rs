//! Command implementations
//!
//! - `porcelain`: the operations on records, branches, commits and merges
//! - `session`: the single-session wrapper that keeps a current branch and
//!   dispatches commits by branch kind

pub mod porcelain;
pub mod session;
