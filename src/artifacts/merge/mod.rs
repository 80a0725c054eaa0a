//! Merging
//!
//! - `ancestor_resolver`: merge-base discovery over the commit graph
//! - `merge_plan`: three-way planning with conflict detection
//! - `migration`: all-or-nothing application of a plan to a target branch

pub mod ancestor_resolver;
pub mod merge_plan;
pub mod migration;
