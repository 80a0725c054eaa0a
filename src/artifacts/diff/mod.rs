//! Record diffing
//!
//! - `content_state`: slug-keyed view of record content and tags, built either
//!   from a branch's live records or from a commit's snapshots
//! - `record_diff`: field-level change classification between two states
//!
//! Diffing is pure: it never touches the stores, so the same engine serves the
//! branch change list, record history and merge planning.

pub mod content_state;
pub mod record_diff;
