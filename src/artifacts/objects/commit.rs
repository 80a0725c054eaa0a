//! Commit graph node
//!
//! Commits record a point in a branch's history. They contain:
//! - The owning branch
//! - Parent commit ID(s) (none for a root commit, two for a merge)
//! - A message
//! - A version number, only for trunk commits
//!
//! Record content is not stored on the commit itself; it lives in the snapshot
//! store, keyed by the commit ID.
//!
//! ## Identity
//!
//! The ID is the SHA-1 digest of the header:
//! ```text
//! branch <branch-id>
//! parent <parent-sha>
//! version <n>
//! created <rfc3339 timestamp>
//! sequence <n>
//!
//! <commit message>
//! ```
//! The sequence number is the position of the commit in the append-only log,
//! so two otherwise identical commits never collide.

use crate::artifacts::objects::branch::BranchId;
use crate::artifacts::objects::object_id::ObjectId;
use serde::{Deserialize, Serialize};

/// Maximum number of parents a commit may have
pub const MAX_PARENTS: usize = 2;

/// Slim representation of a commit
///
/// Borrows just the graph structure, which is all merge-base discovery needs.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SlimCommit<'c> {
    pub oid: &'c ObjectId,
    pub parents: &'c [ObjectId],
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    id: ObjectId,
    branch_id: BranchId,
    /// Parent commit IDs; the first one is always the previous head of the owning branch
    parents: Vec<ObjectId>,
    message: String,
    version: Option<u64>,
    created_at: chrono::DateTime<chrono::FixedOffset>,
    sequence: u64,
}

impl Commit {
    /// Create a new commit, deriving its ID from the header
    ///
    /// # Arguments
    ///
    /// * `branch_id` - Owning branch
    /// * `parents` - Parent commit IDs (empty for a root commit)
    /// * `message` - Commit message
    /// * `version` - Trunk version, `None` for any other branch
    /// * `created_at` - Commit timestamp
    /// * `sequence` - Position in the append-only commit log
    pub fn new(
        branch_id: BranchId,
        parents: Vec<ObjectId>,
        message: String,
        version: Option<u64>,
        created_at: chrono::DateTime<chrono::FixedOffset>,
        sequence: u64,
    ) -> Self {
        let mut commit = Commit {
            id: ObjectId::default(),
            branch_id,
            parents,
            message,
            version,
            created_at,
            sequence,
        };
        commit.id = ObjectId::hash(commit.header().as_bytes());
        commit
    }

    fn header(&self) -> String {
        let mut lines = vec![format!("branch {}", self.branch_id)];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        if let Some(version) = self.version {
            lines.push(format!("version {version}"));
        }
        lines.push(format!("created {}", self.created_at.to_rfc3339()));
        lines.push(format!("sequence {}", self.sequence));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the previous head of the owning branch
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn created_at(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.created_at
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn as_slim(&self) -> SlimCommit<'_> {
        SlimCommit {
            oid: &self.id,
            parents: &self.parents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn timestamp() -> chrono::DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(1640995200, 0)
            .unwrap()
    }

    #[test]
    fn test_sequence_distinguishes_identical_commits() {
        let a = Commit::new(BranchId(1), vec![], "init".into(), Some(1), timestamp(), 0);
        let b = Commit::new(BranchId(1), vec![], "init".into(), Some(1), timestamp(), 1);

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_id_is_stable_for_same_header() {
        let a = Commit::new(BranchId(2), vec![], "edit\n\nbody".into(), None, timestamp(), 4);
        let b = Commit::new(BranchId(2), vec![], "edit\n\nbody".into(), None, timestamp(), 4);

        assert_eq!(a.id(), b.id());
        assert_eq!(a.short_message(), "edit");
    }

    #[test]
    fn test_first_parent_is_previous_head() {
        let root = Commit::new(BranchId(1), vec![], "root".into(), Some(1), timestamp(), 0);
        let other = Commit::new(BranchId(2), vec![], "other".into(), None, timestamp(), 1);
        let merge = Commit::new(
            BranchId(1),
            vec![root.id().clone(), other.id().clone()],
            "merge".into(),
            Some(2),
            timestamp(),
            2,
        );

        assert_eq!(merge.parent(), Some(root.id()));
        assert_eq!(merge.as_slim().parents.len(), 2);
    }
}
