use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BranchId(pub u64);

impl std::fmt::Display for BranchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchStatus {
    /// The trunk; never transitions
    Main,
    InProgress,
    /// Merged into the trunk and retired; terminal
    Committed,
}

impl BranchStatus {
    pub fn can_transition_to(&self, next: BranchStatus) -> bool {
        matches!(
            (self, next),
            (BranchStatus::InProgress, BranchStatus::Committed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchStatus::Main => "MAIN",
            BranchStatus::InProgress => "IN_PROGRESS",
            BranchStatus::Committed => "COMMITTED",
        }
    }
}

impl std::fmt::Display for BranchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Branch metadata
///
/// `fork_point` is the trunk commit the head was set to at creation. It stays
/// fixed for the branch's lifetime even when the head later moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: BranchId,
    pub name: BranchName,
    pub label: String,
    pub status: BranchStatus,
    pub head: Option<ObjectId>,
    pub fork_point: Option<ObjectId>,
    pub base_version: Option<u64>,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl Branch {
    pub fn is_main(&self) -> bool {
        self.status == BranchStatus::Main
    }

    pub fn is_retired(&self) -> bool {
        self.status == BranchStatus::Committed
    }
}
