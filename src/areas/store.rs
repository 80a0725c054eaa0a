//! The whole versioned state in one value
//!
//! `Store` groups the branch registry, commit graph, record and tag stores,
//! snapshots and the current-branch pointer. It is the unit that is locked,
//! persisted and restored; operations borrow it mutably for their whole
//! resolve, plan and apply sequence.

use crate::areas::branches::BranchRegistry;
use crate::areas::commits::CommitGraph;
use crate::areas::records::RecordStore;
use crate::areas::snapshots::SnapshotStore;
use crate::areas::tags::TagStore;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::diff::content_state::{ContentState, StateEntry};
use crate::artifacts::objects::branch::{Branch, BranchId, BranchStatus};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    branches: BranchRegistry,
    commits: CommitGraph,
    records: RecordStore,
    tags: TagStore,
    snapshots: SnapshotStore,
    current_branch: Option<BranchId>,
}

impl Store {
    /// A fresh store holding only the trunk, with no commits and no current branch
    pub fn init() -> Result<Self> {
        let mut branches = BranchRegistry::default();
        branches.create(BranchName::main(), Some("Main"), BranchStatus::Main, None, None)?;

        Ok(Store {
            branches,
            commits: CommitGraph::default(),
            records: RecordStore::default(),
            tags: TagStore::default(),
            snapshots: SnapshotStore::default(),
            current_branch: None,
        })
    }

    pub fn branches(&self) -> &BranchRegistry {
        &self.branches
    }

    pub(crate) fn branches_mut(&mut self) -> &mut BranchRegistry {
        &mut self.branches
    }

    pub fn commits(&self) -> &CommitGraph {
        &self.commits
    }

    pub(crate) fn commits_mut(&mut self) -> &mut CommitGraph {
        &mut self.commits
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut RecordStore {
        &mut self.records
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub(crate) fn tags_mut(&mut self) -> &mut TagStore {
        &mut self.tags
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn current_branch(&self) -> Option<BranchId> {
        self.current_branch
    }

    pub(crate) fn set_current_branch(&mut self, branch_id: BranchId) -> Result<()> {
        self.branches.get(branch_id)?;
        self.current_branch = Some(branch_id);

        Ok(())
    }

    /// Resolve a branch by name, folding aliases such as `trunk`
    pub fn resolve_branch(&self, name: &str) -> Result<&Branch> {
        let name = BranchName::try_parse(name)?;
        self.branches.require_by_name(&name)
    }

    pub fn main_branch(&self) -> Result<&Branch> {
        self.branches.main()
    }

    /// Branch that may still receive edits
    pub(crate) fn writable_branch(&self, branch_id: BranchId) -> Result<&Branch> {
        let branch = self.branches.get(branch_id)?;
        if branch.is_retired() {
            return Err(FolioError::BranchRetired(branch.name.to_string()));
        }

        Ok(branch)
    }

    pub(crate) fn ensure_no_conflicts(&self, branch_id: BranchId) -> Result<()> {
        if self.records.has_conflicts(branch_id) {
            let branch = self.branches.get(branch_id)?;
            return Err(FolioError::HasConflicts(branch.name.to_string()));
        }

        Ok(())
    }

    /// Content and tags of every tracked record on a branch, tombstones included
    pub fn live_state(&self, branch_id: BranchId) -> ContentState {
        self.records
            .by_branch(branch_id)
            .filter(|record| record.tracked)
            .map(|record| {
                (
                    record.slug.clone(),
                    StateEntry::new(
                        record.content.clone(),
                        self.tags.get(record.id).clone(),
                        record.author.clone(),
                    ),
                )
            })
            .collect()
    }

    /// Content and tags captured at a commit; empty when there is no commit
    pub fn state_at(&self, commit_id: Option<&ObjectId>) -> ContentState {
        commit_id
            .map(|commit_id| self.snapshots.state_at(commit_id))
            .unwrap_or_default()
    }

    /// Capture every tracked record of a branch, and its tags, at a commit
    pub(crate) fn capture_snapshots(&mut self, commit_id: &ObjectId, branch_id: BranchId) {
        let Store {
            records,
            tags,
            snapshots,
            ..
        } = self;

        let mut captured = 0usize;
        for record in records.by_branch(branch_id).filter(|record| record.tracked) {
            snapshots.capture_record(commit_id, record);
            for tag in tags.get(record.id) {
                snapshots.capture_tag(commit_id, record.id, tag);
            }
            captured += 1;
        }

        tracing::debug!(commit = %commit_id.to_short_oid(), captured, "captured snapshots");
    }
}
