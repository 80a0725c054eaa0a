//! Append-only commit graph
//!
//! Commits are never modified or removed once created, which keeps the graph
//! acyclic: a new commit can only point at commits that already exist.

use crate::artifacts::objects::branch::BranchId;
use crate::artifacts::objects::commit::{Commit, MAX_PARENTS, SlimCommit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommitGraph {
    commits: BTreeMap<ObjectId, Commit>,
    next_sequence: u64,
}

impl CommitGraph {
    /// Append a commit node
    ///
    /// Every parent must already be in the graph and there may be at most
    /// [`MAX_PARENTS`] of them.
    pub fn create_commit(
        &mut self,
        branch_id: BranchId,
        parents: Vec<ObjectId>,
        message: &str,
        version: Option<u64>,
    ) -> Result<ObjectId> {
        if message.trim().is_empty() {
            return Err(FolioError::Validation(
                "commit message must not be blank".into(),
            ));
        }
        if parents.len() > MAX_PARENTS {
            return Err(FolioError::Validation(format!(
                "a commit has at most {MAX_PARENTS} parents, got {}",
                parents.len()
            )));
        }
        if let Some(missing) = parents.iter().find(|parent| !self.commits.contains_key(parent)) {
            return Err(FolioError::commit_not_found(missing));
        }

        self.next_sequence += 1;
        let commit = Commit::new(
            branch_id,
            parents,
            message.to_string(),
            version,
            chrono::Local::now().fixed_offset(),
            self.next_sequence,
        );
        let oid = commit.id().clone();

        tracing::debug!(oid = %oid.to_short_oid(), branch = %branch_id, ?version, "created commit");
        self.commits.insert(oid.clone(), commit);

        Ok(oid)
    }

    pub fn get(&self, oid: &ObjectId) -> Option<&Commit> {
        self.commits.get(oid)
    }

    pub fn require(&self, oid: &ObjectId) -> Result<&Commit> {
        self.get(oid).ok_or_else(|| FolioError::commit_not_found(oid))
    }

    pub fn parents(&self, oid: &ObjectId) -> Result<&[ObjectId]> {
        Ok(self.require(oid)?.parents())
    }

    /// Graph-only view of a commit, the shape the ancestor resolver walks
    pub fn slim(&self, oid: &ObjectId) -> Option<SlimCommit<'_>> {
        self.get(oid).map(Commit::as_slim)
    }

    /// Commits owned by a branch, oldest first
    pub fn list_by_branch(&self, branch_id: BranchId) -> Vec<&Commit> {
        let mut commits = self
            .commits
            .values()
            .filter(|commit| commit.branch_id() == branch_id)
            .collect::<Vec<_>>();
        commits.sort_by_key(|commit| commit.sequence());

        commits
    }

    /// Next trunk version: one past the highest version on the trunk, 1 when none
    pub fn next_main_version(&self, main_id: BranchId) -> u64 {
        self.commits
            .values()
            .filter(|commit| commit.branch_id() == main_id)
            .filter_map(Commit::version)
            .max()
            .map_or(1, |version| version + 1)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}
