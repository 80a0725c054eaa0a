//! Branch registry
//!
//! Holds the metadata of every branch: name, label, status, head commit and
//! the trunk version the branch forked from. Exactly one branch is MAIN; it is
//! created together with the store and never changes status.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::branch::{Branch, BranchId, BranchStatus};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BranchRegistry {
    branches: BTreeMap<BranchId, Branch>,
    next_id: u64,
}

impl BranchRegistry {
    /// Register a new branch
    ///
    /// # Arguments
    ///
    /// * `name` - Globally unique branch name
    /// * `label` - Human label; defaults to the name when omitted
    /// * `status` - Initial status
    /// * `fork_point` - Trunk head at creation; also the initial head
    /// * `base_version` - Trunk version of the fork point
    pub fn create(
        &mut self,
        name: BranchName,
        label: Option<&str>,
        status: BranchStatus,
        fork_point: Option<ObjectId>,
        base_version: Option<u64>,
    ) -> Result<BranchId> {
        let label = match label {
            Some(label) if label.trim().is_empty() => {
                return Err(FolioError::Validation(
                    "branch label must not be blank".into(),
                ));
            }
            Some(label) => label.trim().to_string(),
            None => name.to_string(),
        };

        if self.get_by_name(&name).is_some() {
            return Err(FolioError::NameConflict(name.to_string()));
        }
        if status == BranchStatus::Main && self.main().is_ok() {
            return Err(FolioError::NameConflict(name.to_string()));
        }

        self.next_id += 1;
        let id = BranchId(self.next_id);

        tracing::debug!(%id, %name, %status, "registered branch");

        self.branches.insert(
            id,
            Branch {
                id,
                name,
                label,
                status,
                head: fork_point.clone(),
                fork_point,
                base_version,
                created_at: chrono::Local::now().fixed_offset(),
            },
        );

        Ok(id)
    }

    pub fn get(&self, id: BranchId) -> Result<&Branch> {
        self.branches
            .get(&id)
            .ok_or_else(|| FolioError::branch_not_found(id))
    }

    fn get_mut(&mut self, id: BranchId) -> Result<&mut Branch> {
        self.branches
            .get_mut(&id)
            .ok_or_else(|| FolioError::branch_not_found(id))
    }

    pub fn get_by_name(&self, name: &BranchName) -> Option<&Branch> {
        self.branches.values().find(|branch| &branch.name == name)
    }

    pub fn require_by_name(&self, name: &BranchName) -> Result<&Branch> {
        self.get_by_name(name)
            .ok_or_else(|| FolioError::branch_not_found(name))
    }

    pub fn main(&self) -> Result<&Branch> {
        self.branches
            .values()
            .find(|branch| branch.is_main())
            .ok_or_else(|| FolioError::branch_not_found(BranchName::main()))
    }

    pub fn set_head(&mut self, id: BranchId, head: ObjectId) -> Result<()> {
        let branch = self.get_mut(id)?;
        tracing::debug!(branch = %branch.name, head = %head.to_short_oid(), "advanced head");
        branch.head = Some(head);

        Ok(())
    }

    pub fn set_status(&mut self, id: BranchId, status: BranchStatus) -> Result<()> {
        let branch = self.get_mut(id)?;

        if !branch.status.can_transition_to(status) {
            return Err(match branch.status {
                BranchStatus::Main => {
                    FolioError::ForbiddenOnTrunk("changing the trunk status".into())
                }
                BranchStatus::Committed => FolioError::BranchRetired(branch.name.to_string()),
                BranchStatus::InProgress => FolioError::Validation(format!(
                    "branch '{}' cannot move from {} to {}",
                    branch.name, branch.status, status
                )),
            });
        }

        branch.status = status;
        Ok(())
    }

    pub fn set_label(&mut self, id: BranchId, label: &str) -> Result<()> {
        let branch = self.get_mut(id)?;

        if branch.is_main() {
            return Err(FolioError::ForbiddenOnTrunk(
                "renaming the trunk label".into(),
            ));
        }
        if label.trim().is_empty() {
            return Err(FolioError::Validation(
                "branch label must not be blank".into(),
            ));
        }

        branch.label = label.trim().to_string();
        Ok(())
    }

    /// All branches in creation order
    pub fn list(&self) -> impl Iterator<Item = &Branch> {
        self.branches.values()
    }
}
