use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::branch::CURRENT_BRANCH_ALIAS;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::branch::{BranchId, BranchStatus};
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::record::{Record, TagSet};
use crate::errors::{FolioError, Result};

/// One row of the branch listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    pub id: BranchId,
    pub name: BranchName,
    pub label: String,
    pub status: BranchStatus,
    pub head: Option<ObjectId>,
    pub base_version: Option<u64>,
    /// Version of the head commit, when it has one
    pub version: Option<u64>,
    pub is_current: bool,
}

impl Store {
    /// Fork a new branch off the trunk
    ///
    /// Every live record on the trunk is cloned onto the branch under a fresh
    /// id, along with its tags. The trunk head becomes both the branch head
    /// and its fork point.
    pub fn create_branch(&mut self, name: &str, label: Option<&str>) -> Result<BranchId> {
        if name.trim() == CURRENT_BRANCH_ALIAS {
            return Err(FolioError::Validation(format!(
                "'{CURRENT_BRANCH_ALIAS}' is reserved for the current branch"
            )));
        }
        let name = BranchName::try_parse(name)?;

        let main = self.main_branch()?;
        let (main_id, fork_point) = (main.id, main.head.clone());
        let base_version = fork_point
            .as_ref()
            .and_then(|oid| self.commits().get(oid))
            .and_then(Commit::version);

        let clones = self
            .records()
            .by_branch(main_id)
            .filter(|record| record.is_live())
            .map(|record| (record.clone(), self.tags().get(record.id).clone()))
            .collect::<Vec<(Record, TagSet)>>();

        let branch_id = self.branches_mut().create(
            name.clone(),
            label,
            BranchStatus::InProgress,
            fork_point,
            base_version,
        )?;

        for (record, tags) in clones {
            let id = self.records_mut().insert(
                branch_id,
                record.slug,
                record.content,
                &record.author,
                record.tracked,
            )?;
            self.tags_mut().set(id, tags);
        }

        tracing::info!(branch = %name, id = %branch_id, ?base_version, "created branch");
        Ok(branch_id)
    }

    pub fn rename_label(&mut self, name: &str, label: &str) -> Result<()> {
        let branch_id = self.resolve_branch(name)?.id;
        self.branches_mut().set_label(branch_id, label)
    }

    pub fn list_branches(&self) -> Vec<BranchSummary> {
        self.branches()
            .list()
            .map(|branch| BranchSummary {
                id: branch.id,
                name: branch.name.clone(),
                label: branch.label.clone(),
                status: branch.status,
                head: branch.head.clone(),
                base_version: branch.base_version,
                version: branch
                    .head
                    .as_ref()
                    .and_then(|oid| self.commits().get(oid))
                    .and_then(Commit::version),
                is_current: self.current_branch() == Some(branch.id),
            })
            .collect()
    }
}

impl Repository {
    pub async fn create_branch(&self, name: &str, label: Option<&str>) -> Result<BranchId> {
        let store = self.store();
        let mut store = store.lock().await;

        store.create_branch(name, label)
    }

    pub async fn rename_label(&self, name: &str, label: &str) -> Result<()> {
        let store = self.store();
        let mut store = store.lock().await;

        store.rename_label(name, label)
    }

    pub async fn list_branches(&self) -> Vec<BranchSummary> {
        let store = self.store();
        let store = store.lock().await;

        store.list_branches()
    }
}
