use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::diff::record_diff::diff_states;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{FolioError, Result};

/// Result of a commit or merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub commit_id: ObjectId,
    /// Trunk version; `None` for commits on any other branch
    pub version: Option<u64>,
}

impl Store {
    /// Commit the trunk's working copies
    ///
    /// The first commit of a store is a root commit and always succeeds. Every
    /// later commit needs at least one change against the trunk head.
    pub fn commit_on_trunk(&mut self, message: &str) -> Result<CommitOutcome> {
        let main = self.main_branch()?;
        let (main_id, main_name, head) = (main.id, main.name.to_string(), main.head.clone());
        self.ensure_no_conflicts(main_id)?;

        if head.is_some() {
            let changes = diff_states(&self.state_at(head.as_ref()), &self.live_state(main_id));
            if changes.is_empty() {
                return Err(FolioError::NoChanges(main_name));
            }
        }

        let version = self.commits().next_main_version(main_id);
        let parents = head.into_iter().collect::<Vec<_>>();
        let is_root = parents.is_empty();
        let commit_id = self
            .commits_mut()
            .create_commit(main_id, parents, message, Some(version))?;

        self.capture_snapshots(&commit_id, main_id);
        self.branches_mut().set_head(main_id, commit_id.clone())?;

        tracing::info!(commit = %commit_id.to_short_oid(), version, is_root, "committed on trunk");
        Ok(CommitOutcome {
            commit_id,
            version: Some(version),
        })
    }
}

impl Repository {
    pub async fn commit_on_trunk(&self, message: &str) -> Result<CommitOutcome> {
        let store = self.store();
        let mut store = store.lock().await;

        store.commit_on_trunk(message)
    }
}
