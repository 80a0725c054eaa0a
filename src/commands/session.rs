//! Single-session convenience layer
//!
//! [`Session`] keeps a current-branch pointer (stored with the rest of the
//! state, so it survives a save and load) and resolves the `@` alias to it.
//! Every method locks the store exactly once, so resolving the current branch
//! and acting on it happen in the same critical section.

use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::branch::CURRENT_BRANCH_ALIAS;
use crate::artifacts::branch::slug::Slug;
use crate::artifacts::objects::branch::{Branch, BranchId};
use crate::artifacts::objects::record::{NewRecord, RecordEdit, RecordId, TagSet};
use crate::commands::porcelain::commit::CommitOutcome;
use crate::commands::porcelain::diff::BranchChange;
use crate::commands::porcelain::record::RecordView;
use crate::errors::{FolioError, Result};

impl Store {
    fn current_branch_id(&self) -> Result<BranchId> {
        self.current_branch().ok_or(FolioError::NoCurrentBranch)
    }

    /// Resolve a branch name, with `@` standing for the current branch
    fn resolve_in_session(&self, name: &str) -> Result<BranchId> {
        if name.trim() == CURRENT_BRANCH_ALIAS {
            self.current_branch_id()
        } else {
            Ok(self.resolve_branch(name)?.id)
        }
    }

    /// Commit the current branch: a trunk commit on the trunk, a merge back
    /// into the trunk anywhere else
    pub fn commit_current_branch(&mut self, message: &str) -> Result<CommitOutcome> {
        let branch_id = self.current_branch_id()?;

        if self.branches().get(branch_id)?.is_main() {
            self.commit_on_trunk(message)
        } else {
            self.merge_branch(branch_id, message)
        }
    }

    pub fn merge_branch_into_current(
        &mut self,
        source: &str,
        message: Option<&str>,
    ) -> Result<CommitOutcome> {
        let target_id = self.current_branch_id()?;
        let source_id = self.resolve_in_session(source)?;

        let message = match message {
            Some(message) => message.to_string(),
            None => format!(
                "Merge branch '{}' into {}",
                self.branches().get(source_id)?.name,
                self.branches().get(target_id)?.name
            ),
        };

        self.merge_into(target_id, source_id, &message)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    repository: Repository,
}

impl Session {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub async fn switch_current(&self, name: &str) -> Result<BranchId> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_in_session(name)?;
        store.set_current_branch(branch_id)?;

        tracing::debug!(branch = %branch_id, "switched current branch");
        Ok(branch_id)
    }

    pub async fn current_branch(&self) -> Result<Branch> {
        let store = self.repository.store();
        let store = store.lock().await;

        let branch_id = store.current_branch_id()?;
        Ok(store.branches().get(branch_id)?.clone())
    }

    pub async fn commit_current_branch(&self, message: &str) -> Result<CommitOutcome> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        store.commit_current_branch(message)
    }

    pub async fn merge_branch_into_current(
        &self,
        source: &str,
        message: Option<&str>,
    ) -> Result<CommitOutcome> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        store.merge_branch_into_current(source, message)
    }

    pub async fn branch_changes(&self, name: &str) -> Result<Vec<BranchChange>> {
        let store = self.repository.store();
        let store = store.lock().await;

        let branch_id = store.resolve_in_session(name)?;
        store.branch_changes(branch_id)
    }

    pub async fn rename_label(&self, name: &str, label: &str) -> Result<()> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_in_session(name)?;
        let name = store.branches().get(branch_id)?.name.to_string();
        store.rename_label(&name, label)
    }

    pub async fn create_record(&self, new_record: NewRecord) -> Result<RecordId> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        let branch_id = store.current_branch_id()?;
        store.create_record(branch_id, new_record)
    }

    pub async fn edit_record(&self, slug: &Slug, edits: &[RecordEdit]) -> Result<()> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        let branch_id = store.current_branch_id()?;
        store.edit_record(branch_id, slug, edits)
    }

    pub async fn delete_record(&self, slug: &Slug) -> Result<()> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        let branch_id = store.current_branch_id()?;
        store.delete_record(branch_id, slug)
    }

    pub async fn set_tags(&self, slug: &Slug, tags: TagSet) -> Result<()> {
        let store = self.repository.store();
        let mut store = store.lock().await;

        let branch_id = store.current_branch_id()?;
        store.set_tags(branch_id, slug, tags)
    }

    pub async fn get_record(&self, slug: &Slug) -> Result<RecordView> {
        let store = self.repository.store();
        let store = store.lock().await;

        let branch_id = store.current_branch_id()?;
        store.get_record(branch_id, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::branch::BranchStatus;
    use pretty_assertions::assert_eq;

    fn hello() -> Slug {
        Slug::try_parse("hello").unwrap()
    }

    async fn session() -> Session {
        let session = Session::new(Repository::in_memory().unwrap());
        session.switch_current("main").await.unwrap();
        session
            .create_record(NewRecord::new(hello(), "H", "ann").with_body("B"))
            .await
            .unwrap();
        session.commit_current_branch("init").await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_no_current_branch_is_reported() {
        let session = Session::new(Repository::in_memory().unwrap());

        assert_eq!(
            session.commit_current_branch("x").await,
            Err(FolioError::NoCurrentBranch)
        );
        assert_eq!(
            session.current_branch().await.unwrap_err(),
            FolioError::NoCurrentBranch
        );
    }

    #[tokio::test]
    async fn test_switch_to_unknown_branch_is_not_found() {
        let session = session().await;

        assert!(matches!(
            session.switch_current("ghost").await,
            Err(FolioError::NotFound { entity: "branch", .. })
        ));
        assert!(session.current_branch().await.unwrap().is_main());
    }

    #[tokio::test]
    async fn test_commit_dispatches_by_branch_kind() {
        let session = session().await;
        session.repository().create_branch("feat", None).await.unwrap();
        session.switch_current("feat").await.unwrap();
        session
            .edit_record(&hello(), &[RecordEdit::Body("B2".into())])
            .await
            .unwrap();

        let outcome = session.commit_current_branch("feat").await.unwrap();

        assert_eq!(outcome.version, Some(2));
        assert_eq!(session.current_branch().await.unwrap().status, BranchStatus::Committed);
        assert_eq!(
            session
                .repository()
                .get_record("main", &hello())
                .await
                .unwrap()
                .record
                .content
                .body,
            "B2"
        );
    }

    #[tokio::test]
    async fn test_merge_into_current_uses_default_message() {
        let session = session().await;
        session.repository().create_branch("feat", None).await.unwrap();
        session.switch_current("feat").await.unwrap();

        let outcome = session.merge_branch_into_current("trunk", None).await.unwrap();

        let store = session.repository().snapshot().await;
        assert_eq!(
            store.commits().get(&outcome.commit_id).unwrap().message(),
            "Merge branch 'main' into feat"
        );
    }

    #[tokio::test]
    async fn test_at_alias_names_the_current_branch() {
        let session = session().await;
        session.repository().create_branch("feat", None).await.unwrap();
        session.switch_current("feat").await.unwrap();
        session.rename_label("@", "Feature").await.unwrap();
        session
            .edit_record(&hello(), &[RecordEdit::Title("H2".into())])
            .await
            .unwrap();

        let changes = session.branch_changes("@").await.unwrap();

        assert_eq!(changes.len(), 1);
        assert_eq!(session.current_branch().await.unwrap().label, "Feature");
    }
}
