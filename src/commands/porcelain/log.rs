use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::branch::slug::Slug;
use crate::artifacts::log::history::{HistoryEntry, RecordHistory};
use crate::errors::Result;

impl Store {
    /// Trunk commits that touched a record, newest first
    pub fn record_history(&self, slug: &Slug, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let head = self.main_branch()?.head.as_ref();

        Ok(RecordHistory::new(self, slug).entries(head, limit))
    }
}

impl Repository {
    pub async fn record_history(&self, slug: &Slug, limit: Option<usize>) -> Result<Vec<HistoryEntry>> {
        let store = self.store();
        let store = store.lock().await;

        store.record_history(slug, limit)
    }
}
