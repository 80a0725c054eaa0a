use crate::areas::store::Store;
use crate::artifacts::branch::slug::Slug;
use crate::artifacts::diff::record_diff::{ChangeType, ChangedFields, classify};
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub commit_id: ObjectId,
    pub version: Option<u64>,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub change_type: ChangeType,
    pub fields: ChangedFields,
}

/// Trunk commits that touched one record, newest first
///
/// A commit touches a slug when diffing its first parent's snapshot against
/// its own reports a change for that slug. The root commit is diffed against
/// an empty state.
#[derive(new)]
pub struct RecordHistory<'s> {
    store: &'s Store,
    slug: &'s Slug,
}

impl RecordHistory<'_> {
    /// Walk from `head`, keeping at most `limit` touching commits
    pub fn entries(&self, head: Option<&ObjectId>, limit: Option<usize>) -> Vec<HistoryEntry> {
        RevList::new(self.store.commits(), head.cloned())
            .into_iter()
            .filter_map(|commit| self.touch(commit))
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    fn touch(&self, commit: &Commit) -> Option<HistoryEntry> {
        let before = self.store.state_at(commit.parent());
        let after = self.store.state_at(Some(commit.id()));

        let (change_type, fields) = classify(before.get(self.slug), after.get(self.slug))?;
        tracing::trace!(commit = %commit.id().to_short_oid(), slug = %self.slug, %change_type, "commit touches record");

        Some(HistoryEntry {
            commit_id: commit.id().clone(),
            version: commit.version(),
            message: commit.message().to_string(),
            created_at: commit.created_at(),
            change_type,
            fields,
        })
    }
}
