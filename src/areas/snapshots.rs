//! Immutable per-commit captures of record content and tag membership
//!
//! Rows are only ever appended. The state of a commit is rebuilt from its rows
//! on demand.

use crate::artifacts::diff::content_state::{ContentState, StateEntry};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::record::{Record, RecordId, TagSet};
use crate::artifacts::objects::snapshot::{RecordSnapshot, TagSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SnapshotStore {
    records: BTreeMap<ObjectId, Vec<RecordSnapshot>>,
    tags: BTreeMap<ObjectId, Vec<TagSnapshot>>,
}

impl SnapshotStore {
    pub fn capture_record(&mut self, commit_id: &ObjectId, record: &Record) {
        self.records
            .entry(commit_id.clone())
            .or_default()
            .push(RecordSnapshot::new(
                commit_id.clone(),
                record.id,
                record.slug.clone(),
                record.content.clone(),
                record.author.clone(),
            ));
    }

    pub fn capture_tag(&mut self, commit_id: &ObjectId, record_id: RecordId, tag: &str) {
        self.tags
            .entry(commit_id.clone())
            .or_default()
            .push(TagSnapshot::new(commit_id.clone(), record_id, tag.to_string()));
    }

    pub fn records_at(&self, commit_id: &ObjectId) -> &[RecordSnapshot] {
        self.records.get(commit_id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn tags_at(&self, commit_id: &ObjectId) -> &[TagSnapshot] {
        self.tags.get(commit_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Content and tags by slug at a commit
    ///
    /// When a live snapshot and a tombstone share a slug, the live one wins.
    pub fn state_at(&self, commit_id: &ObjectId) -> ContentState {
        let mut tags_by_record: HashMap<RecordId, TagSet> = HashMap::new();
        for snapshot in self.tags_at(commit_id) {
            tags_by_record
                .entry(snapshot.record_id)
                .or_default()
                .insert(snapshot.tag.clone());
        }

        self.records_at(commit_id)
            .iter()
            .map(|snapshot| {
                let tags = tags_by_record
                    .remove(&snapshot.record_id)
                    .unwrap_or_default();
                (
                    snapshot.slug.clone(),
                    StateEntry::new(snapshot.content.clone(), tags, snapshot.author.clone()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::slug::Slug;
    use crate::artifacts::objects::branch::BranchId;
    use crate::artifacts::objects::record::{RecordContent, RecordStatus};
    use pretty_assertions::assert_eq;

    fn record(id: u64, slug: &str, title: &str, deleted: bool) -> Record {
        let now = chrono::Local::now().fixed_offset();
        Record {
            id: RecordId(id),
            branch_id: BranchId(1),
            slug: Slug::try_parse(slug).unwrap(),
            content: RecordContent {
                title: title.into(),
                deleted,
                ..Default::default()
            },
            author: "ann".into(),
            created_at: now,
            updated_at: now,
            tracked: true,
            status: RecordStatus::Clean,
        }
    }

    #[test]
    fn test_state_joins_tags_by_record() {
        let commit = ObjectId::hash(b"c1");
        let mut store = SnapshotStore::default();

        store.capture_record(&commit, &record(1, "hello", "H", false));
        store.capture_tag(&commit, RecordId(1), "news");
        store.capture_tag(&commit, RecordId(1), "hot");

        let state = store.state_at(&commit);
        let slug = Slug::try_parse("hello").unwrap();

        assert_eq!(state.len(), 1);
        assert_eq!(state.content(&slug).unwrap().title, "H");
        assert_eq!(
            state.tags(&slug).iter().cloned().collect::<Vec<_>>(),
            vec!["hot".to_string(), "news".to_string()]
        );
    }

    #[test]
    fn test_live_snapshot_shadows_tombstone_with_same_slug() {
        let commit = ObjectId::hash(b"c1");
        let mut store = SnapshotStore::default();

        store.capture_record(&commit, &record(2, "hello", "new", false));
        store.capture_record(&commit, &record(1, "hello", "old", true));

        let state = store.state_at(&commit);

        assert_eq!(
            state.content(&Slug::try_parse("hello").unwrap()).unwrap().title,
            "new"
        );
    }

    #[test]
    fn test_unknown_commit_has_empty_state() {
        let store = SnapshotStore::default();

        assert!(store.state_at(&ObjectId::hash(b"nope")).is_empty());
        assert!(store.records_at(&ObjectId::hash(b"nope")).is_empty());
    }
}
