//! Tag membership per record
//!
//! Records are branch-scoped, so the tag sets are too.

use crate::artifacts::objects::record::{RecordId, TagSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMPTY_TAGS: TagSet = TagSet::new();

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagStore {
    tags: BTreeMap<RecordId, TagSet>,
}

impl TagStore {
    pub fn get(&self, record_id: RecordId) -> &TagSet {
        self.tags.get(&record_id).unwrap_or(&EMPTY_TAGS)
    }

    /// Replace the whole tag set of a record
    pub fn set(&mut self, record_id: RecordId, tags: TagSet) {
        if tags.is_empty() {
            self.tags.remove(&record_id);
        } else {
            self.tags.insert(record_id, tags);
        }
    }

    pub fn add(&mut self, record_id: RecordId, tags: &TagSet) {
        if !tags.is_empty() {
            self.tags
                .entry(record_id)
                .or_default()
                .extend(tags.iter().cloned());
        }
    }

    pub fn remove(&mut self, record_id: RecordId, tags: &TagSet) {
        if let Some(existing) = self.tags.get_mut(&record_id) {
            existing.retain(|tag| !tags.contains(tag));
            if existing.is_empty() {
                self.tags.remove(&record_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> TagSet {
        values.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_add_and_remove_deltas() {
        let mut store = TagStore::default();
        let id = RecordId(1);

        store.set(id, tags(&["news", "hot"]));
        store.add(id, &tags(&["featured"]));
        store.remove(id, &tags(&["hot", "absent"]));

        assert_eq!(store.get(id), &tags(&["featured", "news"]));
    }

    #[test]
    fn test_removing_every_tag_leaves_no_entry() {
        let mut store = TagStore::default();
        let id = RecordId(1);

        store.set(id, tags(&["news"]));
        store.remove(id, &tags(&["news"]));

        assert!(store.get(id).is_empty());
        assert_eq!(store, TagStore::default());
    }
}
