use crate::artifacts::branch::slug::Slug;
use crate::artifacts::objects::record::{RecordContent, TagSet};
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

static EMPTY_TAGS: TagSet = TagSet::new();

/// Everything known about one slug in one state
#[derive(Debug, Clone, PartialEq, Eq, Default, new)]
pub struct StateEntry {
    pub content: RecordContent,
    pub tags: TagSet,
    /// Carried along so merges can create records on the other side; the diff ignores it
    pub author: String,
}

/// Record content and tag sets keyed by slug
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentState {
    entries: BTreeMap<Slug, StateEntry>,
}

impl ContentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the entry for a slug
    ///
    /// A tombstoned record and a live record may share a slug. The live one
    /// always wins, whatever the insertion order.
    pub fn insert(&mut self, slug: Slug, entry: StateEntry) {
        if let Some(existing) = self.entries.get(&slug)
            && existing.content.is_live()
            && !entry.content.is_live()
        {
            return;
        }

        self.entries.insert(slug, entry);
    }

    pub fn get(&self, slug: &Slug) -> Option<&StateEntry> {
        self.entries.get(slug)
    }

    pub fn content(&self, slug: &Slug) -> Option<&RecordContent> {
        self.entries.get(slug).map(|entry| &entry.content)
    }

    /// Tag set of a slug; absent slugs have no tags
    pub fn tags(&self, slug: &Slug) -> &TagSet {
        self.entries
            .get(slug)
            .map(|entry| &entry.tags)
            .unwrap_or(&EMPTY_TAGS)
    }

    pub fn slugs(&self) -> impl Iterator<Item = &Slug> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Slug, &StateEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Slug, StateEntry)> for ContentState {
    fn from_iter<T: IntoIterator<Item = (Slug, StateEntry)>>(iter: T) -> Self {
        let mut state = ContentState::new();
        for (slug, entry) in iter {
            state.insert(slug, entry);
        }
        state
    }
}

/// Every slug appearing in at least one of the states, in order
pub fn union_of_slugs<'s>(states: &[&'s ContentState]) -> BTreeSet<&'s Slug> {
    states.iter().flat_map(|state| state.slugs()).collect()
}
