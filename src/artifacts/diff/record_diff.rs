use crate::artifacts::branch::slug::Slug;
use crate::artifacts::diff::content_state::{ContentState, StateEntry, union_of_slugs};
use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangedFields: u8 {
        const TITLE = 0b00001;
        const DESCRIPTION = 0b00010;
        const BODY = 0b00100;
        const DELETED = 0b01000;
        const TAGS = 0b10000;
    }
}

const FIELD_NAMES: [(ChangedFields, &str); 5] = [
    (ChangedFields::TITLE, "title"),
    (ChangedFields::DESCRIPTION, "description"),
    (ChangedFields::BODY, "body"),
    (ChangedFields::DELETED, "deleted"),
    (ChangedFields::TAGS, "tags"),
];

impl ChangedFields {
    /// Field names in display order
    pub fn names(&self) -> Vec<&'static str> {
        FIELD_NAMES
            .iter()
            .filter(|(field, _)| self.contains(*field))
            .map(|(_, name)| *name)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Added => "added",
            ChangeType::Modified => "modified",
            ChangeType::Deleted => "deleted",
        }
    }

    pub fn status_char(&self) -> char {
        match self {
            ChangeType::Added => 'A',
            ChangeType::Modified => 'M',
            ChangeType::Deleted => 'D',
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChange {
    pub slug: Slug,
    pub change_type: ChangeType,
    pub fields: ChangedFields,
}

/// Classify the change of one slug between two states
///
/// - Added: the working side is live and the base side is absent or tombstoned
/// - Deleted: the base side is live and the working side is absent or tombstoned
/// - Modified: both sides are live and a content field or the tag set differs
///
/// Anything else, including a record that is tombstoned on both sides, is no
/// change.
pub fn classify(
    base: Option<&StateEntry>,
    working: Option<&StateEntry>,
) -> Option<(ChangeType, ChangedFields)> {
    let base = base.filter(|entry| entry.content.is_live());
    let working = working.filter(|entry| entry.content.is_live());

    match (base, working) {
        (None, Some(_)) => Some((
            ChangeType::Added,
            ChangedFields::TITLE
                | ChangedFields::DESCRIPTION
                | ChangedFields::BODY
                | ChangedFields::TAGS,
        )),
        (Some(_), None) => Some((ChangeType::Deleted, ChangedFields::DELETED)),
        (Some(base), Some(working)) => {
            let fields = changed_fields(base, working);
            if fields.is_empty() {
                None
            } else {
                Some((ChangeType::Modified, fields))
            }
        }
        (None, None) => None,
    }
}

fn changed_fields(base: &StateEntry, working: &StateEntry) -> ChangedFields {
    let mut fields = ChangedFields::empty();
    let (old, new) = (&base.content, &working.content);

    if old.title != new.title {
        fields |= ChangedFields::TITLE;
    }
    if old.description != new.description {
        fields |= ChangedFields::DESCRIPTION;
    }
    if old.body != new.body {
        fields |= ChangedFields::BODY;
    }
    if old.deleted != new.deleted {
        fields |= ChangedFields::DELETED;
    }
    if base.tags != working.tags {
        fields |= ChangedFields::TAGS;
    }

    fields
}

/// Diff two states slug by slug, ordered by slug
pub fn diff_states(base: &ContentState, working: &ContentState) -> Vec<RecordChange> {
    union_of_slugs(&[base, working])
        .into_iter()
        .filter_map(|slug| {
            classify(base.get(slug), working.get(slug)).map(|(change_type, fields)| {
                RecordChange {
                    slug: slug.clone(),
                    change_type,
                    fields,
                }
            })
        })
        .collect()
}
