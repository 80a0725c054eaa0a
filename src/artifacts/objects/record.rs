//! Structured records
//!
//! A record is one document on one branch. The same logical document exists
//! once per branch, each copy with its own id; the slug is what ties them
//! together across branches and commits.

use crate::artifacts::branch::slug::Slug;
use crate::artifacts::objects::branch::BranchId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub type TagSet = BTreeSet<String>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Versioned part of a record, compared field by field by the diff engine
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordContent {
    pub title: String,
    pub description: String,
    pub body: String,
    pub deleted: bool,
}

impl RecordContent {
    pub fn is_live(&self) -> bool {
        !self.deleted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    #[default]
    Clean,
    /// Written by external tooling; merges refuse to run while any record carries it
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub branch_id: BranchId,
    pub slug: Slug,
    pub content: RecordContent,
    pub author: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
    /// Only tracked records are captured in commits
    pub tracked: bool,
    #[serde(default)]
    pub status: RecordStatus,
}

impl Record {
    pub fn is_live(&self) -> bool {
        self.content.is_live()
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Local::now().fixed_offset();
    }
}

/// Input for creating a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub slug: Slug,
    pub title: String,
    pub description: String,
    pub body: String,
    pub author: String,
    pub tags: TagSet,
}

impl NewRecord {
    pub fn new(slug: Slug, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            slug,
            title: title.into(),
            description: String::new(),
            body: String::new(),
            author: author.into(),
            tags: TagSet::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A single edit to a record's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordEdit {
    Title(String),
    Description(String),
    Body(String),
}

impl RecordEdit {
    pub fn apply_to(&self, content: &mut RecordContent) {
        match self {
            RecordEdit::Title(title) => content.title = title.clone(),
            RecordEdit::Description(description) => content.description = description.clone(),
            RecordEdit::Body(body) => content.body = body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_touch_only_their_field() {
        let mut content = RecordContent {
            title: "H".into(),
            description: "d".into(),
            body: "B".into(),
            deleted: false,
        };

        RecordEdit::Body("B2".into()).apply_to(&mut content);

        assert_eq!(content.title, "H");
        assert_eq!(content.description, "d");
        assert_eq!(content.body, "B2");
    }

    #[test]
    fn test_new_record_builder_collects_tags() {
        let record = NewRecord::new(Slug::try_parse("hello").unwrap(), "H", "ann")
            .with_body("B")
            .with_tags(["news", "draft", "news"]);

        assert_eq!(record.tags.len(), 2);
        assert_eq!(record.body, "B");
    }
}
