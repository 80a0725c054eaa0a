use crate::artifacts::branch::slug::Slug;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::record::{RecordContent, RecordId};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// Content of one tracked record at one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct RecordSnapshot {
    pub commit_id: ObjectId,
    pub record_id: RecordId,
    pub slug: Slug,
    pub content: RecordContent,
    pub author: String,
}

/// One (record, tag) membership at one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct TagSnapshot {
    pub commit_id: ObjectId,
    pub record_id: RecordId,
    pub tag: String,
}
