//! Working copies of records, scoped by branch
//!
//! Records are never physically removed. Deleting one sets its tombstone flag,
//! which frees the slug for a new live record on the same branch.

use crate::artifacts::branch::slug::Slug;
use crate::artifacts::objects::branch::BranchId;
use crate::artifacts::objects::record::{Record, RecordContent, RecordId, RecordStatus};
use crate::errors::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordStore {
    records: BTreeMap<RecordId, Record>,
    next_id: u64,
}

impl RecordStore {
    /// Insert a new record on a branch
    ///
    /// Fails with a slug conflict when a live record on the branch already
    /// uses the slug. A tombstoned content is always accepted.
    pub fn insert(
        &mut self,
        branch_id: BranchId,
        slug: Slug,
        content: RecordContent,
        author: &str,
        tracked: bool,
    ) -> Result<RecordId> {
        if content.is_live() && self.live_by_slug(branch_id, &slug).is_some() {
            return Err(FolioError::SlugConflict(slug.to_string()));
        }

        self.next_id += 1;
        let id = RecordId(self.next_id);
        let now = chrono::Local::now().fixed_offset();

        self.records.insert(
            id,
            Record {
                id,
                branch_id,
                slug,
                content,
                author: author.to_string(),
                created_at: now,
                updated_at: now,
                tracked,
                status: RecordStatus::Clean,
            },
        );

        Ok(id)
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(&id)
    }

    pub fn live_by_slug(&self, branch_id: BranchId, slug: &Slug) -> Option<&Record> {
        self.by_branch(branch_id)
            .find(|record| &record.slug == slug && record.is_live())
    }

    /// The live record with this slug, or else the most recent tombstone
    pub fn find_by_slug(&self, branch_id: BranchId, slug: &Slug) -> Option<&Record> {
        self.live_by_slug(branch_id, slug).or_else(|| {
            self.by_branch(branch_id)
                .filter(|record| &record.slug == slug)
                .max_by_key(|record| record.id)
        })
    }

    pub fn require_live(&self, branch_id: BranchId, slug: &Slug) -> Result<RecordId> {
        self.live_by_slug(branch_id, slug)
            .map(|record| record.id)
            .ok_or_else(|| FolioError::record_not_found(slug))
    }

    pub fn by_branch(&self, branch_id: BranchId) -> impl Iterator<Item = &Record> {
        self.records
            .values()
            .filter(move |record| record.branch_id == branch_id)
    }

    pub fn has_conflicts(&self, branch_id: BranchId) -> bool {
        self.by_branch(branch_id)
            .any(|record| record.status == RecordStatus::Conflict)
    }
}
