use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::branch::slug::Slug;
use crate::artifacts::objects::branch::BranchId;
use crate::artifacts::objects::record::{
    NewRecord, Record, RecordContent, RecordEdit, RecordId, RecordStatus, TagSet,
};
use crate::errors::{FolioError, Result};

/// A live record together with its tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordView {
    pub record: Record,
    pub tags: TagSet,
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(FolioError::Validation(
            "record title must not be blank".into(),
        ));
    }

    Ok(())
}

fn normalize_tags(tags: TagSet) -> Result<TagSet> {
    tags.into_iter()
        .map(|tag| {
            let tag = tag.trim().to_string();
            if tag.is_empty() {
                Err(FolioError::Validation("tags must not be blank".into()))
            } else {
                Ok(tag)
            }
        })
        .collect()
}

impl Store {
    pub fn create_record(&mut self, branch_id: BranchId, new_record: NewRecord) -> Result<RecordId> {
        self.writable_branch(branch_id)?;
        validate_title(&new_record.title)?;
        let tags = normalize_tags(new_record.tags)?;

        let content = RecordContent {
            title: new_record.title,
            description: new_record.description,
            body: new_record.body,
            deleted: false,
        };
        let id = self.records_mut().insert(
            branch_id,
            new_record.slug.clone(),
            content,
            &new_record.author,
            true,
        )?;
        self.tags_mut().set(id, tags);

        tracing::debug!(slug = %new_record.slug, record = %id, branch = %branch_id, "created record");
        Ok(id)
    }

    /// Apply edits to a live record; an empty edit list is a no-op
    pub fn edit_record(&mut self, branch_id: BranchId, slug: &Slug, edits: &[RecordEdit]) -> Result<()> {
        self.writable_branch(branch_id)?;
        let id = self.records().require_live(branch_id, slug)?;

        for edit in edits {
            if let RecordEdit::Title(title) = edit {
                validate_title(title)?;
            }
        }

        if let Some(record) = self.records_mut().get_mut(id) {
            for edit in edits {
                edit.apply_to(&mut record.content);
            }
            record.touch();
        }

        tracing::debug!(%slug, record = %id, edits = edits.len(), "edited record");
        Ok(())
    }

    /// Tombstone a live record
    pub fn delete_record(&mut self, branch_id: BranchId, slug: &Slug) -> Result<()> {
        self.writable_branch(branch_id)?;
        let id = self.records().require_live(branch_id, slug)?;

        if let Some(record) = self.records_mut().get_mut(id) {
            record.content.deleted = true;
            record.touch();
        }

        tracing::debug!(%slug, record = %id, "deleted record");
        Ok(())
    }

    /// Replace the tag set of a live record
    pub fn set_tags(&mut self, branch_id: BranchId, slug: &Slug, tags: TagSet) -> Result<()> {
        self.writable_branch(branch_id)?;
        let id = self.records().require_live(branch_id, slug)?;
        let tags = normalize_tags(tags)?;

        self.tags_mut().set(id, tags);
        if let Some(record) = self.records_mut().get_mut(id) {
            record.touch();
        }

        Ok(())
    }

    /// Include or exclude a live record from future commits
    pub fn set_tracked(&mut self, branch_id: BranchId, slug: &Slug, tracked: bool) -> Result<()> {
        self.writable_branch(branch_id)?;
        let id = self.records().require_live(branch_id, slug)?;

        if let Some(record) = self.records_mut().get_mut(id) {
            record.tracked = tracked;
        }

        Ok(())
    }

    /// Flag or clear a live record as being in conflict
    ///
    /// Merges and trunk commits refuse to run against a branch while any of
    /// its records is flagged.
    pub fn set_conflict(&mut self, branch_id: BranchId, slug: &Slug, conflicted: bool) -> Result<()> {
        self.branches().get(branch_id)?;
        let id = self.records().require_live(branch_id, slug)?;

        if let Some(record) = self.records_mut().get_mut(id) {
            record.status = if conflicted {
                RecordStatus::Conflict
            } else {
                RecordStatus::Clean
            };
        }

        tracing::debug!(branch = %branch_id, %slug, conflicted, "set record conflict status");
        Ok(())
    }

    pub fn get_record(&self, branch_id: BranchId, slug: &Slug) -> Result<RecordView> {
        self.branches().get(branch_id)?;
        let record = self
            .records()
            .live_by_slug(branch_id, slug)
            .ok_or_else(|| FolioError::record_not_found(slug))?;

        Ok(RecordView {
            record: record.clone(),
            tags: self.tags().get(record.id).clone(),
        })
    }

    /// Live records of a branch, ordered by slug
    pub fn list_records(&self, branch_id: BranchId) -> Result<Vec<RecordView>> {
        self.branches().get(branch_id)?;

        let mut views = self
            .records()
            .by_branch(branch_id)
            .filter(|record| record.is_live())
            .map(|record| RecordView {
                record: record.clone(),
                tags: self.tags().get(record.id).clone(),
            })
            .collect::<Vec<_>>();
        views.sort_by(|a, b| a.record.slug.cmp(&b.record.slug));

        Ok(views)
    }
}

impl Repository {
    pub async fn create_record(&self, branch: &str, new_record: NewRecord) -> Result<RecordId> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.create_record(branch_id, new_record)
    }

    pub async fn edit_record(&self, branch: &str, slug: &Slug, edits: &[RecordEdit]) -> Result<()> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.edit_record(branch_id, slug, edits)
    }

    pub async fn delete_record(&self, branch: &str, slug: &Slug) -> Result<()> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.delete_record(branch_id, slug)
    }

    pub async fn set_tags(&self, branch: &str, slug: &Slug, tags: TagSet) -> Result<()> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.set_tags(branch_id, slug, tags)
    }

    pub async fn set_tracked(&self, branch: &str, slug: &Slug, tracked: bool) -> Result<()> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.set_tracked(branch_id, slug, tracked)
    }

    pub async fn set_conflict(&self, branch: &str, slug: &Slug, conflicted: bool) -> Result<()> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.set_conflict(branch_id, slug, conflicted)
    }

    pub async fn get_record(&self, branch: &str, slug: &Slug) -> Result<RecordView> {
        let store = self.store();
        let store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.get_record(branch_id, slug)
    }

    pub async fn list_records(&self, branch: &str) -> Result<Vec<RecordView>> {
        let store = self.store();
        let store = store.lock().await;

        let branch_id = store.resolve_branch(branch)?.id;
        store.list_records(branch_id)
    }
}
