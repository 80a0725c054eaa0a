use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::branch::slug::Slug;
use crate::artifacts::diff::record_diff::{ChangeType, ChangedFields, diff_states};
use crate::artifacts::objects::branch::BranchId;
use crate::errors::Result;

/// One changed record of a branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchChange {
    pub slug: Slug,
    /// Live title, or the fork-point title for deletions
    pub title: String,
    pub change_type: ChangeType,
    pub fields: ChangedFields,
    pub updated_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl Store {
    /// What a branch changed since it forked
    ///
    /// The trunk has no fork point, so its working copies are compared
    /// against its head instead.
    pub fn branch_changes(&self, branch_id: BranchId) -> Result<Vec<BranchChange>> {
        let branch = self.branches().get(branch_id)?;
        let base_commit = if branch.is_main() {
            branch.head.as_ref()
        } else {
            branch.fork_point.as_ref()
        };

        let base = self.state_at(base_commit);
        let working = self.live_state(branch_id);

        let changes = diff_states(&base, &working)
            .into_iter()
            .map(|change| {
                let record = self.records().find_by_slug(branch_id, &change.slug);
                let title = working
                    .content(&change.slug)
                    .filter(|content| content.is_live())
                    .or_else(|| base.content(&change.slug))
                    .map(|content| content.title.clone())
                    .unwrap_or_default();

                BranchChange {
                    title,
                    change_type: change.change_type,
                    fields: change.fields,
                    updated_at: record.map(|record| record.updated_at),
                    slug: change.slug,
                }
            })
            .collect();

        Ok(changes)
    }
}

impl Repository {
    pub async fn branch_changes(&self, name: &str) -> Result<Vec<BranchChange>> {
        let store = self.store();
        let store = store.lock().await;

        let branch_id = store.resolve_branch(name)?.id;
        store.branch_changes(branch_id)
    }
}
