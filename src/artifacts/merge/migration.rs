//! Merge plan application
//!
//! A [`Migration`] applies a [`MergePlan`] to the working copies of one target
//! branch. Conflicts are checked before anything is written: a plan with at
//! least one conflicted slug is rejected as a whole and the store is left as
//! it was. Past that check no step can fail.
//!
//! Changes are applied in a fixed order:
//!
//! 1. Creates (reviving a tombstone with the same slug when there is one);
//!    a created record gets exactly the planned tag set
//! 2. Updates
//! 3. Removes (tombstoning)
//! 4. Tag removals, then tag additions

use crate::areas::store::Store;
use crate::artifacts::branch::slug::Slug;
use crate::artifacts::merge::merge_plan::MergePlan;
use crate::artifacts::objects::branch::BranchId;
use crate::artifacts::objects::record::RecordId;
use crate::errors::{FolioError, Result};

pub struct Migration<'s> {
    store: &'s mut Store,
    target: BranchId,
    plan: &'s MergePlan,
}

impl<'s> Migration<'s> {
    pub fn new(store: &'s mut Store, target: BranchId, plan: &'s MergePlan) -> Self {
        Self {
            store,
            target,
            plan,
        }
    }

    pub fn apply_changes(&mut self) -> Result<()> {
        self.check_for_conflicts()?;

        self.apply_creates()?;
        self.apply_updates();
        self.apply_removes();
        self.apply_tags();

        tracing::debug!(target_branch = %self.target, "applied merge plan");
        Ok(())
    }

    fn check_for_conflicts(&self) -> Result<()> {
        if self.plan.is_clean() {
            Ok(())
        } else {
            Err(FolioError::MergeConflict(self.plan.conflicted_slugs()))
        }
    }

    /// Id of the target record for a slug, live first, then the latest tombstone
    fn target_record(&self, slug: &Slug) -> Option<RecordId> {
        self.store
            .records()
            .find_by_slug(self.target, slug)
            .map(|record| record.id)
    }

    fn apply_creates(&mut self) -> Result<()> {
        for (slug, planned) in &self.plan.creates {
            let id = match self.target_record(slug) {
                Some(id) => {
                    // an untracked live copy or a tombstone takes the content
                    if let Some(record) = self.store.records_mut().get_mut(id) {
                        record.content = planned.content.clone();
                        record.tracked = true;
                        record.touch();
                    }
                    tracing::trace!(%slug, record = %id, "revived record");
                    id
                }
                None => {
                    let id = self.store.records_mut().insert(
                        self.target,
                        slug.clone(),
                        planned.content.clone(),
                        &planned.author,
                        true,
                    )?;
                    tracing::trace!(%slug, record = %id, "created record");
                    id
                }
            };
            self.store.tags_mut().set(id, planned.tags.clone());
        }

        Ok(())
    }

    fn apply_updates(&mut self) {
        for (slug, content) in &self.plan.updates {
            if let Some(id) = self.target_record(slug)
                && let Some(record) = self.store.records_mut().get_mut(id)
            {
                record.content = content.clone();
                record.touch();
                tracing::trace!(%slug, record = %id, "updated record");
            }
        }
    }

    fn apply_removes(&mut self) {
        for slug in &self.plan.removes {
            if let Some(id) = self.target_record(slug)
                && let Some(record) = self.store.records_mut().get_mut(id)
            {
                record.content.deleted = true;
                record.touch();
                tracing::trace!(%slug, record = %id, "tombstoned record");
            }
        }
    }

    fn apply_tags(&mut self) {
        for (slug, tags) in &self.plan.tag_removes {
            if let Some(id) = self.target_record(slug) {
                self.store.tags_mut().remove(id, tags);
            }
        }
        for (slug, tags) in &self.plan.tag_adds {
            if let Some(id) = self.target_record(slug) {
                self.store.tags_mut().add(id, tags);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::merge::merge_plan::PlannedRecord;
    use crate::artifacts::objects::record::{RecordContent, TagSet};
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::collections::{BTreeMap, BTreeSet};

    fn slug(s: &str) -> Slug {
        Slug::try_parse(s).unwrap()
    }

    fn content(body: &str) -> RecordContent {
        RecordContent {
            title: "H".into(),
            body: body.into(),
            ..Default::default()
        }
    }

    #[fixture]
    fn store() -> Store {
        let mut store = Store::init().unwrap();
        let main_id = store.main_branch().unwrap().id;
        let id = store
            .records_mut()
            .insert(main_id, slug("hello"), content("B"), "ann", true)
            .unwrap();
        store.tags_mut().set(id, TagSet::from(["news".to_string()]));
        store
    }

    fn main_id(store: &Store) -> BranchId {
        store.main_branch().unwrap().id
    }

    #[rstest]
    fn test_conflicted_plan_changes_nothing(mut store: Store) {
        let before = store.clone();
        let target = main_id(&store);
        let plan = MergePlan {
            conflicts: BTreeSet::from([slug("hello")]),
            updates: BTreeMap::from([(slug("other"), content("x"))]),
            ..Default::default()
        };

        let result = Migration::new(&mut store, target, &plan).apply_changes();

        assert_eq!(result, Err(FolioError::MergeConflict(vec!["hello".into()])));
        assert_eq!(store, before);
    }

    #[rstest]
    fn test_clean_plan_is_applied(mut store: Store) {
        let target = main_id(&store);
        let plan = MergePlan {
            creates: BTreeMap::from([(
                slug("fresh"),
                PlannedRecord::new(content("F"), TagSet::from(["draft".to_string()]), "bob".into()),
            )]),
            updates: BTreeMap::from([(slug("hello"), content("B2"))]),
            tag_removes: BTreeMap::from([(slug("hello"), TagSet::from(["news".to_string()]))]),
            ..Default::default()
        };

        Migration::new(&mut store, target, &plan)
            .apply_changes()
            .unwrap();

        let state = store.live_state(target);
        assert_eq!(state.content(&slug("hello")).unwrap().body, "B2");
        assert!(state.tags(&slug("hello")).is_empty());
        assert_eq!(state.content(&slug("fresh")).unwrap().body, "F");
        assert_eq!(state.get(&slug("fresh")).unwrap().author, "bob");
        assert_eq!(state.tags(&slug("fresh")), &TagSet::from(["draft".to_string()]));
    }

    #[rstest]
    fn test_remove_then_create_revives_the_same_record(mut store: Store) {
        let target = main_id(&store);
        let original = store.records().require_live(target, &slug("hello")).unwrap();

        let remove = MergePlan {
            removes: BTreeSet::from([slug("hello")]),
            ..Default::default()
        };
        Migration::new(&mut store, target, &remove)
            .apply_changes()
            .unwrap();
        assert!(store.records().live_by_slug(target, &slug("hello")).is_none());

        let create = MergePlan {
            creates: BTreeMap::from([(
                slug("hello"),
                PlannedRecord::new(content("back"), TagSet::from(["fresh".to_string()]), "ann".into()),
            )]),
            ..Default::default()
        };
        Migration::new(&mut store, target, &create)
            .apply_changes()
            .unwrap();

        let revived = store.records().live_by_slug(target, &slug("hello")).unwrap();
        assert_eq!(revived.id, original);
        assert_eq!(revived.content.body, "back");
        assert_eq!(store.tags().get(original), &TagSet::from(["fresh".to_string()]));
    }

    #[rstest]
    fn test_adopted_untracked_record_takes_only_the_planned_tags(mut store: Store) {
        let target = main_id(&store);
        let draft = store
            .records_mut()
            .insert(target, slug("draft"), content("local"), "ann", false)
            .unwrap();
        store.tags_mut().set(draft, TagSet::from(["old".to_string()]));
        let plan = MergePlan {
            creates: BTreeMap::from([(
                slug("draft"),
                PlannedRecord::new(content("D"), TagSet::from(["new".to_string()]), "bob".into()),
            )]),
            ..Default::default()
        };

        Migration::new(&mut store, target, &plan)
            .apply_changes()
            .unwrap();

        let adopted = store.records().get(draft).unwrap();
        assert!(adopted.tracked);
        assert_eq!(adopted.content.body, "D");
        assert_eq!(store.tags().get(draft), &TagSet::from(["new".to_string()]));
    }
}
