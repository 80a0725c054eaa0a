//! Three-way merge planning
//!
//! Given the content and tags of every slug at the merge base, on the source
//! side and on the target side, the planner decides per slug:
//!
//! 1. Source unchanged from base: nothing to do
//! 2. Target unchanged from base: propagate the source change (create, update
//!    or remove)
//! 3. Both changed: nothing to do if they converged on the same value,
//!    otherwise the slug is conflicted
//!
//! A tombstone compares equal to an absent slug, and neither carries tags.
//! Branches fork from live records only, so a trunk tombstone missing from a
//! branch is not a change.
//!
//! Content and tag sets go through the same rule independently. A slug whose
//! content merges cleanly can still conflict on its tags, and the other way
//! round; both land in the same conflict set. A planned create carries its
//! full tag set instead of a delta.
//!
//! The planner only reads. A plan with conflicts must be rejected as a whole;
//! see [`Migration`](crate::artifacts::merge::migration::Migration).

use crate::artifacts::branch::slug::Slug;
use crate::artifacts::diff::content_state::{ContentState, StateEntry, union_of_slugs};
use crate::artifacts::objects::record::{RecordContent, TagSet};
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

static NO_TAGS: TagSet = TagSet::new();

/// A record the merge creates (or revives) on the target side
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct PlannedRecord {
    pub content: RecordContent,
    pub tags: TagSet,
    pub author: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MergePlan {
    pub conflicts: BTreeSet<Slug>,
    pub creates: BTreeMap<Slug, PlannedRecord>,
    pub updates: BTreeMap<Slug, RecordContent>,
    pub removes: BTreeSet<Slug>,
    pub tag_adds: BTreeMap<Slug, TagSet>,
    pub tag_removes: BTreeMap<Slug, TagSet>,
}

impl MergePlan {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// True when applying the plan would change nothing
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
            && self.creates.is_empty()
            && self.updates.is_empty()
            && self.removes.is_empty()
            && self.tag_adds.is_empty()
            && self.tag_removes.is_empty()
    }

    pub fn conflicted_slugs(&self) -> Vec<String> {
        self.conflicts.iter().map(ToString::to_string).collect()
    }
}

/// Outcome of the three-way rule for one value
#[derive(Debug, PartialEq, Eq)]
enum Resolution {
    Unchanged,
    TakeSource,
    Conflict,
}

fn resolve<T: PartialEq>(base: T, source: T, target: T) -> Resolution {
    if source == base {
        Resolution::Unchanged
    } else if target == base {
        Resolution::TakeSource
    } else if source == target {
        Resolution::Unchanged
    } else {
        Resolution::Conflict
    }
}

/// The live entry of a slug; tombstones read as absent
fn live_entry<'s>(state: &'s ContentState, slug: &Slug) -> Option<&'s StateEntry> {
    state.get(slug).filter(|entry| entry.content.is_live())
}

fn live_tags<'s>(state: &'s ContentState, slug: &Slug) -> &'s TagSet {
    live_entry(state, slug)
        .map(|entry| &entry.tags)
        .unwrap_or(&NO_TAGS)
}

/// Three-way merge planner over base, source and target states
#[derive(Debug, new)]
pub struct MergePlanner<'s> {
    base: &'s ContentState,
    source: &'s ContentState,
    target: &'s ContentState,
}

impl MergePlanner<'_> {
    pub fn plan(&self) -> MergePlan {
        let mut plan = MergePlan::default();

        for slug in union_of_slugs(&[self.base, self.source, self.target]) {
            self.plan_content(slug, &mut plan);
            self.plan_tags(slug, &mut plan);
        }

        tracing::debug!(
            conflicts = plan.conflicts.len(),
            creates = plan.creates.len(),
            updates = plan.updates.len(),
            removes = plan.removes.len(),
            tag_adds = plan.tag_adds.len(),
            tag_removes = plan.tag_removes.len(),
            "planned merge"
        );

        plan
    }

    fn plan_content(&self, slug: &Slug, plan: &mut MergePlan) {
        let base = live_entry(self.base, slug).map(|entry| &entry.content);
        let source = live_entry(self.source, slug);
        let target = live_entry(self.target, slug).map(|entry| &entry.content);

        match resolve(base, source.map(|entry| &entry.content), target) {
            Resolution::Unchanged => {}
            Resolution::Conflict => {
                plan.conflicts.insert(slug.clone());
            }
            Resolution::TakeSource => match (source, target) {
                (Some(source), None) => {
                    plan.creates.insert(
                        slug.clone(),
                        PlannedRecord::new(
                            source.content.clone(),
                            source.tags.clone(),
                            source.author.clone(),
                        ),
                    );
                }
                (Some(source), Some(_)) => {
                    plan.updates.insert(slug.clone(), source.content.clone());
                }
                (None, Some(_)) => {
                    plan.removes.insert(slug.clone());
                }
                (None, None) => {}
            },
        }
    }

    fn plan_tags(&self, slug: &Slug, plan: &mut MergePlan) {
        let base = live_tags(self.base, slug);
        let source = live_tags(self.source, slug);
        let target = live_tags(self.target, slug);

        match resolve(base, source, target) {
            Resolution::Unchanged => {}
            Resolution::Conflict => {
                plan.conflicts.insert(slug.clone());
            }
            Resolution::TakeSource => {
                let source_live = live_entry(self.source, slug).is_some();
                let target_live = live_entry(self.target, slug).is_some();

                if plan.creates.contains_key(slug) || !source_live {
                    return;
                }
                if !target_live {
                    // retagged on the source, deleted on the target
                    plan.conflicts.insert(slug.clone());
                    return;
                }

                let adds = source.difference(target).cloned().collect::<TagSet>();
                let removes = target.difference(source).cloned().collect::<TagSet>();

                if !adds.is_empty() {
                    plan.tag_adds.insert(slug.clone(), adds);
                }
                if !removes.is_empty() {
                    plan.tag_removes.insert(slug.clone(), removes);
                }
            }
        }
    }
}

pub fn plan_merge(base: &ContentState, source: &ContentState, target: &ContentState) -> MergePlan {
    MergePlanner::new(base, source, target).plan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::diff::content_state::StateEntry;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    fn slug(s: &str) -> Slug {
        Slug::try_parse(s).unwrap()
    }

    fn content(body: &str, deleted: bool) -> RecordContent {
        RecordContent {
            title: "H".into(),
            description: String::new(),
            body: body.into(),
            deleted,
        }
    }

    fn with(state: &ContentState, s: &str, body: &str, deleted: bool, tags: &[&str]) -> ContentState {
        let mut state = state.clone();
        state.insert(
            slug(s),
            StateEntry::new(
                content(body, deleted),
                tags.iter().map(|t| t.to_string()).collect(),
                "ann".into(),
            ),
        );
        state
    }

    #[fixture]
    fn base() -> ContentState {
        with(&ContentState::new(), "hello", "B", false, &["news"])
    }

    #[rstest]
    fn test_source_unchanged_is_empty_plan(base: ContentState) {
        let target = with(&base, "hello", "B3", false, &["news", "hot"]);

        assert!(plan_merge(&base, &base, &target).is_empty());
    }

    #[rstest]
    fn test_source_edit_propagates_as_update(base: ContentState) {
        let source = with(&base, "hello", "B2", false, &["news"]);

        let plan = plan_merge(&base, &source, &base);

        assert_eq!(
            plan,
            MergePlan {
                updates: BTreeMap::from([(slug("hello"), content("B2", false))]),
                ..Default::default()
            }
        );
    }

    #[rstest]
    fn test_both_sides_edit_differently_conflicts(base: ContentState) {
        let source = with(&base, "hello", "B2", false, &["news"]);
        let target = with(&base, "hello", "B3", false, &["news"]);

        let plan = plan_merge(&base, &source, &target);

        assert!(!plan.is_clean());
        assert_eq!(plan.conflicted_slugs(), vec!["hello".to_string()]);
    }

    #[rstest]
    fn test_convergent_edits_are_not_conflicts(base: ContentState) {
        let source = with(&base, "hello", "B2", false, &["news", "hot"]);

        let plan = plan_merge(&base, &source, &source);

        assert!(plan.is_empty());
    }

    #[rstest]
    fn test_new_record_is_created_with_tags(base: ContentState) {
        let source = with(&base, "fresh", "F", false, &["draft"]);

        let plan = plan_merge(&base, &source, &base);

        assert_eq!(plan.creates.len(), 1);
        assert_eq!(plan.creates[&slug("fresh")].content.body, "F");
        assert_eq!(plan.creates[&slug("fresh")].author, "ann");
        assert_eq!(
            plan.creates[&slug("fresh")].tags,
            TagSet::from(["draft".to_string()])
        );
        assert!(plan.tag_adds.is_empty());
    }

    #[rstest]
    fn test_tombstone_propagates_as_remove(base: ContentState) {
        let source = with(&base, "hello", "B", true, &["news"]);

        let plan = plan_merge(&base, &source, &base);

        assert_eq!(plan.removes, BTreeSet::from([slug("hello")]));
        assert!(plan.updates.is_empty());
    }

    #[rstest]
    fn test_revived_record_is_created_on_tombstoned_target() {
        let base = with(&ContentState::new(), "hello", "B", true, &[]);
        let source = with(&base, "hello", "again", false, &[]);

        let plan = plan_merge(&base, &source, &base);

        assert!(plan.creates.contains_key(&slug("hello")));
    }

    #[rstest]
    fn test_tag_only_conflict_with_clean_content(base: ContentState) {
        let source = with(&base, "hello", "B2", false, &["news", "a"]);
        let target = with(&base, "hello", "B", false, &["news", "b"]);

        let plan = plan_merge(&base, &source, &target);

        assert_eq!(plan.conflicts, BTreeSet::from([slug("hello")]));
        assert_eq!(plan.updates.len(), 1);
    }

    #[rstest]
    fn test_tag_delta_against_unchanged_target(base: ContentState) {
        let source = with(&base, "hello", "B", false, &["hot"]);

        let plan = plan_merge(&base, &source, &base);

        assert_eq!(plan.tag_adds[&slug("hello")], TagSet::from(["hot".to_string()]));
        assert_eq!(plan.tag_removes[&slug("hello")], TagSet::from(["news".to_string()]));
        assert!(plan.updates.is_empty());
    }

    #[rstest]
    fn test_created_then_deleted_on_source_is_no_op() {
        let base = ContentState::new();
        let source = with(&base, "blip", "x", true, &[]);

        assert!(plan_merge(&base, &source, &base).is_empty());
    }

    #[rstest]
    fn test_tombstone_missing_from_source_is_not_a_change() {
        let base = with(&ContentState::new(), "old", "O", true, &["x"]);
        let source = ContentState::new();

        assert!(plan_merge(&base, &source, &base).is_empty());
    }

    #[rstest]
    fn test_slug_recreated_on_target_after_base_tombstone_is_kept() {
        let base = with(&ContentState::new(), "old", "O", true, &["x"]);
        let source = ContentState::new();
        let target = with(&base, "old", "again", false, &["y"]);

        assert!(plan_merge(&base, &source, &target).is_empty());
    }

    #[rstest]
    fn test_retag_against_deletion_conflicts(base: ContentState) {
        let source = with(&base, "hello", "B", false, &["hot"]);
        let target = with(&base, "hello", "B", true, &["news"]);

        let plan = plan_merge(&base, &source, &target);

        assert_eq!(plan.conflicts, BTreeSet::from([slug("hello")]));
    }

    fn arb_state() -> impl Strategy<Value = ContentState> {
        proptest::collection::vec(("[a-c]", "[xy]", any::<bool>(), proptest::collection::btree_set("[t-v]", 0..3)), 0..5)
            .prop_map(|rows| {
                rows.into_iter()
                    .map(|(s, body, deleted, tags)| {
                        (slug(&s), StateEntry::new(content(&body, deleted), tags, "ann".into()))
                    })
                    .collect()
            })
    }

    proptest! {
        #[test]
        fn test_merging_unchanged_source_is_always_empty(base in arb_state(), target in arb_state()) {
            prop_assert!(plan_merge(&base, &base, &target).is_empty());
        }

        #[test]
        fn test_dropping_tombstones_from_source_changes_nothing(base in arb_state(), target in arb_state()) {
            let source = base
                .iter()
                .filter(|(_, entry)| entry.content.is_live())
                .map(|(slug, entry)| (slug.clone(), entry.clone()))
                .collect::<ContentState>();

            prop_assert!(plan_merge(&base, &source, &target).is_empty());
        }

        #[test]
        fn test_fast_forward_never_conflicts(base in arb_state(), source in arb_state()) {
            prop_assert!(plan_merge(&base, &source, &base).is_clean());
        }
    }
}
