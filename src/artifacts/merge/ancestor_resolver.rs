//! Merge-base discovery
//!
//! Finds the commit both sides of a merge start from. The resolver runs two
//! breadth-first traversals over parent edges:
//!
//! 1. From the target head, marking every reachable commit FROM_TARGET
//! 2. From the source head, marking commits FROM_SOURCE and stopping at
//!    the first one that already carries the target mark
//!
//! Because the second traversal is breadth-first, the result is the common
//! ancestor nearest to the source head. Both traversals keep a visit map, so
//! diamond-shaped histories are walked once per side and the search always
//! terminates on the append-only (hence acyclic) commit graph.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let resolver = AncestorResolver::new(|oid| commits.get(oid).map(Commit::as_slim));
//! let base = resolver.find_merge_base(&source_head, &target_head);
//! ```
//!
//! The loader returns `None` for unknown commits; they are treated as having
//! no parents.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct VisitState: u8 {
        const FROM_SOURCE = 0b01;
        const FROM_TARGET = 0b10;
    }
}

/// Resolves merge bases over any commit source
///
/// # Type Parameters
///
/// * `CommitLoaderFn` - Function returning the slim commit (id and parents) for
///   an ID, borrowed from the commit store for lifetime `'c`
pub struct AncestorResolver<'c, CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> Option<SlimCommit<'c>>,
{
    commit_loader: CommitLoaderFn,
    _marker: std::marker::PhantomData<&'c ()>,
}

impl<'c, CommitLoaderFn> AncestorResolver<'c, CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> Option<SlimCommit<'c>>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self {
            commit_loader,
            _marker: std::marker::PhantomData,
        }
    }

    /// Walk parent edges breadth-first, tagging every reachable commit with `flag`
    ///
    /// Stops early and returns the first commit already tagged with `stop_on`.
    fn traverse(
        &self,
        start: &ObjectId,
        flag: VisitState,
        states: &mut HashMap<ObjectId, VisitState>,
        stop_on: Option<VisitState>,
    ) -> Option<ObjectId> {
        let mut queue = VecDeque::from([start.clone()]);

        while let Some(commit_id) = queue.pop_front() {
            let state = states.entry(commit_id.clone()).or_insert(VisitState::empty());
            if state.contains(flag) {
                continue;
            }
            *state |= flag;

            tracing::trace!(commit = %commit_id, state = ?state, "visiting commit");

            if stop_on.is_some_and(|other| state.contains(other)) {
                return Some(commit_id);
            }

            if let Some(commit) = (self.commit_loader)(&commit_id) {
                for parent_id in commit.parents {
                    let parent_state = states.get(parent_id).copied().unwrap_or(VisitState::empty());
                    if !parent_state.contains(flag) {
                        queue.push_back(parent_id.clone());
                    }
                }
            }
        }

        None
    }

    /// Every commit reachable from `start`, `start` included
    pub fn ancestors_of(&self, start: &ObjectId) -> HashSet<ObjectId> {
        let mut states = HashMap::new();
        self.traverse(start, VisitState::FROM_TARGET, &mut states, None);
        states.into_keys().collect()
    }

    /// Finds the merge base of two heads
    ///
    /// # Returns
    ///
    /// - `Some(ObjectId)` - the common ancestor nearest to `source_commit_id`
    /// - `None` - the histories are disjoint
    pub fn find_merge_base(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> Option<ObjectId> {
        let mut states = HashMap::<ObjectId, VisitState>::new();

        self.traverse(target_commit_id, VisitState::FROM_TARGET, &mut states, None);
        let merge_base = self.traverse(
            source_commit_id,
            VisitState::FROM_SOURCE,
            &mut states,
            Some(VisitState::FROM_TARGET),
        );

        tracing::debug!(
            source = %source_commit_id,
            target = %target_commit_id,
            merge_base = ?merge_base.as_ref().map(ObjectId::to_short_oid),
            visited = states.len(),
            "resolved merge base"
        );

        merge_base
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> bool {
        self.ancestors_of(descendant).contains(ancestor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    /// In-memory commit store for testing
    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, (ObjectId, Vec<ObjectId>)>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: ObjectId, parents: Vec<ObjectId>) {
            self.commits
                .insert(commit_id.clone(), (commit_id, parents));
        }

        fn get_slim_commit(&'_ self, commit_id: &ObjectId) -> Option<SlimCommit<'_>> {
            self.commits
                .get(commit_id)
                .map(|(oid, parents)| SlimCommit {
                    oid,
                    parents: parents.as_slice(),
                })
        }

        fn merge_base(&self, source: &ObjectId, target: &ObjectId) -> Option<ObjectId> {
            AncestorResolver::new(|oid| self.get_slim_commit(oid)).find_merge_base(source, target)
        }

        fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> bool {
            AncestorResolver::new(|oid| self.get_slim_commit(oid)).is_ancestor(ancestor, descendant)
        }
    }

    fn create_oid(id: &str) -> ObjectId {
        ObjectId::hash(id.as_bytes())
    }

    #[fixture]
    fn linear_history() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();

        // Linear history: A <- B <- C <- D
        let a = create_oid("commit_a");
        let b = create_oid("commit_b");
        let c = create_oid("commit_c");
        let d = create_oid("commit_d");

        store.add_commit(a.clone(), vec![]);
        store.add_commit(b.clone(), vec![a.clone()]);
        store.add_commit(c.clone(), vec![b.clone()]);
        store.add_commit(d.clone(), vec![c.clone()]);

        store
    }

    #[fixture]
    fn simple_merge() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();

        //     A
        //    / \
        //   B   C
        //    \ /
        //     D (merge commit)
        let a = create_oid("commit_a");
        let b = create_oid("commit_b");
        let c = create_oid("commit_c");
        let d = create_oid("commit_d");

        store.add_commit(a.clone(), vec![]);
        store.add_commit(b.clone(), vec![a.clone()]);
        store.add_commit(c.clone(), vec![a.clone()]);
        store.add_commit(d.clone(), vec![b.clone(), c.clone()]);

        store
    }

    #[fixture]
    fn criss_cross_merge() -> InMemoryCommitStore {
        let mut store = InMemoryCommitStore::default();

        //     A
        //    / \
        //   B   C
        //   |\ /|
        //   | X |
        //   |/ \|
        //   D   E
        //   |   |
        //   F   G
        let a = create_oid("commit_a");
        let b = create_oid("commit_b");
        let c = create_oid("commit_c");
        let d = create_oid("commit_d");
        let e = create_oid("commit_e");
        let f = create_oid("commit_f");
        let g = create_oid("commit_g");

        store.add_commit(a.clone(), vec![]);
        store.add_commit(b.clone(), vec![a.clone()]);
        store.add_commit(c.clone(), vec![a.clone()]);
        store.add_commit(d.clone(), vec![b.clone(), c.clone()]);
        store.add_commit(e.clone(), vec![c.clone(), b.clone()]);
        store.add_commit(f.clone(), vec![d.clone()]);
        store.add_commit(g.clone(), vec![e.clone()]);

        store
    }

    #[rstest]
    fn test_linear_history_merge_base(linear_history: InMemoryCommitStore) {
        let b = create_oid("commit_b");
        let d = create_oid("commit_d");

        assert_eq!(linear_history.merge_base(&b, &d), Some(b.clone()));
        assert_eq!(linear_history.merge_base(&d, &b), Some(b));
    }

    #[rstest]
    fn test_same_commit_is_its_own_merge_base(linear_history: InMemoryCommitStore) {
        let c = create_oid("commit_c");
        assert_eq!(linear_history.merge_base(&c, &c), Some(c));
    }

    #[rstest]
    fn test_diverged_branches_meet_at_fork(simple_merge: InMemoryCommitStore) {
        let a = create_oid("commit_a");
        let b = create_oid("commit_b");
        let c = create_oid("commit_c");

        assert_eq!(simple_merge.merge_base(&b, &c), Some(a));
    }

    #[rstest]
    fn test_merged_branch_is_merge_base_with_merge_commit(simple_merge: InMemoryCommitStore) {
        let c = create_oid("commit_c");
        let d = create_oid("commit_d");

        assert_eq!(simple_merge.merge_base(&c, &d), Some(c));
    }

    #[rstest]
    fn test_criss_cross_picks_a_best_common_ancestor(criss_cross_merge: InMemoryCommitStore) {
        let b = create_oid("commit_b");
        let c = create_oid("commit_c");
        let f = create_oid("commit_f");
        let g = create_oid("commit_g");

        let base = criss_cross_merge.merge_base(&f, &g).unwrap();

        assert!(base == b || base == c);
        assert!(criss_cross_merge.is_ancestor(&base, &f));
        assert!(criss_cross_merge.is_ancestor(&base, &g));
    }

    #[rstest]
    fn test_no_common_ancestor_different_roots() {
        let mut store = InMemoryCommitStore::default();

        // Two disjoint histories: A <- B and X <- Y
        let a = create_oid("commit_a");
        let b = create_oid("commit_b");
        let x = create_oid("commit_x");
        let y = create_oid("commit_y");

        store.add_commit(a.clone(), vec![]);
        store.add_commit(b.clone(), vec![a]);
        store.add_commit(x.clone(), vec![]);
        store.add_commit(y.clone(), vec![x]);

        assert_eq!(store.merge_base(&b, &y), None);
    }

    #[rstest]
    fn test_ancestors_of_diamond_are_visited_once(simple_merge: InMemoryCommitStore) {
        let d = create_oid("commit_d");
        let resolver = AncestorResolver::new(|oid| simple_merge.get_slim_commit(oid));

        assert_eq!(resolver.ancestors_of(&d).len(), 4);
    }

    #[rstest]
    fn test_is_ancestor_is_directional(linear_history: InMemoryCommitStore) {
        let a = create_oid("commit_a");
        let d = create_oid("commit_d");

        assert!(linear_history.is_ancestor(&a, &d));
        assert!(!linear_history.is_ancestor(&d, &a));
    }

    #[test]
    fn test_unknown_commit_has_no_parents() {
        let store = InMemoryCommitStore::default();
        let ghost = create_oid("ghost");

        assert_eq!(store.merge_base(&ghost, &ghost), Some(ghost));
    }
}
