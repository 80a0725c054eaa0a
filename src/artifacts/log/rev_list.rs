use crate::areas::commits::CommitGraph;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// First-parent walk from a head commit back to the root
///
/// On the trunk the first parent is always the previous trunk head, so the
/// walk yields trunk commits newest first.
#[derive(Clone, new)]
pub struct RevList<'g> {
    commits: &'g CommitGraph,
    start: Option<ObjectId>,
}

impl<'g> IntoIterator for RevList<'g> {
    type Item = &'g Commit;
    type IntoIter = RevListIntoIter<'g>;

    fn into_iter(self) -> Self::IntoIter {
        RevListIntoIter {
            commits: self.commits,
            current_commit_oid: self.start,
        }
    }
}

#[derive(Clone)]
pub struct RevListIntoIter<'g> {
    commits: &'g CommitGraph,
    current_commit_oid: Option<ObjectId>,
}

impl<'g> Iterator for RevListIntoIter<'g> {
    type Item = &'g Commit;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        // an unknown commit ends the walk
        let commit = self.commits.get(&commit_oid)?;
        self.current_commit_oid = commit.parent().cloned();

        Some(commit)
    }
}
