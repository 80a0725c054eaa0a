use crate::areas::repository::Repository;
use crate::areas::store::Store;
use crate::artifacts::merge::ancestor_resolver::AncestorResolver;
use crate::artifacts::merge::merge_plan::{MergePlan, plan_merge};
use crate::artifacts::merge::migration::Migration;
use crate::artifacts::objects::branch::{BranchId, BranchStatus};
use crate::artifacts::objects::object_id::ObjectId;
use crate::commands::porcelain::commit::CommitOutcome;
use crate::errors::{FolioError, Result};

fn merge_parents(first: ObjectId, second: ObjectId) -> Vec<ObjectId> {
    if first == second {
        vec![first]
    } else {
        vec![first, second]
    }
}

impl Store {
    /// Merge a branch back into the trunk and retire it
    ///
    /// The three sides are the fork-point snapshot (base), the branch working
    /// copies (source) and the trunk working copies (target). Nothing is
    /// written unless the plan is free of conflicts and not empty.
    pub fn merge_branch(&mut self, branch_id: BranchId, message: &str) -> Result<CommitOutcome> {
        let branch = self.branches().get(branch_id)?.clone();
        if branch.is_main() {
            return Err(FolioError::ForbiddenOnTrunk(
                "merging the trunk into itself".into(),
            ));
        }
        if branch.is_retired() {
            return Err(FolioError::BranchRetired(branch.name.to_string()));
        }

        let main = self.main_branch()?.clone();
        self.ensure_no_conflicts(main.id)?;

        let fork_point = branch
            .fork_point
            .clone()
            .ok_or_else(|| FolioError::NoCommits(branch.name.to_string()))?;
        let trunk_head = main
            .head
            .clone()
            .ok_or_else(|| FolioError::NoCommits(main.name.to_string()))?;

        let plan = plan_merge(
            &self.state_at(Some(&fork_point)),
            &self.live_state(branch.id),
            &self.live_state(main.id),
        );
        Self::check_plan(&plan)?;
        if plan.is_empty() {
            return Err(FolioError::NoChanges(branch.name.to_string()));
        }

        let version = self.commits().next_main_version(main.id);
        let commit_id = self.commits_mut().create_commit(
            main.id,
            merge_parents(trunk_head, fork_point),
            message,
            Some(version),
        )?;

        Migration::new(self, main.id, &plan).apply_changes()?;
        self.branches_mut()
            .set_status(branch.id, BranchStatus::Committed)?;
        self.branches_mut().set_head(main.id, commit_id.clone())?;
        self.capture_snapshots(&commit_id, main.id);

        tracing::info!(
            branch = %branch.name,
            commit = %commit_id.to_short_oid(),
            version,
            "merged branch into trunk"
        );
        Ok(CommitOutcome {
            commit_id,
            version: Some(version),
        })
    }

    /// Merge the committed state of `source` into the working copies of `target`
    ///
    /// The base is the merge base of the two heads. The merge commit lands on
    /// the target with parents `[target head, source head]` and gets a version
    /// only when the target is the trunk. The source branch is left as is.
    pub fn merge_into(
        &mut self,
        target_id: BranchId,
        source_id: BranchId,
        message: &str,
    ) -> Result<CommitOutcome> {
        let target = self.branches().get(target_id)?.clone();
        let source = self.branches().get(source_id)?.clone();

        if target.id == source.id {
            return Err(FolioError::Validation(format!(
                "cannot merge branch '{}' into itself",
                target.name
            )));
        }
        if target.is_retired() {
            return Err(FolioError::BranchRetired(target.name.to_string()));
        }
        self.ensure_no_conflicts(target.id)?;

        let source_head = source
            .head
            .clone()
            .ok_or_else(|| FolioError::NoCommits(source.name.to_string()))?;
        let target_head = target
            .head
            .clone()
            .ok_or_else(|| FolioError::NoCommits(target.name.to_string()))?;

        let merge_base = {
            let commits = self.commits();
            AncestorResolver::new(|oid| commits.slim(oid))
                .find_merge_base(&source_head, &target_head)
        }
        .ok_or_else(|| FolioError::NoCommonAncestor {
            merging: source.name.to_string(),
            into: target.name.to_string(),
        })?;

        let plan = plan_merge(
            &self.state_at(Some(&merge_base)),
            &self.state_at(Some(&source_head)),
            &self.live_state(target.id),
        );
        Self::check_plan(&plan)?;

        let version = target
            .is_main()
            .then(|| self.commits().next_main_version(target.id));
        let commit_id = self.commits_mut().create_commit(
            target.id,
            merge_parents(target_head, source_head),
            message,
            version,
        )?;

        Migration::new(self, target.id, &plan).apply_changes()?;
        self.branches_mut().set_head(target.id, commit_id.clone())?;
        self.capture_snapshots(&commit_id, target.id);

        tracing::info!(
            source = %source.name,
            target = %target.name,
            merge_base = %merge_base.to_short_oid(),
            commit = %commit_id.to_short_oid(),
            ?version,
            "merged branches"
        );
        Ok(CommitOutcome { commit_id, version })
    }

    fn check_plan(plan: &MergePlan) -> Result<()> {
        if plan.is_clean() {
            Ok(())
        } else {
            tracing::info!(conflicts = ?plan.conflicted_slugs(), "merge aborted");
            Err(FolioError::MergeConflict(plan.conflicted_slugs()))
        }
    }
}

impl Repository {
    /// Merge the named branch back into the trunk
    pub async fn merge_branch(&self, name: &str, message: &str) -> Result<CommitOutcome> {
        let store = self.store();
        let mut store = store.lock().await;

        let branch_id = store.resolve_branch(name)?.id;
        store.merge_branch(branch_id, message)
    }

    /// Merge `source` into `target`
    pub async fn merge_into(&self, target: &str, source: &str, message: &str) -> Result<CommitOutcome> {
        let store = self.store();
        let mut store = store.lock().await;

        let target_id = store.resolve_branch(target)?.id;
        let source_id = store.resolve_branch(source)?.id;
        store.merge_into(target_id, source_id, message)
    }
}
