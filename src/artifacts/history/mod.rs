//! Commit-graph traversal and merge-base search
//!
//! All algorithms here are expressed over a commit loader closure returning
//! `SlimCommit`s, so they run identically against the on-disk database (via
//! the commit cache) and against in-memory stores in tests.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

/// Graph walker over a commit loader
///
/// The loader takes a commit id and returns its slim form (parents and
/// timestamp). Root commits have an empty parent list.
pub struct HistoryWalker<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> HistoryWalker<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Enumerate a commit and everything reachable from it, breadth-first
    ///
    /// Each commit appears once, the starting commit first.
    pub fn ancestors(&self, start: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start.clone()]);
        let mut order = Vec::new();

        while let Some(oid) = queue.pop_front() {
            if !visited.insert(oid.clone()) {
                continue;
            }

            let commit = (self.commit_loader)(&oid)?;
            order.push(oid);

            for parent in commit.parents {
                queue.push_back(parent);
            }
        }

        Ok(order)
    }

    /// `ancestor` ∈ ancestors(`descendant`), reflexively
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> anyhow::Result<bool> {
        if ancestor == descendant {
            return Ok(true);
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([descendant.clone()]);

        while let Some(oid) = queue.pop_front() {
            if !visited.insert(oid.clone()) {
                continue;
            }

            if &oid == ancestor {
                return Ok(true);
            }

            let commit = (self.commit_loader)(&oid)?;
            for parent in commit.parents {
                queue.push_back(parent);
            }
        }

        Ok(false)
    }

    /// Lowest common ancestor of two commits
    ///
    /// Walks breadth-first from `a` and returns the first commit that is also
    /// an ancestor of `b`. When several candidates surface in the same layer,
    /// the one with the greatest commit timestamp wins, digest string as the
    /// stable tie-break. `None` when the histories are disjoint.
    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<Option<ObjectId>> {
        let ancestors_of_b: HashSet<ObjectId> = self.ancestors(b)?.into_iter().collect();

        let mut visited = HashSet::new();
        let mut frontier = vec![a.clone()];

        while !frontier.is_empty() {
            let mut candidates = Vec::new();
            let mut next_frontier = Vec::new();

            for oid in frontier {
                if !visited.insert(oid.clone()) {
                    continue;
                }

                let commit = (self.commit_loader)(&oid)?;
                if ancestors_of_b.contains(&oid) {
                    candidates.push(commit);
                    continue;
                }

                next_frontier.extend(commit.parents);
            }

            if !candidates.is_empty() {
                candidates.sort();
                return Ok(candidates.pop().map(|commit| commit.oid));
            }

            frontier = next_frontier;
        }

        Ok(None)
    }

    /// First-parent chain from `head` down to (excluding) anything reachable
    /// from `upstream`, oldest first
    ///
    /// This is the list of commits a rebase replays.
    pub fn rev_list(
        &self,
        head: &ObjectId,
        upstream: &ObjectId,
    ) -> anyhow::Result<Vec<ObjectId>> {
        let excluded: HashSet<ObjectId> = self.ancestors(upstream)?.into_iter().collect();

        let mut chain = Vec::new();
        let mut current = Some(head.clone());

        while let Some(oid) = current {
            if excluded.contains(&oid) {
                break;
            }

            let commit = (self.commit_loader)(&oid)?;
            chain.push(oid);
            current = commit.parents.first().cloned();
        }

        chain.reverse();
        Ok(chain)
    }

    /// All reachable commits, newest first by commit timestamp
    ///
    /// The ordering `log` and `blame` present to the user.
    pub fn by_timestamp(&self, start: &ObjectId) -> anyhow::Result<Vec<SlimCommit>> {
        let mut commits = self
            .ancestors(start)?
            .iter()
            .map(&self.commit_loader)
            .collect::<anyhow::Result<Vec<_>>>()?;

        commits.sort();
        commits.reverse();
        Ok(commits)
    }
}
