use crate::domain::{Commit, CommitId, Tag};
use crate::error::{NextVerError, Result};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet, VecDeque};

/// A branch name and the commit at its tip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    pub name: String,
    pub tip: CommitId,
}

impl BranchRef {
    pub fn new(name: impl Into<String>, tip: CommitId) -> Self {
        BranchRef {
            name: name.into(),
            tip,
        }
    }
}

/// Immutable view of the repository at one point in time.
///
/// Holds every commit reachable from HEAD, the tags and the branch tips.
/// Parents that were not read (shallow history) are treated as absent.
#[derive(Debug, Clone)]
pub struct RepositorySnapshot {
    head: CommitId,
    branch_name: String,
    commits: HashMap<CommitId, Commit>,
    tags: Vec<Tag>,
    branches: Vec<BranchRef>,
    head_distances: HashMap<CommitId, usize>,
}

impl RepositorySnapshot {
    /// Build a snapshot; fails if HEAD is not among `commits`
    pub fn new(
        head: CommitId,
        branch_name: impl Into<String>,
        commits: Vec<Commit>,
        tags: Vec<Tag>,
        branches: Vec<BranchRef>,
    ) -> Result<Self> {
        let commits: HashMap<CommitId, Commit> =
            commits.into_iter().map(|c| (c.id.clone(), c)).collect();
        if !commits.contains_key(&head) {
            return Err(NextVerError::repository(format!(
                "HEAD commit {} is missing from the snapshot",
                head
            )));
        }

        let head_distances = breadth_first_distances(&commits, &head);
        Ok(RepositorySnapshot {
            head,
            branch_name: branch_name.into(),
            commits,
            tags,
            branches,
            head_distances,
        })
    }

    pub fn head(&self) -> &Commit {
        // Presence checked in `new`
        &self.commits[&self.head]
    }

    pub fn head_id(&self) -> &CommitId {
        &self.head
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    pub fn commit(&self, id: &CommitId) -> Option<&Commit> {
        self.commits.get(id)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn branches(&self) -> &[BranchRef] {
        &self.branches
    }

    /// Fewest parent steps from HEAD to `id`, if reachable
    pub fn distance_from_head(&self, id: &CommitId) -> Option<usize> {
        self.head_distances.get(id).copied()
    }

    pub fn is_reachable_from_head(&self, id: &CommitId) -> bool {
        self.head_distances.contains_key(id)
    }

    /// Commits reachable from HEAD, nearest first, ties broken by id
    pub fn reachable_from_head(&self) -> Vec<&Commit> {
        let mut reachable: Vec<(&usize, &Commit)> = self
            .head_distances
            .iter()
            .filter_map(|(id, distance)| self.commits.get(id).map(|c| (distance, c)))
            .collect();
        reachable.sort_by(|(da, a), (db, b)| da.cmp(db).then_with(|| a.id.cmp(&b.id)));
        reachable.into_iter().map(|(_, c)| c).collect()
    }

    /// Commits in `(anchor, HEAD]`, oldest first.
    ///
    /// Equivalent to `git rev-list anchor..HEAD`.
    pub fn commits_since(&self, anchor: &CommitId) -> Vec<&Commit> {
        let excluded = ancestors(&self.commits, anchor);
        let mut range: Vec<&Commit> = self
            .reachable_from_head()
            .into_iter()
            .filter(|c| !excluded.contains(&c.id))
            .collect();
        range.reverse();
        range
    }

    /// Common ancestor of HEAD and `tip` closest to HEAD
    pub fn merge_base_with(&self, tip: &CommitId) -> Option<&Commit> {
        let tip_ancestors = ancestors(&self.commits, tip);
        self.reachable_from_head()
            .into_iter()
            .find(|c| tip_ancestors.contains(&c.id))
    }

    /// SHA-256 over every tag and branch ref, independent of input order
    pub fn refs_hash(&self) -> String {
        let mut refs: Vec<String> = self
            .tags
            .iter()
            .map(|t| format!("tag:{}={}", t.name, t.target))
            .chain(
                self.branches
                    .iter()
                    .map(|b| format!("branch:{}={}", b.name, b.tip)),
            )
            .collect();
        refs.sort();

        let mut hasher = Sha256::new();
        for entry in refs {
            hasher.update(entry.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

fn breadth_first_distances(
    commits: &HashMap<CommitId, Commit>,
    start: &CommitId,
) -> HashMap<CommitId, usize> {
    let mut distances = HashMap::new();
    let mut queue = VecDeque::new();
    distances.insert(start.clone(), 0);
    queue.push_back(start.clone());

    while let Some(id) = queue.pop_front() {
        let distance = distances[&id];
        let Some(commit) = commits.get(&id) else {
            continue;
        };
        for parent in &commit.parents {
            if commits.contains_key(parent) && !distances.contains_key(parent) {
                distances.insert(parent.clone(), distance + 1);
                queue.push_back(parent.clone());
            }
        }
    }
    distances
}

/// `start` and everything reachable from it
fn ancestors(commits: &HashMap<CommitId, Commit>, start: &CommitId) -> HashSet<CommitId> {
    let mut seen = HashSet::new();
    let mut stack = vec![start.clone()];
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(commit) = commits.get(&id) {
            stack.extend(commit.parents.iter().cloned());
        }
    }
    seen
}
