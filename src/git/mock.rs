use crate::domain::{Commit, CommitId, Tag};
use crate::error::{NextVerError, Result};
use crate::git::{BranchRef, RepositorySnapshot, SnapshotSource};

/// In-memory repository for building commit graphs in tests
///
/// Commit ids are deterministic 40-character hex strings derived from a
/// counter, so two mocks built the same way yield identical snapshots.
#[derive(Debug, Clone)]
pub struct MockRepository {
    commits: Vec<Commit>,
    tags: Vec<Tag>,
    branches: Vec<BranchRef>,
    head: Option<CommitId>,
    branch_name: String,
}

impl MockRepository {
    /// Create an empty repository whose HEAD is on `branch_name`
    pub fn new(branch_name: impl Into<String>) -> Self {
        MockRepository {
            commits: Vec::new(),
            tags: Vec::new(),
            branches: Vec::new(),
            head: None,
            branch_name: branch_name.into(),
        }
    }

    fn next_id(&self) -> CommitId {
        CommitId::new(format!("{:040x}", self.commits.len() + 1))
    }

    fn push(&mut self, message: &str, parents: Vec<CommitId>) -> CommitId {
        let id = self.next_id();
        let authored_at = self.commits.len() as i64;
        self.commits
            .push(Commit::new(id.as_str(), message, parents, authored_at));
        id
    }

    /// Commit on top of HEAD and move HEAD to it
    pub fn commit(&mut self, message: &str) -> CommitId {
        let parents = self.head.iter().cloned().collect();
        let id = self.push(message, parents);
        self.head = Some(id.clone());
        id
    }

    /// Commit on top of `parent` without moving HEAD
    pub fn commit_on(&mut self, parent: &CommitId, message: &str) -> CommitId {
        self.push(message, vec![parent.clone()])
    }

    /// Merge `other` into HEAD and move HEAD to the merge commit
    pub fn merge(&mut self, other: &CommitId, message: &str) -> CommitId {
        let mut parents: Vec<CommitId> = self.head.iter().cloned().collect();
        parents.push(other.clone());
        let id = self.push(message, parents);
        self.head = Some(id.clone());
        id
    }

    /// Add a tag pointing at a commit
    pub fn tag(&mut self, name: impl Into<String>, target: &CommitId) {
        self.tags.push(Tag::new(name, target.clone()));
    }

    /// Add or move a branch
    pub fn branch(&mut self, name: impl Into<String>, tip: &CommitId) {
        let name = name.into();
        self.branches.retain(|b| b.name != name);
        self.branches.push(BranchRef::new(name, tip.clone()));
    }

    /// Rename the branch HEAD is on
    pub fn set_branch_name(&mut self, name: impl Into<String>) {
        self.branch_name = name.into();
    }

    pub fn head(&self) -> Option<&CommitId> {
        self.head.as_ref()
    }
}

impl SnapshotSource for MockRepository {
    fn snapshot(&self) -> Result<RepositorySnapshot> {
        let head = self
            .head
            .clone()
            .ok_or_else(|| NextVerError::repository("Repository has no commits"))?;
        RepositorySnapshot::new(
            head,
            self.branch_name.clone(),
            self.commits.clone(),
            self.tags.clone(),
            self.branches.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_linear_history() {
        let mut repo = MockRepository::new("main");
        let first = repo.commit("first");
        let second = repo.commit("second");

        let snapshot = repo.snapshot().unwrap();
        assert_eq!(snapshot.head_id(), &second);
        assert_eq!(snapshot.head().parents, vec![first]);
        assert_eq!(snapshot.branch_name(), "main");
    }

    #[test]
    fn test_mock_repository_merge() {
        let mut repo = MockRepository::new("main");
        let base = repo.commit("base");
        let side = repo.commit_on(&base, "side work");
        let merge = repo.merge(&side, "Merge branch 'feature/x'");

        let snapshot = repo.snapshot().unwrap();
        assert!(snapshot.commit(&merge).unwrap().is_merge());
        assert_eq!(snapshot.distance_from_head(&side), Some(1));
    }

    #[test]
    fn test_mock_repository_tags_and_branches() {
        let mut repo = MockRepository::new("main");
        let first = repo.commit("first");
        repo.tag("v1.0.0", &first);
        repo.branch("develop", &first);
        repo.branch("develop", &first);

        let snapshot = repo.snapshot().unwrap();
        assert_eq!(snapshot.tags().len(), 1);
        assert_eq!(snapshot.branches().len(), 1);
    }

    #[test]
    fn test_mock_repository_empty() {
        let repo = MockRepository::new("main");
        assert!(matches!(repo.snapshot(), Err(NextVerError::Repository(_))));
    }

    #[test]
    fn test_ids_are_deterministic() {
        let mut a = MockRepository::new("main");
        let mut b = MockRepository::new("main");
        assert_eq!(a.commit("x"), b.commit("y"));
        assert_eq!(a.commit("x").as_str().len(), 40);
    }
}
