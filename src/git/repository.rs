use crate::domain::{Commit, CommitId, Tag};
use crate::error::{NextVerError, Result};
use crate::git::{BranchRef, RepositorySnapshot, SnapshotSource};
use git2::{BranchType, Oid, Repository as Git2Repo, Sort};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Branch name reported when HEAD is detached and no override was given
pub const DETACHED_HEAD: &str = "HEAD";

/// Reads snapshots from a real repository through `git2`
///
/// `git2::Repository` is `Send` but not `Sync`, so access is serialized
/// behind a mutex.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    git_dir: PathBuf,
    branch_override: Option<String>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            git_dir: repo.path().to_path_buf(),
            repo: Mutex::new(repo),
            branch_override: None,
        }
    }

    /// Version as if HEAD were on `branch`; CI checkouts are often detached
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch_override = Some(branch.into());
        self
    }

    /// The `.git` directory
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn lock(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| NextVerError::repository("Repository handle poisoned by a panic"))
    }

    fn current_branch_name(&self, head: &git2::Reference<'_>) -> String {
        if let Some(branch) = &self.branch_override {
            return branch.clone();
        }
        if head.is_branch() {
            head.shorthand().unwrap_or(DETACHED_HEAD).to_string()
        } else {
            DETACHED_HEAD.to_string()
        }
    }
}

/// Local branches first, then remote-tracking ones with the remote name
/// stripped (`origin/main` -> `main`) unless a local branch already has
/// that name.
fn read_branches(repo: &Git2Repo) -> Result<Vec<(BranchRef, Oid)>> {
    let mut seen = HashSet::new();
    let mut branches = Vec::new();

    for branch_type in [BranchType::Local, BranchType::Remote] {
        for entry in repo.branches(Some(branch_type))? {
            let (branch, _) = entry?;
            let Some(full_name) = branch.name()? else {
                continue;
            };
            let name = match branch_type {
                BranchType::Local => full_name,
                BranchType::Remote => match full_name.split_once('/') {
                    Some((_, rest)) if rest != "HEAD" => rest,
                    _ => continue,
                },
            };
            let Ok(tip) = branch.get().peel_to_commit().map(|c| c.id()) else {
                continue;
            };
            if seen.insert(name.to_string()) {
                branches.push((BranchRef::new(name, tip.into()), tip));
            }
        }
    }
    Ok(branches)
}

/// Tags peeled to commits; tags on trees or blobs are skipped
fn read_tags(repo: &Git2Repo) -> Result<Vec<(Tag, Oid)>> {
    let mut tags = Vec::new();
    for name in repo.tag_names(None)?.iter().flatten() {
        let reference = repo.find_reference(&format!("refs/tags/{}", name))?;
        match reference.peel_to_commit() {
            Ok(commit) => tags.push((Tag::new(name, commit.id().into()), commit.id())),
            Err(e) => debug!(tag = name, error = %e, "Skipping tag that does not point at a commit"),
        }
    }
    Ok(tags)
}

impl SnapshotSource for Git2Repository {
    fn snapshot(&self) -> Result<RepositorySnapshot> {
        let repo = self.lock()?;
        let head = repo
            .head()
            .map_err(|e| NextVerError::repository(format!("Cannot resolve HEAD: {}", e)))?;
        let head_commit = head
            .peel_to_commit()
            .map_err(|e| NextVerError::repository(format!("HEAD is not a commit: {}", e)))?;
        let branch_name = self.current_branch_name(&head);

        let branches = read_branches(&repo)?;
        let tags = read_tags(&repo)?;

        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;
        revwalk.push(head_commit.id())?;
        for (_, tip) in &branches {
            revwalk.push(*tip)?;
        }
        for (_, target) in &tags {
            revwalk.push(*target)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = repo.find_commit(oid)?;

            commits.push(Commit {
                id: oid.into(),
                message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
                parents: commit.parent_ids().map(CommitId::from).collect(),
                authored_at: commit.author().when().seconds(),
            });
        }

        debug!(
            commits = commits.len(),
            tags = tags.len(),
            branches = branches.len(),
            branch = %branch_name,
            "Read repository snapshot"
        );

        RepositorySnapshot::new(
            head_commit.id().into(),
            branch_name,
            commits,
            tags.into_iter().map(|(tag, _)| tag).collect(),
            branches.into_iter().map(|(branch, _)| branch).collect(),
        )
    }
}
