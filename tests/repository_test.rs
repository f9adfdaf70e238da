// tests/repository_test.rs
use git2::{Oid, Repository, RepositoryInitOptions};
use git_nextver::cache::ResultCache;
use git_nextver::config::Config;
use git_nextver::engine::{compute, VersionEngine};
use git_nextver::git::repository::DETACHED_HEAD;
use git_nextver::git::{Git2Repository, SnapshotSource};
use tempfile::TempDir;

// Helper function to setup a temporary git repo on branch `main`
fn setup_test_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().expect("Could not create temp dir");

    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(temp_dir.path(), &opts).expect("Could not init git repo");

    {
        let mut config = repo.config().expect("Could not get config");
        config
            .set_str("user.name", "Test User")
            .expect("Could not set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Could not set user.email");
    }

    (temp_dir, repo)
}

fn commit(repo: &Repository, message: &str) -> Oid {
    let sig = repo.signature().expect("Could not get sig");
    let tree_id = repo
        .index()
        .expect("Could not get index")
        .write_tree()
        .expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .expect("Could not create commit")
}

fn tag_lightweight(repo: &Repository, name: &str, id: Oid) {
    let object = repo.find_object(id, None).expect("Could not find object");
    repo.tag_lightweight(name, &object, false)
        .expect("Could not create tag");
}

#[test]
fn test_snapshot_reads_history() {
    let (temp_dir, repo) = setup_test_repo();
    let first = commit(&repo, "Initial commit");
    tag_lightweight(&repo, "v1.0.0", first);
    let second = commit(&repo, "add search\n\n+semver: minor");

    let source = Git2Repository::open(temp_dir.path()).expect("Could not open repo");
    let snapshot = source.snapshot().expect("Could not read snapshot");
    assert_eq!(snapshot.branch_name(), "main");
    assert_eq!(snapshot.head_id().as_str(), second.to_string());
    assert_eq!(snapshot.tags().len(), 1);
    assert_eq!(snapshot.commits_since(&first.into()).len(), 1);

    let result = compute(&snapshot, &Config::default()).unwrap();
    assert_eq!(result.full_sem_ver(), "1.1.0+1");
    assert_eq!(result.sha.as_str(), second.to_string());
}

#[test]
fn test_annotated_tag_is_peeled() {
    let (temp_dir, repo) = setup_test_repo();
    commit(&repo, "Initial commit");
    let head = commit(&repo, "prepare 2.0");
    let sig = repo.signature().unwrap();
    let object = repo.find_object(head, None).unwrap();
    repo.tag("v2.0.0", &object, &sig, "Release 2.0.0", false)
        .expect("Could not create annotated tag");

    let snapshot = Git2Repository::open(temp_dir.path())
        .unwrap()
        .snapshot()
        .unwrap();
    assert_eq!(snapshot.tags()[0].target.as_str(), head.to_string());

    let result = compute(&snapshot, &Config::default()).unwrap();
    assert_eq!(result.full_sem_ver(), "2.0.0");
}

#[test]
fn test_detached_head_and_branch_override() {
    let (temp_dir, repo) = setup_test_repo();
    let first = commit(&repo, "Initial commit");
    tag_lightweight(&repo, "v1.0.0", first);
    let second = commit(&repo, "work");
    repo.set_head_detached(second).unwrap();

    let detached = Git2Repository::open(temp_dir.path())
        .unwrap()
        .snapshot()
        .unwrap();
    assert_eq!(detached.branch_name(), DETACHED_HEAD);

    let overridden = Git2Repository::open(temp_dir.path())
        .unwrap()
        .with_branch("release/3.0.0")
        .snapshot()
        .unwrap();
    assert_eq!(overridden.branch_name(), "release/3.0.0");

    let result = compute(&overridden, &Config::default()).unwrap();
    assert_eq!(result.branch_name, "release/3.0.0");
    assert_eq!(result.semantic_version.major_minor_patch(), "3.0.0");
}

#[test]
fn test_cache_lives_in_git_dir() {
    let (temp_dir, repo) = setup_test_repo();
    commit(&repo, "Initial commit");

    let source = Git2Repository::open(temp_dir.path()).unwrap();
    let engine = VersionEngine::new(&Config::default())
        .unwrap()
        .with_cache(ResultCache::in_git_dir(source.git_dir()));
    let result = engine.compute(&source.snapshot().unwrap()).unwrap();

    assert_eq!(result.full_sem_ver(), "0.1.0");
    assert!(repo.path().join("nextver").join("cache.json").exists());
}
