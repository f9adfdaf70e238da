use crate::domain::{BaseVersionCandidate, BranchContext, Commit, SemanticVersion};
use crate::strategy::{VersionContext, VersionStrategy};
use regex::Regex;

/// Merge message formats, each capturing the merged branch as `source` and
/// optionally the receiving branch as `target`.
const MERGE_FORMATS: &[&str] = &[
    // git default
    r"^Merge branch '(?P<source>[^']+)'(?: of \S+)?(?: into (?P<target>\S+))?",
    // GitHub pull requests
    r"^Merge pull request #\d+ (?:from|in) (?:[^/\s]+/)?(?P<source>\S+)(?: into (?P<target>\S+))?",
    r"^Merge remote-tracking branch '(?:[^/']+/)?(?P<source>[^']+)'(?: into (?P<target>\S+))?",
    // git-flow
    r"^Finish (?P<source>\S+)",
    r"^Merge (?P<source>\S+) into (?P<target>\S+)",
];

/// Versions named by the branches in merge commit messages,
/// e.g. `Merge branch 'release/1.4.0'`
#[derive(Debug, Clone)]
pub struct MergeMessageStrategy {
    formats: Vec<Regex>,
}

impl MergeMessageStrategy {
    pub fn new() -> Self {
        MergeMessageStrategy {
            formats: MERGE_FORMATS
                .iter()
                .filter_map(|pattern| Regex::new(pattern).ok())
                .collect(),
        }
    }

    /// Version named by the merged branch, falling back to the target branch.
    ///
    /// The flag is set when the version came from the target. A target that
    /// is the branch being versioned is ignored, since the branch-name
    /// strategy already speaks for it.
    fn version_in_message(
        &self,
        summary: &str,
        prefix: &Regex,
        current_branch: &str,
    ) -> Option<(SemanticVersion, bool)> {
        self.formats.iter().find_map(|format| {
            let captures = format.captures(summary)?;
            let source = captures
                .name("source")
                .and_then(|m| Self::embedded(m.as_str(), prefix));
            if let Some(version) = source {
                return Some((version, false));
            }
            let target = captures.name("target")?.as_str().trim_end_matches('.');
            if target == current_branch {
                return None;
            }
            Self::embedded(target, prefix).map(|version| (version, true))
        })
    }

    fn embedded(branch: &str, prefix: &Regex) -> Option<SemanticVersion> {
        BranchContext::new(branch.trim_end_matches('.')).embedded_version(Some(prefix))
    }

    fn candidate(&self, commit: &Commit, ctx: &VersionContext<'_>) -> Option<BaseVersionCandidate> {
        if !commit.is_merge() {
            return None;
        }
        let (version, from_target) = self.version_in_message(
            commit.summary(),
            &ctx.config.tag_prefix,
            &ctx.config.branch.name,
        )?;
        // Merging into a versioned branch does not release that version
        let should_increment =
            !from_target && !ctx.config.prevent_increment_for_merged_branch_version;
        Some(BaseVersionCandidate::anchored(
            format!("Merge message '{}'", commit.summary()),
            version,
            should_increment,
            Some(commit.clone()),
        ))
    }
}

impl Default for MergeMessageStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionStrategy for MergeMessageStrategy {
    fn name(&self) -> &'static str {
        "merge-message"
    }

    fn evaluate(&self, ctx: &VersionContext<'_>) -> Vec<BaseVersionCandidate> {
        ctx.snapshot
            .reachable_from_head()
            .into_iter()
            .filter_map(|commit| self.candidate(commit, ctx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::git::MockRepository;
    use crate::strategy::test_support::*;

    fn merged_with(message: &str, config: Config) -> Vec<BaseVersionCandidate> {
        let mut repo = MockRepository::new("main");
        let base = repo.commit("initial");
        let side = repo.commit_on(&base, "release work");
        repo.merge(&side, message);
        repo.commit("after merge");

        let snapshot = snapshot(&repo);
        let config = resolve(config, &snapshot);
        MergeMessageStrategy::new().evaluate(&VersionContext::new(&snapshot, &config))
    }

    fn version_of(message: &str) -> Option<String> {
        merged_with(message, Config::default())
            .first()
            .map(|c| c.version.to_string())
    }

    #[test]
    fn test_merge_formats() {
        assert_eq!(version_of("Merge branch 'release/1.4.0'").as_deref(), Some("1.4.0"));
        assert_eq!(
            version_of("Merge branch 'release-2.0' into main").as_deref(),
            Some("2.0.0")
        );
        assert_eq!(
            version_of("Merge pull request #12 from acme/release/3.1.0").as_deref(),
            Some("3.1.0")
        );
        assert_eq!(
            version_of("Merge remote-tracking branch 'origin/hotfix/1.2.3'").as_deref(),
            Some("1.2.3")
        );
        assert_eq!(version_of("Finish release/0.9.0").as_deref(), Some("0.9.0"));
        assert_eq!(
            version_of("Merge develop into release/1.4.0").as_deref(),
            Some("1.4.0")
        );
    }

    #[test]
    fn test_merges_without_version() {
        assert_eq!(version_of("Merge branch 'feature/login'"), None);
        assert_eq!(version_of("Merged some things"), None);
    }

    #[test]
    fn test_candidate_shape() {
        let candidates = merged_with("Merge branch 'release/1.4.0'", Config::default());
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert!(candidate.should_increment);
        assert!(candidate.anchor.as_ref().unwrap().is_merge());
        assert_eq!(candidate.source, "Merge message 'Merge branch 'release/1.4.0''");
    }

    #[test]
    fn test_prevent_increment_for_merged_branch_version() {
        let candidates = merged_with(
            "Merge branch 'release/1.4.0'",
            Config {
                prevent_increment_for_merged_branch_version: true,
                ..Config::default()
            },
        );
        assert!(!candidates[0].should_increment);
    }

    #[test]
    fn test_target_version_is_not_incremented() {
        let candidates = merged_with(
            "Merge branch 'fix/crash' into release/2.1.0",
            Config::default(),
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version.to_string(), "2.1.0");
        assert!(!candidates[0].should_increment);
    }

    #[test]
    fn test_merge_into_current_branch_is_ignored() {
        let mut repo = MockRepository::new("release/1.4.0");
        let base = repo.commit("initial");
        let side = repo.commit_on(&base, "fix");
        repo.merge(&side, "Merge branch 'fix/crash' into release/1.4.0");

        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        assert!(MergeMessageStrategy::new()
            .evaluate(&VersionContext::new(&snapshot, &config))
            .is_empty());
    }

    #[test]
    fn test_non_merge_commit_is_ignored() {
        let mut repo = MockRepository::new("main");
        repo.commit("Merge branch 'release/1.4.0'");
        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        assert!(MergeMessageStrategy::new()
            .evaluate(&VersionContext::new(&snapshot, &config))
            .is_empty());
    }
}
