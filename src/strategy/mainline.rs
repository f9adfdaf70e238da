use crate::domain::BaseVersionCandidate;
use crate::strategy::tagged_commit::version_tags;
use crate::strategy::{VersionContext, VersionStrategy};
use std::cmp::Reverse;

/// Highest tagged version on a mainline branch.
///
/// Only active when the resolved branch configuration is mainline; the
/// release line always moves forward from its latest tag.
#[derive(Debug, Default, Clone, Copy)]
pub struct MainlineStrategy;

impl VersionStrategy for MainlineStrategy {
    fn name(&self) -> &'static str {
        "mainline"
    }

    fn evaluate(&self, ctx: &VersionContext<'_>) -> Vec<BaseVersionCandidate> {
        if !ctx.config.branch_config.is_mainline {
            return vec![];
        }

        let snapshot = ctx.snapshot;
        version_tags(ctx)
            .into_iter()
            .max_by_key(|(_, version, commit)| {
                (
                    version.clone(),
                    Reverse(snapshot.distance_from_head(&commit.id)),
                    Reverse(commit.id.clone()),
                )
            })
            .map(|(tag, version, commit)| {
                BaseVersionCandidate::anchored(
                    format!("Mainline tag '{}'", tag.name),
                    version,
                    true,
                    Some(commit.clone()),
                )
            })
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::SemanticVersion;
    use crate::git::MockRepository;
    use crate::strategy::test_support::*;

    #[test]
    fn test_highest_tag_on_mainline() {
        let mut repo = MockRepository::new("main");
        let first = repo.commit("initial");
        repo.tag("v1.5.0", &first);
        let second = repo.commit("work");
        repo.tag("v1.4.2", &second);
        repo.commit("more work");

        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        let candidates = MainlineStrategy.evaluate(&VersionContext::new(&snapshot, &config));

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].version, SemanticVersion::new(1, 5, 0));
        assert!(candidates[0].should_increment);
        assert_eq!(candidates[0].anchor.as_ref().unwrap().id, first);
    }

    #[test]
    fn test_inactive_off_mainline() {
        let mut repo = MockRepository::new("feature/login");
        let first = repo.commit("initial");
        repo.tag("v1.0.0", &first);

        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        assert!(MainlineStrategy
            .evaluate(&VersionContext::new(&snapshot, &config))
            .is_empty());
    }

    #[test]
    fn test_mainline_without_tags() {
        let mut repo = MockRepository::new("main");
        repo.commit("initial");

        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        assert!(MainlineStrategy
            .evaluate(&VersionContext::new(&snapshot, &config))
            .is_empty());
    }
}
