//! Base version strategies
//!
//! Each strategy inspects the snapshot and the effective configuration and
//! proposes zero or more [`BaseVersionCandidate`]s. Strategies share no
//! mutable state, so [`evaluate_all`] runs them on the rayon pool and simply
//! joins the results.

pub mod branch_name;
pub mod mainline;
pub mod merge_message;
pub mod next_version;
pub mod tagged_commit;

pub use branch_name::BranchNameStrategy;
pub use mainline::MainlineStrategy;
pub use merge_message::MergeMessageStrategy;
pub use next_version::ConfigNextVersionStrategy;
pub use tagged_commit::TaggedCommitStrategy;

use crate::domain::BaseVersionCandidate;
use crate::git::RepositorySnapshot;
use crate::resolver::EffectiveConfiguration;
use rayon::prelude::*;
use tracing::debug;

/// Inputs shared by every strategy
#[derive(Debug, Clone, Copy)]
pub struct VersionContext<'a> {
    pub snapshot: &'a RepositorySnapshot,
    pub config: &'a EffectiveConfiguration,
}

impl<'a> VersionContext<'a> {
    pub fn new(snapshot: &'a RepositorySnapshot, config: &'a EffectiveConfiguration) -> Self {
        VersionContext { snapshot, config }
    }
}

/// A source of base version candidates
///
/// Implementations must be pure functions of the context. An empty vector
/// means the strategy found nothing; strategies never invent a default.
pub trait VersionStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &VersionContext<'_>) -> Vec<BaseVersionCandidate>;
}

/// Every history-based strategy, in no particular order
pub fn history_strategies() -> Vec<Box<dyn VersionStrategy>> {
    vec![
        Box::new(TaggedCommitStrategy),
        Box::new(MergeMessageStrategy::new()),
        Box::new(MainlineStrategy),
        Box::new(BranchNameStrategy),
    ]
}

/// Run `strategies` in parallel and collect their candidates
pub fn evaluate_all(
    strategies: &[Box<dyn VersionStrategy>],
    ctx: &VersionContext<'_>,
) -> Vec<BaseVersionCandidate> {
    strategies
        .par_iter()
        .flat_map_iter(|strategy| {
            let candidates = strategy.evaluate(ctx);
            debug!(
                strategy = strategy.name(),
                candidates = candidates.len(),
                "Strategy evaluated"
            );
            candidates
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::Config;
    use crate::git::MockRepository;

    #[test]
    fn test_evaluate_all_collects_every_strategy() {
        let mut repo = MockRepository::new("release/2.0.0");
        let main = repo.commit("initial");
        repo.tag("v1.0.0", &main);
        repo.branch("main", &main);
        repo.commit("work");

        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        let ctx = VersionContext::new(&snapshot, &config);

        let mut sources: Vec<String> = evaluate_all(&history_strategies(), &ctx)
            .into_iter()
            .map(|c| c.source)
            .collect();
        sources.sort();
        assert_eq!(
            sources,
            vec![
                "Git tag 'v1.0.0'".to_string(),
                "Version in branch name 'release/2.0.0'".to_string(),
            ]
        );
    }

    #[test]
    fn test_evaluate_all_is_order_independent() {
        let mut repo = MockRepository::new("main");
        let first = repo.commit("initial");
        repo.tag("v1.0.0", &first);
        let second = repo.commit("next");
        repo.tag("v1.1.0", &second);

        let snapshot = snapshot(&repo);
        let config = resolve(Config::default(), &snapshot);
        let ctx = VersionContext::new(&snapshot, &config);

        let mut forward = evaluate_all(&history_strategies(), &ctx);
        let mut reversed_strategies = history_strategies();
        reversed_strategies.reverse();
        let mut backward = evaluate_all(&reversed_strategies, &ctx);

        let key = |c: &BaseVersionCandidate| (c.source.clone(), c.version.clone());
        forward.sort_by_key(key);
        backward.sort_by_key(key);
        assert_eq!(forward, backward);
    }
}
