//! Base version selection
//!
//! Picks one winner among all strategy candidates:
//!
//! 1. an overriding candidate wins outright;
//! 2. candidates anchored outside HEAD's history are dropped, and an empty
//!    set falls back to `0.1.0`;
//! 3. the greatest version wins;
//! 4. equal versions prefer the anchor closest to HEAD;
//! 5. candidates equal in version and anchor merge, OR-ing `should_increment`.
//!
//! The outcome depends only on the candidate set, never on its order.

use crate::domain::{BaseVersionCandidate, CommitId, SemanticVersion};
use crate::git::RepositorySnapshot;
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Ranking key; the maximum wins
type Rank<'a> = (
    &'a SemanticVersion,
    Reverse<usize>,
    Reverse<Option<&'a CommitId>>,
);

fn rank<'a>(candidate: &'a BaseVersionCandidate, snapshot: &RepositorySnapshot) -> Rank<'a> {
    let anchor = candidate.anchor.as_ref().map(|c| &c.id);
    let distance = anchor
        .and_then(|id| snapshot.distance_from_head(id))
        .unwrap_or(usize::MAX);
    (&candidate.version, Reverse(distance), Reverse(anchor))
}

/// Select the base version to build on
pub fn select(
    candidates: Vec<BaseVersionCandidate>,
    snapshot: &RepositorySnapshot,
) -> BaseVersionCandidate {
    let (overrides, candidates): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|c| c.overrides_others);

    if let Some(winner) = overrides
        .into_iter()
        .max_by(|a, b| a.version.cmp(&b.version).then_with(|| b.source.cmp(&a.source)))
    {
        debug!(source = %winner.source, version = %winner.version, "Override candidate wins");
        return winner;
    }

    let reachable: Vec<BaseVersionCandidate> = candidates
        .into_iter()
        .filter(|candidate| match &candidate.anchor {
            Some(anchor) if !snapshot.is_reachable_from_head(&anchor.id) => {
                warn!(
                    source = %candidate.source,
                    anchor = anchor.id.short(),
                    "Dropping candidate anchored outside HEAD history"
                );
                false
            }
            _ => true,
        })
        .collect();

    let Some(best) = reachable.iter().max_by(|a, b| rank(a, snapshot).cmp(&rank(b, snapshot)))
    else {
        debug!("No base version candidates, using fallback");
        return BaseVersionCandidate::fallback();
    };

    let best_anchor = best.anchor.as_ref().map(|c| c.id.clone());
    let best_version = best.version.clone();
    let tied: Vec<&BaseVersionCandidate> = reachable
        .iter()
        .filter(|c| c.version == best_version && c.anchor.as_ref().map(|a| &a.id) == best_anchor.as_ref())
        .collect();

    let sources: BTreeSet<&str> = tied.iter().map(|c| c.source.as_str()).collect();
    let winner = BaseVersionCandidate {
        source: sources.into_iter().collect::<Vec<_>>().join(" + "),
        version: best_version,
        should_increment: tied.iter().any(|c| c.should_increment),
        anchor: best.anchor.clone(),
        overrides_others: false,
    };

    debug!(
        source = %winner.source,
        version = %winner.version,
        should_increment = winner.should_increment,
        considered = reachable.len(),
        "Selected base version"
    );
    winner
}
