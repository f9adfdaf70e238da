use crate::domain::{BaseVersionCandidate, Commit};
use crate::strategy::{VersionContext, VersionStrategy};
use tracing::debug;

/// Version embedded in the current branch name, e.g. `release/1.4.0`.
///
/// The branch name states the version being prepared, so the candidate is
/// not incremented. It is anchored where the branch left its source branch.
#[derive(Debug, Default, Clone, Copy)]
pub struct BranchNameStrategy;

/// Merge base closest to HEAD with any other branch matching the
/// configured source branches
fn tracking_point<'a>(ctx: &VersionContext<'a>) -> Option<&'a Commit> {
    let snapshot = ctx.snapshot;
    let current = snapshot.branch_name();
    snapshot
        .branches()
        .iter()
        .filter(|branch| branch.name != current)
        .filter(|branch| {
            ctx.config
                .source_branches
                .iter()
                .any(|pattern| pattern.is_match(&branch.name))
        })
        .filter_map(|branch| snapshot.merge_base_with(&branch.tip))
        .min_by_key(|commit| (snapshot.distance_from_head(&commit.id), commit.id.clone()))
}

impl VersionStrategy for BranchNameStrategy {
    fn name(&self) -> &'static str {
        "branch-name"
    }

    fn evaluate(&self, ctx: &VersionContext<'_>) -> Vec<BaseVersionCandidate> {
        let branch = &ctx.config.branch;
        let Some(version) = branch.embedded_version(Some(&ctx.config.tag_prefix)) else {
            return vec![];
        };

        let anchor = tracking_point(ctx);
        debug!(
            branch = %branch,
            version = %version,
            anchor = anchor.map(|c| c.id.short()).unwrap_or("none"),
            "Found version in branch name"
        );

        vec![BaseVersionCandidate::anchored(
            format!("Version in branch name '{}'", branch),
            version,
            false,
            anchor.cloned(),
        )]
    }
}
