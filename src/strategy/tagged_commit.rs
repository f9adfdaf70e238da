use crate::domain::{BaseVersionCandidate, Commit, SemanticVersion, Tag};
use crate::strategy::{VersionContext, VersionStrategy};
use tracing::debug;

/// One candidate per version tag reachable from HEAD
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggedCommitStrategy;

/// Tags reachable from HEAD whose names parse as versions.
///
/// Names that do not parse once the prefix is stripped are skipped.
pub(crate) fn version_tags<'a>(
    ctx: &VersionContext<'a>,
) -> Vec<(&'a Tag, SemanticVersion, &'a Commit)> {
    let snapshot = ctx.snapshot;
    snapshot
        .tags()
        .iter()
        .filter_map(|tag| {
            let commit = snapshot.commit(&tag.target)?;
            if !snapshot.is_reachable_from_head(&commit.id) {
                return None;
            }
            match tag.version(Some(&ctx.config.tag_prefix)) {
                Ok(version) => Some((tag, version, commit)),
                Err(e) => {
                    debug!(tag = %tag.name, error = %e, "Skipping tag that is not a version");
                    None
                }
            }
        })
        .collect()
}

impl VersionStrategy for TaggedCommitStrategy {
    fn name(&self) -> &'static str {
        "tagged-commit"
    }

    fn evaluate(&self, ctx: &VersionContext<'_>) -> Vec<BaseVersionCandidate> {
        version_tags(ctx)
            .into_iter()
            .map(|(tag, version, commit)| {
                BaseVersionCandidate::anchored(
                    format!("Git tag '{}'", tag.name),
                    version,
                    true,
                    Some(commit.clone()),
                )
            })
            .collect()
    }
}
