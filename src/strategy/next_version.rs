use crate::domain::{BaseVersionCandidate, SemanticVersion};
use crate::strategy::{VersionContext, VersionStrategy};
use tracing::warn;

/// Version pinned by `next_version` in the configuration.
///
/// A human stating the next version outranks anything derived from
/// history, so the candidate overrides all others and is never bumped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigNextVersionStrategy;

impl VersionStrategy for ConfigNextVersionStrategy {
    fn name(&self) -> &'static str {
        "next-version"
    }

    fn evaluate(&self, ctx: &VersionContext<'_>) -> Vec<BaseVersionCandidate> {
        let Some(raw) = ctx.config.next_version.as_deref() else {
            return vec![];
        };

        match SemanticVersion::parse_with_prefix(raw, Some(&ctx.config.tag_prefix)) {
            Ok(version) => vec![BaseVersionCandidate::overriding(
                "next_version in configuration",
                version,
            )],
            Err(e) => {
                warn!(next_version = raw, error = %e, "Ignoring unparsable next_version");
                vec![]
            }
        }
    }
}
