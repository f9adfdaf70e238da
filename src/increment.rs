//! Increment calculation
//!
//! Advances the selected base version using the commits between its anchor
//! and HEAD, then attaches the branch's pre-release label and the commit
//! count as build metadata. Performs no I/O.

use crate::config::IncrementPatterns;
use crate::domain::{
    BaseVersionCandidate, BranchContext, Commit, CommitId, IncrementMode, VersionBump,
    VersionResult,
};
use crate::error::Result;
use crate::resolver::EffectiveConfiguration;
use rayon::prelude::*;
use semver::{BuildMetadata, Prerelease};
use tracing::{debug, warn};

/// Strongest increment directive in one message, if any
pub fn directive_in(message: &str, patterns: &IncrementPatterns) -> Option<VersionBump> {
    if patterns.major.is_match(message) {
        Some(VersionBump::Major)
    } else if patterns.minor.is_match(message) {
        Some(VersionBump::Minor)
    } else if patterns.patch.is_match(message) {
        Some(VersionBump::Patch)
    } else if patterns.none.is_match(message) {
        Some(VersionBump::None)
    } else {
        None
    }
}

/// Strongest directive across a commit range
pub fn strongest_directive(commits: &[&Commit], patterns: &IncrementPatterns) -> Option<VersionBump> {
    commits
        .par_iter()
        .filter_map(|commit| directive_in(&commit.message, patterns))
        .max()
}

/// Decide the increment for a range.
///
/// Major and minor directives always win. Otherwise an explicit branch
/// increment applies, and an inheriting branch gets patch even when the
/// range only carries `none` directives.
pub fn determine_bump(directive: Option<VersionBump>, mode: IncrementMode) -> VersionBump {
    match (directive, mode.to_bump()) {
        (Some(VersionBump::Major), _) => VersionBump::Major,
        (Some(VersionBump::Minor), _) => VersionBump::Minor,
        (_, Some(branch_bump)) => branch_bump,
        (_, None) => VersionBump::Patch,
    }
}

/// Substitute `{branch}` (sanitized) and `{commits}` into a label template
pub fn render_label(template: &str, branch: &BranchContext, commits: usize) -> String {
    template
        .replace("{branch}", &branch.sanitized())
        .replace("{commits}", &commits.to_string())
}

/// Build the final version from the selected base.
///
/// `commits` is the range `(anchor, HEAD]`, empty when the base has no
/// anchor. An override, or an anchored base with HEAD on the anchor, is
/// reported unchanged. An anchorless base is never incremented but still
/// receives the branch label.
///
/// # Errors
/// `Parse` error when the increment overflows a version component.
pub fn calculate(
    base: &BaseVersionCandidate,
    config: &EffectiveConfiguration,
    commits: &[&Commit],
    head: &CommitId,
) -> Result<VersionResult> {
    let count = commits.len();
    let version = if base.overrides_others || (base.anchor.is_some() && commits.is_empty()) {
        base.version.clone()
    } else {
        let numeric = if base.should_increment && !commits.is_empty() {
            let directive = strongest_directive(commits, &config.increment_patterns);
            let bump = determine_bump(directive, config.branch_config.increment);
            debug!(
                directive = ?directive,
                branch_increment = %config.branch_config.increment,
                bump = %bump,
                "Determined increment"
            );
            base.version.bump(bump)?
        } else {
            base.version.clone()
        };
        numeric
            .with_pre_release(pre_release_for(config, count))
            .with_build_metadata(None)
    };

    let build_metadata = match &base.version.build_metadata {
        Some(existing) => Some(existing.clone()),
        None if count > 0 => BuildMetadata::new(&count.to_string()).ok(),
        None => None,
    };
    let version = version.with_build_metadata(build_metadata);

    Ok(VersionResult::new(
        version,
        base.source.clone(),
        count,
        config.branch.name.clone(),
        head.clone(),
    ))
}

fn pre_release_for(config: &EffectiveConfiguration, commits: usize) -> Option<Prerelease> {
    if config.branch_config.is_mainline {
        return None;
    }
    let template = config.branch_config.pre_release_label_template.as_deref()?;
    let label = render_label(template, &config.branch, commits);
    match Prerelease::new(&label) {
        Ok(pre) if pre.is_empty() => None,
        Ok(pre) => Some(pre),
        Err(e) => {
            warn!(label = %label, error = %e, "Rendered pre-release label is not valid semver");
            None
        }
    }
}
