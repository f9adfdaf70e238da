use crate::domain::version::{SemanticVersion, VersionBump};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Increment policy configured for a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncrementMode {
    Major,
    Minor,
    Patch,
    None,
    /// Defer to commit directives, then to a patch bump
    Inherit,
}

impl IncrementMode {
    /// The bump this mode forces, or `None` for `Inherit`
    pub fn to_bump(self) -> Option<VersionBump> {
        match self {
            IncrementMode::Major => Some(VersionBump::Major),
            IncrementMode::Minor => Some(VersionBump::Minor),
            IncrementMode::Patch => Some(VersionBump::Patch),
            IncrementMode::None => Some(VersionBump::None),
            IncrementMode::Inherit => None,
        }
    }
}

impl fmt::Display for IncrementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IncrementMode::Major => "major",
            IncrementMode::Minor => "minor",
            IncrementMode::Patch => "patch",
            IncrementMode::None => "none",
            IncrementMode::Inherit => "inherit",
        };
        f.write_str(name)
    }
}

/// Fully merged versioning policy for one branch.
///
/// Produced by the resolver; every field carries a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConfig {
    /// Name of the configuration entry that matched (`unknown` if none did)
    pub name: String,
    pub name_pattern: String,
    pub increment: IncrementMode,
    pub tag_prefix: String,
    /// `None` when the branch carries no pre-release label
    pub pre_release_label_template: Option<String>,
    pub is_mainline: bool,
    pub source_branches: Vec<String>,
}

/// Name of the branch being versioned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
}

impl BranchContext {
    pub fn new(name: impl Into<String>) -> Self {
        BranchContext { name: name.into() }
    }

    /// Branch name reduced to a single semver identifier.
    ///
    /// Runs of characters outside `[0-9A-Za-z]` collapse to one `-`, e.g.
    /// `feature/Login_page` becomes `feature-Login-page`.
    pub fn sanitized(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c);
            } else if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }
        while out.ends_with('-') {
            out.pop();
        }

        if out.is_empty() {
            return "unknown".to_string();
        }
        // semver forbids leading zeros in numeric identifiers
        if out.len() > 1 && out.starts_with('0') && out.bytes().all(|b| b.is_ascii_digit()) {
            return format!("branch-{}", out);
        }
        out
    }

    /// Version embedded in the branch name, e.g. `release/1.4.0` or
    /// `release-1.4`.
    ///
    /// Segments split on `/` are tried from the last one back; within a
    /// segment the text after each `-` is tried too. A match needs at least
    /// `MAJOR.MINOR` so that `feature/123-login` is not read as a version.
    pub fn embedded_version(&self, prefix: Option<&Regex>) -> Option<SemanticVersion> {
        self.name.rsplit('/').find_map(|segment| {
            std::iter::once(segment)
                .chain(segment.match_indices('-').map(|(idx, _)| &segment[idx + 1..]))
                .filter(|candidate| has_minor_component(candidate, prefix))
                .find_map(|candidate| SemanticVersion::parse_with_prefix(candidate, prefix).ok())
        })
    }
}

fn has_minor_component(candidate: &str, prefix: Option<&Regex>) -> bool {
    let stripped = match prefix.and_then(|re| re.find(candidate)) {
        Some(m) if m.start() == 0 => &candidate[m.end()..],
        _ => candidate,
    };
    let core = stripped
        .split(|c| c == '-' || c == '+')
        .next()
        .unwrap_or("");
    core.contains('.')
}

impl fmt::Display for BranchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix() -> Regex {
        Regex::new("^(?:[vV])").unwrap()
    }

    #[test]
    fn test_sanitized() {
        assert_eq!(BranchContext::new("feature/login").sanitized(), "feature-login");
        assert_eq!(
            BranchContext::new("feature//Login_page!").sanitized(),
            "feature-Login-page"
        );
        assert_eq!(BranchContext::new("main").sanitized(), "main");
        assert_eq!(BranchContext::new("///").sanitized(), "unknown");
        assert_eq!(BranchContext::new("0042").sanitized(), "branch-0042");
    }

    #[test]
    fn test_embedded_version_slash() {
        let branch = BranchContext::new("release/1.4.0");
        assert_eq!(
            branch.embedded_version(Some(&prefix())),
            Some(SemanticVersion::new(1, 4, 0))
        );
    }

    #[test]
    fn test_embedded_version_dash_and_prefix() {
        assert_eq!(
            BranchContext::new("release-v2.1").embedded_version(Some(&prefix())),
            Some(SemanticVersion::new(2, 1, 0))
        );
        assert_eq!(
            BranchContext::new("hotfix/2.0.1-urgent").embedded_version(Some(&prefix())),
            SemanticVersion::parse("2.0.1-urgent").ok()
        );
    }

    #[test]
    fn test_no_embedded_version() {
        for name in ["main", "feature/123-login", "develop", "feature/login-2"] {
            assert_eq!(
                BranchContext::new(name).embedded_version(Some(&prefix())),
                None,
                "{} should not embed a version",
                name
            );
        }
    }

    #[test]
    fn test_increment_mode_to_bump() {
        assert_eq!(IncrementMode::Major.to_bump(), Some(VersionBump::Major));
        assert_eq!(IncrementMode::None.to_bump(), Some(VersionBump::None));
        assert_eq!(IncrementMode::Inherit.to_bump(), None);
    }

    #[test]
    fn test_increment_mode_serde() {
        let mode: IncrementMode = serde_json::from_str("\"inherit\"").unwrap();
        assert_eq!(mode, IncrementMode::Inherit);
        assert_eq!(serde_json::to_string(&IncrementMode::Minor).unwrap(), "\"minor\"");
    }
}
