use crate::domain::commit::Commit;
use crate::domain::version::SemanticVersion;

/// Base version proposed by one strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseVersionCandidate {
    /// Human readable origin, used for diagnostics and in the result
    pub source: String,
    pub version: SemanticVersion,
    pub should_increment: bool,
    /// Commit the version is attached to; increment scanning starts after it
    pub anchor: Option<Commit>,
    /// Explicit user directive that bypasses selection
    pub overrides_others: bool,
}

impl BaseVersionCandidate {
    /// Candidate attached to a commit in history
    pub fn anchored(
        source: impl Into<String>,
        version: SemanticVersion,
        should_increment: bool,
        anchor: Option<Commit>,
    ) -> Self {
        BaseVersionCandidate {
            source: source.into(),
            version,
            should_increment,
            anchor,
            overrides_others: false,
        }
    }

    /// Candidate that wins unconditionally and is reported verbatim
    pub fn overriding(source: impl Into<String>, version: SemanticVersion) -> Self {
        BaseVersionCandidate {
            source: source.into(),
            version,
            should_increment: false,
            anchor: None,
            overrides_others: true,
        }
    }

    /// Used when no strategy proposed anything
    pub fn fallback() -> Self {
        BaseVersionCandidate::anchored(
            "Fallback base version",
            SemanticVersion::new(0, 1, 0),
            true,
            None,
        )
    }
}
