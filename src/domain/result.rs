use crate::domain::commit::CommitId;
use crate::domain::version::SemanticVersion;
use serde::{Deserialize, Serialize};

/// Outcome of one version computation.
///
/// Field names returned by [`VersionResult::variables`] are stable; output
/// adapters enumerate them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResult {
    pub semantic_version: SemanticVersion,
    pub base_version_source: String,
    pub commits_since_base: usize,
    pub pre_release_tag: Option<String>,
    pub build_metadata: Option<String>,
    pub branch_name: String,
    pub sha: CommitId,
}

impl VersionResult {
    /// Build a result; tag and metadata strings are taken from `version`
    pub fn new(
        version: SemanticVersion,
        base_version_source: impl Into<String>,
        commits_since_base: usize,
        branch_name: impl Into<String>,
        sha: CommitId,
    ) -> Self {
        VersionResult {
            pre_release_tag: version.pre_release.as_ref().map(|p| p.to_string()),
            build_metadata: version.build_metadata.as_ref().map(|m| m.to_string()),
            semantic_version: version,
            base_version_source: base_version_source.into(),
            commits_since_base,
            branch_name: branch_name.into(),
            sha,
        }
    }

    pub fn major(&self) -> u64 {
        self.semantic_version.major
    }

    pub fn minor(&self) -> u64 {
        self.semantic_version.minor
    }

    pub fn patch(&self) -> u64 {
        self.semantic_version.patch
    }

    /// Version without build metadata, e.g. `1.3.0-beta.4`
    pub fn sem_ver(&self) -> String {
        self.semantic_version.sem_ver()
    }

    /// Version including build metadata, e.g. `1.3.0-beta.4+4`
    pub fn full_sem_ver(&self) -> String {
        self.semantic_version.to_string()
    }

    /// Leading non-numeric identifier of the pre-release tag (`beta` in `beta.4`)
    pub fn pre_release_label(&self) -> Option<String> {
        let tag = self.pre_release_tag.as_deref()?;
        let first = tag.split('.').next()?;
        if first.bytes().all(|b| b.is_ascii_digit()) {
            None
        } else {
            Some(first.to_string())
        }
    }

    /// Trailing numeric identifier of the pre-release tag (`4` in `beta.4`)
    pub fn pre_release_number(&self) -> Option<u64> {
        self.pre_release_tag
            .as_deref()?
            .rsplit('.')
            .next()?
            .parse()
            .ok()
    }

    /// Every exported field as `(name, value)`, in a fixed order.
    /// Absent optional fields are rendered as empty strings.
    pub fn variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Major", self.major().to_string()),
            ("Minor", self.minor().to_string()),
            ("Patch", self.patch().to_string()),
            ("MajorMinorPatch", self.semantic_version.major_minor_patch()),
            ("PreReleaseTag", self.pre_release_tag.clone().unwrap_or_default()),
            ("PreReleaseLabel", self.pre_release_label().unwrap_or_default()),
            (
                "PreReleaseNumber",
                self.pre_release_number()
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
            ),
            ("BuildMetaData", self.build_metadata.clone().unwrap_or_default()),
            ("SemVer", self.sem_ver()),
            ("FullSemVer", self.full_sem_ver()),
            ("BranchName", self.branch_name.clone()),
            ("Sha", self.sha.to_string()),
            ("ShortSha", self.sha.short().to_string()),
            (
                "CommitsSinceVersionSource",
                self.commits_since_base.to_string(),
            ),
            ("VersionSourceDescription", self.base_version_source.clone()),
        ]
    }

    /// Look up one variable by name, ignoring ASCII case
    pub fn variable(&self, name: &str) -> Option<String> {
        self.variables()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}
