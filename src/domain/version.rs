use crate::error::{NextVerError, Result};
use regex::Regex;
use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version with optional pre-release tag and build metadata.
///
/// Values are immutable: every transformation returns a new version.
/// Ordering follows semver precedence, with build metadata compared last so
/// that `Ord` stays consistent with `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<Prerelease>,
    pub build_metadata: Option<BuildMetadata>,
}

impl SemanticVersion {
    /// Create a release version with no pre-release tag or metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            pre_release: None,
            build_metadata: None,
        }
    }

    /// Parse `MAJOR[.MINOR[.PATCH]][-PRE][+META]`.
    ///
    /// Missing minor/patch components default to zero, so `1.4` parses as
    /// `1.4.0`. Pre-release and metadata identifiers must be valid semver.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(NextVerError::parse("Empty version string"));
        }

        let (rest, meta) = match trimmed.split_once('+') {
            Some((rest, meta)) => (rest, Some(meta)),
            None => (trimmed, None),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (rest, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(NextVerError::parse(format!(
                "Invalid version format: '{}' - expected at most MAJOR.MINOR.PATCH",
                input
            )));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NextVerError::parse(format!(
                    "Invalid numeric component '{}' in '{}'",
                    part, input
                )));
            }
            *slot = part.parse::<u64>().map_err(|_| {
                NextVerError::parse(format!("Numeric component '{}' out of range", part))
            })?;
        }

        let pre_release = match pre {
            Some("") => {
                return Err(NextVerError::parse(format!(
                    "Empty pre-release tag in '{}'",
                    input
                )))
            }
            Some(pre) => Some(Prerelease::new(pre).map_err(|e| {
                NextVerError::parse(format!("Invalid pre-release tag '{}': {}", pre, e))
            })?),
            None => None,
        };

        let build_metadata = match meta {
            Some("") => {
                return Err(NextVerError::parse(format!(
                    "Empty build metadata in '{}'",
                    input
                )))
            }
            Some(meta) => Some(BuildMetadata::new(meta).map_err(|e| {
                NextVerError::parse(format!("Invalid build metadata '{}': {}", meta, e))
            })?),
            None => None,
        };

        Ok(SemanticVersion {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre_release,
            build_metadata,
        })
    }

    /// Parse after stripping a tag prefix.
    ///
    /// `prefix` must be anchored at the start of input (see
    /// `ValidatedConfig::tag_prefix`); a prefix that does not match leaves
    /// the input untouched.
    pub fn parse_with_prefix(input: &str, prefix: Option<&Regex>) -> Result<Self> {
        let stripped = match prefix.and_then(|re| re.find(input)) {
            Some(m) if m.start() == 0 => &input[m.end()..],
            _ => input,
        };
        Self::parse(stripped)
    }

    /// Apply an increment to the numeric triple.
    ///
    /// A pre-release base is promoted rather than skipped over:
    /// `1.3.0-beta.2` bumped by minor becomes `1.3.0`, not `1.4.0`.
    /// Metadata never survives an increment.
    ///
    /// # Errors
    /// `Parse` error when the bumped component would overflow `u64`.
    pub fn bump(&self, bump: VersionBump) -> Result<Self> {
        let has_pre = self.pre_release.is_some();
        let (major, minor, patch) = match bump {
            VersionBump::None => {
                return Ok(SemanticVersion {
                    build_metadata: None,
                    ..self.clone()
                })
            }
            VersionBump::Major if has_pre && self.minor == 0 && self.patch == 0 => {
                (self.major, 0, 0)
            }
            VersionBump::Major => (self.checked_next(self.major, bump)?, 0, 0),
            VersionBump::Minor if has_pre && self.patch == 0 => (self.major, self.minor, 0),
            VersionBump::Minor => (self.major, self.checked_next(self.minor, bump)?, 0),
            VersionBump::Patch if has_pre => (self.major, self.minor, self.patch),
            VersionBump::Patch => (self.major, self.minor, self.checked_next(self.patch, bump)?),
        };
        Ok(SemanticVersion::new(major, minor, patch))
    }

    fn checked_next(&self, component: u64, bump: VersionBump) -> Result<u64> {
        component.checked_add(1).ok_or_else(|| {
            NextVerError::parse(format!(
                "Cannot apply {} increment to '{}': component overflows",
                bump, self
            ))
        })
    }

    /// Same numeric triple with a different pre-release tag
    pub fn with_pre_release(&self, pre_release: Option<Prerelease>) -> Self {
        SemanticVersion {
            pre_release,
            ..self.clone()
        }
    }

    /// Same version with different build metadata
    pub fn with_build_metadata(&self, build_metadata: Option<BuildMetadata>) -> Self {
        SemanticVersion {
            build_metadata,
            ..self.clone()
        }
    }

    /// `MAJOR.MINOR.PATCH` only
    pub fn major_minor_patch(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    /// Version without build metadata
    pub fn sem_ver(&self) -> String {
        match &self.pre_release {
            Some(pre) => format!("{}-{}", self.major_minor_patch(), pre),
            None => self.major_minor_patch(),
        }
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre_release, &other.pre_release) {
                (None, None) => Ordering::Equal,
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (Some(a), Some(b)) => a.cmp(b),
            })
            .then_with(|| self.build_metadata.cmp(&other.build_metadata))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sem_ver())?;
        if let Some(meta) = &self.build_metadata {
            write!(f, "+{}", meta)?;
        }
        Ok(())
    }
}

impl FromStr for SemanticVersion {
    type Err = NextVerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SemanticVersion {
    type Error = NextVerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SemanticVersion> for String {
    fn from(version: SemanticVersion) -> Self {
        version.to_string()
    }
}

/// Increment severity, ordered `None < Patch < Minor < Major`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::None => "none",
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        };
        f.write_str(name)
    }
}
