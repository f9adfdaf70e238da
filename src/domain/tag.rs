use crate::domain::commit::CommitId;
use crate::domain::version::SemanticVersion;
use crate::error::Result;
use regex::Regex;

/// A git tag peeled to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub target: CommitId,
}

impl Tag {
    pub fn new(name: impl Into<String>, target: CommitId) -> Self {
        Tag {
            name: name.into(),
            target,
        }
    }

    /// Version carried by the tag name once `prefix` is stripped
    /// (e.g. `v1.2.3` -> `1.2.3`)
    pub fn version(&self, prefix: Option<&Regex>) -> Result<SemanticVersion> {
        SemanticVersion::parse_with_prefix(&self.name, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_version() {
        let prefix = Regex::new("^(?:[vV])").unwrap();
        let tag = Tag::new("v1.2.3", CommitId::new("abc"));
        assert_eq!(
            tag.version(Some(&prefix)).unwrap(),
            SemanticVersion::new(1, 2, 3)
        );
    }

    #[test]
    fn test_tag_version_custom_prefix() {
        let prefix = Regex::new("^(?:release-)").unwrap();
        let tag = Tag::new("release-2.0.0-rc.1", CommitId::new("abc"));
        assert_eq!(tag.version(Some(&prefix)).unwrap().to_string(), "2.0.0-rc.1");
    }

    #[test]
    fn test_tag_version_malformed() {
        let prefix = Regex::new("^(?:[vV])").unwrap();
        assert!(Tag::new("nightly", CommitId::new("abc"))
            .version(Some(&prefix))
            .is_err());
        assert!(Tag::new("v1.2.x", CommitId::new("abc"))
            .version(Some(&prefix))
            .is_err());
    }
}
