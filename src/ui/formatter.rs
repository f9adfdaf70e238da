//! Pure formatting functions for version output.
//!
//! Everything here returns strings so the binary decides where they go.
//! Nothing is styled; colour is applied by the display helpers in the
//! parent module.

use crate::domain::VersionResult;
use crate::error::{NextVerError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Variables serialized as a JSON object in their stable order
struct Variables<'a>(&'a [(&'static str, String)]);

impl Serialize for Variables<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One `Name: value` line per variable, values aligned.
pub fn format_text(result: &VersionResult) -> String {
    let variables = result.variables();
    let width = variables
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0)
        + 1;

    variables
        .iter()
        .map(|(name, value)| format!("{:<width$} {}", format!("{}:", name), value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty JSON object of every variable
pub fn format_json(result: &VersionResult) -> Result<String> {
    let variables = result.variables();
    Ok(serde_json::to_string_pretty(&Variables(&variables))?)
}

/// Value of one variable, looked up case-insensitively.
///
/// # Errors
/// `Config` error listing the known names when `name` is unknown.
pub fn format_variable(result: &VersionResult, name: &str) -> Result<String> {
    result.variable(name).ok_or_else(|| {
        let known: Vec<&str> = result.variables().into_iter().map(|(k, _)| k).collect();
        NextVerError::config(format!(
            "Unknown variable '{}'. Available: {}",
            name,
            known.join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommitId, SemanticVersion};

    fn result() -> VersionResult {
        VersionResult::new(
            SemanticVersion::parse("1.3.0-beta.4+4").unwrap(),
            "Version in branch name 'release/1.3.0'",
            4,
            "release/1.3.0",
            CommitId::new("0123456789abcdef0123456789abcdef01234567"),
        )
    }

    #[test]
    fn test_format_text_lists_every_variable() {
        let text = format_text(&result());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), result().variables().len());
        assert!(lines[0].starts_with("Major:"));
        assert!(lines[0].ends_with(" 1"));
        assert!(text.contains("FullSemVer:"));
        assert!(text.contains("1.3.0-beta.4+4"));
    }

    #[test]
    fn test_format_json_keeps_order() {
        let json = format_json(&result()).unwrap();
        let major = json.find("\"Major\"").unwrap();
        let sha = json.find("\"Sha\"").unwrap();
        assert!(major < sha);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["SemVer"], "1.3.0-beta.4");
        assert_eq!(parsed["PreReleaseLabel"], "beta");
        assert_eq!(parsed["CommitsSinceVersionSource"], "4");
    }

    #[test]
    fn test_format_variable() {
        assert_eq!(format_variable(&result(), "fullsemver").unwrap(), "1.3.0-beta.4+4");
        let err = format_variable(&result(), "Nope").unwrap_err();
        assert!(err.to_string().contains("Unknown variable 'Nope'"));
        assert!(err.to_string().contains("MajorMinorPatch"));
    }
}
