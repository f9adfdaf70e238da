use crate::domain::{BranchConfig, BranchContext, IncrementMode};
use crate::error::{NextVerError, Result};
use crate::increment::render_label;
use regex::{Regex, RegexBuilder};
use semver::Prerelease;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "nextver.toml";

/// Represents the complete configuration for git-nextver.
///
/// Global fields act as the default branch policy; `branches` are matched in
/// declaration order against the current branch name.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Explicit next version; overrides everything computed from history
    #[serde(default)]
    pub next_version: Option<String>,

    /// Regex stripped from the start of tag names before parsing
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,

    #[serde(default = "default_increment")]
    pub increment: IncrementMode,

    /// Pre-release label template; `{branch}` and `{commits}` are substituted.
    /// An empty string disables the label.
    #[serde(default = "default_label")]
    pub label: String,

    /// Versions found in merge messages are taken as-is instead of bumped
    #[serde(default)]
    pub prevent_increment_for_merged_branch_version: bool,

    #[serde(default)]
    pub increment_messages: IncrementMessagesConfig,

    #[serde(default = "default_branches")]
    pub branches: Vec<BranchEntry>,
}

/// Partial branch policy; unset fields inherit the global defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BranchEntry {
    pub name: String,
    pub regex: String,
    #[serde(default)]
    pub increment: Option<IncrementMode>,
    #[serde(default)]
    pub tag_prefix: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub mainline: Option<bool>,
    #[serde(default)]
    pub source_branches: Option<Vec<String>>,
}

impl BranchEntry {
    fn new(name: &str, regex: &str) -> Self {
        BranchEntry {
            name: name.to_string(),
            regex: regex.to_string(),
            increment: None,
            tag_prefix: None,
            label: None,
            mainline: None,
            source_branches: None,
        }
    }

    /// Merge this entry field by field over `defaults`
    pub fn merge_onto(&self, defaults: &BranchConfig) -> BranchConfig {
        let label = match &self.label {
            Some(label) => non_empty(label),
            None => defaults.pre_release_label_template.clone(),
        };
        BranchConfig {
            name: self.name.clone(),
            name_pattern: self.regex.clone(),
            increment: self.increment.unwrap_or(defaults.increment),
            tag_prefix: self
                .tag_prefix
                .clone()
                .unwrap_or_else(|| defaults.tag_prefix.clone()),
            pre_release_label_template: label,
            is_mainline: self.mainline.unwrap_or(defaults.is_mainline),
            source_branches: self
                .source_branches
                .clone()
                .unwrap_or_else(|| defaults.source_branches.clone()),
        }
    }
}

/// Regexes recognising increment directives in commit messages.
///
/// Matched case-insensitively anywhere in the message.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct IncrementMessagesConfig {
    #[serde(default = "default_major_message")]
    pub major: String,
    #[serde(default = "default_minor_message")]
    pub minor: String,
    #[serde(default = "default_patch_message")]
    pub patch: String,
    #[serde(default = "default_none_message")]
    pub none: String,
}

fn default_tag_prefix() -> String {
    "[vV]".to_string()
}

fn default_increment() -> IncrementMode {
    IncrementMode::Patch
}

fn default_label() -> String {
    "{branch}.{commits}".to_string()
}

fn default_major_message() -> String {
    r"\+semver:\s?(breaking|major)".to_string()
}

fn default_minor_message() -> String {
    r"\+semver:\s?(feature|minor)".to_string()
}

fn default_patch_message() -> String {
    r"\+semver:\s?(fix|patch)".to_string()
}

fn default_none_message() -> String {
    r"\+semver:\s?(none|skip)".to_string()
}

/// Returns the default branch table.
fn default_branches() -> Vec<BranchEntry> {
    let main = BranchEntry {
        increment: Some(IncrementMode::Patch),
        label: Some(String::new()),
        mainline: Some(true),
        source_branches: Some(vec![]),
        ..BranchEntry::new("main", "^(main|master)$")
    };
    let develop = BranchEntry {
        increment: Some(IncrementMode::Minor),
        label: Some("alpha.{commits}".to_string()),
        source_branches: Some(vec!["^(main|master)$".to_string()]),
        ..BranchEntry::new("develop", "^dev(elop)?(ment)?$")
    };
    let release = BranchEntry {
        increment: Some(IncrementMode::Patch),
        label: Some("beta.{commits}".to_string()),
        source_branches: Some(vec![
            "^(main|master)$".to_string(),
            "^dev(elop)?(ment)?$".to_string(),
        ]),
        ..BranchEntry::new("release", "^releases?[/-]")
    };
    let hotfix = BranchEntry {
        increment: Some(IncrementMode::Patch),
        label: Some("beta.{commits}".to_string()),
        source_branches: Some(vec!["^(main|master)$".to_string()]),
        ..BranchEntry::new("hotfix", "^hotfix(es)?[/-]")
    };
    let feature = BranchEntry {
        increment: Some(IncrementMode::Inherit),
        label: Some("{branch}.{commits}".to_string()),
        source_branches: Some(vec![
            "^dev(elop)?(ment)?$".to_string(),
            "^(main|master)$".to_string(),
        ]),
        ..BranchEntry::new("feature", "^features?[/-]")
    };
    vec![main, develop, release, hotfix, feature]
}

impl Default for IncrementMessagesConfig {
    fn default() -> Self {
        IncrementMessagesConfig {
            major: default_major_message(),
            minor: default_minor_message(),
            patch: default_patch_message(),
            none: default_none_message(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            next_version: None,
            tag_prefix: default_tag_prefix(),
            increment: default_increment(),
            label: default_label(),
            prevent_increment_for_merged_branch_version: false,
            increment_messages: IncrementMessagesConfig::default(),
            branches: default_branches(),
        }
    }
}

impl Config {
    /// Policy applied to branches no entry matches
    pub fn default_branch_config(&self) -> BranchConfig {
        BranchConfig {
            name: "unknown".to_string(),
            name_pattern: ".*".to_string(),
            increment: self.increment,
            tag_prefix: self.tag_prefix.clone(),
            pre_release_label_template: non_empty(&self.label),
            is_mainline: false,
            source_branches: vec![],
        }
    }

    /// Compile every pattern and check the branch table for contradictions.
    ///
    /// All configuration errors surface here, before any history is read.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let tag_prefix = compile_prefix(&self.tag_prefix, "tag_prefix")?;
        check_label(&self.label, "label")?;

        let increment_patterns = IncrementPatterns {
            major: compile_message(&self.increment_messages.major, "major")?,
            minor: compile_message(&self.increment_messages.minor, "minor")?,
            patch: compile_message(&self.increment_messages.patch, "patch")?,
            none: compile_message(&self.increment_messages.none, "none")?,
        };

        let mut seen = HashSet::new();
        let mut branches = Vec::with_capacity(self.branches.len());
        for entry in &self.branches {
            if entry.name.trim().is_empty() {
                return Err(NextVerError::config("Branch entry with an empty name"));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(NextVerError::config(format!(
                    "Branch '{}' is configured more than once",
                    entry.name
                )));
            }
            if entry.regex.is_empty() {
                return Err(NextVerError::config(format!(
                    "Branch '{}' has an empty regex",
                    entry.name
                )));
            }

            let pattern = Regex::new(&entry.regex).map_err(|e| {
                NextVerError::config(format!(
                    "Invalid regex for branch '{}': {}",
                    entry.name, e
                ))
            })?;
            let tag_prefix = entry
                .tag_prefix
                .as_deref()
                .map(|p| compile_prefix(p, &format!("branches.{}.tag_prefix", entry.name)))
                .transpose()?;
            if let Some(label) = &entry.label {
                check_label(label, &format!("branches.{}.label", entry.name))?;
            }
            let source_branches = entry
                .source_branches
                .iter()
                .flatten()
                .map(|source| {
                    Regex::new(source).map_err(|e| {
                        NextVerError::config(format!(
                            "Invalid source branch regex '{}' for branch '{}': {}",
                            source, entry.name, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            branches.push(CompiledBranch {
                entry: entry.clone(),
                pattern,
                tag_prefix,
                source_branches,
            });
        }

        Ok(ValidatedConfig {
            config: self.clone(),
            tag_prefix,
            branches,
            increment_patterns,
        })
    }
}

/// Configuration whose patterns have all been compiled successfully
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub(crate) config: Config,
    pub(crate) tag_prefix: Regex,
    pub(crate) branches: Vec<CompiledBranch>,
    pub(crate) increment_patterns: IncrementPatterns,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledBranch {
    pub(crate) entry: BranchEntry,
    pub(crate) pattern: Regex,
    pub(crate) tag_prefix: Option<Regex>,
    pub(crate) source_branches: Vec<Regex>,
}

/// Compiled increment directive patterns
#[derive(Debug, Clone)]
pub struct IncrementPatterns {
    pub major: Regex,
    pub minor: Regex,
    pub patch: Regex,
    pub none: Regex,
}

fn non_empty(label: &str) -> Option<String> {
    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Compile a tag prefix anchored at the start of the tag name
pub(crate) fn compile_prefix(prefix: &str, field: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})", prefix))
        .map_err(|e| NextVerError::config(format!("Invalid {} '{}': {}", field, prefix, e)))
}

fn compile_message(pattern: &str, field: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| {
            NextVerError::config(format!(
                "Invalid increment_messages.{} pattern '{}': {}",
                field, pattern, e
            ))
        })
}

/// A label template must render to a valid semver pre-release
fn check_label(template: &str, field: &str) -> Result<()> {
    if template.is_empty() {
        return Ok(());
    }
    let rendered = render_label(template, &BranchContext::new("sample/branch"), 1);
    Prerelease::new(&rendered).map(|_| ()).map_err(|e| {
        NextVerError::config(format!(
            "{} '{}' does not produce a valid pre-release tag ('{}'): {}",
            field, template, rendered, e
        ))
    })
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `nextver.toml` in current directory
/// 3. `.nextver.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| NextVerError::config(format!("Invalid TOML: {}", e)))
}
