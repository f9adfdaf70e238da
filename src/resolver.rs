//! Branch configuration resolution
//!
//! Maps the current branch name to one fully merged [`BranchConfig`] and
//! bundles it with the rest of the settings strategies need.

use crate::config::{IncrementPatterns, ValidatedConfig};
use crate::domain::{BranchConfig, BranchContext};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Everything a strategy or the increment calculator may consult
#[derive(Debug, Clone)]
pub struct EffectiveConfiguration {
    pub branch: BranchContext,
    pub branch_config: BranchConfig,
    /// Anchored tag prefix for this branch
    pub tag_prefix: Regex,
    pub source_branches: Vec<Regex>,
    pub next_version: Option<String>,
    pub prevent_increment_for_merged_branch_version: bool,
    pub increment_patterns: IncrementPatterns,
}

#[derive(Serialize)]
struct HashView<'a> {
    branch: &'a str,
    branch_config: &'a BranchConfig,
    next_version: Option<&'a str>,
    prevent_increment_for_merged_branch_version: bool,
    increment_patterns: [&'a str; 4],
}

impl EffectiveConfiguration {
    /// SHA-256 over every setting that can influence the computed version
    pub fn config_hash(&self) -> String {
        let view = HashView {
            branch: &self.branch.name,
            branch_config: &self.branch_config,
            next_version: self.next_version.as_deref(),
            prevent_increment_for_merged_branch_version: self
                .prevent_increment_for_merged_branch_version,
            increment_patterns: [
                self.increment_patterns.major.as_str(),
                self.increment_patterns.minor.as_str(),
                self.increment_patterns.patch.as_str(),
                self.increment_patterns.none.as_str(),
            ],
        };
        // Serializing plain structs of strings cannot fail; fall back to Debug anyway
        let bytes = serde_json::to_vec(&view)
            .unwrap_or_else(|_| format!("{:?}", self.branch_config).into_bytes());
        hex::encode(Sha256::digest(&bytes))
    }
}

impl ValidatedConfig {
    /// Resolve the policy for `branch_name`.
    ///
    /// The first entry whose regex matches wins; with no match the global
    /// defaults apply unchanged. Matching never fails: every pattern was
    /// compiled during validation.
    pub fn resolve(&self, branch_name: &str) -> EffectiveConfiguration {
        let defaults = self.config.default_branch_config();
        let matched = self
            .branches
            .iter()
            .find(|branch| branch.pattern.is_match(branch_name));

        let (branch_config, tag_prefix, source_branches) = match matched {
            Some(branch) => {
                debug!(branch = branch_name, entry = %branch.entry.name, "Matched branch configuration");
                (
                    branch.entry.merge_onto(&defaults),
                    branch.tag_prefix.clone().unwrap_or_else(|| self.tag_prefix.clone()),
                    branch.source_branches.clone(),
                )
            }
            None => {
                debug!(branch = branch_name, "No branch configuration matched, using defaults");
                (defaults, self.tag_prefix.clone(), vec![])
            }
        };

        EffectiveConfiguration {
            branch: BranchContext::new(branch_name),
            branch_config,
            tag_prefix,
            source_branches,
            next_version: self
                .config
                .next_version
                .clone()
                .filter(|v| !v.trim().is_empty()),
            prevent_increment_for_merged_branch_version: self
                .config
                .prevent_increment_for_merged_branch_version,
            increment_patterns: self.increment_patterns.clone(),
        }
    }
}
