//! Version resolution pipeline
//!
//! `snapshot + config -> strategies -> selector -> increment -> result`,
//! with an optional [`ResultCache`] wrapped around the whole pipeline.

use crate::cache::{Fingerprint, ResultCache};
use crate::config::{Config, ValidatedConfig};
use crate::domain::VersionResult;
use crate::error::Result;
use crate::git::RepositorySnapshot;
use crate::increment;
use crate::resolver::EffectiveConfiguration;
use crate::selector;
use crate::strategy::{
    evaluate_all, history_strategies, ConfigNextVersionStrategy, VersionContext, VersionStrategy,
};
use tracing::{debug, info, warn};

/// Computes versions for one validated configuration
pub struct VersionEngine {
    config: ValidatedConfig,
    strategies: Vec<Box<dyn VersionStrategy>>,
    cache: Option<ResultCache>,
}

impl VersionEngine {
    /// Validate `config`; configuration errors surface here, before any
    /// history is read
    pub fn new(config: &Config) -> Result<Self> {
        Ok(VersionEngine {
            config: config.validate()?,
            strategies: history_strategies(),
            cache: None,
        })
    }

    /// Serve and store results through `cache`
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolved policy for the snapshot's branch
    pub fn effective_config(&self, snapshot: &RepositorySnapshot) -> EffectiveConfiguration {
        self.config.resolve(snapshot.branch_name())
    }

    /// Compute the version of HEAD, consulting the cache first
    pub fn compute(&self, snapshot: &RepositorySnapshot) -> Result<VersionResult> {
        let config = self.effective_config(snapshot);

        let Some(cache) = &self.cache else {
            return self.resolve(snapshot, &config);
        };

        let fingerprint = Fingerprint::new(
            snapshot.head_id(),
            &config.config_hash(),
            &snapshot.refs_hash(),
        );
        if let Some(result) = cache.lookup(&fingerprint) {
            return Ok(result);
        }

        let result = self.resolve(snapshot, &config)?;
        if let Err(e) = cache.store(fingerprint, result.clone()) {
            warn!(path = %cache.path().display(), error = %e, "Failed to write version cache");
        }
        Ok(result)
    }

    fn resolve(
        &self,
        snapshot: &RepositorySnapshot,
        config: &EffectiveConfiguration,
    ) -> Result<VersionResult> {
        let ctx = VersionContext::new(snapshot, config);

        // An explicit next_version wins outright; skip the history walk
        let mut candidates = ConfigNextVersionStrategy.evaluate(&ctx);
        if candidates.is_empty() {
            candidates = evaluate_all(&self.strategies, &ctx);
        } else {
            debug!("next_version configured, skipping history strategies");
        }

        let winner = selector::select(candidates, snapshot);
        let range = match &winner.anchor {
            Some(anchor) if !winner.overrides_others => snapshot.commits_since(&anchor.id),
            _ => vec![],
        };

        let result = increment::calculate(&winner, config, &range, snapshot.head_id())?;
        info!(
            version = %result.full_sem_ver(),
            source = %result.base_version_source,
            branch = %result.branch_name,
            commits = result.commits_since_base,
            "Computed version"
        );
        Ok(result)
    }
}

/// One-shot computation without a cache
pub fn compute(snapshot: &RepositorySnapshot, config: &Config) -> Result<VersionResult> {
    VersionEngine::new(config)?.compute(snapshot)
}
