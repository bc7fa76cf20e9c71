use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::fragment::{FragmentScope, SectionKind};
use crate::scoring::weights::{DimensionWeights, ScoringProfile};

/// Upper bound on suggestions per scope. Larger values are a config mistake.
const MAX_SUGGESTIONS_PER_SCOPE: usize = 10;

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Optional JSON file holding an `EngineConfig`.
    pub selection_config_path: Option<String>,
    /// Maximum cached score vectors; 0 disables the cache.
    pub score_cache_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            selection_config_path: std::env::var("SELECTION_CONFIG_PATH").ok(),
            score_cache_capacity: std::env::var("SCORE_CACHE_CAPACITY")
                .unwrap_or_else(|_| "4096".to_string())
                .parse::<usize>()
                .context("SCORE_CACHE_CAPACITY must be a non-negative integer")?,
        })
    }

    /// Loads the engine configuration file, or the built-in defaults when unset.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        match &self.selection_config_path {
            Some(path) => EngineConfig::from_file(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Tunables of the selection engine. Every map is sparse: missing keys fall
/// back to the per-section defaults in `SectionKind`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub default_weights: DimensionWeights,
    #[serde(default)]
    pub scope_weights: BTreeMap<FragmentScope, DimensionWeights>,
    #[serde(default)]
    pub section_budgets: BTreeMap<SectionKind, i64>,
    #[serde(default)]
    pub suggestions_per_scope: BTreeMap<SectionKind, usize>,
    #[serde(default)]
    pub section_defaults: BTreeMap<SectionKind, bool>,
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Engine config '{}' is not valid JSON", path.display()))
    }

    /// Validates weights and returns the scoring profile they describe.
    pub fn scoring_profile(&self) -> Result<ScoringProfile, EngineError> {
        ScoringProfile::new(self.default_weights, self.scope_weights.clone())
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.scoring_profile()?;
        for (section, k) in &self.suggestions_per_scope {
            if *k > MAX_SUGGESTIONS_PER_SCOPE {
                return Err(EngineError::InvalidConfig(format!(
                    "suggestions_per_scope for {} is {k}, max {MAX_SUGGESTIONS_PER_SCOPE}",
                    section.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn budget_for(&self, section: SectionKind) -> i64 {
        self.section_budgets
            .get(&section)
            .copied()
            .unwrap_or_else(|| section.default_budget())
    }

    pub fn suggestions_for(&self, section: SectionKind) -> usize {
        self.suggestions_per_scope
            .get(&section)
            .copied()
            .unwrap_or_else(|| section.default_suggestions())
    }

    pub fn include_by_default(&self, section: SectionKind) -> bool {
        self.section_defaults
            .get(&section)
            .copied()
            .unwrap_or_else(|| section.default_include())
    }
}
