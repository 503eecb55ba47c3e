//! Engine configuration with documented constants
//!
//! The approximation knobs of the outcome tree live here. Changing either
//! `prune_threshold` or `max_rounds` shifts the reported `bad` probability,
//! so fixtures that pin `bad` must be re-validated after a change.

use crate::core::error::{OddsError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Probability below which a branch is no longer expanded
pub const DEFAULT_PRUNE_THRESHOLD: f64 = 0.005;

/// Hard cap on combat rounds per branch
pub const DEFAULT_MAX_ROUNDS: u32 = 16;

/// What the prune threshold is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruneMode {
    /// One side's hit count in one volley, conditional on the roster firing it
    #[default]
    Volley,
    /// A roster's absolute probability of being reached in a given round
    Branch,
}

/// Configuration for the odds calculation
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === APPROXIMATION ===
    /// Outcomes whose probability falls below this are not expanded; their
    /// mass is reported as `bad`.
    ///
    /// At 0.005 a 20 vs 20 infantry battle finishes quickly while leaving a
    /// few percent unresolved. Lower values trade time for precision.
    pub prune_threshold: f64,

    /// Whether `prune_threshold` applies to volley outcomes or to whole branches
    ///
    /// Branch pruning bounds work tightly but its `bad` mass grows fast with
    /// army size, since a large battle spreads over many unlikely rosters.
    pub prune_mode: PruneMode,

    /// Maximum number of rounds a branch may enter
    ///
    /// Pruning alone does not terminate a battle where neither side can
    /// eliminate the other. Mass still unresolved at this round is `bad`.
    pub max_rounds: u32,

    // === RULES ===
    /// Number of opening rounds in which anti-air units fire
    ///
    /// Classic rules fire anti-air once, before the first round.
    pub anti_air_rounds: u32,

    // === PARALLELIZATION ===
    /// Minimum number of distinct rosters in a round before fanning out to rayon
    ///
    /// Below this the thread hand-off costs more than it saves.
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            prune_mode: PruneMode::Volley,
            max_rounds: DEFAULT_MAX_ROUNDS,
            anti_air_rounds: 1,
            parallel_threshold: 64,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prune_threshold(mut self, threshold: f64) -> Self {
        self.prune_threshold = threshold;
        self
    }

    pub fn with_prune_mode(mut self, mode: PruneMode) -> Self {
        self.prune_mode = mode;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(0.0..1.0).contains(&self.prune_threshold) {
            return Err(format!(
                "prune_threshold ({}) must be in [0, 1)",
                self.prune_threshold
            ));
        }

        if self.max_rounds == 0 {
            return Err("max_rounds must be at least 1".into());
        }

        if self.anti_air_rounds > self.max_rounds {
            return Err(format!(
                "anti_air_rounds ({}) should be <= max_rounds ({})",
                self.anti_air_rounds, self.max_rounds
            ));
        }

        Ok(())
    }
}

/// Parse a config from TOML text; missing keys take their defaults
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let config: EngineConfig = toml::from_str(content)?;
    config.validate().map_err(OddsError::InvalidConfig)?;
    Ok(config)
}

/// Load a config from a TOML file
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}
