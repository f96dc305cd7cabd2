//! Planner configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{PlanningError, PlanningResult};

/// Configuration for the parallel near-projection KPIECE planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearKpieceConfig {
    /// Number of worker threads
    #[serde(default = "default_thread_count")]
    pub thread_count: usize,

    /// Probability of sampling toward the goal [0, 1]
    #[serde(default = "default_goal_bias")]
    pub goal_bias: f64,

    /// Maximum expansion distance; derived from the space extent when unset
    #[serde(default)]
    pub max_distance: Option<f64>,

    /// Partially valid transitions are kept when their valid fraction exceeds this
    #[serde(default = "default_min_valid_path_fraction")]
    pub min_valid_path_fraction: f64,

    /// Score multiplier applied to a cell after a failed expansion (0, 1]
    #[serde(default = "default_failed_expansion_score_factor")]
    pub failed_expansion_score_factor: f64,

    /// Minimum probability of expanding from an exterior cell [0, 1]
    #[serde(default = "default_border_fraction")]
    pub border_fraction: f64,

    /// Seed for the worker random generators; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_thread_count() -> usize {
    2
}

fn default_goal_bias() -> f64 {
    0.05
}

fn default_min_valid_path_fraction() -> f64 {
    0.5
}

fn default_failed_expansion_score_factor() -> f64 {
    0.5
}

fn default_border_fraction() -> f64 {
    0.9
}

impl Default for NearKpieceConfig {
    fn default() -> Self {
        Self {
            thread_count: default_thread_count(),
            goal_bias: default_goal_bias(),
            max_distance: None,
            min_valid_path_fraction: default_min_valid_path_fraction(),
            failed_expansion_score_factor: default_failed_expansion_score_factor(),
            border_fraction: default_border_fraction(),
            seed: None,
        }
    }
}

impl NearKpieceConfig {
    /// Parse and validate a TOML configuration
    pub fn from_toml_str(contents: &str) -> PlanningResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> PlanningResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("Loaded planner config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> PlanningResult<()> {
        if self.thread_count == 0 {
            return Err(invalid("thread_count must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(invalid("goal_bias must lie in [0, 1]"));
        }
        if let Some(d) = self.max_distance {
            if !(d > 0.0) || !d.is_finite() {
                return Err(invalid("max_distance must be positive and finite"));
            }
        }
        if !(0.0..=1.0).contains(&self.min_valid_path_fraction) {
            return Err(invalid("min_valid_path_fraction must lie in [0, 1]"));
        }
        if !(self.failed_expansion_score_factor > 0.0 && self.failed_expansion_score_factor <= 1.0)
        {
            return Err(invalid("failed_expansion_score_factor must lie in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.border_fraction) {
            return Err(invalid("border_fraction must lie in [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> PlanningError {
    PlanningError::InvalidParameter(msg.to_string())
}
