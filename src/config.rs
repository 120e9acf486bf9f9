//! Solver configuration, optionally loaded from a JSON file.
//!
//! Every field has a default, so a file only needs to name what it changes:
//!
//! ```json
//! { "annealing": { "cooling_rate": 0.99 }, "open_weight": { "fixed": 5000.0 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::heuristics::anytime::AnytimeConfig;
use crate::heuristics::construction::GreedyConfig;
use crate::heuristics::local_search::{AnnealingConfig, DescentConfig};
use crate::objective::OpenWeight;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub annealing: AnnealingConfig,
    pub descent: DescentConfig,
    pub greedy: GreedyConfig,
    pub open_weight: OpenWeight,
    /// Share of the remaining time given to each anytime run
    pub slice_fraction: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            annealing: AnnealingConfig::default(),
            descent: DescentConfig::default(),
            greedy: GreedyConfig::default(),
            open_weight: OpenWeight::Auto,
            slice_fraction: 0.25,
        }
    }
}

impl SolverConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: SolverConfig = serde_json::from_str(&text)
            .map_err(|e| SolverError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.annealing.validate()?;
        self.descent.validate()?;
        self.greedy.validate()?;
        self.open_weight.validate()?;
        self.anytime(0.0, None).validate()
    }

    /// Anytime parameters for one solve
    pub fn anytime(&self, time_limit: f64, seed: Option<u64>) -> AnytimeConfig {
        AnytimeConfig { time_limit, slice_fraction: self.slice_fraction, seed }
    }
}
