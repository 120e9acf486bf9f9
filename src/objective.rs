//! Scalar objective: facility count first, total distance as tie-break.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};

/// Weight used when nothing larger is needed for the instance scale
pub const DEFAULT_OPEN_WEIGHT: f64 = 1_000.0;

/// How the per-facility weight is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenWeight {
    /// `max(1000, bound + 1)` where `bound` caps the total distance of any
    /// feasible assignment. One extra facility then always outweighs any
    /// distance saving.
    Auto,
    /// A hand-picked weight.
    Fixed(f64),
}

impl Default for OpenWeight {
    fn default() -> Self {
        OpenWeight::Auto
    }
}

impl OpenWeight {
    pub fn validate(&self) -> Result<()> {
        if let OpenWeight::Fixed(w) = *self {
            if !(w.is_finite() && w > 0.0) {
                return Err(SolverError::InvalidConfig(format!(
                    "open weight must be positive and finite, got {}",
                    w
                )));
            }
        }
        Ok(())
    }

    /// Resolve to a concrete weight given the assignment distance bound
    pub fn resolve(&self, distance_bound: f64) -> f64 {
        match *self {
            OpenWeight::Auto => DEFAULT_OPEN_WEIGHT.max(distance_bound + 1.0),
            OpenWeight::Fixed(w) => w,
        }
    }
}

/// `num_open * weight + total_distance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub weight: f64,
}

impl Objective {
    pub fn new(weight: f64) -> Self {
        Objective { weight }
    }

    #[inline]
    pub fn value(&self, num_open: usize, total_distance: f64) -> f64 {
        num_open as f64 * self.weight + total_distance
    }
}

impl Default for Objective {
    fn default() -> Self {
        Objective::new(DEFAULT_OPEN_WEIGHT)
    }
}
