//! Random instance generation.
//!
//! Clients and facilities are drawn uniformly on a square grid; coordinates
//! are rounded to two decimals so a generated instance survives a
//! write/parse cycle unchanged.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::instance::{Client, Facility, Instance};

/// Generator parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub num_clients: usize,
    pub num_facilities: usize,
    pub coverage: f64,
    /// Side of the square the points are drawn from
    pub grid: f64,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.grid.is_finite() && self.grid >= 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "grid size must be non-negative and finite, got {}",
                self.grid
            )));
        }
        if !(self.coverage.is_finite() && self.coverage >= 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "coverage distance must be non-negative and finite, got {}",
                self.coverage
            )));
        }
        Ok(())
    }
}

/// Size classes used by the benchmark tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Small,
    Large,
    Extreme,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Preset::Small => "small",
            Preset::Large => "large",
            Preset::Extreme => "extreme",
        }
    }

    /// Draw concrete sizes for this class
    pub fn config<R: Rng + ?Sized>(&self, rng: &mut R) -> GeneratorConfig {
        match self {
            Preset::Small => GeneratorConfig {
                num_clients: rng.gen_range(5..=12),
                num_facilities: rng.gen_range(3..=8),
                coverage: rng.gen_range(5..=15) as f64,
                grid: 100.0,
            },
            Preset::Large => GeneratorConfig {
                num_clients: rng.gen_range(40..=70),
                num_facilities: rng.gen_range(25..=40),
                coverage: rng.gen_range(8..=20) as f64,
                grid: 200.0,
            },
            Preset::Extreme => GeneratorConfig {
                num_clients: 150,
                num_facilities: 100,
                coverage: 12.0,
                grid: 300.0,
            },
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub struct InstanceGenerator {
    pub config: GeneratorConfig,
}

impl InstanceGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(InstanceGenerator { config })
    }

    fn point<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        (round2(rng.gen_range(0.0..=self.config.grid)), round2(rng.gen_range(0.0..=self.config.grid)))
    }

    /// Uniform instance; may be infeasible when coverage is small.
    pub fn generate<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Instance {
        let clients = (1..=self.config.num_clients)
            .map(|i| {
                let (x, y) = self.point(rng);
                Client::new(format!("C{}", i), x, y)
            })
            .collect();
        let facilities = (1..=self.config.num_facilities)
            .map(|i| {
                let (x, y) = self.point(rng);
                Facility::new(format!("F{}", i), x, y, false)
            })
            .collect();
        Instance::new(name, clients, facilities, self.config.coverage)
    }

    /// Like [`generate`](Self::generate), but every client out of reach of
    /// all facilities is moved next to a random facility.
    pub fn generate_feasible<R: Rng + ?Sized>(&self, name: &str, rng: &mut R) -> Instance {
        let mut instance = self.generate(name, rng);
        if instance.facilities.is_empty() {
            return instance;
        }
        let coverage = instance.coverage_distance;
        for i in 0..instance.clients.len() {
            let covered = instance
                .facilities
                .iter()
                .any(|f| f.distance_to(&instance.clients[i]) <= coverage);
            if covered {
                continue;
            }
            let anchor = rng.gen_range(0..instance.facilities.len());
            let (fx, fy) = (instance.facilities[anchor].x, instance.facilities[anchor].y);
            let radius = rng.gen_range(0.0..=0.9) * coverage;
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let client = &mut instance.clients[i];
            client.x = round2(fx + radius * angle.cos());
            client.y = round2(fy + radius * angle.sin());
        }
        instance
    }
}
