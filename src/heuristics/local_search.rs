//! Local search over open-sets under the hard coverage constraint.
//!
//! This module implements:
//! - Simulated annealing with random OPEN / CLOSE / SWAP moves
//! - Best-improvement descent over the full OPEN / CLOSE / SWAP neighborhood
//!
//! Both only ever hold feasible candidates: a neighbor that leaves a client
//! uncovered is dropped before it is compared with anything.

use std::time::Instant;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::assignment::first_uncovered;
use crate::error::{Result, SolverError};
use crate::heuristics::moves::{Move, MoveGenerator};
use crate::problem::Problem;
use crate::solution::{Candidate, OpenSet};

/// Counters collected during one local-search run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub iterations: usize,
    pub accepted: usize,
    /// Neighbors discarded by the coverage check
    pub infeasible: usize,
    /// Iterations where the drawn move kind had nothing to act on
    pub skipped: usize,
    /// Best objective after each improvement, starting with the initial value
    pub best_trace: Vec<f64>,
}

/// Best candidate of a run plus its counters
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub best: Candidate,
    pub stats: RunStats,
}

/// Trait for bounded-time local search runs
pub trait LocalSearch {
    /// Run once until `deadline` (or an internal stopping rule).
    ///
    /// `restart` counts the runs already made by the caller. Fails only with
    /// [`SolverError::Infeasible`] when the all-open configuration does not
    /// cover every client.
    fn run(
        &self,
        problem: &Problem<'_>,
        restart: usize,
        deadline: Instant,
        rng: &mut ChaCha8Rng,
    ) -> Result<RunOutcome>;

    fn name(&self) -> &str;
}

// ==================== Simulated Annealing ====================

/// Simulated annealing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Initial temperature
    pub initial_temperature: f64,
    /// The run stops once the temperature falls below this
    pub min_temperature: f64,
    /// Geometric cooling factor applied after every evaluated neighbor
    pub cooling_rate: f64,
    /// Iteration cap is `iteration_factor * F^2` for F facilities
    pub iteration_factor: usize,
    /// Lower bound on the temperature used in the acceptance probability
    pub temperature_floor: f64,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        AnnealingConfig {
            initial_temperature: 1.0,
            min_temperature: 1e-4,
            cooling_rate: 0.995,
            iteration_factor: 10,
            temperature_floor: 1e-9,
        }
    }
}

impl AnnealingConfig {
    pub fn max_iterations(&self, num_facilities: usize) -> usize {
        self.iteration_factor
            .saturating_mul(num_facilities)
            .saturating_mul(num_facilities)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(SolverError::InvalidConfig(msg));
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return fail(format!("initial_temperature must be positive, got {}", self.initial_temperature));
        }
        if !(self.min_temperature > 0.0) {
            return fail(format!("min_temperature must be positive, got {}", self.min_temperature));
        }
        if self.min_temperature >= self.initial_temperature {
            return fail("min_temperature must be less than initial_temperature".to_string());
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return fail(format!("cooling_rate must be in (0, 1), got {}", self.cooling_rate));
        }
        if self.iteration_factor == 0 {
            return fail("iteration_factor must be at least 1".to_string());
        }
        if !(self.temperature_floor > 0.0) {
            return fail(format!("temperature_floor must be positive, got {}", self.temperature_floor));
        }
        Ok(())
    }
}

/// Simulated Annealing
///
/// Metaheuristic that accepts worse feasible solutions with decreasing
/// probability. Each run starts from every facility open.
#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    pub config: AnnealingConfig,
    pub moves: MoveGenerator,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Self {
        SimulatedAnnealing { config, moves: MoveGenerator::new() }
    }

    pub fn with_moves(mut self, moves: MoveGenerator) -> Self {
        self.moves = moves;
        self
    }

    /// Metropolis rule: improvements always pass, worsening moves pass with
    /// probability `exp(-delta / T)`.
    fn accept(&self, delta: f64, temperature: f64, rng: &mut ChaCha8Rng) -> bool {
        if delta <= 0.0 {
            return true;
        }
        let prob = (-delta / temperature.max(self.config.temperature_floor)).exp();
        rng.gen::<f64>() < prob
    }

    /// Anneal from an arbitrary feasible starting candidate
    pub fn run_from(
        &self,
        problem: &Problem<'_>,
        start: Candidate,
        deadline: Instant,
        rng: &mut ChaCha8Rng,
    ) -> RunOutcome {
        let num_facilities = problem.num_facilities();
        let max_iterations = self.config.max_iterations(num_facilities);

        let mut stats = RunStats::default();
        let mut current = start;
        let mut best = current.clone();
        stats.best_trace.push(best.objective);

        let mut temp = self.config.initial_temperature;

        while stats.iterations < max_iterations
            && temp > self.config.min_temperature
            && Instant::now() < deadline
        {
            stats.iterations += 1;

            let Some(mv) = self.moves.propose(&current.open, num_facilities, rng) else {
                stats.skipped += 1;
                continue;
            };
            let Some(neighbor) = problem.evaluate(mv.apply(&current.open)) else {
                stats.infeasible += 1;
                continue;
            };

            let delta = neighbor.objective - current.objective;
            if self.accept(delta, temp, rng) {
                stats.accepted += 1;
                if neighbor.improves_on(&best) {
                    log::trace!(
                        "SA improvement via {:?}: {} open, objective {:.4}",
                        mv,
                        neighbor.num_open(),
                        neighbor.objective
                    );
                    best = neighbor.clone();
                    stats.best_trace.push(best.objective);
                }
                current = neighbor;
            }

            temp *= self.config.cooling_rate;
        }

        log::debug!(
            "SA run: {} iterations ({} accepted, {} infeasible, {} skipped), final T {:.3e}, best {:.4}",
            stats.iterations,
            stats.accepted,
            stats.infeasible,
            stats.skipped,
            temp,
            best.objective
        );

        RunOutcome { best, stats }
    }
}

impl LocalSearch for SimulatedAnnealing {
    fn run(
        &self,
        problem: &Problem<'_>,
        _restart: usize,
        deadline: Instant,
        rng: &mut ChaCha8Rng,
    ) -> Result<RunOutcome> {
        let start = problem.baseline()?;
        Ok(self.run_from(problem, start, deadline, rng))
    }

    fn name(&self) -> &str {
        "SimulatedAnnealing"
    }
}

// ==================== Best-Improvement Descent ====================

/// Descent parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DescentConfig {
    /// Probability that a facility starts open on restarts after the first
    pub restart_open_probability: f64,
    /// Objectives closer than this count as ties
    pub tie_tolerance: f64,
}

impl Default for DescentConfig {
    fn default() -> Self {
        DescentConfig { restart_open_probability: 0.5, tie_tolerance: 1e-9 }
    }
}

impl DescentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.restart_open_probability) {
            return Err(SolverError::InvalidConfig(format!(
                "restart_open_probability must be in [0, 1], got {}",
                self.restart_open_probability
            )));
        }
        if !(self.tie_tolerance >= 0.0) {
            return Err(SolverError::InvalidConfig("tie_tolerance must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Best-improvement descent
///
/// Scans every feasible neighbor, applies the best strictly improving one
/// (random choice among ties), stops at a local optimum. The first run
/// starts from every facility open; later runs start from a random open-set
/// repaired until it covers every client.
#[derive(Debug, Clone, Default)]
pub struct DescentSearch {
    pub config: DescentConfig,
    pub moves: MoveGenerator,
}

impl DescentSearch {
    pub fn new(config: DescentConfig) -> Self {
        DescentSearch { config, moves: MoveGenerator::new() }
    }

    /// Random open-set, then open facilities covering the first uncovered
    /// client until none is left.
    fn random_start(&self, problem: &Problem<'_>, baseline: &Candidate, rng: &mut ChaCha8Rng) -> Candidate {
        let num_facilities = problem.num_facilities();
        let mut open: OpenSet = (0..num_facilities)
            .filter(|_| rng.gen_bool(self.config.restart_open_probability))
            .collect();
        if open.is_empty() {
            open.insert(rng.gen_range(0..num_facilities));
        }

        while let Some(c) = first_uncovered(&open, &problem.matrix, problem.coverage()) {
            let row = problem.matrix.row(c);
            let reaching: Vec<usize> = (0..num_facilities)
                .filter(|&f| row[f] <= problem.coverage())
                .collect();
            match reaching.choose(rng) {
                Some(&f) => {
                    open.insert(f);
                }
                None => break,
            }
        }

        problem.evaluate(open).unwrap_or_else(|| baseline.clone())
    }

    /// Best strictly improving neighbor, ties broken at random.
    ///
    /// `None` at a local optimum or once the deadline passes mid-scan.
    fn best_neighbor(
        &self,
        problem: &Problem<'_>,
        current: &Candidate,
        deadline: Instant,
        stats: &mut RunStats,
        rng: &mut ChaCha8Rng,
    ) -> Option<(Move, Candidate)> {
        let tol = self.config.tie_tolerance;
        let mut ties: Vec<(Move, Candidate)> = Vec::new();
        let mut best_value = f64::INFINITY;

        for mv in self.moves.enumerate(&current.open, problem.num_facilities()) {
            if Instant::now() >= deadline {
                return None;
            }
            let Some(neighbor) = problem.evaluate(mv.apply(&current.open)) else {
                stats.infeasible += 1;
                continue;
            };
            if neighbor.objective >= current.objective - tol {
                continue;
            }
            if neighbor.objective < best_value - tol {
                best_value = neighbor.objective;
                ties.clear();
                ties.push((mv, neighbor));
            } else if (neighbor.objective - best_value).abs() <= tol {
                ties.push((mv, neighbor));
            }
        }

        if ties.is_empty() {
            return None;
        }
        let pick = rng.gen_range(0..ties.len());
        Some(ties.swap_remove(pick))
    }
}

impl LocalSearch for DescentSearch {
    fn run(
        &self,
        problem: &Problem<'_>,
        restart: usize,
        deadline: Instant,
        rng: &mut ChaCha8Rng,
    ) -> Result<RunOutcome> {
        let baseline = problem.baseline()?;
        let mut current = if restart == 0 {
            baseline
        } else {
            self.random_start(problem, &baseline, rng)
        };

        let mut stats = RunStats::default();
        stats.best_trace.push(current.objective);

        while Instant::now() < deadline {
            stats.iterations += 1;
            match self.best_neighbor(problem, &current, deadline, &mut stats, rng) {
                Some((mv, next)) => {
                    log::trace!("descent step {:?}: objective {:.4}", mv, next.objective);
                    stats.accepted += 1;
                    stats.best_trace.push(next.objective);
                    current = next;
                }
                None => break,
            }
        }

        log::debug!(
            "descent run {}: {} steps, {} open, objective {:.4}",
            restart,
            stats.accepted,
            current.num_open(),
            current.objective
        );

        Ok(RunOutcome { best: current, stats })
    }

    fn name(&self) -> &str {
        "Descent"
    }
}
