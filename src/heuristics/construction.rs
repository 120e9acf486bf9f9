//! Randomized greedy construction and a cheap bound on the open count.
//!
//! The greedy opens one facility at a time, drawn with probability
//! proportional to `exp(beta * gain)` where `gain` is the number of still
//! uncovered clients the facility reaches. Repeated under the anytime driver
//! it becomes a randomized multi-start.

use std::time::Instant;

use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::heuristics::local_search::{LocalSearch, RunOutcome, RunStats};
use crate::problem::Problem;
use crate::solution::OpenSet;

/// `cover_sets[f]` lists the clients within range of facility `f`
fn cover_sets(problem: &Problem<'_>) -> Vec<Vec<usize>> {
    let coverage = problem.coverage();
    (0..problem.num_facilities())
        .map(|f| {
            (0..problem.matrix.num_clients())
                .filter(|&c| problem.matrix.get(c, f) <= coverage)
                .collect()
        })
        .collect()
}

/// Greedy parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GreedyConfig {
    /// Softmax sharpness; 0 picks uniformly among useful facilities,
    /// large values approach the deterministic greedy
    pub beta: f64,
}

impl Default for GreedyConfig {
    fn default() -> Self {
        GreedyConfig { beta: 0.15 }
    }
}

impl GreedyConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "greedy beta must be non-negative and finite, got {}",
                self.beta
            )));
        }
        Ok(())
    }
}

/// Randomized greedy construction
#[derive(Debug, Clone, Default)]
pub struct GreedyConstruction {
    pub config: GreedyConfig,
}

impl GreedyConstruction {
    pub fn new(config: GreedyConfig) -> Self {
        GreedyConstruction { config }
    }

    /// Build one open-set. Clients no facility can newly cover end up with
    /// their nearest facility opened.
    pub fn construct(&self, problem: &Problem<'_>, rng: &mut ChaCha8Rng) -> OpenSet {
        let covers = cover_sets(problem);
        let num_clients = problem.matrix.num_clients();
        let mut uncovered = vec![true; num_clients];
        let mut remaining = num_clients;
        let mut open = OpenSet::new();

        while remaining > 0 {
            let gains: Vec<(usize, usize)> = (0..problem.num_facilities())
                .filter(|f| !open.contains(f))
                .map(|f| (f, covers[f].iter().filter(|&&c| uncovered[c]).count()))
                .collect();
            let best_gain = gains.iter().map(|&(_, g)| g).max().unwrap_or(0);
            if best_gain == 0 {
                break;
            }

            // Shifted by the best gain so the weights never overflow.
            let beta = self.config.beta;
            let chosen = match gains.choose_weighted(rng, |&(_, g)| (beta * (g as f64 - best_gain as f64)).exp()) {
                Ok(&(f, _)) => f,
                Err(_) => gains
                    .iter()
                    .find(|&&(_, g)| g == best_gain)
                    .map_or(0, |&(f, _)| f),
            };

            open.insert(chosen);
            for &c in &covers[chosen] {
                if uncovered[c] {
                    uncovered[c] = false;
                    remaining -= 1;
                }
            }
        }

        for c in (0..num_clients).filter(|&c| uncovered[c]) {
            let row = problem.matrix.row(c);
            if let Some(nearest) = (0..row.len()).min_by_key(|&f| OrderedFloat(row[f])) {
                open.insert(nearest);
            }
        }

        if open.is_empty() && problem.num_facilities() > 0 {
            open.insert(0);
        }
        open
    }
}

impl LocalSearch for GreedyConstruction {
    fn run(
        &self,
        problem: &Problem<'_>,
        restart: usize,
        _deadline: Instant,
        rng: &mut ChaCha8Rng,
    ) -> Result<RunOutcome> {
        let baseline = problem.baseline()?;
        let open = self.construct(problem, rng);
        let steps = open.len();
        let best = problem.evaluate(open).unwrap_or(baseline);

        log::debug!(
            "greedy run {}: {} open, objective {:.4}",
            restart,
            best.num_open(),
            best.objective
        );

        let stats = RunStats {
            iterations: steps,
            accepted: steps,
            best_trace: vec![best.objective],
            ..Default::default()
        };
        Ok(RunOutcome { best, stats })
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}

/// Reference counts for the number of open facilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCountBound {
    /// Facilities that are the only option of some client; a true lower bound
    pub forced: usize,
    /// `forced` plus a deterministic greedy set cover of the remaining clients
    pub estimate: usize,
}

/// Forced facilities, then greedy set cover of what they leave uncovered.
///
/// `None` when some client has no facility in range.
pub fn open_count_bound(problem: &Problem<'_>) -> Option<OpenCountBound> {
    let covers = cover_sets(problem);
    let num_clients = problem.matrix.num_clients();
    let coverage = problem.coverage();

    let mut forced = OpenSet::new();
    for c in 0..num_clients {
        let row = problem.matrix.row(c);
        let mut options = (0..row.len()).filter(|&f| row[f] <= coverage);
        match (options.next(), options.next()) {
            (None, _) => return None,
            (Some(f), None) => {
                forced.insert(f);
            }
            _ => {}
        }
    }

    let mut uncovered = vec![true; num_clients];
    for &f in &forced {
        for &c in &covers[f] {
            uncovered[c] = false;
        }
    }

    let mut estimate = forced.len();
    loop {
        let best = (0..covers.len())
            .map(|f| (f, covers[f].iter().filter(|&&c| uncovered[c]).count()))
            .filter(|&(_, g)| g > 0)
            .max_by_key(|&(f, g)| (g, std::cmp::Reverse(f)));
        let Some((f, _)) = best else { break };
        estimate += 1;
        for &c in &covers[f] {
            uncovered[c] = false;
        }
    }

    Some(OpenCountBound { forced: forced.len(), estimate })
}
