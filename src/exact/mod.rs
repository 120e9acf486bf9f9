//! Exact reference solver for small instances.
//!
//! Enumerates open-sets by increasing size. The first size admitting a
//! feasible set gives the minimum facility count; among the sets of that
//! size the one with the smallest total distance wins. This is the true
//! lexicographic optimum, independent of the open-facility weight.

use std::time::{Duration, Instant};

use crate::error::{Result, SolverError};
use crate::problem::Problem;
use crate::solution::{Candidate, OpenSet, Solution};

/// Exact solver configuration
#[derive(Debug, Clone)]
pub struct ExactConfig {
    /// Refuse instances with more facilities than this
    pub max_facilities: usize,
    /// Time limit in seconds
    pub time_limit: Option<f64>,
}

impl Default for ExactConfig {
    fn default() -> Self {
        ExactConfig { max_facilities: 24, time_limit: None }
    }
}

/// Lexicographic successor of a `k`-combination of `0..n`, in place.
/// Returns `false` once the last combination has been passed.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let k = indices.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if indices[i] < n - k + i {
            indices[i] += 1;
            for j in i + 1..k {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

/// Brute-force solver
pub struct ExactSolver {
    config: ExactConfig,
}

impl ExactSolver {
    pub fn new(config: ExactConfig) -> Self {
        ExactSolver { config }
    }

    pub fn solve(&self, problem: &Problem<'_>) -> Result<Solution> {
        let start = Instant::now();
        let n = problem.num_facilities();
        if n > self.config.max_facilities {
            return Err(SolverError::ExactLimit { facilities: n, limit: self.config.max_facilities });
        }
        let deadline = match self.config.time_limit {
            Some(t) => {
                let budget = Duration::try_from_secs_f64(t)
                    .map_err(|e| SolverError::InvalidConfig(format!("time limit {}: {}", t, e)))?;
                start.checked_add(budget)
            }
            None => None,
        };

        // Also rejects instances that no open-set can cover.
        problem.baseline()?;

        let mut examined = 0usize;
        for size in 1..=n {
            let mut best: Option<Candidate> = None;
            let mut indices: Vec<usize> = (0..size).collect();
            loop {
                if deadline.map_or(false, |d| Instant::now() >= d) {
                    return Err(SolverError::ExactTimeout);
                }
                examined += 1;
                let open: OpenSet = indices.iter().copied().collect();
                if let Some(cand) = problem.evaluate(open) {
                    let better = best
                        .as_ref()
                        .map_or(true, |b| cand.total_distance() < b.total_distance());
                    if better {
                        best = Some(cand);
                    }
                }
                if !next_combination(&mut indices, n) {
                    break;
                }
            }

            if let Some(best) = best {
                log::debug!(
                    "exact: {} facilities suffice, distance {:.4}, {} subsets examined",
                    size,
                    best.total_distance(),
                    examined
                );
                let mut solution = Solution::from_candidate(problem, best, "Exact");
                solution.runs = 1;
                solution.iterations = examined;
                solution.computation_time = start.elapsed().as_secs_f64();
                return Ok(solution);
            }
        }

        // Unreachable when the baseline is feasible: size n is the all-open set.
        let baseline = problem.baseline()?;
        Ok(Solution::from_candidate(problem, baseline, "Exact"))
    }
}
