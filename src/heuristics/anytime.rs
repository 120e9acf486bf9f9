//! Anytime restart driver.
//!
//! Repeats a [`LocalSearch`] run under a global wall-clock budget. Each run
//! gets a fixed fraction of whatever time remains, so budgets shrink
//! geometrically and many runs fit even in a short limit.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, SolverError};
use crate::heuristics::local_search::LocalSearch;
use crate::problem::Problem;
use crate::solution::Solution;

/// Anytime driver parameters
#[derive(Debug, Clone)]
pub struct AnytimeConfig {
    /// Global budget in seconds
    pub time_limit: f64,
    /// Share of the remaining time given to each run
    pub slice_fraction: f64,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for AnytimeConfig {
    fn default() -> Self {
        AnytimeConfig { time_limit: 10.0, slice_fraction: 0.25, seed: None }
    }
}

impl AnytimeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.time_limit.is_finite() && self.time_limit >= 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "time limit must be non-negative and finite, got {}",
                self.time_limit
            )));
        }
        if !(self.slice_fraction > 0.0 && self.slice_fraction <= 1.0) {
            return Err(SolverError::InvalidConfig(format!(
                "slice fraction must be in (0, 1], got {}",
                self.slice_fraction
            )));
        }
        Ok(())
    }

    fn budget(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.time_limit)
            .map_err(|e| SolverError::InvalidConfig(format!("time limit {}: {}", self.time_limit, e)))
    }
}

/// Runs a local search repeatedly until the global deadline
pub struct AnytimeSolver<S: LocalSearch> {
    pub config: AnytimeConfig,
    pub search: S,
}

impl<S: LocalSearch> AnytimeSolver<S> {
    pub fn new(config: AnytimeConfig, search: S) -> Self {
        AnytimeSolver { config, search }
    }

    fn run_deadline(&self, deadline: Instant) -> Instant {
        let now = Instant::now();
        let remaining = deadline.saturating_duration_since(now);
        now + remaining.mul_f64(self.config.slice_fraction)
    }

    /// Best feasible solution found before the deadline.
    ///
    /// The first run always happens, even with a zero budget, so the
    /// all-open configuration is the worst possible answer. Fails with
    /// [`SolverError::Infeasible`] when that first run finds the instance
    /// infeasible.
    pub fn solve(&self, problem: &Problem<'_>) -> Result<Solution> {
        self.config.validate()?;
        let start = Instant::now();
        let deadline = start
            .checked_add(self.config.budget()?)
            .ok_or_else(|| SolverError::InvalidConfig(format!("time limit {} too large", self.config.time_limit)))?;

        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let first = self.search.run(problem, 0, self.run_deadline(deadline), &mut rng)?;
        let mut runs = 1;
        let mut iterations = first.stats.iterations;
        let mut best = first.best;
        log::info!(
            "{} run 0: {} open, distance {:.4}",
            self.search.name(),
            best.num_open(),
            best.total_distance()
        );

        while Instant::now() < deadline {
            let outcome = match self.search.run(problem, runs, self.run_deadline(deadline), &mut rng) {
                Ok(outcome) => outcome,
                Err(e) if e.is_infeasible() => {
                    log::warn!("run {} reported infeasibility, keeping best so far: {}", runs, e);
                    break;
                }
                Err(e) => return Err(e),
            };
            iterations += outcome.stats.iterations;

            if outcome.best.improves_on(&best) {
                log::info!(
                    "{} run {}: new best {} open, distance {:.4}",
                    self.search.name(),
                    runs,
                    outcome.best.num_open(),
                    outcome.best.total_distance()
                );
                best = outcome.best;
            }
            runs += 1;
        }

        let mut solution = Solution::from_candidate(problem, best, self.search.name());
        solution.runs = runs;
        solution.iterations = iterations;
        solution.computation_time = start.elapsed().as_secs_f64();

        log::info!(
            "{} finished: {} runs, {} iterations, {:.3}s",
            solution.algorithm,
            solution.runs,
            solution.iterations,
            solution.computation_time
        );

        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::{ExactConfig, ExactSolver};
    use crate::generator::{GeneratorConfig, InstanceGenerator};
    use crate::instance::{Client, Facility, Instance};
    use crate::heuristics::local_search::{DescentSearch, SimulatedAnnealing};
    use crate::objective::OpenWeight;

    fn annealer(time_limit: f64, seed: u64) -> AnytimeSolver<SimulatedAnnealing> {
        AnytimeSolver::new(
            AnytimeConfig { time_limit, seed: Some(seed), ..Default::default() },
            SimulatedAnnealing::default(),
        )
    }

    fn assert_covers(sol: &Solution, problem: &Problem<'_>) {
        assert!(sol.covers_all(problem));
    }

    #[test]
    fn test_single_facility_sufficient() {
        let inst = Instance::new(
            "one",
            vec![Client::new("C1", 0.0, 0.0)],
            vec![Facility::new("F1", 3.0, 4.0, false)],
            5.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let sol = annealer(0.05, 1).solve(&problem).unwrap();

        assert_eq!(sol.open, vec![0]);
        assert_eq!(sol.assignment, vec![0]);
        assert!((sol.total_distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_facilities_needed() {
        let inst = Instance::new(
            "three",
            vec![
                Client::new("C1", 0.0, 0.0),
                Client::new("C2", 100.0, 0.0),
                Client::new("C3", 0.0, 100.0),
            ],
            vec![
                Facility::new("F1", 1.0, 0.0, false),
                Facility::new("F2", 101.0, 0.0, false),
                Facility::new("F3", 0.0, 101.0, false),
            ],
            5.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let sol = annealer(0.05, 2).solve(&problem).unwrap();

        assert_eq!(sol.num_open(), 3);
        assert_covers(&sol, &problem);
    }

    #[test]
    fn test_colocated_pairs_tiny_coverage() {
        let inst = Instance::new(
            "pairs",
            vec![Client::new("C1", 0.0, 0.0), Client::new("C2", 10.0, 0.0)],
            vec![Facility::new("F1", 0.0, 0.0, false), Facility::new("F2", 10.0, 0.0, false)],
            0.01,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let sol = annealer(0.05, 3).solve(&problem).unwrap();

        assert_eq!(sol.open, vec![0, 1]);
        assert_eq!(sol.assignment, vec![0, 1]);
        assert!(sol.total_distance.abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_instance_is_fatal() {
        let inst = Instance::new(
            "far",
            vec![Client::new("C1", 0.0, 0.0)],
            vec![Facility::new("F1", 100.0, 100.0, false)],
            1.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let err = annealer(0.05, 4).solve(&problem).unwrap_err();
        assert!(matches!(err, SolverError::Infeasible { .. }));
    }

    #[test]
    fn test_zero_budget_returns_baseline() {
        let inst = Instance::new(
            "zero",
            vec![Client::new("C1", 0.0, 0.0), Client::new("C2", 1.0, 0.0)],
            vec![Facility::new("F1", 0.0, 0.0, false), Facility::new("F2", 1.0, 0.0, false)],
            5.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let sol = annealer(0.0, 5).solve(&problem).unwrap();

        assert_eq!(sol.runs, 1);
        assert_eq!(sol.iterations, 0);
        assert_eq!(sol.open, vec![0, 1]);
        assert_covers(&sol, &problem);
    }

    #[test]
    fn test_more_time_is_not_worse() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let config = GeneratorConfig { num_clients: 25, num_facilities: 12, coverage: 30.0, grid: 100.0 };
        let inst = InstanceGenerator::new(config).unwrap().generate_feasible("mono", &mut rng);
        let problem = Problem::new(&inst, OpenWeight::Auto);

        let short = annealer(0.02, 11).solve(&problem).unwrap();
        let long = annealer(0.3, 11).solve(&problem).unwrap();

        assert!(long.objective <= short.objective + 1e-9);
        assert!(long.runs >= short.runs);
    }

    #[test]
    fn test_random_instances_respect_coverage_and_exact_bound() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let config = GeneratorConfig { num_clients: 15, num_facilities: 8, coverage: 35.0, grid: 100.0 };
        let exact = ExactSolver::new(ExactConfig::default());

        for i in 0..5 {
            let inst = InstanceGenerator::new(config.clone()).unwrap().generate_feasible(&format!("r{}", i), &mut rng);
            let problem = Problem::new(&inst, OpenWeight::Auto);
            let sol = annealer(0.05, i).solve(&problem).unwrap();
            let optimum = exact.solve(&problem).unwrap();

            assert_covers(&sol, &problem);
            assert!(sol.num_open() >= optimum.num_open());
            assert!(sol.objective >= optimum.objective - 1e-6);
        }
    }

    #[test]
    fn test_descent_under_driver() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let config = GeneratorConfig { num_clients: 20, num_facilities: 10, coverage: 30.0, grid: 100.0 };
        let inst = InstanceGenerator::new(config).unwrap().generate_feasible("desc", &mut rng);
        let problem = Problem::new(&inst, OpenWeight::Auto);

        let solver = AnytimeSolver::new(
            AnytimeConfig { time_limit: 0.1, seed: Some(9), ..Default::default() },
            DescentSearch::default(),
        );
        let sol = solver.solve(&problem).unwrap();
        assert_eq!(sol.algorithm, "Descent");
        assert!(sol.runs >= 1);
        assert_covers(&sol, &problem);
    }

    #[test]
    fn test_invalid_time_limit() {
        let inst = Instance::new("x", vec![], vec![Facility::new("F1", 0.0, 0.0, false)], 1.0);
        let problem = Problem::new(&inst, OpenWeight::Auto);
        assert!(annealer(-1.0, 0).solve(&problem).is_err());
        assert!(annealer(f64::NAN, 0).solve(&problem).is_err());
    }
}
