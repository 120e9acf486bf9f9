//! Benchmarking and experimentation module.
//!
//! Runs the anytime annealer, the descent baseline and the randomized greedy
//! over several seeds, the exact solver when the instance is small enough,
//! and aggregates the results per algorithm. Without an exact optimum the
//! facility-count gap is measured against the greedy set-cover estimate.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::SolverConfig;
use crate::error::Result;
use crate::exact::{ExactConfig, ExactSolver};
use crate::heuristics::anytime::AnytimeSolver;
use crate::heuristics::construction::{open_count_bound, GreedyConstruction, OpenCountBound};
use crate::heuristics::local_search::{DescentSearch, LocalSearch, SimulatedAnnealing};
use crate::instance::Instance;
use crate::problem::Problem;
use crate::solution::Solution;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    pub algorithm: String,
    pub instance: String,
    pub num_clients: usize,
    pub num_facilities: usize,
    /// Seed of the run; `None` for deterministic solvers
    pub seed: Option<u64>,
    pub num_open: usize,
    pub total_distance: f64,
    pub objective: f64,
    /// Computation time in seconds
    pub time: f64,
    pub runs: usize,
    pub iterations: usize,
    /// Facilities that are some client's only option
    pub lower_bound: Option<usize>,
    /// Extra facilities opened compared with the exact optimum, or with the
    /// set-cover estimate when no optimum is known
    pub open_gap: Option<usize>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub num_results: usize,
    /// Results matching the reference facility count
    pub num_optimal: usize,
    pub avg_open: f64,
    pub best_open: usize,
    pub avg_distance: f64,
    pub std_distance: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of seeds per stochastic algorithm
    pub num_runs: usize,
    /// Time limit per run in seconds
    pub time_limit: f64,
    pub run_exact: bool,
    /// Exact solver only runs up to this many facilities
    pub exact_max_facilities: usize,
    pub exact_time_limit: f64,
    /// Run seeds in parallel
    pub parallel: bool,
    pub solver: SolverConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            time_limit: 1.0,
            run_exact: true,
            exact_max_facilities: 20,
            exact_time_limit: 60.0,
            parallel: true,
            solver: SolverConfig::default(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    /// Exact facility count per instance
    best_known: HashMap<String, usize>,
    bounds: HashMap<String, OpenCountBound>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark { config, results: Vec::new(), best_known: HashMap::new(), bounds: HashMap::new() }
    }

    /// Set the known optimal facility count for an instance
    pub fn set_best_known(&mut self, instance_name: &str, num_open: usize) {
        self.best_known.insert(instance_name.to_string(), num_open);
    }

    /// Run the exact solver if enabled and the instance is small enough
    pub fn run_exact(&mut self, problem: &Problem<'_>) -> Option<Solution> {
        if !self.config.run_exact || problem.num_facilities() > self.config.exact_max_facilities {
            return None;
        }
        let solver = ExactSolver::new(ExactConfig {
            max_facilities: self.config.exact_max_facilities,
            time_limit: Some(self.config.exact_time_limit),
        });
        match solver.solve(problem) {
            Ok(solution) => {
                self.best_known
                    .insert(problem.instance.name.clone(), solution.num_open());
                self.record_result(problem.instance, &solution, None);
                Some(solution)
            }
            Err(e) => {
                log::error!("exact solver failed on {}: {}", problem.instance.name, e);
                None
            }
        }
    }

    /// Run one anytime algorithm for every seed
    fn run_seeds<S, F>(&mut self, problem: &Problem<'_>, make_search: F)
    where
        S: LocalSearch,
        F: Fn() -> S + Sync,
    {
        let run = |seed: u64| -> Result<Solution> {
            let anytime = self.config.solver.anytime(self.config.time_limit, Some(seed));
            AnytimeSolver::new(anytime, make_search()).solve(problem)
        };

        let seeds: Vec<u64> = (0..self.config.num_runs as u64).collect();
        let outcomes: Vec<(u64, Result<Solution>)> = if self.config.parallel {
            seeds.into_par_iter().map(|s| (s, run(s))).collect()
        } else {
            seeds.into_iter().map(|s| (s, run(s))).collect()
        };

        for (seed, outcome) in outcomes {
            match outcome {
                Ok(solution) => self.record_result(problem.instance, &solution, Some(seed)),
                Err(e) => log::warn!("{} seed {}: {}", problem.instance.name, seed, e),
            }
        }
    }

    /// Run full benchmark on an instance
    pub fn run_full_benchmark(&mut self, instance: &Instance) {
        log::info!("Running benchmark on instance: {}", instance.name);
        let problem = Problem::new(instance, self.config.solver.open_weight);

        if let Some(bound) = open_count_bound(&problem) {
            log::debug!(
                "{}: {} forced facilities, set-cover estimate {}",
                instance.name,
                bound.forced,
                bound.estimate
            );
            self.bounds.insert(instance.name.clone(), bound);
        }

        self.run_exact(&problem);

        let annealing = self.config.solver.annealing.clone();
        self.run_seeds(&problem, || SimulatedAnnealing::new(annealing.clone()));

        let descent = self.config.solver.descent.clone();
        self.run_seeds(&problem, || DescentSearch::new(descent.clone()));

        let greedy = self.config.solver.greedy.clone();
        self.run_seeds(&problem, || GreedyConstruction::new(greedy.clone()));
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[Instance]) {
        for instance in instances {
            self.run_full_benchmark(instance);
        }
    }

    /// Record a result
    fn record_result(&mut self, instance: &Instance, solution: &Solution, seed: Option<u64>) {
        let bound = self.bounds.get(&instance.name).copied();
        let reference = self
            .best_known
            .get(&instance.name)
            .copied()
            .or_else(|| bound.map(|b| b.estimate));
        let open_gap = reference.map(|r| solution.num_open().saturating_sub(r));

        self.results.push(AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: instance.name.clone(),
            num_clients: instance.num_clients(),
            num_facilities: instance.num_facilities(),
            seed,
            num_open: solution.num_open(),
            total_distance: solution.total_distance,
            objective: solution.objective,
            time: solution.computation_time,
            runs: solution.runs,
            iterations: solution.iterations,
            lower_bound: bound.map(|b| b.forced),
            open_gap,
        });
    }

    /// Compute statistics for each algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut by_algorithm: HashMap<&str, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            by_algorithm
                .entry(result.algorithm.as_str())
                .or_default()
                .push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = by_algorithm
            .into_iter()
            .map(|(algo, results)| {
                let opens: Vec<f64> = results.iter().map(|r| r.num_open as f64).collect();
                let distances: Vec<f64> = results.iter().map(|r| r.total_distance).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();
                let std_distance = if distances.len() > 1 { distances.iter().std_dev() } else { 0.0 };

                AlgorithmStatistics {
                    algorithm: algo.to_string(),
                    num_results: results.len(),
                    num_optimal: results.iter().filter(|r| r.open_gap == Some(0)).count(),
                    avg_open: opens.iter().mean(),
                    best_open: results.iter().map(|r| r.num_open).fold(usize::MAX, usize::min),
                    avg_distance: distances.iter().mean(),
                    std_distance,
                    avg_time: times.iter().mean(),
                    total_time: times.iter().sum(),
                }
            })
            .collect();

        statistics.sort_by_key(|s| (OrderedFloat(s.avg_open), OrderedFloat(s.avg_distance)));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for result in &self.results {
            writer.serialize(result)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);
        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("   Facility Coverage Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str(&format!(
            "Runs per algorithm: {}, time limit: {:.2}s\n\n",
            self.config.num_runs, self.config.time_limit
        ));

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str(&"-".repeat(88));
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>8} {:>9} {:>9} {:>12} {:>12} {:>10}\n",
            "Algorithm", "Results", "Optimal", "Avg Open", "Avg Dist", "Std Dist", "Avg Time"
        ));
        report.push_str(&"-".repeat(88));
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<20} {:>8} {:>9} {:>9.2} {:>12.4} {:>12.4} {:>10.4}\n",
                stat.algorithm,
                stat.num_results,
                stat.num_optimal,
                stat.avg_open,
                stat.avg_distance,
                stat.std_distance,
                stat.avg_time
            ));
        }

        report.push_str(&"-".repeat(88));
        report.push('\n');

        report.push_str("\nBest Solutions per Instance:\n");
        let mut instance_best: HashMap<&str, &AlgorithmResult> = HashMap::new();
        for result in &self.results {
            let entry = instance_best.entry(result.instance.as_str()).or_insert(result);
            if OrderedFloat(result.objective) < OrderedFloat(entry.objective) {
                *entry = result;
            }
        }
        let mut names: Vec<&str> = instance_best.keys().copied().collect();
        names.sort();
        for name in names {
            let best = instance_best[name];
            report.push_str(&format!(
                "  {}: {} open, distance {:.4} ({})\n",
                name, best.num_open, best.total_distance, best.algorithm
            ));
        }

        report
    }

    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    pub fn best_known(&self) -> &HashMap<String, usize> {
        &self.best_known
    }

    pub fn bound(&self, instance_name: &str) -> Option<&OpenCountBound> {
        self.bounds.get(instance_name)
    }
}

/// Load every `.txt` instance in a directory, smallest first.
///
/// Files that fail to parse are skipped with a warning.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<Instance>> {
    let mut instances = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |e| e == "txt") {
            match Instance::from_file(&path) {
                Ok(instance) => instances.push(instance),
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
    }

    instances.sort_by(|a, b| {
        (a.num_facilities(), a.num_clients(), &a.name).cmp(&(b.num_facilities(), b.num_clients(), &b.name))
    });
    Ok(instances)
}
