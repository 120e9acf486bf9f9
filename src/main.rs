//! Facility Coverage Solver - Command Line Interface
//!
//! Reads an instance from a file or stdin, solves it within the time limit
//! and prints the solution report on stdout.

use clap::{Parser, ValueEnum};
use facility_coverage_solver::config::SolverConfig;
use facility_coverage_solver::exact::{ExactConfig, ExactSolver};
use facility_coverage_solver::heuristics::anytime::AnytimeSolver;
use facility_coverage_solver::heuristics::construction::GreedyConstruction;
use facility_coverage_solver::heuristics::local_search::{DescentSearch, SimulatedAnnealing};
use facility_coverage_solver::instance::Instance;
use facility_coverage_solver::objective::OpenWeight;
use facility_coverage_solver::output::write_solution;
use facility_coverage_solver::problem::Problem;
use facility_coverage_solver::{Result, Solution};

use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "facility-coverage-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Anytime solver for coverage-constrained facility location")]
struct Cli {
    /// Time limit in seconds
    #[arg(short = 't', long = "time-limit")]
    time_limit: f64,

    /// Instance file; reads stdin when absent or "-"
    input: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Algorithm to use
    #[arg(short, long, value_enum, default_value = "annealing")]
    algorithm: Algorithm,

    /// Fixed weight per open facility (default: derived from the instance)
    #[arg(long)]
    open_weight: Option<f64>,

    /// JSON solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the solution as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Simulated annealing under the anytime driver
    Annealing,
    /// Best-improvement descent under the anytime driver
    Descent,
    /// Randomized greedy construction under the anytime driver
    Greedy,
    /// Brute-force enumeration (small instances only)
    Exact,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        let code = if e.is_infeasible() { 2 } else { 1 };
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };
    if let Some(w) = cli.open_weight {
        config.open_weight = OpenWeight::Fixed(w);
    }
    config.validate()?;

    let instance = Instance::load(cli.input.as_deref())?;
    if cli.verbose {
        eprintln!("{}", instance.statistics());
    }

    let problem = Problem::new(&instance, config.open_weight);
    log::info!("open facility weight: {}", problem.objective.weight);

    let solution = solve(cli, &config, &problem)?;

    if cli.verbose {
        eprintln!("{}", solution);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_solution(&mut out, &instance, &solution)?;
    out.flush()?;

    if let Some(path) = &cli.json {
        let json = serde_json::to_string_pretty(&solution).map_err(std::io::Error::from)?;
        std::fs::write(path, json)?;
        log::info!("solution saved to {}", path.display());
    }

    Ok(())
}

fn solve(cli: &Cli, config: &SolverConfig, problem: &Problem<'_>) -> Result<Solution> {
    let anytime = config.anytime(cli.time_limit, cli.seed);
    match cli.algorithm {
        Algorithm::Annealing => {
            AnytimeSolver::new(anytime, SimulatedAnnealing::new(config.annealing.clone())).solve(problem)
        }
        Algorithm::Descent => {
            AnytimeSolver::new(anytime, DescentSearch::new(config.descent.clone())).solve(problem)
        }
        Algorithm::Greedy => {
            AnytimeSolver::new(anytime, GreedyConstruction::new(config.greedy.clone())).solve(problem)
        }
        Algorithm::Exact => {
            anytime.validate()?;
            let exact = ExactConfig { time_limit: Some(cli.time_limit), ..Default::default() };
            ExactSolver::new(exact).solve(problem)
        }
    }
}
