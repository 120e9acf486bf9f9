//! Benchmark runner: every `.txt` instance in a directory, several seeds
//! per algorithm, CSV and text report in the output directory.

use clap::Parser;
use facility_coverage_solver::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use facility_coverage_solver::config::SolverConfig;
use facility_coverage_solver::Result;
use indicatif::{ProgressBar, ProgressStyle};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "benchmark")]
#[command(about = "Compare the coverage solvers on a directory of instances")]
struct Args {
    /// Directory containing instance files
    #[arg(short, long)]
    dir: PathBuf,

    /// Output directory for results
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Number of seeds per algorithm
    #[arg(short, long, default_value = "5")]
    runs: usize,

    /// Time limit per run in seconds
    #[arg(short, long, default_value = "1")]
    time_limit: f64,

    /// Skip the exact solver
    #[arg(long)]
    no_exact: bool,

    /// Exact solver is only run up to this many facilities
    #[arg(long, default_value = "20")]
    exact_max_facilities: usize,

    /// Exact solver time limit
    #[arg(long, default_value = "60")]
    exact_time_limit: f64,

    /// Run seeds one after the other
    #[arg(long)]
    sequential: bool,

    /// Maximum number of facilities
    #[arg(long)]
    max_size: Option<usize>,

    /// JSON solver configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let solver = match &args.config {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };

    println!("Loading instances from {:?}...", args.dir);
    let mut instances = load_instances_from_dir(&args.dir)?;
    if let Some(max) = args.max_size {
        instances.retain(|i| i.num_facilities() <= max);
    }
    println!("Found {} instances", instances.len());
    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(&args.output)?;

    let config = BenchmarkConfig {
        num_runs: args.runs,
        time_limit: args.time_limit,
        run_exact: !args.no_exact,
        exact_max_facilities: args.exact_max_facilities,
        exact_time_limit: args.exact_time_limit,
        parallel: !args.sequential,
        solver,
    };
    let mut benchmark = Benchmark::new(config);

    let progress = ProgressBar::new(instances.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}") {
        progress.set_style(style.progress_chars("=>-"));
    }
    for instance in &instances {
        progress.set_message(format!(
            "{} ({} clients, {} facilities)",
            instance.name,
            instance.num_clients(),
            instance.num_facilities()
        ));
        benchmark.run_full_benchmark(instance);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let results_path = args.output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = args.output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = args.output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}
