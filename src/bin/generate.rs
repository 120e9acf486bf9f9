//! Random instance generator.
//!
//! Writes instances in the solver's input format, either from a size preset
//! or from explicit dimensions.

use clap::{Parser, ValueEnum};
use facility_coverage_solver::generator::{GeneratorConfig, InstanceGenerator, Preset};
use facility_coverage_solver::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "generate")]
#[command(about = "Generate random coverage instances")]
struct Args {
    /// Size preset
    #[arg(short, long, value_enum, default_value = "small")]
    preset: PresetArg,

    /// Number of instances
    #[arg(short, long, default_value = "1")]
    count: usize,

    /// Random seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Output directory; a single instance goes to stdout when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the number of clients
    #[arg(long)]
    clients: Option<usize>,

    /// Override the number of facilities
    #[arg(long)]
    facilities: Option<usize>,

    /// Override the coverage distance
    #[arg(long)]
    coverage: Option<f64>,

    /// Override the grid size
    #[arg(long)]
    grid: Option<f64>,

    /// Move unreachable clients next to a facility
    #[arg(long)]
    feasible: bool,

    /// Log each written file
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum PresetArg {
    Small,
    Large,
    Extreme,
}

impl From<PresetArg> for Preset {
    fn from(p: PresetArg) -> Self {
        match p {
            PresetArg::Small => Preset::Small,
            PresetArg::Large => Preset::Large,
            PresetArg::Extreme => Preset::Extreme,
        }
    }
}

impl Args {
    fn apply_overrides(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(n) = self.clients {
            config.num_clients = n;
        }
        if let Some(n) = self.facilities {
            config.num_facilities = n;
        }
        if let Some(c) = self.coverage {
            config.coverage = c;
        }
        if let Some(g) = self.grid {
            config.grid = g;
        }
        config
    }
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
    let preset = Preset::from(args.preset);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    if let Some(dir) = &args.output {
        std::fs::create_dir_all(dir)?;
    }

    for i in 0..args.count {
        let config = args.apply_overrides(preset.config(&mut rng));
        let name = format!("{}_{:03}", preset.name(), i + 1);
        let generator = InstanceGenerator::new(config)?;
        let instance = if args.feasible {
            generator.generate_feasible(&name, &mut rng)
        } else {
            generator.generate(&name, &mut rng)
        };

        match &args.output {
            Some(dir) => {
                let path = dir.join(format!("{}.txt", name));
                let mut out = BufWriter::new(File::create(&path)?);
                instance.write_to(&mut out)?;
                out.flush()?;
                log::info!("wrote {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                if i > 0 {
                    writeln!(out)?;
                }
                instance.write_to(&mut out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use facility_coverage_solver::SolverError;

    #[test]
    fn test_verbose_flag() {
        let args = Args::try_parse_from(["generate", "-v", "--count", "2"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.count, 2);
        assert!(!Args::try_parse_from(["generate"]).unwrap().verbose);
    }

    #[test]
    fn test_negative_grid_is_rejected() {
        let args = Args::try_parse_from(["generate", "--grid=-5"]).unwrap();
        assert!(matches!(run(&args), Err(SolverError::InvalidConfig(_))));
    }
}
