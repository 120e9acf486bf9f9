//! Facility Coverage Solver Library
//!
//! Anytime solver for the coverage-constrained facility location problem:
//! open as few facilities as possible so that every client lies within the
//! coverage distance of an open facility, then minimize the total
//! client-to-facility distance.
//!
//! # Features
//!
//! - Simulated annealing over OPEN / CLOSE / SWAP moves with a hard coverage filter
//! - Anytime restart driver with geometrically shrinking time slices
//! - Randomized greedy construction, best-improvement descent and a brute-force
//!   exact solver for comparison
//! - Instance generator and benchmarking tools
//!
//! # Example
//!
//! ```no_run
//! use facility_coverage_solver::heuristics::anytime::{AnytimeConfig, AnytimeSolver};
//! use facility_coverage_solver::instance::Instance;
//! use facility_coverage_solver::heuristics::local_search::SimulatedAnnealing;
//! use facility_coverage_solver::objective::OpenWeight;
//! use facility_coverage_solver::problem::Problem;
//!
//! let instance = Instance::from_file("instance.txt").unwrap();
//! let problem = Problem::new(&instance, OpenWeight::Auto);
//!
//! let config = AnytimeConfig { time_limit: 5.0, seed: Some(42), ..Default::default() };
//! let solution = AnytimeSolver::new(config, SimulatedAnnealing::default())
//!     .solve(&problem)
//!     .unwrap();
//!
//! println!("{} open, distance {:.4}", solution.num_open(), solution.total_distance);
//! ```

pub mod error;
pub mod instance;
pub mod distance;
pub mod assignment;
pub mod objective;
pub mod problem;
pub mod solution;
pub mod heuristics;
pub mod exact;
pub mod generator;
pub mod output;
pub mod config;
pub mod benchmark;

pub use error::{Result, SolverError};
pub use instance::Instance;
pub use problem::Problem;
pub use solution::Solution;
