//! Solution representation for the coverage problem.
//!
//! [`Candidate`] is the search state carried by the local-search engines;
//! [`Solution`] is the reported result with bookkeeping about the run
//! that produced it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::problem::Problem;

/// Indices of the open facilities, kept sorted
pub type OpenSet = BTreeSet<usize>;

/// Search state: an open-set with its derived assignment and objective.
///
/// Only ever built through [`Problem::evaluate`], so the assignment always
/// matches the open-set and is feasible.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub open: OpenSet,
    pub assignment: Assignment,
    pub objective: f64,
}

impl Candidate {
    #[inline]
    pub fn num_open(&self) -> usize {
        self.open.len()
    }

    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.assignment.total_distance
    }

    /// Strictly better objective than `other`
    #[inline]
    pub fn improves_on(&self, other: &Candidate) -> bool {
        self.objective < other.objective
    }
}

/// Represents a solution to the coverage problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Open facility indices, ascending
    pub open: Vec<usize>,
    /// Open facility names, in index order
    pub open_names: Vec<String>,
    /// `assignment[c]` is the facility index serving client `c`
    pub assignment: Vec<usize>,
    /// Sum of client-to-facility distances
    pub total_distance: f64,
    /// Scalar objective `num_open * weight + total_distance`
    pub objective: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of local-search runs (restarts)
    pub runs: usize,
    /// Total iterations over all runs
    pub iterations: usize,
}

impl Solution {
    pub fn from_candidate(problem: &Problem<'_>, candidate: Candidate, algorithm: &str) -> Self {
        let open: Vec<usize> = candidate.open.into_iter().collect();
        let open_names = open
            .iter()
            .map(|&j| problem.instance.facilities[j].name.clone())
            .collect();

        Solution {
            open,
            open_names,
            assignment: candidate.assignment.facility_of,
            total_distance: candidate.assignment.total_distance,
            objective: candidate.objective,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            runs: 0,
            iterations: 0,
        }
    }

    pub fn num_open(&self) -> usize {
        self.open.len()
    }

    /// Client indices served by `facility`
    pub fn clients_of(&self, facility: usize) -> Vec<usize> {
        self.assignment
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f == facility)
            .map(|(c, _)| c)
            .collect()
    }

    /// Check that every client is served by an open facility within range
    pub fn covers_all(&self, problem: &Problem<'_>) -> bool {
        self.assignment.len() == problem.instance.num_clients()
            && self.assignment.iter().enumerate().all(|(c, &f)| {
                self.open.binary_search(&f).is_ok() && problem.matrix.get(c, f) <= problem.coverage()
            })
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Open facilities: {}", self.num_open())?;
        writeln!(f, "  Total distance: {:.4}", self.total_distance)?;
        writeln!(f, "  Objective: {:.4}", self.objective)?;
        writeln!(f, "  Runs: {}", self.runs)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        write!(f, "  Time: {:.4}s", self.computation_time)
    }
}
