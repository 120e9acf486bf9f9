//! Heuristic solvers for the coverage problem.
//!
//! - [`moves`]: OPEN / CLOSE / SWAP neighborhood
//! - [`local_search`]: simulated annealing and best-improvement descent
//! - [`construction`]: randomized greedy construction and the open-count bound
//! - [`anytime`]: restart driver shared by all of them

pub mod moves;
pub mod local_search;
pub mod construction;
pub mod anytime;
