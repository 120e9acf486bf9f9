//! Read-only search context shared by every solver.

use crate::assignment::{assign, first_uncovered};
use crate::distance::DistanceMatrix;
use crate::error::{Result, SolverError};
use crate::instance::Instance;
use crate::objective::{Objective, OpenWeight};
use crate::solution::{Candidate, OpenSet};

/// An instance together with its distance matrix and objective.
#[derive(Debug, Clone)]
pub struct Problem<'a> {
    pub instance: &'a Instance,
    pub matrix: DistanceMatrix,
    pub objective: Objective,
}

impl<'a> Problem<'a> {
    pub fn new(instance: &'a Instance, weight: OpenWeight) -> Self {
        let matrix = DistanceMatrix::from_instance(instance);
        let bound = matrix.assignment_upper_bound(instance.coverage_distance);
        let objective = Objective::new(weight.resolve(bound));
        Problem { instance, matrix, objective }
    }

    #[inline]
    pub fn coverage(&self) -> f64 {
        self.instance.coverage_distance
    }

    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.instance.num_facilities()
    }

    /// Assign clients for `open` and score it; `None` if infeasible
    pub fn evaluate(&self, open: OpenSet) -> Option<Candidate> {
        let assignment = assign(&open, &self.matrix, self.coverage())?;
        let objective = self.objective.value(open.len(), assignment.total_distance);
        Some(Candidate { open, assignment, objective })
    }

    pub fn all_open(&self) -> OpenSet {
        (0..self.num_facilities()).collect()
    }

    pub fn is_feasible(&self, open: &OpenSet) -> bool {
        !open.is_empty() && first_uncovered(open, &self.matrix, self.coverage()).is_none()
    }

    /// The all-open starting solution.
    ///
    /// Fails with [`SolverError::NoFacilities`] on an instance without
    /// facilities and with [`SolverError::Infeasible`] when even every
    /// facility open leaves a client uncovered.
    pub fn baseline(&self) -> Result<Candidate> {
        if self.num_facilities() == 0 {
            return Err(SolverError::NoFacilities);
        }
        let open = self.all_open();
        if let Some(c) = first_uncovered(&open, &self.matrix, self.coverage()) {
            return Err(SolverError::Infeasible { client: self.instance.clients[c].name.clone() });
        }
        self.evaluate(open).ok_or(SolverError::NoFacilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Client, Facility};

    #[test]
    fn test_baseline_infeasible_names_client() {
        let inst = Instance::new(
            "far",
            vec![Client::new("C1", 0.0, 0.0)],
            vec![Facility::new("F1", 100.0, 100.0, false)],
            1.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        match problem.baseline() {
            Err(SolverError::Infeasible { client }) => assert_eq!(client, "C1"),
            other => panic!("expected infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_no_facilities_is_infeasible() {
        let inst = Instance::new("empty", vec![], vec![], 1.0);
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let err = problem.baseline().unwrap_err();
        assert!(err.is_infeasible());
        assert!(matches!(err, SolverError::NoFacilities));
        assert_eq!(err.to_string(), "instance is infeasible: it has no facilities");
    }

    #[test]
    fn test_clients_without_facilities_is_not_blamed_on_a_client() {
        let inst = Instance::new("bare", vec![Client::new("C1", 0.0, 0.0)], vec![], 1.0);
        let problem = Problem::new(&inst, OpenWeight::Auto);
        assert!(matches!(problem.baseline(), Err(SolverError::NoFacilities)));
    }

    #[test]
    fn test_evaluate_scores_count_and_distance() {
        let inst = Instance::new(
            "pair",
            vec![Client::new("C1", 0.0, 0.0)],
            vec![Facility::new("F1", 1.0, 0.0, false), Facility::new("F2", 2.0, 0.0, false)],
            5.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Fixed(1000.0));
        let both = problem.evaluate(problem.all_open()).unwrap();
        assert!((both.objective - 2001.0).abs() < 1e-9);
        let second: OpenSet = [1].into_iter().collect();
        let only_second = problem.evaluate(second).unwrap();
        assert!((only_second.objective - 1002.0).abs() < 1e-9);
    }
}
