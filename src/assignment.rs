//! Coverage-constrained assignment of clients to open facilities.

use serde::{Deserialize, Serialize};

use crate::distance::DistanceMatrix;
use crate::solution::OpenSet;

/// Client → facility mapping for a feasible open-set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// `facility_of[c]` is the open facility serving client `c`
    pub facility_of: Vec<usize>,
    /// Sum of client-to-facility distances
    pub total_distance: f64,
}

/// Assign every client to its nearest open facility within `coverage`.
///
/// Returns `None` when the open-set is empty or some client has no open
/// facility in range; no partial assignment is ever produced. Ties on equal
/// distance go to the lowest facility index.
pub fn assign(open: &OpenSet, matrix: &DistanceMatrix, coverage: f64) -> Option<Assignment> {
    if open.is_empty() {
        return None;
    }

    let mut facility_of = Vec::with_capacity(matrix.num_clients());
    let mut total_distance = 0.0;

    for c in 0..matrix.num_clients() {
        let row = matrix.row(c);
        let mut best: Option<(usize, f64)> = None;
        for &f in open {
            let d = row[f];
            if d <= coverage && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((f, d));
            }
        }
        let (f, d) = best?;
        facility_of.push(f);
        total_distance += d;
    }

    Some(Assignment { facility_of, total_distance })
}

/// Index of the first client left uncovered by `open`, if any
pub fn first_uncovered(open: &OpenSet, matrix: &DistanceMatrix, coverage: f64) -> Option<usize> {
    (0..matrix.num_clients()).find(|&c| {
        let row = matrix.row(c);
        !open.iter().any(|&f| row[f] <= coverage)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Client, Facility, Instance};
    use proptest::prelude::*;

    fn line_instance() -> Instance {
        Instance::new(
            "line",
            vec![
                Client::new("C1", 0.0, 0.0),
                Client::new("C2", 4.0, 0.0),
                Client::new("C3", 10.0, 0.0),
            ],
            vec![
                Facility::new("F1", 1.0, 0.0, false),
                Facility::new("F2", 5.0, 0.0, false),
                Facility::new("F3", 9.0, 0.0, false),
            ],
            3.0,
        )
    }

    #[test]
    fn test_nearest_within_coverage() {
        let inst = line_instance();
        let matrix = DistanceMatrix::from_instance(&inst);
        let open: OpenSet = [0, 1, 2].into_iter().collect();

        let a = assign(&open, &matrix, inst.coverage_distance).unwrap();
        assert_eq!(a.facility_of, vec![0, 1, 2]);
        assert!((a.total_distance - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_infeasible_when_client_out_of_range() {
        let inst = line_instance();
        let matrix = DistanceMatrix::from_instance(&inst);
        let open: OpenSet = [0, 1].into_iter().collect();

        assert!(assign(&open, &matrix, inst.coverage_distance).is_none());
        assert_eq!(first_uncovered(&open, &matrix, inst.coverage_distance), Some(2));
    }

    #[test]
    fn test_empty_open_set_is_infeasible() {
        let inst = line_instance();
        let matrix = DistanceMatrix::from_instance(&inst);
        assert!(assign(&OpenSet::new(), &matrix, 100.0).is_none());
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let inst = Instance::new(
            "tie",
            vec![Client::new("C1", 0.0, 0.0)],
            vec![Facility::new("F1", 1.0, 0.0, false), Facility::new("F2", -1.0, 0.0, false)],
            2.0,
        );
        let matrix = DistanceMatrix::from_instance(&inst);
        let open: OpenSet = [0, 1].into_iter().collect();
        assert_eq!(assign(&open, &matrix, 2.0).unwrap().facility_of, vec![0]);
    }

    fn arb_instance() -> impl Strategy<Value = Instance> {
        (
            prop::collection::vec((0.0..100.0f64, 0.0..100.0f64), 1..12),
            prop::collection::vec((0.0..100.0f64, 0.0..100.0f64), 1..8),
            1.0..80.0f64,
        )
            .prop_map(|(cs, fs, coverage)| {
                let clients = cs
                    .into_iter()
                    .enumerate()
                    .map(|(i, (x, y))| Client::new(format!("C{}", i + 1), x, y))
                    .collect();
                let facilities = fs
                    .into_iter()
                    .enumerate()
                    .map(|(j, (x, y))| Facility::new(format!("F{}", j + 1), x, y, false))
                    .collect();
                Instance::new("prop", clients, facilities, coverage)
            })
    }

    proptest! {
        #[test]
        fn prop_assignment_is_pure(inst in arb_instance(), mask in any::<u8>()) {
            let matrix = DistanceMatrix::from_instance(&inst);
            let open: OpenSet = (0..inst.num_facilities()).filter(|j| mask & (1 << j) != 0).collect();
            let first = assign(&open, &matrix, inst.coverage_distance);
            let second = assign(&open, &matrix, inst.coverage_distance);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_assignment_respects_coverage(inst in arb_instance(), mask in any::<u8>()) {
            let matrix = DistanceMatrix::from_instance(&inst);
            let open: OpenSet = (0..inst.num_facilities()).filter(|j| mask & (1 << j) != 0).collect();
            match assign(&open, &matrix, inst.coverage_distance) {
                Some(a) => {
                    prop_assert_eq!(a.facility_of.len(), inst.num_clients());
                    for (c, &f) in a.facility_of.iter().enumerate() {
                        prop_assert!(open.contains(&f));
                        prop_assert!(matrix.get(c, f) <= inst.coverage_distance);
                    }
                }
                None => prop_assert!(
                    open.is_empty() || first_uncovered(&open, &matrix, inst.coverage_distance).is_some()
                ),
            }
        }
    }
}
