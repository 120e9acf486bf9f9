//! Dense client × facility distance matrix.

use crate::instance::Instance;

/// Euclidean distance between two points
#[inline]
pub fn euclidean(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}

/// Row-major matrix where entry `(c, f)` is the distance from client `c` to facility `f`.
///
/// Built once per instance and only read afterwards, so it can be shared
/// freely between independent runs.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    num_clients: usize,
    num_facilities: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute Euclidean distance matrix
    pub fn from_instance(instance: &Instance) -> Self {
        let num_clients = instance.num_clients();
        let num_facilities = instance.num_facilities();
        let mut data = Vec::with_capacity(num_clients * num_facilities);

        for client in &instance.clients {
            for facility in &instance.facilities {
                data.push(facility.distance_to(client));
            }
        }

        DistanceMatrix { num_clients, num_facilities, data }
    }

    /// Get the distance between a client and a facility
    #[inline]
    pub fn get(&self, client: usize, facility: usize) -> f64 {
        self.data[client * self.num_facilities + facility]
    }

    /// All facility distances for one client
    #[inline]
    pub fn row(&self, client: usize) -> &[f64] {
        let start = client * self.num_facilities;
        &self.data[start..start + self.num_facilities]
    }

    pub fn num_clients(&self) -> usize {
        self.num_clients
    }

    pub fn num_facilities(&self) -> usize {
        self.num_facilities
    }

    /// Upper bound on the total distance of any feasible assignment.
    ///
    /// Each client is served within `coverage`, and never further than its
    /// most distant facility.
    pub fn assignment_upper_bound(&self, coverage: f64) -> f64 {
        (0..self.num_clients)
            .map(|c| {
                self.row(c)
                    .iter()
                    .cloned()
                    .filter(|&d| d <= coverage)
                    .fold(0.0, f64::max)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Client, Facility};

    #[test]
    fn test_distance_calculation() {
        let instance = Instance::new(
            "t",
            vec![Client::new("C1", 0.0, 0.0), Client::new("C2", 6.0, 8.0)],
            vec![Facility::new("F1", 3.0, 4.0, false), Facility::new("F2", 0.0, 0.0, false)],
            10.0,
        );
        let matrix = DistanceMatrix::from_instance(&instance);

        assert!((matrix.get(0, 0) - 5.0).abs() < 1e-10);
        assert!((matrix.get(1, 0) - 5.0).abs() < 1e-10);
        assert!((matrix.get(1, 1) - 10.0).abs() < 1e-10);
        assert_eq!(matrix.get(0, 1), 0.0);
        assert_eq!(matrix.row(1).len(), 2);
    }

    #[test]
    fn test_assignment_upper_bound_ignores_out_of_range() {
        let instance = Instance::new(
            "t",
            vec![Client::new("C1", 0.0, 0.0)],
            vec![Facility::new("F1", 3.0, 4.0, false), Facility::new("F2", 30.0, 40.0, false)],
            10.0,
        );
        let matrix = DistanceMatrix::from_instance(&instance);
        assert!((matrix.assignment_upper_bound(10.0) - 5.0).abs() < 1e-10);
    }
}
