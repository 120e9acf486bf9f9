//! Plain-text solution report written to stdout by the solver binary.

use std::io::{self, Write};

use crate::instance::Instance;
use crate::solution::Solution;

/// Write `solution` in the report format:
///
/// ```text
/// Total distance: 12.3456
///
/// Open facilities:
/// F1 F3
///
/// Coverage:
/// F1 covers: C1 C2
/// F3 covers: (none)
/// ```
pub fn write_solution<W: Write>(out: &mut W, instance: &Instance, solution: &Solution) -> io::Result<()> {
    writeln!(out, "Total distance: {:.4}", solution.total_distance)?;
    writeln!(out)?;
    writeln!(out, "Open facilities:")?;
    let names: Vec<&str> = solution
        .open
        .iter()
        .map(|&f| instance.facilities[f].name.as_str())
        .collect();
    writeln!(out, "{}", names.join(" "))?;
    writeln!(out)?;
    writeln!(out, "Coverage:")?;
    for &f in &solution.open {
        let served: Vec<&str> = solution
            .clients_of(f)
            .into_iter()
            .map(|c| instance.clients[c].name.as_str())
            .collect();
        let list = if served.is_empty() { "(none)".to_string() } else { served.join(" ") };
        writeln!(out, "{} covers: {}", instance.facilities[f].name, list)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Client, Facility};
    use crate::objective::OpenWeight;
    use crate::problem::Problem;
    use crate::solution::OpenSet;

    #[test]
    fn test_report_format() {
        let inst = Instance::new(
            "fmt",
            vec![Client::new("A", 0.0, 0.0), Client::new("B", 0.0, 3.0)],
            vec![
                Facility::new("X", 0.0, 1.0, true),
                Facility::new("Y", 50.0, 50.0, false),
                Facility::new("Z", 0.0, 2.0, false),
            ],
            5.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let open: OpenSet = [0, 2].into_iter().collect();
        let cand = problem.evaluate(open).unwrap();
        let sol = Solution::from_candidate(&problem, cand, "test");

        let mut buf = Vec::new();
        write_solution(&mut buf, &inst, &sol).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let expected = "Total distance: 2.0000\n\
                        \n\
                        Open facilities:\n\
                        X Z\n\
                        \n\
                        Coverage:\n\
                        X covers: A\n\
                        Z covers: B\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_idle_facility_reports_none() {
        let inst = Instance::new(
            "idle",
            vec![Client::new("A", 0.0, 0.0)],
            vec![Facility::new("X", 0.0, 0.0, false), Facility::new("Y", 1.0, 0.0, false)],
            5.0,
        );
        let problem = Problem::new(&inst, OpenWeight::Auto);
        let sol = Solution::from_candidate(&problem, problem.baseline().unwrap(), "test");

        let mut buf = Vec::new();
        write_solution(&mut buf, &inst, &sol).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("X covers: A\nY covers: (none)\n"));
    }
}
