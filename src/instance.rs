//! Module for parsing and representing facility coverage instances.
//!
//! The text format is line oriented:
//!
//! ```text
//! <n_clients> <n_facilities>
//! <client_name> <x> <y>                 (n_clients lines)
//! <facility_name> <x> <y> <open_flag>   (n_facilities lines)
//! <coverage_distance>
//! ```
//!
//! Blank lines and lines starting with `#` are skipped anywhere in the file.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::distance::{euclidean, DistanceMatrix};
use crate::error::{Result, SolverError};

/// A client that must be served by some open facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Client {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Client { name: name.into(), x, y }
    }
}

/// A candidate facility site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub x: f64,
    pub y: f64,
    /// Parsed from the input but not consulted by the search, which always
    /// starts from every facility open.
    pub initially_open: bool,
}

impl Facility {
    pub fn new(name: impl Into<String>, x: f64, y: f64, initially_open: bool) -> Self {
        Facility { name: name.into(), x, y, initially_open }
    }

    /// Euclidean distance to a client
    #[inline]
    pub fn distance_to(&self, client: &Client) -> f64 {
        euclidean(client.x, client.y, self.x, self.y)
    }
}

/// Represents a complete coverage instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the instance (file stem, or "stdin")
    pub name: String,
    pub clients: Vec<Client>,
    pub facilities: Vec<Facility>,
    /// Maximum distance between a client and the facility serving it
    pub coverage_distance: f64,
}

/// Upper bound on capacity reserved from header counts before any line is read
const MAX_PREALLOC: usize = 4096;

/// Non-comment lines of the input, remembering their 1-based line numbers.
struct DataLines<I> {
    inner: I,
    line_no: usize,
}

impl<I: Iterator<Item = io::Result<String>>> DataLines<I> {
    fn new(inner: I) -> Self {
        DataLines { inner, line_no: 0 }
    }

    fn next_data(&mut self) -> Result<Option<(usize, String)>> {
        for line in self.inner.by_ref() {
            let line = line?;
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some((self.line_no, trimmed.to_string())));
        }
        Ok(None)
    }

    fn expect(&mut self, what: &str) -> Result<(usize, String)> {
        self.next_data()?.ok_or_else(|| {
            SolverError::parse(self.line_no + 1, format!("unexpected end of input, expected {}", what))
        })
    }
}

fn parse_count(line: usize, token: &str, what: &str) -> Result<usize> {
    token
        .parse()
        .map_err(|_| SolverError::parse(line, format!("invalid {}: '{}'", what, token)))
}

fn parse_real(line: usize, token: &str, what: &str) -> Result<f64> {
    let value: f64 = token
        .parse()
        .map_err(|_| SolverError::parse(line, format!("invalid {}: '{}'", what, token)))?;
    if !value.is_finite() {
        return Err(SolverError::parse(line, format!("{} must be finite, got '{}'", what, token)));
    }
    Ok(value)
}

fn fields<'a>(line_no: usize, line: &'a str, expected: usize, what: &str) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != expected {
        return Err(SolverError::parse(
            line_no,
            format!("{} line needs {} fields, found {}", what, expected, parts.len()),
        ));
    }
    Ok(parts)
}

impl Instance {
    pub fn new(
        name: impl Into<String>,
        clients: Vec<Client>,
        facilities: Vec<Facility>,
        coverage_distance: f64,
    ) -> Self {
        Instance { name: name.into(), clients, facilities, coverage_distance }
    }

    /// Parse an instance from a file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());
        Self::from_reader(name, BufReader::new(file))
    }

    /// Parse from a file path, where `None` or `-` denotes standard input
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p != Path::new("-") => Self::from_file(p),
            _ => Self::from_reader("stdin", io::stdin().lock()),
        }
    }

    /// Parse an instance from any buffered reader
    pub fn from_reader<R: BufRead>(name: impl Into<String>, reader: R) -> Result<Self> {
        let mut lines = DataLines::new(reader.lines());

        let (line_no, header) = lines.expect("header '<n_clients> <n_facilities>'")?;
        let parts = fields(line_no, &header, 2, "header")?;
        let n_clients = parse_count(line_no, parts[0], "client count")?;
        let n_facilities = parse_count(line_no, parts[1], "facility count")?;

        let mut seen = HashSet::new();
        let mut clients = Vec::with_capacity(n_clients.min(MAX_PREALLOC));
        for _ in 0..n_clients {
            let (line_no, line) = lines.expect("client line '<name> <x> <y>'")?;
            let parts = fields(line_no, &line, 3, "client")?;
            if !seen.insert(parts[0].to_string()) {
                return Err(SolverError::parse(line_no, format!("duplicate name '{}'", parts[0])));
            }
            let x = parse_real(line_no, parts[1], "x coordinate")?;
            let y = parse_real(line_no, parts[2], "y coordinate")?;
            clients.push(Client::new(parts[0], x, y));
        }

        seen.clear();
        let mut facilities = Vec::with_capacity(n_facilities.min(MAX_PREALLOC));
        for _ in 0..n_facilities {
            let (line_no, line) = lines.expect("facility line '<name> <x> <y> <open_flag>'")?;
            let parts = fields(line_no, &line, 4, "facility")?;
            if !seen.insert(parts[0].to_string()) {
                return Err(SolverError::parse(line_no, format!("duplicate name '{}'", parts[0])));
            }
            let x = parse_real(line_no, parts[1], "x coordinate")?;
            let y = parse_real(line_no, parts[2], "y coordinate")?;
            let initially_open = match parts[3] {
                "0" => false,
                "1" => true,
                other => {
                    return Err(SolverError::parse(
                        line_no,
                        format!("open flag must be 0 or 1, got '{}'", other),
                    ))
                }
            };
            facilities.push(Facility::new(parts[0], x, y, initially_open));
        }

        let (line_no, line) = lines.expect("coverage distance")?;
        let parts = fields(line_no, &line, 1, "coverage distance")?;
        let coverage_distance = parse_real(line_no, parts[0], "coverage distance")?;
        if coverage_distance < 0.0 {
            return Err(SolverError::parse(line_no, "coverage distance must be non-negative"));
        }

        if let Some((line_no, _)) = lines.next_data()? {
            log::warn!("ignoring trailing input starting at line {}", line_no);
        }

        Ok(Instance::new(name, clients, facilities, coverage_distance))
    }

    /// Parse an instance held in a string
    pub fn parse_str(name: impl Into<String>, text: &str) -> Result<Self> {
        Self::from_reader(name, text.as_bytes())
    }

    /// Write the instance back in the input text format
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{} {}", self.clients.len(), self.facilities.len())?;
        for c in &self.clients {
            writeln!(out, "{} {:.2} {:.2}", c.name, c.x, c.y)?;
        }
        for f in &self.facilities {
            writeln!(out, "{} {:.2} {:.2} {}", f.name, f.x, f.y, u8::from(f.initially_open))?;
        }
        writeln!(out, "{}", self.coverage_distance)
    }

    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    pub fn num_facilities(&self) -> usize {
        self.facilities.len()
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let matrix = DistanceMatrix::from_instance(self);
        let coverage = self.coverage_distance;

        let mut sum = 0.0;
        let mut max_distance: f64 = 0.0;
        let mut uncovered_clients = 0;
        let mut single_option_clients = 0;
        for c in 0..self.num_clients() {
            let row = matrix.row(c);
            sum += row.iter().sum::<f64>();
            max_distance = row.iter().cloned().fold(max_distance, f64::max);
            match row.iter().filter(|&&d| d <= coverage).count() {
                0 => uncovered_clients += 1,
                1 => single_option_clients += 1,
                _ => {}
            }
        }
        let pairs = self.num_clients() * self.num_facilities();
        let avg_distance = if pairs > 0 { sum / pairs as f64 } else { 0.0 };

        InstanceStatistics {
            name: self.name.clone(),
            num_clients: self.num_clients(),
            num_facilities: self.num_facilities(),
            coverage_distance: coverage,
            avg_distance,
            max_distance,
            single_option_clients,
            uncovered_clients,
        }
    }
}

/// Statistics about a coverage instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_clients: usize,
    pub num_facilities: usize,
    pub coverage_distance: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Clients with exactly one facility in range; those facilities are forced open
    pub single_option_clients: usize,
    /// Clients with no facility in range at all
    pub uncovered_clients: usize,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Clients: {}", self.num_clients)?;
        writeln!(f, "  Facilities: {}", self.num_facilities)?;
        writeln!(f, "  Coverage distance: {:.2}", self.coverage_distance)?;
        writeln!(f, "  Avg client-facility distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max client-facility distance: {:.2}", self.max_distance)?;
        writeln!(f, "  Clients with a single facility in range: {}", self.single_option_clients)?;
        write!(f, "  Clients with no facility in range: {}", self.uncovered_clients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# two clients, three facilities
2 3
C1 0.0 0.0

C2 10.0 0.0
F1 0.0 1.0 1
# comment between facilities
F2 10.0 1.0 0
F3 5.0 5.0 0
2.5
";

    #[test]
    fn test_parse_sample() {
        let inst = Instance::parse_str("sample", SAMPLE).unwrap();
        assert_eq!(inst.num_clients(), 2);
        assert_eq!(inst.num_facilities(), 3);
        assert_eq!(inst.clients[1], Client::new("C2", 10.0, 0.0));
        assert!(inst.facilities[0].initially_open);
        assert!(!inst.facilities[1].initially_open);
        assert!((inst.coverage_distance - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_bad_header() {
        let err = Instance::parse_str("bad", "2\nC1 0 0\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_truncated_huge_header() {
        let err = Instance::parse_str("huge", "4000000000000000000 1\nC1 0 0\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 3, .. }));
        let err = Instance::parse_str("huge", "0 4000000000000000000\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_load_names_instance_by_file_stem() {
        let path = std::env::temp_dir().join(format!("fcs-stem-{}.txt", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();
        let loaded = Instance::load(Some(path.as_path()));
        std::fs::remove_file(&path).ok();

        let inst = loaded.unwrap();
        assert_eq!(inst.name, format!("fcs-stem-{}", std::process::id()));
        assert_eq!(inst.num_facilities(), 3);

        let missing = Instance::load(Some(Path::new("/nonexistent/fcs-instance.txt")));
        assert!(matches!(missing, Err(SolverError::Io(_))));
    }

    #[test]
    fn test_parse_rejects_non_numeric_coordinate() {
        let err = Instance::parse_str("bad", "1 1\nC1 zero 0\nF1 0 0 1\n1.0\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = Instance::parse_str("bad", "1 1\nC1 0 0\nF1 0 0\n1.0\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_bad_open_flag() {
        let err = Instance::parse_str("bad", "1 1\nC1 0 0\nF1 0 0 2\n1.0\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_parse_rejects_missing_coverage() {
        let err = Instance::parse_str("bad", "1 1\nC1 0 0\nF1 0 0 1\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { .. }));
    }

    #[test]
    fn test_parse_rejects_negative_coverage_and_nan() {
        assert!(Instance::parse_str("bad", "1 1\nC1 0 0\nF1 0 0 1\n-1\n").is_err());
        assert!(Instance::parse_str("bad", "1 1\nC1 NaN 0\nF1 0 0 1\n1\n").is_err());
    }

    #[test]
    fn test_parse_rejects_duplicate_names() {
        let err = Instance::parse_str("bad", "2 1\nC1 0 0\nC1 1 1\nF1 0 0 1\n1.0\n").unwrap_err();
        assert!(matches!(err, SolverError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_write_then_parse_keeps_layout() {
        let inst = Instance::parse_str("sample", SAMPLE).unwrap();
        let mut buf = Vec::new();
        inst.write_to(&mut buf).unwrap();
        let again = Instance::parse_str("sample", std::str::from_utf8(&buf).unwrap()).unwrap();
        assert_eq!(inst, again);
    }

    #[test]
    fn test_statistics() {
        let inst = Instance::parse_str("sample", SAMPLE).unwrap();
        let stats = inst.statistics();
        assert_eq!(stats.num_clients, 2);
        assert_eq!(stats.single_option_clients, 2);
        assert_eq!(stats.uncovered_clients, 0);
        assert!(stats.max_distance > 10.0);
    }
}
