//! Loading of the highway centerline table
//!
//! The table has one waypoint per line, `x y s dx dy`, separated by single
//! spaces and without a header, where `(dx, dy)` is the unit vector
//! pointing away from the centerline towards the lanes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::common::PlannerResult;
use crate::road::{CurveSample, ReferenceCurve};

#[derive(Debug, Deserialize)]
struct MapRow {
    x: f64,
    y: f64,
    s: f64,
    dx: f64,
    dy: f64,
}

impl From<MapRow> for CurveSample {
    fn from(row: MapRow) -> Self {
        CurveSample::new(row.s, row.x, row.y, row.dx, row.dy)
    }
}

/// Parse a waypoint table from any reader
pub fn parse_highway_map<R: Read>(reader: R, total_length: f64) -> PlannerResult<ReferenceCurve> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for row in rdr.deserialize::<MapRow>() {
        samples.push(CurveSample::from(row?));
    }

    ReferenceCurve::new(samples, total_length)
}

/// Load the waypoint table at `path`
pub fn load_highway_map<P: AsRef<Path>>(path: P, total_length: f64) -> PlannerResult<ReferenceCurve> {
    let file = File::open(path.as_ref())?;
    let curve = parse_highway_map(file, total_length)?;
    info!(
        "Loaded {} map waypoints from {:?} (loop length {:.3} m)",
        curve.len(), path.as_ref(), total_length
    );
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PlannerError;

    const MAP: &str = "\
784.6001 1135.571 0 -0.02359831 -0.9997216
815.2679 1134.93 30.6744785308838 -0.01099479 -0.9999396
844.6398 1134.911 60.0463714599609 -0.002048373 -0.9999979
";

    #[test]
    fn test_parse_map() {
        let curve = parse_highway_map(MAP.as_bytes(), 6945.554).unwrap();
        assert_eq!(curve.len(), 3);
        let p = curve.sample(1);
        assert_eq!(p.x, 815.2679);
        assert_eq!(p.y, 1134.93);
        assert_eq!(p.progress, 30.6744785308838);
        assert_eq!(p.lateral_dy, -0.9999396);
    }

    #[test]
    fn test_parse_errors() {
        let bad = "784.6 1135.5 zero -0.02 -0.99\n";
        assert!(matches!(
            parse_highway_map(bad.as_bytes(), 100.0),
            Err(PlannerError::MapParse(_))
        ));

        // Loop length shorter than the table
        assert!(matches!(
            parse_highway_map(MAP.as_bytes(), 50.0),
            Err(PlannerError::InvalidCurve(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_highway_map("/nonexistent/highway_map.csv", 100.0),
            Err(PlannerError::Io(_))
        ));
    }
}
