// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Axisymmetric wall description and segment-crossing test.
//!
//! Walls are 2-D segments in the (z, ρ) half-plane plus an outer
//! bounding box. A trajectory step from x₁ to x₂ is collapsed to the
//! same half-plane and tested against every wall segment with the
//! sign-of-denominator branch of Antonio's "Faster Line Segment
//! Intersection" (Graphics Gems III).

use cryo_types::error::{CryoError, CryoResult};
use cryo_types::record::Termination;

/// One wall segment in (z, ρ) coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub z1: f64,
    pub rho1: f64,
    pub z2: f64,
    pub rho2: f64,
}

/// Wall segments plus the outer bounding box.
#[derive(Debug, Clone)]
pub struct Geometry {
    segments: Vec<Segment>,
    /// Axial extent of the simulation domain.
    pub z_min: f64,
    pub z_max: f64,
    /// Outer radial bound.
    pub rho_max: f64,
}

/// Half-closed segment-pair intersection.
///
/// A crossing that only grazes a vertex (numerator exactly 0 or exactly
/// equal to the denominator) does not count, matching the parity of the
/// reference routine.
fn segments_cross(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let ax = p2[0] - p1[0];
    let ay = p2[1] - p1[1];
    let bx = q1[0] - q2[0];
    let by = q1[1] - q2[1];
    let cx = p1[0] - q1[0];
    let cy = p1[1] - q1[1];

    let denom = ay * bx - ax * by;
    if denom == 0.0 {
        // collinear or parallel
        return false;
    }
    let alpha = by * cx - bx * cy;
    let beta = ax * cy - ay * cx;
    if denom > 0.0 {
        if alpha <= 0.0 || alpha >= denom {
            return false;
        }
        if beta <= 0.0 || beta >= denom {
            return false;
        }
    } else {
        if alpha >= 0.0 || alpha <= denom {
            return false;
        }
        if beta >= 0.0 || beta <= denom {
            return false;
        }
    }
    true
}

impl Geometry {
    pub fn new(segments: Vec<Segment>, z_min: f64, z_max: f64, rho_max: f64) -> Self {
        Geometry {
            segments,
            z_min,
            z_max,
            rho_max,
        }
    }

    /// Parse the wall table.
    ///
    /// Layout: 5 header lines, bounding block on lines 6–7 (min line
    /// then max line, axial column then radial column), two spacer
    /// lines, then `ID z₁ ρ₁ z₂ ρ₂` rows from line 10 onward. The ID
    /// column is read and discarded.
    pub fn from_file(path: &str) -> CryoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_table(&contents, path)
    }

    pub fn from_table(contents: &str, origin: &str) -> CryoResult<Self> {
        let malformed = |line: usize, message: &str| CryoError::MalformedTable {
            file: origin.to_string(),
            line,
            message: message.to_string(),
        };

        let lines: Vec<&str> = contents.lines().collect();
        if lines.len() < 7 {
            return Err(malformed(lines.len(), "missing bounding block"));
        }

        let parse_pair = |line_no: usize| -> CryoResult<(f64, f64)> {
            let fields: Vec<&str> = lines[line_no - 1].split_whitespace().collect();
            if fields.len() < 2 {
                return Err(malformed(line_no, "expected axial and radial bound"));
            }
            let a = fields[0]
                .parse::<f64>()
                .map_err(|_| malformed(line_no, "bad axial bound"))?;
            let b = fields[1]
                .parse::<f64>()
                .map_err(|_| malformed(line_no, "bad radial bound"))?;
            Ok((a, b))
        };

        let (z_min, _rho_min) = parse_pair(6)?;
        let (z_max, rho_max) = parse_pair(7)?;

        let mut segments = Vec::new();
        for (i, raw) in lines.iter().enumerate().skip(9) {
            let line_no = i + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = raw.split_whitespace().collect();
            if fields.len() < 5 {
                return Err(malformed(line_no, "expected ID z1 rho1 z2 rho2"));
            }
            // fields[0] is the segment ID; unused by the engine
            let mut vals = [0.0f64; 4];
            for (k, v) in vals.iter_mut().enumerate() {
                *v = fields[k + 1]
                    .parse::<f64>()
                    .map_err(|_| malformed(line_no, "bad segment coordinate"))?;
            }
            segments.push(Segment {
                z1: vals[0],
                rho1: vals[1],
                z2: vals[2],
                rho2: vals[3],
            });
        }

        Ok(Geometry::new(segments, z_min, z_max, rho_max))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Test the step x₁ → x₂ against walls, then the bounding box.
    ///
    /// Returns `Some(Wall)` on the first segment crossing, `Some(Exit)`
    /// when the endpoint leaves the axial interval or the radial bound,
    /// `None` otherwise.
    pub fn test(&self, x1: &[f64; 3], x2: &[f64; 3]) -> Option<Termination> {
        let rho1 = (x1[0] * x1[0] + x1[1] * x1[1]).sqrt();
        let rho2 = (x2[0] * x2[0] + x2[1] * x2[1]).sqrt();
        let p1 = [x1[2], rho1];
        let p2 = [x2[2], rho2];

        for seg in &self.segments {
            if segments_cross(p1, p2, [seg.z1, seg.rho1], [seg.z2, seg.rho2]) {
                return Some(Termination::Wall);
            }
        }
        if x2[2] < self.z_min || x2[2] > self.z_max || rho2 > self.rho_max {
            return Some(Termination::Exit);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe_with_cap() -> Geometry {
        // one wall segment across the axis at z = 0.1
        let cap = Segment {
            z1: 0.1,
            rho1: 0.0,
            z2: 0.1,
            rho2: 0.05,
        };
        Geometry::new(vec![cap], -1.0, 1.0, 0.5)
    }

    #[test]
    fn test_crossing_segment_is_wall() {
        let geom = pipe_with_cap();
        let a = [0.0, 0.0, 0.0];
        let b = [0.0, 0.02, 0.3];
        assert_eq!(geom.test(&a, &b), Some(Termination::Wall));
    }

    #[test]
    fn test_step_short_of_wall_is_none() {
        let geom = pipe_with_cap();
        let a = [0.0, 0.0, 0.0];
        let b = [0.0, 0.02, 0.05];
        assert_eq!(geom.test(&a, &b), None);
    }

    #[test]
    fn test_axial_exit() {
        let geom = pipe_with_cap();
        let a = [0.0, 0.0, -0.5];
        let b = [0.0, 0.0, -1.5];
        assert_eq!(geom.test(&a, &b), Some(Termination::Exit));
    }

    #[test]
    fn test_radial_exit() {
        let geom = pipe_with_cap();
        let a = [0.1, 0.0, -0.5];
        let b = [0.7, 0.0, -0.5];
        assert_eq!(geom.test(&a, &b), Some(Termination::Exit));
    }

    #[test]
    fn test_vertex_graze_does_not_count() {
        let geom = pipe_with_cap();
        // path touches the segment's outer vertex (0.1, 0.05) exactly
        let a = [0.05, 0.0, 0.0];
        let b = [0.05, 0.0, 0.2];
        assert_eq!(geom.test(&a, &b), None);
    }

    #[test]
    fn test_parallel_paths_do_not_cross() {
        let geom = pipe_with_cap();
        // pure radial motion at fixed z parallel to the cap
        let a = [0.01, 0.0, 0.05];
        let b = [0.04, 0.0, 0.05];
        assert_eq!(geom.test(&a, &b), None);
    }

    #[test]
    fn test_from_table() {
        let table = "\
header1
header2
header3
header4
header5
-1.0  0.0
 1.0  0.5
spacer
spacer
1  0.1 0.0  0.1 0.05
2  0.5 0.0  0.5 0.30
";
        let geom = Geometry::from_table(table, "inline").unwrap();
        assert_eq!(geom.segments().len(), 2);
        assert!((geom.z_min + 1.0).abs() < 1e-12);
        assert!((geom.z_max - 1.0).abs() < 1e-12);
        assert!((geom.rho_max - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_from_table_reports_line() {
        let table = "\
h
h
h
h
h
-1 0
1 0.5
s
s
1 0.1 zero 0.1 0.05
";
        let err = Geometry::from_table(table, "inline").unwrap_err();
        match err {
            CryoError::MalformedTable { line, .. } => assert_eq!(line, 10),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
