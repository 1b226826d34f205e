// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Flow Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Background buffer-gas state on a 2-D (z, r) sample cloud.
//!
//! Lookups go through a kd-tree, but the common case is served from a
//! per-worker cache: every sample carries a precomputed validity radius
//! `d_min` inside which all tracked fields stay within a fractional
//! tolerance of the sample, so repeated queries along a short step
//! avoid the tree entirely.

use cryo_math::kdtree::KdTree2;
use cryo_types::constants::{FIELD_TOLERANCE, VALIDITY_NEIGHBORS};
use cryo_types::error::{CryoError, CryoResult};

/// One flow sample in the (z, r) half-plane.
#[derive(Debug, Clone, Copy)]
pub struct FlowPoint {
    pub z: f64,
    pub r: f64,
    /// Axial bulk velocity [m/s].
    pub v_axial: f64,
    /// Radial bulk velocity [m/s].
    pub v_radial: f64,
    /// Azimuthal bulk column of the flow table; parsed for completeness,
    /// unused by the axisymmetric model.
    pub v_phi: f64,
    /// Gas temperature [K]; always > 0 after construction.
    pub temperature: f64,
    /// Gas number density [m⁻³].
    pub density: f64,
    /// Validity radius [m]; 0 is legal and means "always refresh".
    pub d_min: f64,
}

/// Raw parsed row, before the validity radius is known.
#[derive(Debug, Clone, Copy)]
pub struct FlowSample {
    pub z: f64,
    pub r: f64,
    pub v_axial: f64,
    pub v_radial: f64,
    pub v_phi: f64,
    pub temperature: f64,
    pub density: f64,
}

/// Per-worker cached gas state.
///
/// `vg` is the bulk gas velocity in 3-D Cartesian coordinates, rotated
/// to the particle's azimuth at the moment of the last refresh.
#[derive(Debug, Clone, Copy)]
pub struct InterpState {
    z_ref: f64,
    r_ref: f64,
    d_min: f64,
    pub vg: [f64; 3],
    pub temperature: f64,
    pub density: f64,
    /// Cache misses served by the kd-tree.
    pub refreshes: u64,
}

impl Default for InterpState {
    fn default() -> Self {
        InterpState {
            z_ref: 0.0,
            r_ref: 0.0,
            // negative radius forces a refresh on first use
            d_min: -1.0,
            vg: [0.0; 3],
            temperature: 0.0,
            density: 0.0,
            refreshes: 0,
        }
    }
}

/// kd-tree over the flow samples plus per-sample validity radii.
#[derive(Debug, Clone)]
pub struct FlowField {
    points: Vec<FlowPoint>,
    tree: KdTree2,
    pub z_min: f64,
    pub z_max: f64,
    pub r_min: f64,
    pub r_max: f64,
    pub t_min: f64,
    pub t_max: f64,
    /// Largest bulk-speed magnitude over all samples [m/s].
    pub max_bulk_speed: f64,
}

/// True when `value` lies inside the fractional tolerance band of
/// `base`. The band bounds are ordered so a negative base (bulk
/// velocities) still yields a well-formed interval.
fn within_band(base: f64, value: f64) -> bool {
    let a = FIELD_TOLERANCE * base;
    let b = (1.0 + FIELD_TOLERANCE) * base;
    let lo = a.min(b);
    let hi = a.max(b);
    value >= lo && value <= hi
}

impl FlowField {
    /// Build from parsed samples; rows with `T ≤ 0` are dropped here as
    /// well so callers may pass an unfiltered table.
    pub fn new(samples: Vec<FlowSample>) -> CryoResult<Self> {
        let kept: Vec<FlowSample> = samples
            .into_iter()
            .filter(|s| s.temperature > 0.0)
            .collect();
        if kept.is_empty() {
            return Err(CryoError::ConfigError(
                "flow field has no samples with T > 0".to_string(),
            ));
        }

        let coords: Vec<[f64; 2]> = kept.iter().map(|s| [s.z, s.r]).collect();
        let tree = KdTree2::build(&coords);

        let mut points = Vec::with_capacity(kept.len());
        for s in &kept {
            let neighbors = tree.k_nearest([s.z, s.r], VALIDITY_NEIGHBORS);
            let mut d_min = neighbors.last().map(|&(_, d)| d).unwrap_or(0.0);
            for &(idx, dist) in &neighbors {
                let q = &kept[idx];
                let in_band = within_band(s.v_axial, q.v_axial)
                    && within_band(s.v_radial, q.v_radial)
                    && within_band(s.temperature, q.temperature)
                    && within_band(s.density, q.density);
                if !in_band {
                    d_min = dist;
                    break;
                }
            }
            points.push(FlowPoint {
                z: s.z,
                r: s.r,
                v_axial: s.v_axial,
                v_radial: s.v_radial,
                v_phi: s.v_phi,
                temperature: s.temperature,
                density: s.density,
                d_min,
            });
        }

        let z_min = points.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);
        let z_max = points.iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max);
        let r_min = points.iter().map(|p| p.r).fold(f64::INFINITY, f64::min);
        let r_max = points.iter().map(|p| p.r).fold(f64::NEG_INFINITY, f64::max);
        let t_min = points
            .iter()
            .map(|p| p.temperature)
            .fold(f64::INFINITY, f64::min);
        let t_max = points
            .iter()
            .map(|p| p.temperature)
            .fold(f64::NEG_INFINITY, f64::max);
        let max_bulk_speed = points
            .iter()
            .map(|p| (p.v_axial * p.v_axial + p.v_radial * p.v_radial).sqrt())
            .fold(0.0, f64::max);

        Ok(FlowField {
            points,
            tree,
            z_min,
            z_max,
            r_min,
            r_max,
            t_min,
            t_max,
            max_bulk_speed,
        })
    }

    /// Parse the flow table: columns `x y T ρ ρ_m vx vy vz` from line
    /// 10 onward; `x → z`, `y → r`, `vx → axial bulk`, `vy → radial
    /// bulk`; `ρ_m` is skipped.
    pub fn from_file(path: &str) -> CryoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_table(&contents, path)
    }

    pub fn from_table(contents: &str, origin: &str) -> CryoResult<Self> {
        let mut samples = Vec::new();
        for (i, raw) in contents.lines().enumerate().skip(9) {
            let line_no = i + 1;
            if raw.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = raw.split_whitespace().collect();
            if fields.len() < 8 {
                return Err(CryoError::MalformedTable {
                    file: origin.to_string(),
                    line: line_no,
                    message: "expected x y T rho rho_m vx vy vz".to_string(),
                });
            }
            let mut vals = [0.0f64; 8];
            for (k, v) in vals.iter_mut().enumerate() {
                *v = fields[k].parse::<f64>().map_err(|_| CryoError::MalformedTable {
                    file: origin.to_string(),
                    line: line_no,
                    message: format!("bad float in column {}", k + 1),
                })?;
            }
            samples.push(FlowSample {
                z: vals[0],
                r: vals[1],
                temperature: vals[2],
                density: vals[3],
                // vals[4] is the mass density column, unused
                v_axial: vals[5],
                v_radial: vals[6],
                v_phi: vals[7],
            });
        }
        Self::new(samples)
    }

    pub fn points(&self) -> &[FlowPoint] {
        &self.points
    }

    /// Refresh the cached gas state for the particle at `x`.
    ///
    /// Serves from the cache while the particle stays within the
    /// reference sample's validity radius in (z, r); otherwise performs
    /// a nearest-neighbor query and re-rotates the bulk velocity to the
    /// particle's current azimuth.
    pub fn refresh(&self, state: &mut InterpState, x: &[f64; 3]) {
        let r = (x[0] * x[0] + x[1] * x[1]).sqrt();
        let dz = x[2] - state.z_ref;
        let dr = r - state.r_ref;
        let delta = (dz * dz + dr * dr).sqrt();
        if delta <= state.d_min {
            return;
        }

        // tree is non-empty by construction
        if let Some((idx, _)) = self.tree.nearest([x[2], r]) {
            let p = &self.points[idx];
            state.z_ref = p.z;
            state.r_ref = p.r;
            state.d_min = p.d_min;
            state.temperature = p.temperature;
            state.density = p.density;
            let phi = x[1].atan2(x[0]);
            state.vg = [p.v_radial * phi.cos(), p.v_radial * phi.sin(), p.v_axial];
            state.refreshes += 1;
        }
    }
}
