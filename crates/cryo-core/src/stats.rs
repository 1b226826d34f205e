// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Bin Statistics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Per-cell trajectory statistics on a Cartesian (r, z) grid.
//!
//! Each cell carries a 2-D velocity moment accumulator over
//! (v_tangential, v_axial) plus scalar accumulators for time of
//! flight, cumulative collision count, and sampled free path. All
//! accumulators merge with the parallel moment formula, so per-worker
//! grids combine into the shared one without ordering effects.

use ndarray::Array2;

use cryo_math::moments::{BivariateMoments, ScalarMoments};
use cryo_types::error::{CryoError, CryoResult};

/// Near-axis guard for the tangential-velocity quotient.
const MIN_RADIUS_M: f64 = 1e-9;

/// Statistics of one grid cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinStats {
    /// (v_tangential, v_axial) means and 2×2 covariance.
    pub velocity: BivariateMoments,
    /// Time of flight at the sample.
    pub time: ScalarMoments,
    /// Cumulative collision count at the sample.
    pub collisions: ScalarMoments,
    /// Free-path length sampled at the sample.
    pub free_path: ScalarMoments,
}

impl BinStats {
    pub fn observe(&mut self, v: [f64; 2], time: f64, n_coll: u64, l_free: f64) {
        self.velocity.push(v);
        self.time.push(time);
        self.collisions.push(n_coll as f64);
        self.free_path.push(l_free);
    }

    pub fn merge(&mut self, other: &BinStats) {
        self.velocity.merge(&other.velocity);
        self.time.merge(&other.time);
        self.collisions.merge(&other.collisions);
        self.free_path.merge(&other.free_path);
    }
}

/// Grid extents and resolution; shared by every worker grid in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinGridSpec {
    pub r_bins: usize,
    pub z_bins: usize,
    pub r_min: f64,
    pub r_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl BinGridSpec {
    pub fn dr(&self) -> f64 {
        (self.r_max - self.r_min) / self.r_bins as f64
    }

    pub fn dz(&self) -> f64 {
        (self.z_max - self.z_min) / self.z_bins as f64
    }
}

/// (r, z) grid of [`BinStats`] cells.
#[derive(Debug, Clone)]
pub struct BinGrid {
    spec: BinGridSpec,
    cells: Array2<BinStats>,
}

impl BinGrid {
    pub fn new(spec: BinGridSpec) -> Self {
        BinGrid {
            spec,
            cells: Array2::default((spec.r_bins, spec.z_bins)),
        }
    }

    pub fn spec(&self) -> &BinGridSpec {
        &self.spec
    }

    pub fn cell(&self, ir: usize, iz: usize) -> &BinStats {
        &self.cells[[ir, iz]]
    }

    /// Bin the sample at `x` and observe it. Indices are clamped into
    /// range, so arbitrarily far-out positions land in edge cells
    /// rather than trapping.
    pub fn update(&mut self, x: &[f64; 3], v: &[f64; 3], time: f64, n_coll: u64, l_free: f64) {
        let r = (x[0] * x[0] + x[1] * x[1]).sqrt();
        let ir = self.clamp_index(
            ((r - self.spec.r_min) / self.spec.dr()).floor(),
            self.spec.r_bins,
        );
        let iz = self.clamp_index(
            ((x[2] - self.spec.z_min) / self.spec.dz()).floor(),
            self.spec.z_bins,
        );
        let v_t = (-x[1] * v[0] + x[0] * v[1]) / r.max(MIN_RADIUS_M);
        self.cells[[ir, iz]].observe([v_t, v[2]], time, n_coll, l_free);
    }

    fn clamp_index(&self, raw: f64, n: usize) -> usize {
        if raw.is_nan() {
            return 0;
        }
        raw.clamp(0.0, (n - 1) as f64) as usize
    }

    /// Cell-by-cell merge; the grids must share their geometry.
    pub fn merge(&mut self, other: &BinGrid) -> CryoResult<()> {
        if self.spec != other.spec {
            return Err(CryoError::PhysicsViolation(
                "bin-grid merge requires identical grid geometry".to_string(),
            ));
        }
        for (mine, theirs) in self.cells.iter_mut().zip(other.cells.iter()) {
            mine.merge(theirs);
        }
        Ok(())
    }
}
