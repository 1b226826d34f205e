// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Proposal Table
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Precomputed Gaussian proposal parameters over (T, U).
//!
//! Each cell is calibrated once before the run: 100 pairs are drawn
//! with a loose acceptance bound against analytic first-guess
//! parameters, and the sample moments become the production proposal.
//! Lookups round to the nearest cell and clamp, so out-of-range
//! temperatures or relative speeds are served silently.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

use cryo_math::moments::ScalarMoments;
use cryo_types::constants::KB_AMU;
use cryo_types::record::TrajectoryDiagnostics;

use crate::collision::{sample_angle, sample_gas_speed};

/// Samples per table axis.
pub const TABLE_SAMPLES: usize = 21;

/// Calibration draws per cell.
const CALIBRATION_DRAWS: usize = 100;

/// Loose acceptance bound used only during calibration.
const CALIBRATION_BOUND: f64 = 20.0;

/// Gaussian proposal parameters for one (T, U) cell.
#[derive(Debug, Clone, Copy)]
pub struct ProposalCell {
    pub mu_vg: f64,
    pub sigma_vg: f64,
    pub sigma_theta: f64,
}

/// 21×21 lookup table of proposal parameters.
#[derive(Debug, Clone)]
pub struct ProposalTable {
    cells: Array2<ProposalCell>,
    t_min: f64,
    t_step: f64,
    u_step: f64,
}

/// Analytic first guess for a cell before calibration.
fn first_guess(t: f64, u: f64, gas_mass: f64) -> ProposalCell {
    let sigma_vg = 1.5 * (8.0 * KB_AMU * (t + 0.2) / (PI * gas_mass)).sqrt();
    ProposalCell {
        mu_vg: u + sigma_vg,
        sigma_vg,
        sigma_theta: 1.5 * PI * sigma_vg / (sigma_vg + u),
    }
}

impl ProposalTable {
    /// Build the table for temperatures in `[t_min, t_max]` and
    /// relative speeds in `[0, u_max]`, deterministically from `seed`.
    pub fn generate(t_min: f64, t_max: f64, u_max: f64, gas_mass: f64, seed: u64) -> Self {
        let n = TABLE_SAMPLES;
        let t_step = (t_max - t_min) / (n - 1) as f64;
        let u_step = u_max / (n - 1) as f64;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut diag = TrajectoryDiagnostics::default();

        let cells = Array2::from_shape_fn((n, n), |(i, j)| {
            let t = t_min + i as f64 * t_step;
            let u = j as f64 * u_step;
            let guess = first_guess(t, u, gas_mass);

            let mut vg_acc = ScalarMoments::new();
            let mut theta_acc = ScalarMoments::new();
            for _ in 0..CALIBRATION_DRAWS {
                let vg = sample_gas_speed(
                    u,
                    t,
                    guess.mu_vg,
                    guess.sigma_vg,
                    CALIBRATION_BOUND,
                    gas_mass,
                    &mut rng,
                    &mut diag,
                );
                let theta = sample_angle(
                    u,
                    vg,
                    t,
                    guess.sigma_theta,
                    CALIBRATION_BOUND,
                    gas_mass,
                    &mut rng,
                    &mut diag,
                );
                vg_acc.push(vg);
                theta_acc.push(theta);
            }
            ProposalCell {
                mu_vg: vg_acc.mean(),
                sigma_vg: vg_acc.variance().sqrt(),
                sigma_theta: theta_acc.variance().sqrt(),
            }
        });

        ProposalTable {
            cells,
            t_min,
            t_step,
            u_step,
        }
    }

    /// Nearest-cell lookup, clamped to the table extents.
    pub fn lookup(&self, temperature: f64, u: f64) -> &ProposalCell {
        let n = TABLE_SAMPLES as f64;
        let i = if self.t_step > 0.0 {
            ((temperature - self.t_min) / self.t_step).round()
        } else {
            0.0
        };
        let j = if self.u_step > 0.0 {
            (u / self.u_step).round()
        } else {
            0.0
        };
        let i = i.clamp(0.0, n - 1.0) as usize;
        let j = j.clamp(0.0, n - 1.0) as usize;
        &self.cells[[i, j]]
    }
}
