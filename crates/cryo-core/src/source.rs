// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Particle Source
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Initial phase-space sampling.
//!
//! The default source launches from `(r, 0, z)` with a drifting
//! Maxwellian velocity: each Cartesian component gets an independent
//! `N(0, √(kB·T/M))` kick on top of the configured bulk components. A
//! zero source temperature collapses the spread so the launch is
//! exact.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use cryo_types::config::SimConfig;
use cryo_types::constants::KB_AMU;

/// Phase-space sample produced by a particle source.
pub type PhaseSpace = ([f64; 3], [f64; 3]);

/// Default source for the configuration surface: position `(r, 0, z)`,
/// velocity `(vr + G, G, vz + G)`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianSource {
    position: [f64; 3],
    v_mean: [f64; 3],
    v_sigma: f64,
}

impl GaussianSource {
    pub fn from_config(cfg: &SimConfig) -> Self {
        GaussianSource {
            position: [cfg.r_start, 0.0, cfg.z_start],
            v_mean: [cfg.vr_start, 0.0, cfg.vz_start],
            v_sigma: (KB_AMU * cfg.t_source / cfg.particle_mass).sqrt(),
        }
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> PhaseSpace {
        let mut v = self.v_mean;
        if self.v_sigma > 0.0 {
            if let Ok(thermal) = Normal::new(0.0, self.v_sigma) {
                for component in v.iter_mut() {
                    *component += thermal.sample(rng);
                }
            }
        }
        (self.position, v)
    }
}
