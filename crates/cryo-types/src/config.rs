// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

use crate::error::{CryoError, CryoResult};

fn default_n() -> usize {
    10_000
}
fn default_z() -> f64 {
    0.035
}
fn default_gas_mass() -> f64 {
    4.0
}
fn default_particle_mass() -> f64 {
    191.0
}
fn default_sigma() -> f64 {
    130e-20
}
fn default_zmin() -> f64 {
    f64::NEG_INFINITY
}
fn default_zmax() -> f64 {
    f64::INFINITY
}
fn default_seed() -> u64 {
    0
}

// JSON has no representation for the infinite trap-window defaults, so
// they are omitted on save and restored by the field defaults on load.
fn is_neg_infinite(v: &f64) -> bool {
    *v == f64::NEG_INFINITY
}
fn is_pos_infinite(v: &f64) -> bool {
    *v == f64::INFINITY
}

/// Simulation configuration.
///
/// Field names mirror the historical flat key set, so an existing run
/// deck serializes 1:1. Masses are in AMU, lengths in meters, the
/// cross-section in m², temperatures in kelvin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Geometry table path.
    #[serde(default)]
    pub geom: Option<String>,
    /// Flow-field table path.
    #[serde(default)]
    pub flow: Option<String>,
    /// Number of trajectories.
    #[serde(rename = "n", default = "default_n")]
    pub n_particles: usize,
    /// Source axial position [m].
    #[serde(rename = "z", default = "default_z")]
    pub z_start: f64,
    /// Source radial position [m].
    #[serde(rename = "r", default)]
    pub r_start: f64,
    /// Source axial bulk velocity [m/s].
    #[serde(rename = "vz", default)]
    pub vz_start: f64,
    /// Source radial bulk velocity [m/s].
    #[serde(rename = "vr", default)]
    pub vr_start: f64,
    /// Source temperature [K]; 0 collapses the thermal spread.
    #[serde(rename = "T", default)]
    pub t_source: f64,
    /// Buffer-gas atom mass [AMU].
    #[serde(rename = "m", default = "default_gas_mass")]
    pub gas_mass: f64,
    /// Test-particle mass [AMU].
    #[serde(rename = "M", default = "default_particle_mass")]
    pub particle_mass: f64,
    /// Collision cross-section [m²].
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Harmonic trap frequency parameter [1/s]; signed, 0 = free flight.
    #[serde(default)]
    pub omega: f64,
    /// Axial interval within which the trap is active.
    #[serde(
        rename = "zmin",
        default = "default_zmin",
        skip_serializing_if = "is_neg_infinite"
    )]
    pub trap_z_min: f64,
    #[serde(
        rename = "zmax",
        default = "default_zmax",
        skip_serializing_if = "is_pos_infinite"
    )]
    pub trap_z_max: f64,
    /// Per-collision probability of flipping the trap sign.
    #[serde(rename = "pflip", default)]
    pub p_flip: f64,
    /// Emit every per-particle row, not only exits (any non-zero value).
    #[serde(rename = "saveall", default)]
    pub save_all: u8,
    /// Bin-statistics CSV path, all trajectories.
    #[serde(default)]
    pub stats: Option<String>,
    /// Bin-statistics CSV path, exited trajectories only.
    #[serde(default)]
    pub exitstats: Option<String>,
    /// Radial bin count for trajectory statistics.
    #[serde(rename = "rbins", default)]
    pub r_bins: Option<usize>,
    /// Axial bin count for trajectory statistics.
    #[serde(rename = "zbins", default)]
    pub z_bins: Option<usize>,
    /// Master RNG seed; trajectory i consumes stream i.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            geom: None,
            flow: None,
            n_particles: default_n(),
            z_start: default_z(),
            r_start: 0.0,
            vz_start: 0.0,
            vr_start: 0.0,
            t_source: 0.0,
            gas_mass: default_gas_mass(),
            particle_mass: default_particle_mass(),
            sigma: default_sigma(),
            omega: 0.0,
            trap_z_min: default_zmin(),
            trap_z_max: default_zmax(),
            p_flip: 0.0,
            save_all: 0,
            stats: None,
            exitstats: None,
            r_bins: None,
            z_bins: None,
            seed: default_seed(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON run deck.
    pub fn from_file(path: &str) -> CryoResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reduced mass m·M/(m+M) [AMU].
    pub fn reduced_mass(&self) -> f64 {
        self.gas_mass * self.particle_mass / (self.gas_mass + self.particle_mass)
    }

    pub fn validate(&self) -> CryoResult<()> {
        if !self.gas_mass.is_finite() || self.gas_mass <= 0.0 {
            return Err(CryoError::ConfigError(
                "gas mass m must be finite and > 0".to_string(),
            ));
        }
        if !self.particle_mass.is_finite() || self.particle_mass <= 0.0 {
            return Err(CryoError::ConfigError(
                "particle mass M must be finite and > 0".to_string(),
            ));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(CryoError::ConfigError(
                "cross-section sigma must be finite and >= 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.p_flip) {
            return Err(CryoError::ConfigError(
                "pflip must be in [0, 1]".to_string(),
            ));
        }
        if !self.t_source.is_finite() || self.t_source < 0.0 {
            return Err(CryoError::ConfigError(
                "source temperature T must be finite and >= 0".to_string(),
            ));
        }
        if self.trap_z_min > self.trap_z_max {
            return Err(CryoError::ConfigError(
                "zmin must not exceed zmax".to_string(),
            ));
        }
        if self.r_bins.is_some() != self.z_bins.is_some() {
            return Err(CryoError::ConfigError(
                "rbins and zbins must be given together".to_string(),
            ));
        }
        if matches!(self.r_bins, Some(0)) || matches!(self.z_bins, Some(0)) {
            return Err(CryoError::ConfigError(
                "bin counts must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
