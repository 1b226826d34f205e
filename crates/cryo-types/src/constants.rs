// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Boltzmann constant in AMU·m²/(s²·K).
/// All masses in this code are carried in atomic mass units, so
/// kB/m ratios come out directly in m²/s².
pub const KB_AMU: f64 = 8314.46;

/// Speeds below this [m/s] are treated as "at rest".
pub const V_EPSILON: f64 = 1e-6;

/// Hard cap on a single sampled free path [m].
/// Prevents pathological excursions through near-vacuum cells.
pub const FREE_PATH_CAP_M: f64 = 1000.0;

/// Fractional tolerance defining the validity radius of a flow sample.
pub const FIELD_TOLERANCE: f64 = 0.2;

/// Neighbors explored when computing a sample's validity radius.
pub const VALIDITY_NEIGHBORS: usize = 100;

/// Upper clamp on the Bessel I0 argument in the collision kernel.
pub const BESSEL_ARG_MAX: f64 = 10.0;

/// Temperature [K] below which the gas-velocity sampler collapses to
/// the deterministic cold limit.
pub const COLD_LIMIT_K: f64 = 1e-2;
