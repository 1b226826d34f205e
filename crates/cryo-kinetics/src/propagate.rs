// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Propagator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Free flight between collisions.
//!
//! The axial coordinate always moves ballistically; the two transverse
//! coordinates see a quadratic potential of signed frequency parameter
//! ω (positive confines, negative inverts, zero is free flight). The
//! trap acts only while `z_min ≤ x₃ ≤ z_max`; steps that cross an axial
//! threshold are split there and the sub-segments integrated with the
//! correct trap state on each side.
//!
//! With `s = √2·|ω|·t` the transverse solution of `ẍ = −2ω²x` is
//!   x' = x·cos s + v·sin s/(√2·ω),  v' = v·cos s − √2·ω·x·sin s
//! and the inverted branch replaces sin/cos by sinh/cosh with the
//! velocity sign flipped. The invariant v² + 2ω²x² is conserved per
//! transverse axis in the confining branch.

use std::f64::consts::{PI, SQRT_2};

use cryo_types::constants::{FREE_PATH_CAP_M, KB_AMU, V_EPSILON};

use crate::norm3;

/// Guard against degenerate threshold geometry producing zero-length
/// sub-segments.
const MAX_SPLITS: usize = 64;

/// Trap configuration seen by one trajectory (ω carries the current
/// spin sign).
#[derive(Debug, Clone, Copy)]
pub struct TrapParams {
    pub omega: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl TrapParams {
    pub fn free() -> Self {
        TrapParams {
            omega: 0.0,
            z_min: f64::NEG_INFINITY,
            z_max: f64::INFINITY,
        }
    }
}

/// Advance (x, v) by time `t` under a fixed trap frequency.
pub fn harmonic_step(x: &mut [f64; 3], v: &mut [f64; 3], t: f64, omega: f64) {
    x[2] += v[2] * t;
    if omega == 0.0 {
        x[0] += v[0] * t;
        x[1] += v[1] * t;
        return;
    }
    let w = omega.abs();
    let s = SQRT_2 * w * t;
    if omega > 0.0 {
        let (sin_s, cos_s) = s.sin_cos();
        for k in 0..2 {
            let xi = x[k];
            let vi = v[k];
            x[k] = xi * cos_s + vi * sin_s / (SQRT_2 * omega);
            v[k] = vi * cos_s - SQRT_2 * omega * xi * sin_s;
        }
    } else {
        let cosh_s = s.cosh();
        let sinh_s = s.sinh();
        for k in 0..2 {
            let xi = x[k];
            let vi = v[k];
            x[k] = xi * cosh_s + vi * sinh_s / (SQRT_2 * w);
            v[k] = vi * cosh_s + SQRT_2 * w * xi * sinh_s;
        }
    }
}

/// First axial threshold crossing strictly ahead of `z` within `t_max`.
/// Returns (time, threshold value).
fn next_axial_crossing(z: f64, vz: f64, trap: &TrapParams, t_max: f64) -> Option<(f64, f64)> {
    if vz == 0.0 {
        return None;
    }
    let mut best: Option<(f64, f64)> = None;
    for threshold in [trap.z_min, trap.z_max] {
        if !threshold.is_finite() {
            continue;
        }
        let dt = (threshold - z) / vz;
        if dt > 0.0 && dt < t_max {
            match best {
                Some((t_best, _)) if t_best <= dt => {}
                _ => best = Some((dt, threshold)),
            }
        }
    }
    best
}

/// Propagate a sampled free-path distance `d`, splitting at axial trap
/// thresholds so the trap is active exactly while `z_min ≤ x₃ ≤ z_max`.
///
/// The distance is converted to time with the current speed at the
/// start of every sub-segment, and the consumed chord length is
/// subtracted from the remainder after each split. Particles slower
/// than `V_EPSILON` do not move.
pub fn propagate_distance(x: &mut [f64; 3], v: &mut [f64; 3], d: f64, trap: &TrapParams) {
    let mut remaining = d;
    for _ in 0..MAX_SPLITS {
        let speed = norm3(v);
        if speed < V_EPSILON || remaining <= 0.0 {
            return;
        }
        let t_total = remaining / speed;
        let crossing = next_axial_crossing(x[2], v[2], trap, t_total);
        let t_seg = crossing.map(|(t, _)| t).unwrap_or(t_total);

        // trap state from the sub-segment midpoint: active iff inside
        let z_mid = x[2] + 0.5 * t_seg * v[2];
        let omega_seg = if z_mid >= trap.z_min && z_mid <= trap.z_max {
            trap.omega
        } else {
            0.0
        };

        let x_before = *x;
        harmonic_step(x, v, t_seg, omega_seg);

        match crossing {
            Some((_, threshold)) => {
                x[2] = threshold;
                let dx = [
                    x[0] - x_before[0],
                    x[1] - x_before[1],
                    x[2] - x_before[2],
                ];
                remaining -= norm3(&dx);
            }
            None => return,
        }
    }
}

/// Local mean free path [m].
///
/// λ = |v| / (ρ·σ·√(8·kB·T/(π·m) + v_rel²))
pub fn mean_free_path(
    speed: f64,
    v_rel: f64,
    temperature: f64,
    density: f64,
    gas_mass: f64,
    sigma: f64,
) -> f64 {
    let thermal_sq = 8.0 * KB_AMU * temperature / (PI * gas_mass);
    speed / (density * sigma * (thermal_sq + v_rel * v_rel).sqrt())
}

/// Exponentially distributed free path with the hard cap applied.
pub fn sample_free_path<R: rand::Rng>(lambda: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    (-u.ln() * lambda).min(FREE_PATH_CAP_M)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_free_flight_is_straight() {
        let mut x = [1.0, -2.0, 0.5];
        let mut v = [3.0, 4.0, -1.0];
        harmonic_step(&mut x, &mut v, 2.0, 0.0);
        assert_eq!(x, [7.0, 6.0, -1.5]);
        assert_eq!(v, [3.0, 4.0, -1.0]);
    }

    #[test]
    fn test_confining_invariant() {
        let omega = 1000.0;
        let mut x = [0.001, -0.002, 0.0];
        let mut v = [0.3, 0.1, 5.0];
        let inv0: Vec<f64> = (0..2)
            .map(|k| v[k] * v[k] + 2.0 * omega * omega * x[k] * x[k])
            .collect();
        harmonic_step(&mut x, &mut v, 3.7e-3, omega);
        for k in 0..2 {
            let inv1 = v[k] * v[k] + 2.0 * omega * omega * x[k] * x[k];
            let rel = (inv1 - inv0[k]).abs() / inv0[k];
            assert!(rel < 1e-12, "axis {k}: invariant drift {rel}");
        }
        // axial untouched
        assert_eq!(v[2], 5.0);
    }

    #[test]
    fn test_inverted_branch_grows() {
        let omega = -500.0;
        let mut x = [0.001, 0.0, 0.0];
        let mut v = [0.0, 0.0, 1.0];
        harmonic_step(&mut x, &mut v, 1e-2, omega);
        assert!(x[0] > 0.001, "inverted trap should push outward");
        assert!(v[0] > 0.0);
    }

    #[test]
    fn test_period_closes_orbit() {
        // full period of the transverse oscillator: s = 2π
        let omega = 200.0;
        let t = 2.0 * PI / (SQRT_2 * omega);
        let mut x = [0.004, -0.001, 0.0];
        let mut v = [0.5, 0.25, 0.0];
        let (x0, v0) = (x, v);
        harmonic_step(&mut x, &mut v, t, omega);
        for k in 0..2 {
            assert!((x[k] - x0[k]).abs() < 1e-12, "x[{k}] did not close");
            assert!((v[k] - v0[k]).abs() < 1e-12, "v[{k}] did not close");
        }
    }

    #[test]
    fn test_propagate_snaps_to_threshold() {
        let trap = TrapParams {
            omega: 800.0,
            z_min: 0.0,
            z_max: 0.01,
        };
        let mut x = [0.0, 0.0, -0.005];
        let mut v = [0.0, 0.0, 10.0];
        // the first split must land exactly on z_min
        let d_to_threshold = 0.005;
        let mut x2 = x;
        let mut v2 = v;
        propagate_distance(&mut x2, &mut v2, d_to_threshold + 0.002, &trap);
        // final position is past the threshold, inside the trap window
        assert!(x2[2] > 0.0 && x2[2] < 0.01, "z = {}", x2[2]);

        // a step ending exactly at the threshold snaps there
        propagate_distance(&mut x, &mut v, d_to_threshold, &trap);
        assert!((x[2] - 0.0).abs() < 1e-12, "z = {}", x[2]);
    }

    #[test]
    fn test_trap_gating_outside_window() {
        let trap = TrapParams {
            omega: 5000.0,
            z_min: 1.0,
            z_max: 2.0,
        };
        // entirely below the window: transverse motion must stay straight
        let mut x = [0.01, 0.0, 0.0];
        let mut v = [1.0, 0.0, 5.0];
        propagate_distance(&mut x, &mut v, 0.5, &trap);
        assert!((v[0] - 1.0).abs() < 1e-12, "trap leaked outside window");
    }

    #[test]
    fn test_reentry_reenables_trap() {
        let trap = TrapParams {
            omega: 3000.0,
            z_min: -0.5,
            z_max: 0.5,
        };
        // start above the window moving down through it
        let mut x = [0.01, 0.0, 1.0];
        let mut v = [0.0, 0.0, -20.0];
        propagate_distance(&mut x, &mut v, 1.2, &trap);
        // once inside, the trap must have bent the transverse velocity
        assert!(
            v[0].abs() > 0.0,
            "transverse velocity unchanged after entering trap window"
        );
        assert!(x[2] < 0.5);
    }

    #[test]
    fn test_slow_particle_does_not_move() {
        let trap = TrapParams::free();
        let mut x = [1.0, 2.0, 3.0];
        let mut v = [1e-9, 0.0, 0.0];
        propagate_distance(&mut x, &mut v, 10.0, &trap);
        assert_eq!(x, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_free_path_mean_and_cap() {
        let mut rng = StdRng::seed_from_u64(7);
        let lambda = 0.25;
        let n = 200_000;
        let mut sum = 0.0;
        for _ in 0..n {
            sum += sample_free_path(lambda, &mut rng);
        }
        let mean = sum / n as f64;
        assert!(
            (mean - lambda).abs() / lambda < 0.01,
            "empirical mean {mean} vs λ = {lambda}"
        );

        // zero density: λ = ∞, every draw hits the cap
        let inf_lambda = mean_free_path(10.0, 10.0, 4.0, 0.0, 4.0, 130e-20);
        assert!(inf_lambda.is_infinite());
        for _ in 0..10 {
            assert_eq!(sample_free_path(inf_lambda, &mut rng), FREE_PATH_CAP_M);
        }
    }

    #[test]
    fn test_mean_free_path_formula() {
        let lambda = mean_free_path(100.0, 50.0, 4.0, 1e21, 4.0, 130e-20);
        let thermal_sq = 8.0 * KB_AMU * 4.0 / (PI * 4.0);
        let expected = 100.0 / (1e21 * 130e-20 * (thermal_sq + 2500.0_f64).sqrt());
        assert!((lambda - expected).abs() / expected < 1e-12);
    }
}
