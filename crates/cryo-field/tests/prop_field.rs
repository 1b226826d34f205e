// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Property-Based Tests (proptest) for cryo-field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for cryo-field using proptest.
//!
//! Covers: wall-crossing agreement with an orientation-predicate
//! oracle, and the flow-field validity-radius tolerance.

use cryo_field::flow::{FlowField, FlowSample};
use cryo_field::geometry::{Geometry, Segment};
use cryo_types::record::Termination;
use proptest::prelude::*;

/// Orientation of the ordered triple (a, b, c).
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Reference oracle: proper (interior) segment intersection via strict
/// orientation predicates, matching the half-closed tie-breaking of
/// the production test.
fn oracle_cross(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let o1 = orient(p1, p2, q1);
    let o2 = orient(p1, p2, q2);
    let o3 = orient(q1, q2, p1);
    let o4 = orient(q1, q2, p2);
    // strict sign changes on both segments; any touch is a non-hit
    (o1 * o2 < 0.0) && (o3 * o4 < 0.0)
}

proptest! {
    /// Geometry::test agrees with the orientation oracle for random
    /// segment pairs (paths kept at positive radius so the cylindrical
    /// projection is the identity on the test plane).
    #[test]
    fn wall_test_matches_oracle(
        pz1 in -1.0f64..1.0, pr1 in 0.05f64..1.0,
        pz2 in -1.0f64..1.0, pr2 in 0.05f64..1.0,
        qz1 in -1.0f64..1.0, qr1 in 0.0f64..1.0,
        qz2 in -1.0f64..1.0, qr2 in 0.0f64..1.0,
    ) {
        let segment = Segment { z1: qz1, rho1: qr1, z2: qz2, rho2: qr2 };
        // bounding box far away so only the wall can trigger
        let geom = Geometry::new(vec![segment], -100.0, 100.0, 100.0);

        // embed the (z, ρ) path on the +x half-plane
        let a = [pr1, 0.0, pz1];
        let b = [pr2, 0.0, pz2];
        let got = geom.test(&a, &b) == Some(Termination::Wall);
        let want = oracle_cross([pz1, pr1], [pz2, pr2], [qz1, qr1], [qz2, qr2]);
        prop_assert_eq!(got, want,
            "path ({}, {}) -> ({}, {}) vs segment ({}, {}) -> ({}, {})",
            pz1, pr1, pz2, pr2, qz1, qr1, qz2, qr2);
    }
}

fn graded_samples() -> Vec<FlowSample> {
    let mut out = Vec::new();
    for i in 0..24 {
        for j in 0..12 {
            let z = i as f64 * 0.01;
            let r = j as f64 * 0.005;
            out.push(FlowSample {
                z,
                r,
                // smooth axial gradient in every tracked field
                v_axial: 80.0 + 400.0 * z,
                v_radial: 2.0 + 10.0 * z,
                v_phi: 0.0,
                temperature: 4.0 + 30.0 * z,
                density: 1e21 * (1.0 + 4.0 * z),
            });
        }
    }
    out
}

proptest! {
    /// Any query within a cached sample's validity radius sees fields
    /// within the fractional tolerance of that sample.
    #[test]
    fn validity_radius_honors_tolerance(
        pick in 0usize..288,
        angle in 0.0f64..std::f64::consts::TAU,
        frac in 0.0f64..1.0,
    ) {
        let field = FlowField::new(graded_samples()).unwrap();
        let base = field.points()[pick % field.points().len()];
        prop_assume!(base.d_min > 0.0);

        // query inside half the validity radius, so the true nearest
        // sample is itself strictly inside the in-band neighborhood
        let rho = frac * base.d_min * 0.499;
        let qz = base.z + rho * angle.cos();
        let qr = (base.r + rho * angle.sin()).max(0.0);

        // the true nearest sample at the query point
        let mut best = (f64::INFINITY, base);
        for &p in field.points() {
            let d = ((p.z - qz).powi(2) + (p.r - qr).powi(2)).sqrt();
            if d < best.0 {
                best = (d, p);
            }
        }
        let truth = best.1;

        let tol = 0.2;
        let in_band = |b: f64, v: f64| {
            let lo = (tol * b).min((1.0 + tol) * b);
            let hi = (tol * b).max((1.0 + tol) * b);
            v >= lo - 1e-12 && v <= hi + 1e-12
        };
        prop_assert!(in_band(base.temperature, truth.temperature),
            "T {} outside band of {}", truth.temperature, base.temperature);
        prop_assert!(in_band(base.density, truth.density));
        prop_assert!(in_band(base.v_axial, truth.v_axial));
        prop_assert!(in_band(base.v_radial, truth.v_radial));
    }
}
