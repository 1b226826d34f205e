// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Modified Bessel I0
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Modified Bessel function of the first kind, order zero.
//!
//! Abramowitz & Stegun 9.8.1 / 9.8.2 polynomial approximations,
//! |error| < 2e-7 over the full range. The collision kernel clamps its
//! argument before calling, so the large-x branch stays well below
//! overflow.

/// I0(x) for any finite x (even function).
pub fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (ax / 3.75) * (ax / 3.75);
        1.0 + t
            * (3.5156229
                + t * (3.0899424
                    + t * (1.2067492 + t * (0.2659732 + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let u = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + u * (0.01328592
                    + u * (0.00225319
                        + u * (-0.00157565
                            + u * (0.00916281
                                + u * (-0.02057706
                                    + u * (0.02635537
                                        + u * (-0.01647633 + u * 0.00392377))))))))
    }
}
