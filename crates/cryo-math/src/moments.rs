// ─────────────────────────────────────────────────────────────────────
// SCPN CryoFlow — Online Moments
// © 1998–2026 Miroslav Šotek. All rights reserved.
// ─────────────────────────────────────────────────────────────────────
//! Mergeable online moment accumulators.
//!
//! Welford single-sample updates combined with the Chan et al. parallel
//! formula, so that merging two partial accumulators equals a single
//! pass over the union to roundoff.
//!
//! Reference: Chan, Golub, LeVeque, "Updating Formulae and a Pairwise
//! Algorithm for Computing Sample Variances", STAN-CS-79-773 (1979).

/// Running count, mean, and second central moment of a scalar stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScalarMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl ScalarMoments {
    pub fn new() -> Self {
        ScalarMoments::default()
    }

    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn merge(&mut self, other: &ScalarMoments) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let delta = other.mean - self.mean;
        self.mean += delta * n_b / n;
        self.m2 += other.m2 + delta * delta * n_a * n_b / n;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// NaN on an empty accumulator.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    /// Population variance; NaN on an empty accumulator.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// Running mean and 2×2 covariance of a 2-vector stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BivariateMoments {
    count: u64,
    mean: [f64; 2],
    m2: [f64; 2],
    c2: f64,
}

impl BivariateMoments {
    pub fn new() -> Self {
        BivariateMoments::default()
    }

    pub fn push(&mut self, x: [f64; 2]) {
        self.count += 1;
        let n = self.count as f64;
        let d0 = x[0] - self.mean[0];
        let d1 = x[1] - self.mean[1];
        self.mean[0] += d0 / n;
        self.mean[1] += d1 / n;
        // cross moment uses the pre-update delta on one axis and the
        // post-update delta on the other
        self.m2[0] += d0 * (x[0] - self.mean[0]);
        self.m2[1] += d1 * (x[1] - self.mean[1]);
        self.c2 += d0 * (x[1] - self.mean[1]);
    }

    pub fn merge(&mut self, other: &BivariateMoments) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = n_a + n_b;
        let d0 = other.mean[0] - self.mean[0];
        let d1 = other.mean[1] - self.mean[1];
        self.mean[0] += d0 * n_b / n;
        self.mean[1] += d1 * n_b / n;
        self.m2[0] += other.m2[0] + d0 * d0 * n_a * n_b / n;
        self.m2[1] += other.m2[1] + d1 * d1 * n_a * n_b / n;
        self.c2 += other.c2 + d0 * d1 * n_a * n_b / n;
        self.count += other.count;
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> [f64; 2] {
        if self.count == 0 {
            [f64::NAN; 2]
        } else {
            self.mean
        }
    }

    /// Population variances of the two components.
    pub fn variance(&self) -> [f64; 2] {
        if self.count == 0 {
            [f64::NAN; 2]
        } else {
            let n = self.count as f64;
            [self.m2[0] / n, self.m2[1] / n]
        }
    }

    /// Population covariance of the two components.
    pub fn covariance(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.c2 / self.count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_matches_two_pass() {
        let xs = [1.0, 4.0, -2.5, 0.75, 9.0, 9.0, -4.0];
        let mut acc = ScalarMoments::new();
        for &x in &xs {
            acc.push(x);
        }
        let n = xs.len() as f64;
        let mean = xs.iter().sum::<f64>() / n;
        let var = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
        assert!((acc.mean() - mean).abs() < 1e-12);
        assert!((acc.variance() - var).abs() < 1e-12);
    }

    #[test]
    fn test_scalar_merge_equals_single_pass() {
        let xs: Vec<f64> = (0..100).map(|i| (i as f64 * 0.37).sin() * 5.0).collect();
        let mut whole = ScalarMoments::new();
        for &x in &xs {
            whole.push(x);
        }
        let mut left = ScalarMoments::new();
        let mut right = ScalarMoments::new();
        for &x in &xs[..33] {
            left.push(x);
        }
        for &x in &xs[33..] {
            right.push(x);
        }
        left.merge(&right);
        assert_eq!(left.count(), whole.count());
        assert!((left.mean() - whole.mean()).abs() < 1e-12);
        assert!((left.variance() - whole.variance()).abs() < 1e-12);
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let mut acc = ScalarMoments::new();
        acc.push(2.0);
        acc.push(-1.0);
        let before = acc;
        acc.merge(&ScalarMoments::new());
        assert_eq!(acc, before);

        let mut empty = ScalarMoments::new();
        empty.merge(&before);
        assert_eq!(empty, before);
    }

    #[test]
    fn test_empty_moments_are_nan() {
        let acc = ScalarMoments::new();
        assert_eq!(acc.count(), 0);
        assert!(acc.mean().is_nan());
        assert!(acc.variance().is_nan());
        let biv = BivariateMoments::new();
        assert!(biv.mean()[0].is_nan());
        assert!(biv.covariance().is_nan());
    }

    #[test]
    fn test_bivariate_covariance_matches_two_pass() {
        let pts: Vec<[f64; 2]> = (0..50)
            .map(|i| {
                let t = i as f64 * 0.11;
                [t.sin() * 2.0, t.cos() * 3.0 + t.sin()]
            })
            .collect();
        let mut acc = BivariateMoments::new();
        for &p in &pts {
            acc.push(p);
        }
        let n = pts.len() as f64;
        let mx = pts.iter().map(|p| p[0]).sum::<f64>() / n;
        let my = pts.iter().map(|p| p[1]).sum::<f64>() / n;
        let cov = pts.iter().map(|p| (p[0] - mx) * (p[1] - my)).sum::<f64>() / n;
        assert!((acc.mean()[0] - mx).abs() < 1e-12);
        assert!((acc.mean()[1] - my).abs() < 1e-12);
        assert!((acc.covariance() - cov).abs() < 1e-12);
    }

    #[test]
    fn test_bivariate_merge_equals_single_pass() {
        let pts: Vec<[f64; 2]> = (0..64)
            .map(|i| [((i * 7) % 13) as f64, ((i * 5) % 11) as f64 - 5.0])
            .collect();
        let mut whole = BivariateMoments::new();
        for &p in &pts {
            whole.push(p);
        }
        let mut a = BivariateMoments::new();
        let mut b = BivariateMoments::new();
        for &p in &pts[..20] {
            a.push(p);
        }
        for &p in &pts[20..] {
            b.push(p);
        }
        a.merge(&b);
        assert!((a.covariance() - whole.covariance()).abs() < 1e-10);
        assert!((a.variance()[0] - whole.variance()[0]).abs() < 1e-10);
        assert!((a.variance()[1] - whole.variance()[1]).abs() < 1e-10);
    }
}
