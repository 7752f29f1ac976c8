//! Reproducible demo data
//!
//! A small seeded generator produces normal samples for demos and for
//! round-trip checks of the region estimators. The same seed always yields
//! the same sequence.

use densplot_stats::{CovarianceMatrix, MeanVector, Point2D, StatsError};

use crate::error::Result;

/// Seeded 64-bit generator (LCG state, splitmix output)
#[derive(Debug, Clone)]
pub struct SampleRng {
    state: u64,
}

impl SampleRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E3779B97F4A7C15),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `[0, 1]`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    /// Two independent standard normal values (Box-Muller)
    pub fn standard_normal_pair(&mut self) -> (f64, f64) {
        let u1 = self.next_f64().max(1e-10);
        let u2 = self.next_f64();

        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;

        (r * theta.cos(), r * theta.sin())
    }
}

/// `n` samples of `N(mean, std_dev^2)`
pub fn normal_samples(mean: f64, std_dev: f64, n: usize, seed: u64) -> Result<Vec<f64>> {
    if !(std_dev.is_finite() && std_dev >= 0.0) {
        return Err(StatsError::InvalidStdDev(std_dev).into());
    }
    let mut rng = SampleRng::new(seed);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let (z0, z1) = rng.standard_normal_pair();
        out.push(mean + std_dev * z0);
        if out.len() < n {
            out.push(mean + std_dev * z1);
        }
    }
    Ok(out)
}

/// Lower-triangular `L` with `L L^T = cov`, as `(l11, l21, l22)`
///
/// Tolerates singular matrices: a zero variance gives a zero column.
fn cholesky(cov: &CovarianceMatrix) -> (f64, f64, f64) {
    let l11 = cov.a.max(0.0).sqrt();
    let l21 = if l11 > 0.0 { cov.b / l11 } else { 0.0 };
    let l22 = (cov.d - l21 * l21).max(0.0).sqrt();
    (l11, l21, l22)
}

/// `n` points from the bivariate normal `N(mean, cov)`
pub fn gaussian_points(
    mean: &MeanVector,
    cov: &CovarianceMatrix,
    n: usize,
    seed: u64,
) -> Result<Vec<Point2D>> {
    cov.validate()?;
    let (l11, l21, l22) = cholesky(cov);
    let mut rng = SampleRng::new(seed);

    Ok((0..n)
        .map(|_| {
            let (z0, z1) = rng.standard_normal_pair();
            Point2D::new(mean.x + l11 * z0, mean.y + l21 * z0 + l22 * z1)
        })
        .collect())
}
