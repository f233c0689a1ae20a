use std::f64::consts::PI;

const LENGTH_SCALES: [f64; 6] = [0.05, 0.1, 0.2, 0.35, 0.5, 1.0];
const BASE_JITTER: f64 = 1e-8;
const MAX_JITTER_STEPS: usize = 6;

#[derive(Debug, Clone)]
pub struct GaussianProcess {
    points: Vec<Vec<f64>>,
    chol: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    length_scale: f64,
    log_likelihood: f64,
    y_mean: f64,
    y_std: f64,
}

impl GaussianProcess {
    pub fn fit(points: &[Vec<f64>], values: &[f64]) -> Option<Self> {
        if points.is_empty() || points.len() != values.len() {
            return None;
        }
        let n = values.len() as f64;
        let y_mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>() / n;
        let y_std = if variance > 0.0 { variance.sqrt() } else { 1.0 };
        let y = values
            .iter()
            .map(|v| (v - y_mean) / y_std)
            .collect::<Vec<_>>();

        LENGTH_SCALES
            .iter()
            .filter_map(|&length_scale| Self::fit_with(points, &y, length_scale, y_mean, y_std))
            .max_by(|a, b| a.log_likelihood.total_cmp(&b.log_likelihood))
    }

    fn fit_with(
        points: &[Vec<f64>],
        y: &[f64],
        length_scale: f64,
        y_mean: f64,
        y_std: f64,
    ) -> Option<Self> {
        let mut jitter = BASE_JITTER;
        for _ in 0..MAX_JITTER_STEPS {
            let kernel = kernel_matrix(points, length_scale, jitter);
            if let Some(chol) = cholesky(&kernel) {
                let alpha = solve_upper_transposed(&chol, &solve_lower(&chol, y));
                let log_det = chol
                    .iter()
                    .enumerate()
                    .map(|(i, row)| row[i].ln())
                    .sum::<f64>();
                let log_likelihood =
                    -0.5 * dot(y, &alpha) - log_det - 0.5 * y.len() as f64 * (2.0 * PI).ln();
                return Some(Self {
                    points: points.to_vec(),
                    chol,
                    alpha,
                    length_scale,
                    log_likelihood,
                    y_mean,
                    y_std,
                });
            }
            jitter *= 10.0;
        }
        None
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn predict(&self, x: &[f64]) -> (f64, f64) {
        let k = self
            .points
            .iter()
            .map(|point| rbf(point, x, self.length_scale))
            .collect::<Vec<_>>();
        let mean = dot(&k, &self.alpha);
        let v = solve_lower(&self.chol, &k);
        let variance = (1.0 - dot(&v, &v)).max(1e-12);
        (
            mean * self.y_std + self.y_mean,
            variance.sqrt() * self.y_std,
        )
    }
}

/// Expected improvement below `best` (minimization).
pub fn expected_improvement(mean: f64, std: f64, best: f64, xi: f64) -> f64 {
    let improvement = best - mean - xi;
    if std <= 0.0 {
        return improvement.max(0.0);
    }
    let z = improvement / std;
    improvement * normal_cdf(z) + std * normal_pdf(z)
}

fn rbf(a: &[f64], b: &[f64], length_scale: f64) -> f64 {
    let sq = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>();
    (-0.5 * sq / (length_scale * length_scale)).exp()
}

fn kernel_matrix(points: &[Vec<f64>], length_scale: f64, jitter: f64) -> Vec<Vec<f64>> {
    points
        .iter()
        .enumerate()
        .map(|(i, a)| {
            points
                .iter()
                .enumerate()
                .map(|(j, b)| rbf(a, b, length_scale) + if i == j { jitter } else { 0.0 })
                .collect()
        })
        .collect()
}

/// Lower-triangular `L` with `L Lᵀ = matrix`.
fn cholesky(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut lower = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum = (0..j).map(|k| lower[i][k] * lower[j][k]).sum::<f64>();
            if i == j {
                let diagonal = matrix[i][i] - sum;
                if diagonal <= 0.0 || !diagonal.is_finite() {
                    return None;
                }
                lower[i][j] = diagonal.sqrt();
            } else {
                lower[i][j] = (matrix[i][j] - sum) / lower[j][j];
            }
        }
    }
    Some(lower)
}

fn solve_lower(lower: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut x = vec![0.0; n];
    for i in 0..n {
        let sum = (0..i).map(|k| lower[i][k] * x[k]).sum::<f64>();
        x[i] = (b[i] - sum) / lower[i][i];
    }
    x
}

fn solve_upper_transposed(lower: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum = ((i + 1)..n).map(|k| lower[k][i] * x[k]).sum::<f64>();
        x[i] = (b[i] - sum) / lower[i][i];
    }
    x
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

// Abramowitz & Stegun 7.1.26, absolute error below 1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}
