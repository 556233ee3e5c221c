//! Ordinary least squares for a single predictor.
//!
//! We fit
//!
//! ```text
//! minimize Σ (y_i - (a·x_i + b))^2
//! ```
//!
//! Implementation choices:
//! - The predictor is centered (`x_i - x̄`) before solving, so the two design
//!   columns are orthogonal and the conditioning does not depend on where the
//!   time axis starts.
//! - The 2-column system is solved with nalgebra's SVD, which also handles the
//!   tall (n × 2) shape directly. A zero singular value means the predictor has
//!   no variance; we report that as `None` instead of returning a
//!   pseudo-inverse answer.

use nalgebra::{DMatrix, DVector};

/// Singular values below `SINGULAR_EPS * σ_max` are treated as zero.
const SINGULAR_EPS: f64 = 1e-12;

/// Fitted line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit `y = a·x + b` by least squares.
///
/// Returns `None` if the inputs differ in length, there are fewer than two
/// points, `x` has zero variance, or the solution is not finite.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LineFit> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }

    let x_mean = x.iter().sum::<f64>() / n as f64;

    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &xi) in x.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = xi - x_mean;
    }
    let rhs = DVector::from_column_slice(y);

    let svd = design.svd(true, true);
    let sigma_max = svd.singular_values.max();
    let sigma_min = svd.singular_values.min();
    if !(sigma_max.is_finite() && sigma_min > SINGULAR_EPS * sigma_max) {
        return None;
    }

    let beta = svd.solve(&rhs, SINGULAR_EPS * sigma_max).ok()?;
    let slope = beta[1];
    // Undo the centering: b = β0 - a·x̄.
    let intercept = beta[0] - slope * x_mean;

    (slope.is_finite() && intercept.is_finite()).then_some(LineFit { slope, intercept })
}
