//! Newton-type nonlinear least squares for a small set of models.

use std::fmt;

use nalgebra::{DMatrix, DVector};
use tracing::{debug, trace};

use crate::util::{Error, Result};

/// Maximum number of Newton updates.
pub const MAX_ITER: usize = 10;
/// Residual norm treated as an exact fit.
pub const ABS_TOL: f64 = 1e-15;
/// Convergence threshold on the residual norm relative to the first one.
pub const REL_TOL: f64 = 1e-3;

/// Model functions `f(x; params)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Model {
    /// `a x^2 + b x + c`
    Quadratic,
    /// `a exp(b x)`
    Exponential,
}

impl Model {
    pub const fn param_count(self) -> usize {
        match self {
            Self::Quadratic => 3,
            Self::Exponential => 2,
        }
    }

    pub fn value(self, p: &[f64], x: f64) -> f64 {
        match self {
            Self::Quadratic => p[0] * x * x + p[1] * x + p[2],
            Self::Exponential => p[0] * (p[1] * x).exp(),
        }
    }

    /// First derivative with respect to parameter `i`.
    pub fn d1(self, p: &[f64], x: f64, i: usize) -> f64 {
        match (self, i) {
            (Self::Quadratic, 0) => x * x,
            (Self::Quadratic, 1) => x,
            (Self::Quadratic, _) => 1.0,
            (Self::Exponential, 0) => (p[1] * x).exp(),
            (Self::Exponential, _) => p[0] * x * (p[1] * x).exp(),
        }
    }

    /// Second derivative with respect to parameters `i` and `j`.
    pub fn d2(self, p: &[f64], x: f64, i: usize, j: usize) -> f64 {
        match (self, i, j) {
            (Self::Quadratic, _, _) => 0.0,
            (Self::Exponential, 0, 0) => 0.0,
            (Self::Exponential, 1, 1) => p[0] * x * x * (p[1] * x).exp(),
            (Self::Exponential, _, _) => x * (p[1] * x).exp(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quadratic => "quadratic",
            Self::Exponential => "exponential",
        })
    }
}

/// Converged parameters and the number of updates it took.
#[derive(Clone, Debug, PartialEq)]
pub struct NonlinearFit {
    pub params: Vec<f64>,
    pub iterations: usize,
}

/// Fit `model` to `data` starting from `initial`.
///
/// Each step solves `K da = R` with `R_i = -sum (f - y) df/dp_i` and
/// `K_ij = sum df/dp_i df/dp_j + (f - y) d2f/dp_i dp_j`. Stops when the
/// residual norm `sqrt(|R|^2 / n)` drops below [`ABS_TOL`] or below
/// [`REL_TOL`] times the first norm; fails after [`MAX_ITER`] updates.
pub fn nonlinear_regression(data: &[(f64, f64)], model: Model, initial: &[f64]) -> Result<NonlinearFit> {
    let m = model.param_count();
    if initial.len() != m {
        return Err(Error::regression(format!(
            "{model} model takes {m} parameters, got {}",
            initial.len()
        )));
    }
    if data.is_empty() {
        return Err(Error::regression("no data points"));
    }
    let n = data.len() as f64;

    let mut params = initial.to_vec();
    let mut norm0 = 0.0;

    for iter in 0..MAX_ITER {
        let p = params.as_slice();
        let r = DVector::from_fn(m, |i, _| {
            -data
                .iter()
                .map(|&(x, y)| (model.value(p, x) - y) * model.d1(p, x, i))
                .sum::<f64>()
        });
        let norm = (r.norm_squared() / n).sqrt();
        trace!(iter, norm, "residual");

        if norm < ABS_TOL {
            return Ok(converged(params, iter));
        }
        if iter == 0 {
            norm0 = norm;
        } else if norm / norm0 < REL_TOL {
            return Ok(converged(params, iter));
        }

        let k = DMatrix::from_fn(m, m, |i, j| {
            data.iter()
                .map(|&(x, y)| {
                    model.d1(p, x, i) * model.d1(p, x, j)
                        + (model.value(p, x) - y) * model.d2(p, x, i, j)
                })
                .sum::<f64>()
        });
        let da = k
            .lu()
            .solve(&r)
            .ok_or_else(|| Error::regression("singular system"))?;

        for (a, d) in params.iter_mut().zip(da.iter()) {
            *a += d;
        }
        if params.iter().any(|a| !a.is_finite()) {
            return Err(Error::regression("parameters diverged"));
        }
    }

    Err(Error::regression(format!(
        "{model} fit did not converge in {MAX_ITER} iterations"
    )))
}

fn converged(params: Vec<f64>, iterations: usize) -> NonlinearFit {
    debug!(iterations, ?params, "nonlinear fit converged");
    NonlinearFit { params, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(f: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
        (0..=8).map(|i| i as f64 * 0.25).map(|x| (x, f(x))).collect()
    }

    #[test]
    fn test_exponential_fit() {
        let data = sample(|x| 2.0 * (0.5 * x).exp());
        let fit = nonlinear_regression(&data, Model::Exponential, &[1.9, 0.45]).unwrap();
        assert!((fit.params[0] - 2.0).abs() < 1e-2);
        assert!((fit.params[1] - 0.5).abs() < 1e-2);
        assert!(fit.iterations < MAX_ITER);
    }

    #[test]
    fn test_quadratic_fit_is_one_step() {
        let data = sample(|x| 3.0 * x * x - x + 0.5);
        let fit = nonlinear_regression(&data, Model::Quadratic, &[0.0, 0.0, 0.0]).unwrap();
        assert_eq!(fit.iterations, 1);
        for (got, want) in fit.params.iter().zip([3.0, -1.0, 0.5]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn test_exact_start_needs_no_update() {
        let data = sample(|x| x * x);
        let fit = nonlinear_regression(&data, Model::Quadratic, &[1.0, 0.0, 0.0]).unwrap();
        assert_eq!(fit.iterations, 0);
        assert_eq!(fit.params, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_bad_arguments() {
        let data = sample(|x| x);
        assert!(nonlinear_regression(&data, Model::Exponential, &[1.0]).is_err());
        assert!(nonlinear_regression(&[], Model::Quadratic, &[1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn test_singular_system() {
        // a single abscissa cannot determine three coefficients
        let data = vec![(1.0, 2.0); 4];
        let err = nonlinear_regression(&data, Model::Quadratic, &[0.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::Regression(_)));
    }

    #[test]
    fn test_model_derivatives() {
        let p = [2.0, 0.5];
        let x = 1.2;
        let h = 1e-6;
        let fd = (Model::Exponential.value(&[p[0], p[1] + h], x)
            - Model::Exponential.value(&[p[0], p[1] - h], x))
            / (2.0 * h);
        assert!((Model::Exponential.d1(&p, x, 1) - fd).abs() < 1e-6);
        assert_eq!(Model::Exponential.d2(&p, x, 0, 1), Model::Exponential.d2(&p, x, 1, 0));
        assert_eq!(Model::Quadratic.param_count(), 3);
    }
}
