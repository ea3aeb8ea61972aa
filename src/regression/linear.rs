//! Closed-form linear least squares.

use crate::util::{Error, Result};

/// Result of [`linear_regression`]: `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a straight line to `(x, y)` samples.
///
/// Fails on empty input and when all `x` are equal (zero variance).
pub fn linear_regression(data: &[(f64, f64)]) -> Result<LinearFit> {
    if data.is_empty() {
        return Err(Error::regression("no data points"));
    }
    let n = data.len() as f64;

    let (mut mx, mut my, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for &(x, y) in data {
        mx += x;
        my += y;
        sxx += x * x;
        sxy += x * y;
    }
    mx /= n;
    my /= n;
    sxx /= n;
    sxy /= n;

    let d = sxx - mx * mx;
    if d == 0.0 {
        return Err(Error::regression("x values have zero variance"));
    }

    let slope = (sxy - mx * my) / d;
    Ok(LinearFit {
        slope,
        intercept: my - slope * mx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_line() {
        let data: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 2.0 * i as f64 + 3.0)).collect();
        let fit = linear_regression(&data).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
        assert!((fit.eval(10.0) - 23.0).abs() < 1e-10);
    }

    #[test]
    fn test_noisy_line_is_least_squares() {
        let data = [(0.0, 1.1), (1.0, 1.9), (2.0, 3.1), (3.0, 3.9)];
        let fit = linear_regression(&data).unwrap();
        assert!((fit.slope - 0.96).abs() < 1e-12);
        assert!((fit.intercept - 1.06).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_input() {
        assert!(matches!(linear_regression(&[]), Err(Error::Regression(_))));
        let same_x = [(1.0, 0.0), (1.0, 5.0), (1.0, 2.0)];
        assert!(matches!(linear_regression(&same_x), Err(Error::Regression(_))));
    }
}
