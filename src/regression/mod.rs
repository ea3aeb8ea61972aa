//! Curve fitting for tabulated `(x, y)` data.
//!
//! [`linear_regression`] is closed form; [`nonlinear_regression`] iterates
//! Newton updates on the least-squares objective of a [`Model`].

mod linear;
mod nonlinear;

pub use linear::*;
pub use nonlinear::*;
