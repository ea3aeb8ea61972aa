//! Utility types and functions shared by every module.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - Math type re-exports from glam plus a bounding box

mod error;
mod math;

pub use error::*;
pub use math::*;
