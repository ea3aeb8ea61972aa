//! Tagged, versioned parameter model.
//!
//! - [`ParamValue`] / [`ParamType`] - closed set of parameter payloads
//! - [`Parameter`] - value plus identity, unit, state, index and time curve
//! - [`ParamBlock`] - ordered, id-addressed parameter collection
//! - [`LoadCurve`] / [`CurveList`] - time curves and their export registry
//! - persistence through [`crate::archive`] chunks, with legacy remapping
//!   via [`LegacyParamLoader`]

mod block;
mod curve_list;
mod load_curve;
#[allow(clippy::module_inception)]
mod param;
mod persist;
mod value;

pub use block::*;
pub use curve_list::*;
pub use load_curve::*;
pub use param::*;
pub use persist::*;
pub use value::*;
