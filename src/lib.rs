//! # fscore
//!
//! Core data layer for a finite-element pre-processor: a tagged, versioned
//! parameter model, its nested-chunk binary persistence, mesh subdivision
//! modifiers and small curve-fitting utilities.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math helpers
//! - [`archive`] - Chunked binary archive reader and writer
//! - [`param`] - Parameters, parameter blocks and load curves
//! - [`mesh`] - Volume and surface meshes, refinement modifiers
//! - [`regression`] - Linear and nonlinear least squares
//!
//! ## Example
//!
//! ```ignore
//! use fscore::prelude::*;
//!
//! let mut block = ParamBlock::new();
//! block.add(Parameter::float(1.0, "E").with_long_name("Young's modulus"));
//!
//! let mut ar = OArchive::new();
//! block.save(&mut ar)?;
//! ar.write_file("material.fsa")?;
//!
//! let mut ar = IArchive::open("material.fsa")?;
//! block.load(&mut ar)?;
//! ```

pub mod util;
pub mod archive;
pub mod param;
pub mod mesh;
pub mod regression;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Error, Result};
    pub use crate::archive::{IArchive, OArchive};
    pub use crate::param::{
        CurveList, LoadCurve, ParamBlock, ParamContainer, ParamType, ParamValue, Parameter,
    };
    pub use crate::mesh::{
        Hex2DSplit, HexSplit, Mesh, MeshModifier, RefineSurface, SurfaceMesh, SurfaceModifier,
    };
    pub use crate::regression::{linear_regression, nonlinear_regression, Model};
}
