//! Finite-element meshes and subdivision modifiers.
//!
//! - [`Mesh`] - solid elements with face adjacency and boundary faces
//! - [`SurfaceMesh`] - triangles and quads with edge adjacency
//! - [`HexSplit`], [`Hex2DSplit`] - hexahedral refinement ([`MeshModifier`])
//! - [`RefineSurface`] - triangle refinement ([`SurfaceModifier`])
//!
//! Modifiers never touch their input; they return a freshly built mesh
//! whose adjacency is already rebuilt.

mod hex2d_split;
mod hex_split;
#[allow(clippy::module_inception)]
mod mesh;
mod modifier;
mod refine;
mod surface;
mod topology;

pub use hex2d_split::*;
pub use hex_split::*;
pub use mesh::*;
pub use modifier::*;
pub use refine::*;
pub use surface::*;
pub use topology::*;
