//! Mesh modifier traits.

use super::mesh::Mesh;
use super::surface::SurfaceMesh;
use crate::util::Result;

/// Operation producing a new volume mesh from an existing one.
///
/// The input is never modified; on error no partial mesh is returned.
pub trait MeshModifier {
    /// Short human-readable name.
    fn name(&self) -> &'static str;

    fn apply(&self, mesh: &Mesh) -> Result<Mesh>;
}

/// Operation producing a new surface mesh from an existing one.
pub trait SurfaceModifier {
    fn name(&self) -> &'static str;

    fn apply(&self, mesh: &SurfaceMesh) -> Result<SurfaceMesh>;
}
