//! Iterative 1-to-4 refinement of triangle surfaces.

use tracing::debug;

use super::mesh::Node;
use super::modifier::SurfaceModifier;
use super::surface::{Face, SurfaceMesh};
use crate::util::{midpoint, Error, Result};

/// Split every triangle into four by inserting edge midpoints, repeated
/// `iterations` times. Produces `4^iterations` times as many faces.
#[derive(Clone, Copy, Debug)]
pub struct RefineSurface {
    pub iterations: u32,
}

impl Default for RefineSurface {
    fn default() -> Self {
        Self { iterations: 1 }
    }
}

impl RefineSurface {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }
}

impl SurfaceModifier for RefineSurface {
    fn name(&self) -> &'static str {
        "Refine surface"
    }

    fn apply(&self, mesh: &SurfaceMesh) -> Result<SurfaceMesh> {
        if self.iterations < 1 {
            return Err(Error::mesh("refinement needs at least one iteration"));
        }
        if !mesh.is_triangulated() {
            return Err(Error::mesh("refinement only works on triangle meshes"));
        }

        let mut out = split(mesh)?;
        for _ in 1..self.iterations {
            out = split(&out)?;
        }
        debug!(
            iterations = self.iterations,
            nodes = out.node_count(),
            faces = out.face_count(),
            "refined surface"
        );
        Ok(out)
    }
}

/// One refinement pass. Each edge midpoint is created by the face with no
/// neighbour across it or with the lower index; the other face reuses it.
fn split(mesh: &SurfaceMesh) -> Result<SurfaceMesh> {
    let nn0 = mesh.nodes.len();
    let nf0 = mesh.faces.len();

    let mut nodes = Vec::with_capacity(nn0 + 3 * nf0 / 2 + 3);
    nodes.extend_from_slice(&mesh.nodes);

    // per face, new node index at the midpoint of each edge
    let mut mids = vec![[0usize; 3]; nf0];
    for (i, face) in mesh.faces.iter().enumerate() {
        for j in 0..3 {
            let (a, b) = face.edge(j);
            let m = match face.nbr[j] {
                Some(nb) if nb < i => {
                    let k = mesh.faces[nb].find_edge(a, b).ok_or_else(|| {
                        Error::InconsistentTopology(format!(
                            "edge ({a}, {b}) of face {i} not found on neighbour {nb}"
                        ))
                    })?;
                    mids[nb][k]
                }
                _ => {
                    nodes.push(Node::new(midpoint(mesh.position(a), mesh.position(b))));
                    nodes.len() - 1
                }
            };
            mids[i][j] = m;
        }
    }

    let mut faces = Vec::with_capacity(4 * nf0);
    for (face, m) in mesh.faces.iter().zip(&mids) {
        let n = &face.nodes;
        let [e0, e1, e2] = *m;
        for child in [
            Face::tri(n[0], e0, e2),
            Face::tri(e0, n[1], e1),
            Face::tri(e2, e1, n[2]),
            Face::tri(e0, e1, e2),
        ] {
            faces.push(child.with_gid(face.gid));
        }
    }

    Ok(SurfaceMesh::new(nodes, faces))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn tetra() -> SurfaceMesh {
        SurfaceMesh::from_triangles(
            &[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
            &[[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
        )
    }

    #[test]
    fn test_face_count_grows_fourfold() {
        let s = tetra();
        for n in 1..=3u32 {
            let out = RefineSurface::new(n).apply(&s).unwrap();
            assert_eq!(out.face_count(), 4 * 4usize.pow(n));
        }
    }

    #[test]
    fn test_closed_surface_stays_closed() {
        let out = RefineSurface::new(2).apply(&tetra()).unwrap();
        // V - E + F = 2 with E = 3F/2
        let f = out.face_count();
        assert_eq!(out.node_count() + f - 3 * f / 2, 2);
        assert!(out.faces.iter().all(|f| f.nbr.iter().all(|n| n.is_some())));
    }

    #[test]
    fn test_midpoints_shared_between_faces() {
        let s = SurfaceMesh::from_triangles(
            &[DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
            &[[0, 1, 2], [0, 2, 3]],
        );
        let out = RefineSurface::default().apply(&s).unwrap();
        // 4 corners + 5 unique edges
        assert_eq!(out.node_count(), 9);
        assert_eq!(out.face_count(), 8);
        assert!((out.position(4) - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
        assert!((out.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gid_propagates() {
        let mut s = tetra();
        s.faces[2].gid = 3;
        let out = RefineSurface::new(1).apply(&s).unwrap();
        assert_eq!(out.faces.iter().filter(|f| f.gid == 3).count(), 4);
    }

    #[test]
    fn test_rejects_zero_iterations_and_quads() {
        assert!(RefineSurface::new(0).apply(&tetra()).is_err());

        let quad = SurfaceMesh::new(
            [DVec3::ZERO, DVec3::X, DVec3::X + DVec3::Y, DVec3::Y]
                .into_iter()
                .map(Node::new)
                .collect(),
            vec![Face::quad(0, 1, 2, 3)],
        );
        let err = RefineSurface::new(1).apply(&quad).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)));
    }
}
