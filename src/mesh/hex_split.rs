//! Uniform 1-to-8 refinement of hexahedral meshes.

use tracing::debug;

use super::mesh::{Element, ElementType, Mesh, Node};
use super::modifier::MeshModifier;
use super::topology::{EdgeTable, FaceTable};
use crate::util::{centroid, midpoint, Error, Result};

/// Child connectivity in terms of the 27 local points of a parent:
/// 0-7 corners, 8-19 edge midpoints, 20-25 face centers, 26 the centroid.
const HEX_LUT: [[usize; 8]; 8] = [
    [0, 8, 24, 11, 16, 20, 26, 23],
    [8, 1, 9, 24, 20, 17, 21, 26],
    [11, 24, 10, 3, 23, 26, 22, 19],
    [24, 9, 2, 10, 26, 21, 18, 22],
    [16, 20, 26, 23, 4, 12, 25, 15],
    [20, 17, 21, 26, 12, 5, 13, 25],
    [23, 26, 22, 19, 15, 25, 14, 7],
    [26, 21, 18, 22, 25, 13, 6, 14],
];

/// Split every hexahedron into eight.
///
/// New nodes are laid out as: original nodes, one per unique edge, one per
/// unique face, one per element. With `smooth_surface`, boundary nodes are
/// then relaxed towards a Catmull-Clark style average of the surface.
#[derive(Clone, Copy, Debug, Default)]
pub struct HexSplit {
    pub smooth_surface: bool,
}

impl HexSplit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn smoothing(smooth_surface: bool) -> Self {
        Self { smooth_surface }
    }
}

impl MeshModifier for HexSplit {
    fn name(&self) -> &'static str {
        "Split hex"
    }

    fn apply(&self, mesh: &Mesh) -> Result<Mesh> {
        if !mesh.is_type(ElementType::Hex8) {
            return Err(Error::mesh("hex split requires an all-hexahedral mesh"));
        }

        let et = EdgeTable::hex(mesh);
        let ft = FaceTable::hex(mesh);

        let nn0 = mesh.nodes.len();
        let nc0 = et.len();
        let nf0 = ft.len();
        let ne0 = mesh.elements.len();

        let mut nodes = Vec::with_capacity(nn0 + nc0 + nf0 + ne0);
        nodes.extend_from_slice(&mesh.nodes);
        nodes.extend(
            et.edges
                .iter()
                .map(|e| Node::new(midpoint(mesh.position(e[0]), mesh.position(e[1])))),
        );
        nodes.extend(
            ft.faces
                .iter()
                .map(|f| Node::new(centroid(f.iter().map(|&n| mesh.position(n))))),
        );
        nodes.extend(
            mesh.elements
                .iter()
                .map(|el| Node::new(centroid(el.nodes.iter().map(|&n| mesh.position(n))))),
        );

        let mut elements = Vec::with_capacity(8 * ne0);
        for (i, el) in mesh.elements.iter().enumerate() {
            let mut m = [0usize; 27];
            m[..8].copy_from_slice(&el.nodes[..8]);
            for (j, &e) in et.element_edges[i].iter().enumerate() {
                m[8 + j] = nn0 + e;
            }
            for (j, &f) in ft.element_faces[i].iter().enumerate() {
                m[20 + j] = nn0 + nc0 + f;
            }
            m[26] = nn0 + nc0 + nf0 + i;

            for lut in &HEX_LUT {
                elements.push(Element::hex8(lut.map(|l| m[l])).with_gid(el.gid));
            }
        }

        if self.smooth_surface {
            smooth_boundary(&mut nodes, nn0, &et, &ft)?;
        }

        let out = Mesh::new(nodes, elements);
        debug!(
            nodes = out.node_count(),
            elements = out.element_count(),
            smooth = self.smooth_surface,
            "split hex mesh"
        );
        Ok(out)
    }
}

/// Relax original boundary nodes and boundary edge midpoints.
///
/// Corner nodes move to `(P/m + r(m-3)) / m` where `m` is the number of
/// boundary faces around the node and `P` accumulates adjacent edge
/// midpoints (twice) and face centers. Edge midpoints move to the average
/// of their old position and the adjacent face centers.
fn smooth_boundary(nodes: &mut [Node], nn0: usize, et: &EdgeTable, ft: &FaceTable) -> Result<()> {
    let nc0 = et.len();
    let face_center = |f: usize| nn0 + nc0 + f;

    let mut valence = vec![0u32; nn0 + nc0];
    let mut acc = vec![glam::DVec3::ZERO; nn0];
    let mut face_edges = Vec::new();

    for f in ft.boundary() {
        let face = ft.faces[f];
        let fc = nodes[face_center(f)].r;
        for j in 0..4 {
            let a = face[j];
            let b = face[(j + 1) % 4];
            let e = et.find(a, b).ok_or_else(|| {
                Error::InconsistentTopology(format!("boundary edge ({a}, {b}) is not a mesh edge"))
            })?;
            face_edges.push((e, f));

            valence[a] += 1;
            valence[nn0 + e] += 1;

            let [e0, e1] = et.edges[e];
            let mid = nodes[nn0 + e].r;
            acc[e0] += mid;
            acc[e1] += mid;
            acc[a] += fc;
        }
    }

    for (i, node) in nodes.iter_mut().take(nn0).enumerate() {
        if valence[i] != 0 {
            let m = f64::from(valence[i]);
            node.r = (acc[i] / m + node.r * (m - 3.0)) / m;
        }
    }

    for &(e, f) in &face_edges {
        let fc = nodes[face_center(f)].r;
        nodes[nn0 + e].r += fc * 0.5;
    }
    for e in 0..nc0 {
        if valence[nn0 + e] != 0 {
            nodes[nn0 + e].r *= 0.5;
        }
    }
    Ok(())
}
