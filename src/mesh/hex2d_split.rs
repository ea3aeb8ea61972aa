//! In-plane 1-to-4 refinement of single-layer hexahedral meshes.

use tracing::debug;

use super::mesh::{Element, ElementType, Mesh, Node};
use super::modifier::MeshModifier;
use crate::util::{centroid, midpoint, Error, Result};

/// Children in terms of the 18 local points of a parent: 0-7 corners,
/// 8-15 bottom and top ring midpoints, 16 bottom center, 17 top center.
const HEX2D_LUT: [[usize; 8]; 4] = [
    [0, 8, 16, 11, 4, 12, 17, 15],
    [8, 1, 9, 16, 12, 5, 13, 17],
    [11, 16, 10, 3, 15, 17, 14, 7],
    [16, 9, 2, 10, 17, 13, 6, 14],
];

/// Split every hexahedron of a one-element-thick mesh into four, leaving
/// the thickness direction (faces 4 and 5) undivided.
#[derive(Clone, Copy, Debug, Default)]
pub struct Hex2DSplit;

impl Hex2DSplit {
    pub fn new() -> Self {
        Self
    }
}

/// End nodes of ring edge `j` in layer `k` (0 = bottom, 1 = top).
#[inline]
fn ring_edge(el: &Element, k: usize, j: usize) -> (usize, usize) {
    (el.nodes[k * 4 + j], el.nodes[k * 4 + (j + 1) % 4])
}

impl MeshModifier for Hex2DSplit {
    fn name(&self) -> &'static str {
        "Split hex 2D"
    }

    fn apply(&self, mesh: &Mesh) -> Result<Mesh> {
        if !mesh.is_type(ElementType::Hex8) {
            return Err(Error::mesh("2D hex split requires an all-hexahedral mesh"));
        }
        if let Some(i) = mesh
            .elements
            .iter()
            .position(|el| el.nbr[4].is_some() || el.nbr[5].is_some())
        {
            return Err(Error::mesh(format!(
                "element {i} has a neighbour across its top or bottom face; mesh is not a single layer"
            )));
        }

        let nn0 = mesh.nodes.len();
        let ne0 = mesh.elements.len();

        // per element, global edge index of each of the 8 ring edges
        let mut ring = vec![[usize::MAX; 8]; ne0];
        let mut edges: Vec<(usize, usize)> = Vec::new();

        for (i, el) in mesh.elements.iter().enumerate() {
            for k in 0..2 {
                for j in 0..4 {
                    let (a, b) = ring_edge(el, k, j);
                    let e = match el.nbr[j] {
                        Some(nb) if nb < i => {
                            let other = &mesh.elements[nb];
                            let l = (0..4)
                                .find(|&l| {
                                    let (p, q) = ring_edge(other, k, l);
                                    (p == a && q == b) || (p == b && q == a)
                                })
                                .ok_or_else(|| {
                                    Error::InconsistentTopology(format!(
                                        "edge ({a}, {b}) of element {i} not found on neighbour {nb}"
                                    ))
                                })?;
                            ring[nb][k * 4 + l]
                        }
                        _ => {
                            edges.push((a, b));
                            edges.len() - 1
                        }
                    };
                    ring[i][k * 4 + j] = e;
                }
            }
        }

        let nc = edges.len();
        let mut nodes = Vec::with_capacity(nn0 + nc + 2 * ne0);
        nodes.extend_from_slice(&mesh.nodes);
        nodes.extend(
            edges
                .iter()
                .map(|&(a, b)| Node::new(midpoint(mesh.position(a), mesh.position(b)))),
        );
        for el in &mesh.elements {
            for k in 0..2 {
                let layer = &el.nodes[k * 4..k * 4 + 4];
                nodes.push(Node::new(centroid(layer.iter().map(|&n| mesh.position(n)))));
            }
        }

        let mut elements = Vec::with_capacity(4 * ne0);
        for (i, el) in mesh.elements.iter().enumerate() {
            let mut m = [0usize; 18];
            m[..8].copy_from_slice(&el.nodes[..8]);
            for (j, &e) in ring[i].iter().enumerate() {
                m[8 + j] = nn0 + e;
            }
            m[16] = nn0 + nc + 2 * i;
            m[17] = nn0 + nc + 2 * i + 1;

            for lut in &HEX2D_LUT {
                elements.push(Element::hex8(lut.map(|l| m[l])).with_gid(el.gid));
            }
        }

        let out = Mesh::new(nodes, elements);
        debug!(
            nodes = out.node_count(),
            elements = out.element_count(),
            "split single-layer hex mesh"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    /// `nx` x 1 strip of unit hexes, one layer thick.
    fn strip(nx: usize) -> Mesh {
        let row = nx + 1;
        let mut pos = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..row {
                    pos.push(DVec3::new(x as f64, y as f64, z as f64));
                }
            }
        }
        let id = |x: usize, y: usize, z: usize| x + row * y + 2 * row * z;
        let hexes: Vec<[usize; 8]> = (0..nx)
            .map(|x| {
                [
                    id(x, 0, 0),
                    id(x + 1, 0, 0),
                    id(x + 1, 1, 0),
                    id(x, 1, 0),
                    id(x, 0, 1),
                    id(x + 1, 0, 1),
                    id(x + 1, 1, 1),
                    id(x, 1, 1),
                ]
            })
            .collect();
        Mesh::from_hexes(&pos, &hexes)
    }

    #[test]
    fn test_split_single_hex() {
        let out = Hex2DSplit::new().apply(&strip(1)).unwrap();
        // 8 corners + 8 ring midpoints + 2 centers
        assert_eq!(out.node_count(), 18);
        assert_eq!(out.element_count(), 4);
        assert!((out.position(8) - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
        assert!((out.position(16) - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-12);
        assert!((out.position(17) - DVec3::new(0.5, 0.5, 1.0)).length() < 1e-12);
        // still one layer thick
        assert!(out.elements.iter().all(|e| e.nbr[4].is_none() && e.nbr[5].is_none()));
    }

    #[test]
    fn test_shared_side_edges_are_reused() {
        let out = Hex2DSplit::new().apply(&strip(2)).unwrap();
        // 12 corners + (16 - 2 shared) midpoints + 4 centers
        assert_eq!(out.node_count(), 12 + 14 + 4);
        assert_eq!(out.element_count(), 8);
        // 4 x 2 grid: top and bottom of each child plus the outer rim
        assert_eq!(out.faces.len(), 8 * 2 + 2 * 6);
    }

    #[test]
    fn test_rejects_stacked_layers() {
        let base = strip(1);
        let mut pos: Vec<DVec3> = base.nodes.iter().map(|n| n.r).collect();
        pos.extend((4..8).map(|i| base.nodes[i].r + DVec3::Z));
        let mesh = Mesh::from_hexes(
            &pos,
            &[[0, 1, 3, 2, 4, 5, 7, 6], [4, 5, 7, 6, 8, 9, 11, 10]],
        );
        let err = Hex2DSplit::new().apply(&mesh).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)));
    }

    #[test]
    fn test_rejects_non_hex() {
        let mut mesh = strip(1);
        mesh.elements[0] = Element::new(ElementType::Penta6, &[0, 1, 2, 4, 5, 6]);
        assert!(Hex2DSplit::new().apply(&mesh).is_err());
    }
}
