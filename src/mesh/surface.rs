//! Surface meshes of triangles and quads.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::DVec3;
use smallvec::{smallvec, SmallVec};

use super::mesh::Node;
use crate::util::{centroid, BBox3d};

/// Polygonal face (3 or 4 nodes) with per-edge neighbours.
///
/// Edge `j` runs from `nodes[j]` to `nodes[(j + 1) % n]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub nodes: SmallVec<[usize; 4]>,
    pub gid: i32,
    /// Owning element and its local face, for boundary faces of a solid mesh.
    pub elem: Option<(usize, usize)>,
    pub nbr: SmallVec<[Option<usize>; 4]>,
}

impl Face {
    pub fn new(nodes: &[usize]) -> Self {
        Self {
            nodes: SmallVec::from_slice(nodes),
            gid: 0,
            elem: None,
            nbr: smallvec![None; nodes.len()],
        }
    }

    pub fn tri(a: usize, b: usize, c: usize) -> Self {
        Self::new(&[a, b, c])
    }

    pub fn quad(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self::new(&[a, b, c, d])
    }

    pub fn with_gid(mut self, gid: i32) -> Self {
        self.gid = gid;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn is_tri(&self) -> bool {
        self.nodes.len() == 3
    }

    /// End nodes of edge `j`.
    #[inline]
    pub fn edge(&self, j: usize) -> (usize, usize) {
        let n = self.nodes.len();
        (self.nodes[j], self.nodes[(j + 1) % n])
    }

    /// Local index of the edge joining `a` and `b`, in either direction.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        (0..self.nodes.len()).find(|&j| {
            let (p, q) = self.edge(j);
            (p == a && q == b) || (p == b && q == a)
        })
    }
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Link faces that share an edge.
///
/// Edges used by more than two faces keep only the first pairing.
pub(crate) fn build_face_neighbors(faces: &mut [Face]) {
    let mut open: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    let mut pairs = Vec::new();

    for face in faces.iter_mut() {
        face.nbr = smallvec![None; face.nodes.len()];
    }

    for (i, face) in faces.iter().enumerate() {
        for j in 0..face.len() {
            let (a, b) = face.edge(j);
            match open.entry(edge_key(a, b)) {
                Entry::Occupied(e) => {
                    let (k, fk) = *e.get();
                    if k != usize::MAX {
                        pairs.push((i, j, k, fk));
                        e.into_mut().0 = usize::MAX;
                    }
                }
                Entry::Vacant(e) => {
                    e.insert((i, j));
                }
            }
        }
    }

    for (i, j, k, fk) in pairs {
        faces[i].nbr[j] = Some(k);
        faces[k].nbr[fk] = Some(i);
    }
}

/// Mesh made of triangles and quads.
#[derive(Clone, Debug, Default)]
pub struct SurfaceMesh {
    pub nodes: Vec<Node>,
    pub faces: Vec<Face>,
}

impl SurfaceMesh {
    /// Create a surface and build its face adjacency.
    pub fn new(nodes: Vec<Node>, faces: Vec<Face>) -> Self {
        let mut mesh = Self { nodes, faces };
        mesh.rebuild();
        mesh
    }

    /// Create a triangle surface from positions and connectivity.
    pub fn from_triangles(positions: &[DVec3], tris: &[[usize; 3]]) -> Self {
        let nodes = positions.iter().copied().map(Node::new).collect();
        let faces = tris.iter().map(|t| Face::tri(t[0], t[1], t[2])).collect();
        Self::new(nodes, faces)
    }

    /// Recompute face neighbours.
    pub fn rebuild(&mut self) {
        build_face_neighbors(&mut self.faces);
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn position(&self, n: usize) -> DVec3 {
        self.nodes[n].r
    }

    /// True when the surface is non-empty and made only of triangles.
    pub fn is_triangulated(&self) -> bool {
        !self.faces.is_empty() && self.faces.iter().all(Face::is_tri)
    }

    pub fn face_center(&self, f: usize) -> DVec3 {
        centroid(self.faces[f].nodes.iter().map(|&n| self.nodes[n].r))
    }

    pub fn bounds(&self) -> BBox3d {
        self.nodes.iter().map(|n| n.r).collect()
    }

    /// Total area, splitting quads along their first diagonal.
    pub fn area(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| {
                let r = |i: usize| self.nodes[f.nodes[i]].r;
                let mut a = (r(1) - r(0)).cross(r(2) - r(0)).length();
                if f.len() == 4 {
                    a += (r(2) - r(0)).cross(r(3) - r(0)).length();
                }
                0.5 * a
            })
            .sum()
    }
}
