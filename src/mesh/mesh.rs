//! Volumetric finite-element mesh.

use std::collections::HashMap;

use glam::DVec3;
use smallvec::{smallvec, SmallVec};

use super::surface::{build_face_neighbors, Face, SurfaceMesh};
use crate::util::BBox3d;

/// Local node indices of the six hexahedron faces.
///
/// Faces 0-3 are the sides, 4 is the bottom and 5 the top; every face is
/// ordered so its normal points out of the element.
pub const HEX_FACES: [[usize; 4]; 6] = [
    [0, 1, 5, 4],
    [1, 2, 6, 5],
    [2, 3, 7, 6],
    [3, 0, 4, 7],
    [0, 3, 2, 1],
    [4, 5, 6, 7],
];

/// Local node indices of the twelve hexahedron edges: bottom ring, top ring,
/// then the four vertical edges.
pub const HEX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

const PENTA_FACES: [&[usize]; 5] = [
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[0, 3, 5, 2],
    &[0, 2, 1],
    &[3, 4, 5],
];

const TET_FACES: [&[usize]; 4] = [&[0, 1, 3], &[1, 2, 3], &[0, 3, 2], &[0, 2, 1]];

const HEX_FACE_REFS: [&[usize]; 6] = [
    &HEX_FACES[0],
    &HEX_FACES[1],
    &HEX_FACES[2],
    &HEX_FACES[3],
    &HEX_FACES[4],
    &HEX_FACES[5],
];

/// Mesh node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Node {
    pub r: DVec3,
}

impl Node {
    #[inline]
    pub const fn new(r: DVec3) -> Self {
        Self { r }
    }
}

impl From<DVec3> for Node {
    fn from(r: DVec3) -> Self {
        Self { r }
    }
}

/// Solid element shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Hex8,
    Penta6,
    Tet4,
}

impl ElementType {
    /// Number of nodes.
    pub const fn nodes(self) -> usize {
        match self {
            Self::Hex8 => 8,
            Self::Penta6 => 6,
            Self::Tet4 => 4,
        }
    }

    /// Number of faces.
    pub fn face_count(self) -> usize {
        self.faces().len()
    }

    /// Local node indices of each face.
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            Self::Hex8 => &HEX_FACE_REFS,
            Self::Penta6 => &PENTA_FACES,
            Self::Tet4 => &TET_FACES,
        }
    }
}

/// Solid element with per-face neighbours (`None` = boundary face).
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub kind: ElementType,
    /// Group (part) id.
    pub gid: i32,
    pub nodes: SmallVec<[usize; 8]>,
    pub nbr: SmallVec<[Option<usize>; 6]>,
}

impl Element {
    pub fn new(kind: ElementType, nodes: &[usize]) -> Self {
        debug_assert_eq!(nodes.len(), kind.nodes());
        Self {
            kind,
            gid: 0,
            nodes: SmallVec::from_slice(nodes),
            nbr: smallvec![None; kind.face_count()],
        }
    }

    pub fn hex8(nodes: [usize; 8]) -> Self {
        Self::new(ElementType::Hex8, &nodes)
    }

    pub fn with_gid(mut self, gid: i32) -> Self {
        self.gid = gid;
        self
    }

    #[inline]
    pub fn is_type(&self, kind: ElementType) -> bool {
        self.kind == kind
    }

    /// Global node indices of local face `j`.
    pub fn face_nodes(&self, j: usize) -> SmallVec<[usize; 4]> {
        self.kind.faces()[j].iter().map(|&l| self.nodes[l]).collect()
    }
}

/// Order-independent key of a face or edge.
pub(crate) fn sorted_key(nodes: &[usize]) -> SmallVec<[usize; 4]> {
    let mut key = SmallVec::from_slice(nodes);
    key.sort_unstable();
    key
}

/// Volumetric mesh of solid elements.
///
/// `faces` holds the boundary faces; it and the element neighbours are
/// derived data, refreshed by [`rebuild`](Self::rebuild).
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Create a mesh and build its adjacency.
    pub fn new(nodes: Vec<Node>, elements: Vec<Element>) -> Self {
        let mut mesh = Self {
            nodes,
            elements,
            faces: Vec::new(),
        };
        mesh.rebuild();
        mesh
    }

    /// Create a mesh from positions and hexahedra connectivity.
    pub fn from_hexes(positions: &[DVec3], hexes: &[[usize; 8]]) -> Self {
        let nodes = positions.iter().copied().map(Node::new).collect();
        let elements = hexes.iter().map(|&h| Element::hex8(h)).collect();
        Self::new(nodes, elements)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// True when the mesh is non-empty and every element is of `kind`.
    pub fn is_type(&self, kind: ElementType) -> bool {
        !self.elements.is_empty() && self.elements.iter().all(|e| e.is_type(kind))
    }

    pub fn position(&self, n: usize) -> DVec3 {
        self.nodes[n].r
    }

    pub fn bounds(&self) -> BBox3d {
        self.nodes.iter().map(|n| n.r).collect()
    }

    /// Recompute element neighbours across faces and the boundary faces.
    pub fn rebuild(&mut self) {
        let mut open: HashMap<SmallVec<[usize; 4]>, (usize, usize)> = HashMap::new();
        let mut pairs = Vec::new();

        for el in &mut self.elements {
            el.nbr = smallvec![None; el.kind.face_count()];
        }

        for (i, el) in self.elements.iter().enumerate() {
            for j in 0..el.kind.face_count() {
                let key = sorted_key(&el.face_nodes(j));
                match open.remove(&key) {
                    Some((k, fk)) => pairs.push((i, j, k, fk)),
                    None => {
                        open.insert(key, (i, j));
                    }
                }
            }
        }

        for (i, j, k, fk) in pairs {
            self.elements[i].nbr[j] = Some(k);
            self.elements[k].nbr[fk] = Some(i);
        }

        self.faces.clear();
        for (i, el) in self.elements.iter().enumerate() {
            for (j, nbr) in el.nbr.iter().enumerate() {
                if nbr.is_none() {
                    let mut face = Face::new(&el.face_nodes(j));
                    face.gid = el.gid;
                    face.elem = Some((i, j));
                    self.faces.push(face);
                }
            }
        }
        build_face_neighbors(&mut self.faces);
    }

    /// Boundary surface as a standalone surface mesh (all nodes kept).
    pub fn extract_surface(&self) -> SurfaceMesh {
        let faces = self
            .faces
            .iter()
            .map(|f| {
                let mut g = Face::new(&f.nodes);
                g.gid = f.gid;
                g
            })
            .collect();
        SurfaceMesh::new(self.nodes.clone(), faces)
    }
}
