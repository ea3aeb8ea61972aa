//! Unique edge and face enumeration for hexahedral meshes.

use std::collections::HashMap;

use super::mesh::{Mesh, HEX_EDGES, HEX_FACES};

/// Unique edges of a hex mesh, numbered in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct EdgeTable {
    /// End nodes as first encountered.
    pub edges: Vec<[usize; 2]>,
    /// Per element, the global edge index of each local edge.
    pub element_edges: Vec<[usize; 12]>,
    lookup: HashMap<(usize, usize), usize>,
}

impl EdgeTable {
    /// Enumerate the edges of every element, which must all be hexahedra.
    pub fn hex(mesh: &Mesh) -> Self {
        let mut table = Self {
            element_edges: Vec::with_capacity(mesh.elements.len()),
            ..Self::default()
        };
        for el in &mesh.elements {
            let mut local = [0; 12];
            for (j, e) in HEX_EDGES.iter().enumerate() {
                local[j] = table.insert(el.nodes[e[0]], el.nodes[e[1]]);
            }
            table.element_edges.push(local);
        }
        table
    }

    fn insert(&mut self, a: usize, b: usize) -> usize {
        let key = if a < b { (a, b) } else { (b, a) };
        let next = self.edges.len();
        let idx = *self.lookup.entry(key).or_insert(next);
        if idx == next {
            self.edges.push([a, b]);
        }
        idx
    }

    /// Global index of the edge joining `a` and `b`.
    pub fn find(&self, a: usize, b: usize) -> Option<usize> {
        let key = if a < b { (a, b) } else { (b, a) };
        self.lookup.get(&key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Unique faces of a hex mesh with the number of elements using each.
#[derive(Clone, Debug, Default)]
pub struct FaceTable {
    /// Node loops as first encountered (outward for the first owner).
    pub faces: Vec<[usize; 4]>,
    pub element_faces: Vec<[usize; 6]>,
    /// Elements referencing each face; 1 marks a boundary face.
    pub valence: Vec<u32>,
}

impl FaceTable {
    pub fn hex(mesh: &Mesh) -> Self {
        let mut table = Self {
            element_faces: Vec::with_capacity(mesh.elements.len()),
            ..Self::default()
        };
        let mut lookup: HashMap<[usize; 4], usize> = HashMap::new();

        for el in &mesh.elements {
            let mut local = [0; 6];
            for (j, f) in HEX_FACES.iter().enumerate() {
                let nodes = f.map(|l| el.nodes[l]);
                let mut key = nodes;
                key.sort_unstable();
                let next = table.faces.len();
                let idx = *lookup.entry(key).or_insert(next);
                if idx == next {
                    table.faces.push(nodes);
                    table.valence.push(0);
                }
                table.valence[idx] += 1;
                local[j] = idx;
            }
            table.element_faces.push(local);
        }
        table
    }

    /// Indices of faces used by exactly one element.
    pub fn boundary(&self) -> impl Iterator<Item = usize> + '_ {
        self.valence
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v == 1)
            .map(|(i, _)| i)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn two_hexes() -> Mesh {
        let mut pos = Vec::new();
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..3 {
                    pos.push(DVec3::new(x as f64, y as f64, z as f64));
                }
            }
        }
        // node = x + 3*y + 6*z
        Mesh::from_hexes(
            &pos,
            &[[0, 1, 4, 3, 6, 7, 10, 9], [1, 2, 5, 4, 7, 8, 11, 10]],
        )
    }

    #[test]
    fn test_hex_edge_count() {
        let mesh = two_hexes();
        let et = EdgeTable::hex(&mesh);
        // 12 + 12 - 4 shared
        assert_eq!(et.len(), 20);
        assert_eq!(et.find(4, 1), et.find(1, 4));
        assert_eq!(et.element_edges[0][1], et.element_edges[1][3]);
        assert!(et.find(0, 2).is_none());
    }

    #[test]
    fn test_hex_face_valence() {
        let mesh = two_hexes();
        let ft = FaceTable::hex(&mesh);
        assert_eq!(ft.len(), 11);
        assert_eq!(ft.boundary().count(), 10);
        let shared = ft.element_faces[0][1];
        assert_eq!(ft.valence[shared], 2);
        assert_eq!(ft.element_faces[1][3], shared);
    }
}
