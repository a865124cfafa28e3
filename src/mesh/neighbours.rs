//! Element face-adjacency construction
//!
//! The transport loop asks one question of the topology: given an element
//! and the face a particle just crossed, which element is on the other
//! side? Answering it from a dense table is O(1); the job of this module is
//! to fill that table in near-linear time instead of the obvious O(N²)
//! all-pairs face comparison.
//!
//! The approach is the classic two-stage one from Löhner's *Applied CFD
//! Techniques* (sections 2.2.1 and 2.2.3): first build a CSR-style index of
//! the elements incident to every node, then for each face scan only the
//! handful of elements sharing that face's first node. Node valence is
//! bounded in any well-shaped mesh, so the whole pass is O(T).

// internal modules
use crate::error::{MeshError, Result};
use crate::mesh::element::Tetrahedron;
use crate::utils::*;

// external crates
use log::debug;

/// Faces per tetrahedron, also the width of the neighbour table
pub const FACES_PER_ELEMENT: usize = 4;

/// Dense table of the four face-neighbours of every element
///
/// `table[e][f]` is the index of the element across face `f` of element
/// `e`, or `None` where that face lies on the mesh boundary.
pub type NeighbourTable = Vec<[Option<usize>; FACES_PER_ELEMENT]>;

/// CSR index of the elements incident to each node
///
/// For node `n` the incident element indices are
/// `elements[offsets[n - 1]..offsets[n]]`, in unspecified order. Built in
/// two linear scans over the element list, so construction is
/// O(T + total incidences).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeElementIndex {
    /// Slice bounds per node, length `max_node + 1`
    offsets: Vec<usize>,
    /// Element indices grouped by node, length `4 * |elements|`
    elements: Vec<usize>,
}

impl NodeElementIndex {
    /// Build the index for a list of tetrahedra
    ///
    /// Node tags must be numbered from 1; a tag of zero fails with
    /// [MeshError::MalformedMesh]. Gaps in the numbering are representable
    /// (they produce empty incidence lists) but the mesh-level validation
    /// rejects them before this index is ever built.
    pub fn build(elements: &[Tetrahedron]) -> Result<Self> {
        let mut max_node = 0_usize;
        for elt in elements {
            for node in elt.nodes() {
                if node <= 0 {
                    return Err(MeshError::MalformedMesh(f!(
                        "node tag {node} out of range, node tags are numbered from 1"
                    )));
                }
            }
            max_node = max_node.max(elt.max_node() as usize);
        }

        // first pass counts the incidences of each node
        let mut offsets = vec![0_usize; max_node + 1];
        for elt in elements {
            for node in elt.nodes() {
                offsets[node as usize] += 1;
            }
        }

        // prefix-sum converts counts to end offsets
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }

        // second pass writes element indices, advancing a cursor per node
        let mut list = vec![0_usize; offsets[max_node]];
        for (i, elt) in elements.iter().enumerate() {
            for node in elt.nodes() {
                let slot = offsets[node as usize - 1];
                list[slot] = i;
                offsets[node as usize - 1] += 1;
            }
        }

        // shift right by one to restore canonical start offsets
        for i in (1..offsets.len()).rev() {
            offsets[i] = offsets[i - 1];
        }
        offsets[0] = 0;

        Ok(Self {
            offsets,
            elements: list,
        })
    }

    /// Indices of the elements containing `node`
    ///
    /// Lookup is O(incidences(node)). Panics if `node` is outside
    /// `1..=max_node()`; [build](Self::build) guarantees every node tag of
    /// its input is in range.
    pub fn elements_around(&self, node: i32) -> &[usize] {
        let node = node as usize;
        &self.elements[self.offsets[node - 1]..self.offsets[node]]
    }

    /// The largest node tag the index was built over
    pub fn max_node(&self) -> i32 {
        (self.offsets.len() - 1) as i32
    }
}

/// Returns the face-neighbour table for a list of tetrahedra
///
/// Every slot starts as `None`. Faces are matched through the incidence
/// index: for an unmatched face, only the elements sharing its first node
/// are candidates, and a match assigns both directions at once so each
/// interior face is visited exactly once from each side.
///
/// A conforming manifold mesh has at most two elements on any face. If a
/// third element presents an already-matched face the input is not a
/// manifold mesh and the build fails with [MeshError::MalformedMesh]
/// rather than silently re-wiring the earlier match.
pub fn tetrahedron_neighbours(elements: &[Tetrahedron]) -> Result<NeighbourTable> {
    let index = NodeElementIndex::build(elements)?;
    let mut neighbours: NeighbourTable = vec![[None; FACES_PER_ELEMENT]; elements.len()];

    debug!("Building face adjacency for {} elements", elements.len());

    for i in 0..elements.len() {
        let faces = elements[i].faces();
        for f in 0..FACES_PER_ELEMENT {
            // already matched from the other side
            if neighbours[i][f].is_some() {
                continue;
            }
            let face = faces[f];
            // any face node works as the probe; to be a neighbour an element
            // must contain all three
            'candidates: for &j in index.elements_around(face[0]) {
                if j == i {
                    continue;
                }
                let other_faces = elements[j].faces();
                for (jf, other_face) in other_faces.iter().enumerate() {
                    if *other_face == face {
                        if neighbours[j][jf].is_some() {
                            return Err(MeshError::MalformedMesh(f!(
                                "more than two tetrahedra share the face ({}, {}, {})",
                                face[0],
                                face[1],
                                face[2]
                            )));
                        }
                        neighbours[i][f] = Some(j);
                        neighbours[j][jf] = Some(i);
                        break 'candidates;
                    }
                }
            }
        }
    }

    Ok(neighbours)
}
