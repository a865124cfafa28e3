//! The canonical tetrahedron value type
//!
//! Node ordering in the input file carries no information the transport code
//! needs, so the four tags are sorted once at construction. Faces derived
//! from sorted nodes are themselves canonical: two tetrahedra share a face
//! exactly when the derived triples compare equal component-wise, which is
//! what makes the neighbour search a plain array comparison.

// internal modules
use crate::error::{MeshError, Result};
use crate::utils::*;

/// A tetrahedron face as the ordered triple of its node tags
///
/// Faces are derived on the stack during adjacency construction and never
/// stored in the mesh.
pub type Face = [i32; 3];

/// A four-node tetrahedron with its node tags held in ascending order
///
/// Construction fails rather than produce a degenerate element, so any
/// `Tetrahedron` value is guaranteed to hold four distinct, non-negative
/// tags. The original input ordering is not preserved.
///
/// ```rust
/// # use tetmesh::mesh::Tetrahedron;
/// let tet = Tetrahedron::new(4, 1, 3, 2).unwrap();
/// assert_eq!(tet.nodes(), [1, 2, 3, 4]);
/// assert_eq!(tet.max_node(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetrahedron {
    nodes: [i32; 4],
}

impl Tetrahedron {
    /// Make a tetrahedron from four node tags
    ///
    /// Fails with [MeshError::InvalidElement] if any tag is negative or if
    /// any two tags are equal.
    pub fn new(a: i32, b: i32, c: i32, d: i32) -> Result<Self> {
        for tag in [a, b, c, d] {
            if tag < 0 {
                return Err(MeshError::InvalidElement(f!("negative node {tag}")));
            }
        }
        if a == b || a == c || a == d {
            return Err(MeshError::InvalidElement(f!("duplicate node {a}")));
        }
        if b == c || b == d {
            return Err(MeshError::InvalidElement(f!("duplicate node {b}")));
        }
        if c == d {
            return Err(MeshError::InvalidElement(f!("duplicate node {c}")));
        }
        let mut nodes = [a, b, c, d];
        nodes.sort_unstable();
        Ok(Self { nodes })
    }

    /// The four node tags in ascending order
    pub fn nodes(&self) -> [i32; 4] {
        self.nodes
    }

    /// The largest node tag, used to size the node-incidence index
    pub fn max_node(&self) -> i32 {
        self.nodes[3]
    }

    /// The four faces, each produced by omitting one of the sorted nodes
    ///
    /// Face order is deterministic (omit-0, omit-1, omit-2, omit-3), so the
    /// face-slot index reported by the neighbour table is meaningful.
    pub fn faces(&self) -> [Face; 4] {
        let [a, b, c, d] = self.nodes;
        [[b, c, d], [a, c, d], [a, b, d], [a, b, c]]
    }
}
