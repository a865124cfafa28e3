//! Core mesh data structures
//!
//! A [Mesh] owns three ordered sequences (nodes, elements, media) plus the
//! face-neighbour table built at construction. Cross-references are plain
//! indices and tags rather than pointers: an element stores the integer tag
//! of its medium, the neighbour table stores element indices. This keeps
//! the whole mesh trivially copyable and comparable, which the test suite
//! leans on.

// standard library
use std::collections::HashSet;
use std::fmt;

// internal modules
use crate::error::{MeshError, Result};
use crate::mesh::element::Tetrahedron;
use crate::mesh::neighbours::{tetrahedron_neighbours, NeighbourTable};
use crate::utils::*;

/// A single 3d point of the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    /// Positive tag, unique within a mesh
    pub tag: i32,
    /// Cartesian x coordinate
    pub x: f64,
    /// Cartesian y coordinate
    pub y: f64,
    /// Cartesian z coordinate
    pub z: f64,
}

/// A named material region
///
/// One medium per volume, any number of volumes per medium. The mesh keeps
/// only the media actually referenced by at least one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Medium {
    /// Physical group tag, unique within a mesh
    pub tag: i32,
    /// Display name from the quoted `$PhysicalNames` entry, never empty
    pub name: String,
}

/// A tetrahedral mesh element with its resolved medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    /// Tag of the medium filling this element
    pub medium_tag: i32,
    /// The canonical four-node tetrahedron
    pub tetrahedron: Tetrahedron,
}

impl Element {
    /// The element's four node tags in ascending order
    pub fn nodes(&self) -> [i32; 4] {
        self.tetrahedron.nodes()
    }
}

/// An immutable tetrahedral volume mesh with face-adjacency
///
/// Built either by the msh reader ([read_msh](crate::read_msh)) or
/// programmatically through [Mesh::new]. Either way the constructor checks
/// the cross-referencing invariants and computes the neighbour table, so a
/// `Mesh` value is always internally consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    elements: Vec<Element>,
    nodes: Vec<Node>,
    media: Vec<Medium>,
    neighbours: NeighbourTable,
}

impl Mesh {
    /// Assemble a mesh from its three owned sequences
    ///
    /// Validates the structural invariants and builds the face-neighbour
    /// table:
    /// - node tags must be unique and contiguous from 1 (sparse numbering
    ///   is rejected with [MeshError::MalformedMesh]),
    /// - every element's medium tag must appear in `media`
    ///   ([MeshError::DanglingReference] otherwise),
    /// - every element's node tags must fall inside the node range
    ///   ([MeshError::MalformedMesh] otherwise),
    /// - at most two elements may share any face
    ///   ([MeshError::MalformedMesh] otherwise).
    pub fn new(elements: Vec<Element>, nodes: Vec<Node>, media: Vec<Medium>) -> Result<Self> {
        if elements.is_empty() {
            return Err(MeshError::MalformedMesh("mesh has no elements".to_string()));
        }
        if nodes.is_empty() {
            return Err(MeshError::MalformedMesh("mesh has no nodes".to_string()));
        }
        if media.is_empty() {
            return Err(MeshError::MalformedMesh("mesh has no media".to_string()));
        }

        // node tags must cover 1..=len exactly
        let mut seen = vec![false; nodes.len()];
        for node in &nodes {
            if node.tag < 1 || node.tag as usize > nodes.len() {
                return Err(MeshError::MalformedMesh(f!(
                    "node tags are not contiguous from 1, got tag {} with {} nodes",
                    node.tag,
                    nodes.len()
                )));
            }
            if seen[node.tag as usize - 1] {
                return Err(MeshError::MalformedMesh(f!(
                    "found duplicate node tag {}",
                    node.tag
                )));
            }
            seen[node.tag as usize - 1] = true;
        }

        if let Some(tag) = first_duplicate_tag(media.iter().map(|m| m.tag)) {
            return Err(MeshError::MalformedMesh(f!(
                "found duplicate medium tag {tag}"
            )));
        }
        let medium_tags: HashSet<i32> = media.iter().map(|m| m.tag).collect();

        for (i, elt) in elements.iter().enumerate() {
            if !medium_tags.contains(&elt.medium_tag) {
                return Err(MeshError::DanglingReference(f!(
                    "element {i} has unknown medium tag {}",
                    elt.medium_tag
                )));
            }
            for node in elt.nodes() {
                if node < 1 || node as usize > nodes.len() {
                    return Err(MeshError::MalformedMesh(f!(
                        "element {i} references unknown node tag {node}"
                    )));
                }
            }
        }

        let tets: Vec<Tetrahedron> = elements.iter().map(|e| e.tetrahedron).collect();
        let neighbours = tetrahedron_neighbours(&tets)?;

        Ok(Self {
            elements,
            nodes,
            media,
            neighbours,
        })
    }

    /// The mesh elements, in file order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The mesh nodes, in file order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The media referenced by at least one element, in file order
    pub fn media(&self) -> &[Medium] {
        &self.media
    }

    /// The element across face `face` of element `element`
    ///
    /// Returns `None` where the face lies on the mesh boundary. This is the
    /// O(1) query the transport loop makes while tracking a particle.
    ///
    /// Panics if `element` is out of range or `face` is not in `0..4`.
    pub fn neighbour(&self, element: usize, face: usize) -> Option<usize> {
        self.neighbours[element][face]
    }

    /// All four face-neighbours of an element
    pub fn neighbours(&self, element: usize) -> [Option<usize>; 4] {
        self.neighbours[element]
    }

    /// The full neighbour table, one row of four slots per element
    pub fn neighbour_table(&self) -> &NeighbourTable {
        &self.neighbours
    }
}

impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "mesh: {} nodes, {} tetrahedra, {} media",
            self.nodes.len(),
            self.elements.len(),
            self.media.len()
        )?;
        for medium in &self.media {
            writeln!(f, "  > medium {:<4} \"{}\"", medium.tag, medium.name)?;
        }
        Ok(())
    }
}
