//! Core mesh library
//!
//! # Overview
//!
//! Module for the in-memory representation of a tetrahedral volume mesh and
//! the face-adjacency topology a particle-transport code tracks against.
//! The msh-file reading logic is re-exported at the crate root to make
//! loading a file a one-liner.
//!
//! ```ignore
//! // Read a Gmsh msh v4.1 file into a Mesh
//! let mesh = tetmesh::read_msh_file("./data/water.msh").unwrap();
//!
//! // O(1) topology query: the element across face 2 of element 40
//! let next = mesh.neighbour(40, 2);
//! ```
//!
//! A [Mesh] owns its nodes, elements and media outright and is immutable
//! after construction. The neighbour table is built once, up front, by
//! [tetrahedron_neighbours], a near-linear pass that replaces the obvious
//! all-pairs face comparison with a [NodeElementIndex] lookup.

// Split into subfiles for development, but anything important is re-exported
mod core;
mod element;
mod neighbours;

// inline important the mesh-related modules for a nice public API
#[doc(inline)]
pub use crate::mesh::core::{Element, Medium, Mesh, Node};

#[doc(inline)]
pub use crate::mesh::element::{Face, Tetrahedron};

#[doc(inline)]
pub use crate::mesh::neighbours::{
    tetrahedron_neighbours, NeighbourTable, NodeElementIndex, FACES_PER_ELEMENT,
};
