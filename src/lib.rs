//! # The Tetmesh crate
//!
//! A strict reader for Gmsh msh v4.1 ascii files that builds the in-memory
//! tetrahedral mesh representation used by Monte-Carlo particle-transport
//! codes, element face-adjacency included.
//!
//! ## Overview
//!
//! Particle tracking needs exactly one topology query to be fast: given an
//! element and the face a particle crosses, find the element on the other
//! side. The crate answers that from a dense neighbour table built once at
//! load time, in near-linear time, via a node-incidence index rather than
//! the obvious all-pairs face comparison.
//!
//! The reader cross-links four sections of the file into one coherent mesh
//! and refuses anything inconsistent:
//!
//! | Section          | Contribution                                      |
//! | ---------------- | ------------------------------------------------- |
//! | `$Entities`      | volume entity to physical group mapping           |
//! | `$PhysicalNames` | physical group tag to material name               |
//! | `$Nodes`         | node tags and coordinates, any number of blocks   |
//! | `$Elements`      | tetrahedra per volume, lower dimensions discarded |
//!
//! Anything else between the header and the end of the stream is skipped,
//! so files carrying extra sections from newer Gmsh releases still load.
//!
//! ## Supported format
//!
//! Only version 4.1 ascii with an 8-byte size_t is accepted. Binary files,
//! other versions, and 3d element types other than the linear tetrahedron
//! are rejected outright rather than half-read: a volume silently missing
//! elements would lose mass during transport, which is far worse than an
//! error at load time.
//!
//! ## Quickstart
//!
//! Reading a file is a one-liner, and everything the transport loop needs
//! afterwards lives on the [Mesh](crate::mesh::Mesh):
//!
//! ```ignore
//! // read a Gmsh msh v4.1 file, adjacency built up front
//! let mesh = tetmesh::read_msh_file("data/water.msh")?;
//!
//! // the particle crossed face 2 of element 40
//! match mesh.neighbour(40, 2) {
//!     Some(next) => println!("entering element {next}"),
//!     None => println!("leaving the mesh"),
//! }
//! ```
//!
//! Every failure mode is a [MeshError](crate::error::MeshError) variant
//! carrying a single contextual line, e.g.
//! `malformed mesh: $Nodes section: found duplicate node tag 363`.
//!
//! Parsing is handled by the `nom` parser combinator library line by line,
//! so memory stays proportional to the mesh rather than the file.

// Public facing modules
pub mod error;
pub mod mesh;
pub mod utils;

// note that docs are hidden to prevent confusing the current simple API
pub mod readers;

// Re-exports of useful data structures
#[doc(inline)]
pub use crate::error::MeshError;

#[doc(inline)]
pub use crate::mesh::Mesh;

#[doc(inline)]
pub use crate::readers::{read_msh, read_msh_file, MshReader};
