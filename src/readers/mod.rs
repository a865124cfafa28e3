#![doc(hidden)]
//! Library of readers and common functions for msh files

// internal modules
use crate::error::Result;
use crate::mesh::Mesh;
use crate::utils::*;

// standard library
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

// files under the readers module
mod msh_file;
pub mod parsers;

// inline important the mesh-related modules for a nice API
#[doc(inline)]
pub use crate::readers::msh_file::MshReader;

/// Read a tetrahedral mesh from any buffered msh v4.1 stream
///
/// Returns a result containing the [Mesh] extracted from `input`, with the
/// face-neighbour table already built. The stream is read strictly forward
/// and only borrowed for the duration of the call.
///
/// Example
/// ```ignore
/// // Read an in-memory msh document
/// let mesh: Mesh = tetmesh::read_msh(document.as_bytes())?;
/// ```
pub fn read_msh<R: BufRead>(input: R) -> Result<Mesh> {
    let mut reader = MshReader::new();
    reader.disable_progress();
    reader.parse(input)
}

/// Read a tetrahedral mesh from a msh v4.1 file
///
/// Returns a result containing the [Mesh] extracted from the file at
/// `path` by the parser.
///
/// - `path` - Path to the msh file, can be [&str], [String], [Path], etc...
///
/// Example
/// ```ignore
/// // Read a mesh exported by Gmsh
/// let mesh: Mesh = tetmesh::read_msh_file("path/to/water.msh")?;
/// ```
pub fn read_msh_file<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path: &Path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| io::Error::new(e.kind(), f!("could not open {}: {e}", path.display())))?;
    let mut reader = MshReader::new();
    reader.disable_progress();
    reader.parse(BufReader::new(file))
}
