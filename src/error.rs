//! Error reporting for mesh parsing and topology construction
//!
//! Every failure aborts the parse; no partial mesh is ever returned. The
//! variants exist so callers (and tests) can match on the failure kind, but
//! the payload is always a single human-readable line carrying the section
//! context and, where available, the offending tag.

// standard library
use std::io;

// external crates
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T, E = MeshError> = std::result::Result<T, E>;

/// Anything that can go wrong while reading a msh file or building the
/// face-adjacency topology
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MeshError {
    /// Underlying stream failure, including unexpected end of input
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Missing or malformed `$MeshFormat` header
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Msh version other than 4.1
    #[error("unsupported msh version `{0}`, the only supported version is 4.1")]
    UnsupportedVersion(String),

    /// Binary flag set, or a size_t width other than 8
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// Structural violation within a section, e.g. a missing token, missing
    /// end marker, duplicate tag, or empty quoted name
    #[error("malformed mesh: {0}")]
    MalformedMesh(String),

    /// A 3d element block declared a non-tetrahedral element type
    #[error("unsupported element type: {0}")]
    UnsupportedElementType(String),

    /// An element referenced an unknown entity, or an entity referenced an
    /// unknown physical group
    #[error("dangling reference: {0}")]
    DanglingReference(String),

    /// Negative or duplicate node tags passed to a tetrahedron
    #[error("invalid element: {0}")]
    InvalidElement(String),
}

impl MeshError {
    /// Prefix the message with the enclosing context, keeping the error kind
    ///
    /// Used to build chains such as
    /// `$Elements section: block for entity 12: non-tetrahedral element type 5`.
    pub(crate) fn context(self, ctx: &str) -> Self {
        match self {
            Self::Io(e) => Self::Io(io::Error::new(e.kind(), format!("{ctx}: {e}"))),
            Self::MalformedHeader(m) => Self::MalformedHeader(format!("{ctx}: {m}")),
            Self::UnsupportedVersion(v) => Self::UnsupportedVersion(v),
            Self::UnsupportedEncoding(m) => Self::UnsupportedEncoding(format!("{ctx}: {m}")),
            Self::MalformedMesh(m) => Self::MalformedMesh(format!("{ctx}: {m}")),
            Self::UnsupportedElementType(m) => Self::UnsupportedElementType(format!("{ctx}: {m}")),
            Self::DanglingReference(m) => Self::DanglingReference(format!("{ctx}: {m}")),
            Self::InvalidElement(m) => Self::InvalidElement(format!("{ctx}: {m}")),
        }
    }

    /// Unexpected end of input while a section or the header was still open
    pub(crate) fn eof(expected: &str) -> Self {
        Self::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("unexpected end of input, expected {expected}"),
        ))
    }
}
