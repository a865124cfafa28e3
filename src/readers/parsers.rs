//! Library of nom parser combinators for msh v4.1 lines
//!
//! Every function takes a single logical line and returns an [IResult], so
//! the reader can decide how to wrap a failure with section context. Tokens
//! are whitespace separated; trailing content beyond what a record needs is
//! ignored, which is what the format specifies for entity lines.

// external crates
use nom::bytes::complete::take_till1;
use nom::character::complete::{alphanumeric1, char, multispace0, multispace1};
use nom::character::complete::{i32 as int32, i64 as int64, u64 as uint64};
use nom::combinator::{map, opt};
use nom::multi::count;
use nom::number::complete::double;
use nom::sequence::{preceded, tuple};
use nom::IResult;

/// A `$Name` section marker, returning the bare name
pub fn section_marker(i: &str) -> IResult<&str, &str> {
    preceded(char('$'), alphanumeric1)(i)
}

/// The `$MeshFormat` payload: version token, binary flag, size_t width
pub fn format_line(i: &str) -> IResult<&str, (&str, i32, i32)> {
    tuple((
        preceded(multispace0, take_till1(|c: char| c.is_whitespace())),
        preceded(multispace1, int32),
        preceded(multispace1, int32),
    ))(i)
}

/// Four non-negative counts, shared by the `$Entities` header
/// (`n0 n1 n2 n3`) and the `$Nodes`/`$Elements` headers
/// (`blocks total min max`)
pub fn counts4(i: &str) -> IResult<&str, (u64, u64, u64, u64)> {
    tuple((
        preceded(multispace0, uint64),
        preceded(multispace1, uint64),
        preceded(multispace1, uint64),
        preceded(multispace1, uint64),
    ))(i)
}

/// A block sub-header: dimension, entity tag, a third integer (parametric
/// flag for nodes, element type for elements), block record count
pub fn block_header(i: &str) -> IResult<&str, (i32, i32, i32, u64)> {
    tuple((
        preceded(multispace0, int32),
        preceded(multispace1, int32),
        preceded(multispace1, int32),
        preceded(multispace1, uint64),
    ))(i)
}

/// A volume entity line as far as the parser cares about it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeLine {
    /// Entity tag
    pub tag: i32,
    /// Declared number of attached physical groups
    pub num_groups: u64,
    /// First attached group tag, when one is present
    pub group: Option<i32>,
}

/// A `$Entities` volume record: tag, bounding box (ignored), group count,
/// first group tag; trailing boundary information is ignored
pub fn volume_entity(i: &str) -> IResult<&str, VolumeLine> {
    map(
        tuple((
            preceded(multispace0, int32),
            count(preceded(multispace1, double), 6),
            preceded(multispace1, uint64),
            opt(preceded(multispace1, int32)),
        )),
        |(tag, _bbox, num_groups, group)| VolumeLine {
            tag,
            num_groups,
            group,
        },
    )(i)
}

/// The `dim tag` prefix of a `$PhysicalNames` record; the quoted name is
/// cut from the raw line by the reader
pub fn physical_name_prefix(i: &str) -> IResult<&str, (i32, i32)> {
    tuple((
        preceded(multispace0, int32),
        preceded(multispace1, int32),
    ))(i)
}

/// A single unsigned integer, e.g. a node tag line or a total count line
pub fn unsigned_int(i: &str) -> IResult<&str, u64> {
    preceded(multispace0, uint64)(i)
}

/// Three node coordinates
pub fn coordinates(i: &str) -> IResult<&str, (f64, f64, f64)> {
    tuple((
        preceded(multispace0, double),
        preceded(multispace1, double),
        preceded(multispace1, double),
    ))(i)
}

/// A tetrahedron record: element tag then four node tags
///
/// Signed on purpose: a negative node tag must reach the tetrahedron
/// constructor so it is reported as an invalid element rather than a
/// token error.
pub fn element_line(i: &str) -> IResult<&str, (i64, [i64; 4])> {
    map(
        tuple((
            preceded(multispace0, int64),
            preceded(multispace1, int64),
            preceded(multispace1, int64),
            preceded(multispace1, int64),
            preceded(multispace1, int64),
        )),
        |(tag, a, b, c, d)| (tag, [a, b, c, d]),
    )(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_markers() {
        assert_eq!(section_marker("$Nodes"), Ok(("", "Nodes")));
        assert_eq!(section_marker("$EndNodes"), Ok(("", "EndNodes")));
        assert!(section_marker("Nodes").is_err());
    }

    #[test]
    fn format_lines() {
        assert_eq!(format_line("4.1 0 8"), Ok(("", ("4.1", 0, 8))));
        assert_eq!(format_line("  2.2 1 4"), Ok(("", ("2.2", 1, 4))));
        assert!(format_line("4.1").is_err());
    }

    #[test]
    fn volume_entities() {
        let (_, volume) = volume_entity("7 0 0 0 1 1 1 1 12 6 -1 2 3").unwrap();
        assert_eq!(
            volume,
            VolumeLine {
                tag: 7,
                num_groups: 1,
                group: Some(12),
            }
        );

        // a volume the mesher never assigned a group still parses; the
        // reader rejects it with the entity tag in hand
        let (_, volume) = volume_entity("3 0 0 0 1 1 1 0").unwrap();
        assert_eq!(volume.num_groups, 0);
        assert_eq!(volume.group, None);
    }

    #[test]
    fn element_lines() {
        assert_eq!(element_line("12 1 2 3 4"), Ok(("", (12, [1, 2, 3, 4]))));
        assert_eq!(element_line("1 5 -2 7 9"), Ok(("", (1, [5, -2, 7, 9]))));
        assert!(element_line("1 2 3 4").is_err());
    }

    #[test]
    fn coordinate_lines() {
        let (_, (x, y, z)) = coordinates("0.25 -1e-3 42").unwrap();
        assert_eq!(x, 0.25);
        assert_eq!(y, -1e-3);
        assert_eq!(z, 42.0);
    }
}
