// internal modules
use crate::error::{MeshError, Result};
use crate::mesh::{Element, Medium, Mesh, Node, Tetrahedron};
use crate::readers::parsers;
use crate::utils::*;

// standard library
use std::collections::{HashMap, HashSet};
use std::io::BufRead;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, trace};

/// Gmsh element type code for the linear four-node tetrahedron
const TETRAHEDRON_TYPE: i32 = 4;

/// A strict reader for Gmsh msh v4.1 ascii files
///
/// The reader consumes the stream once, front to back, and either returns a
/// fully cross-linked [Mesh] (neighbour table included) or the first error
/// it hit. No partial mesh is ever produced.
///
/// The pipeline in order:
///     - gate on the `$MeshFormat` header (version 4.1, ascii only)
///     - dispatch the body sections, skipping unrecognised ones
///     - cross-link entities, physical names, nodes and tetrahedra
///     - build the element face-adjacency table
///
/// Notes:
///     - sections may appear in any order after the header
///     - a second `$MeshFormat` stops the body parse (concatenated meshes
///       are tolerated at the byte level, only the first is read)
///     - lower-dimensional element blocks are read and discarded
///
/// Example:
/// ```ignore
///     let file = BufReader::new(File::open("water.msh")?);
///     let mut reader = MshReader::new();
///     let mesh = reader.parse(file)?;
/// ```
#[derive(Debug, Default)]
pub struct MshReader {
    /// Disable progress bar?
    disable_progress: bool,
}

/// High level methods
impl MshReader {
    /// Just calls Default::default(), nothing special to be initialised
    pub fn new() -> Self {
        Default::default()
    }

    /// Do not print the progress indicator
    pub fn disable_progress(&mut self) {
        debug!("Progress bar disabled");
        self.disable_progress = true;
    }

    /// Parse one mesh from an input stream
    ///
    /// The stream is read strictly forward and is only borrowed for the
    /// duration of the call. Fails on the first violation with the section
    /// context in the message.
    pub fn parse<R: BufRead>(&mut self, input: R) -> Result<Mesh> {
        let mut lines = LineReader::new(input, self.init_progress_bar());

        if !self.disable_progress {
            lines.progress.refresh()?;
        }

        // route on the header version token
        let mesh = match Self::parse_header(&mut lines)? {
            MshVersion::V41 => Self::parse_body(&mut lines)?,
        };

        // need an extra line for clean spacing if the progress bar is printed
        if !self.disable_progress {
            eprintln!()
        };

        Ok(mesh)
    }

    /// Initialise the progress bar, if wanted
    fn init_progress_bar(&self) -> Bar {
        BarBuilder::default()
            .delay(0.0)
            .unit(" lines")
            .unit_scale(true)
            .disable(self.disable_progress)
            .build()
            .unwrap()
    }
}

/// Format header gate
impl MshReader {
    /// Accept the `$MeshFormat` section or refuse the whole file
    ///
    /// Only version 4.1 ascii with 8-byte size_t gets through. The version
    /// token routes the body parse.
    fn parse_header<R: BufRead>(lines: &mut LineReader<R>) -> Result<MshVersion> {
        let line = lines.require_line("$MeshFormat")?;
        if line != "$MeshFormat" {
            return Err(MeshError::MalformedHeader(f!(
                "expected $MeshFormat, got `{line}`"
            )));
        }

        let line = lines.require_line("the msh format line")?;
        let Ok((_, (version, binary_flag, size_t))) = parsers::format_line(&line) else {
            return Err(MeshError::MalformedHeader(f!(
                "failed to parse `{line}` as `version binary-flag size_t`"
            )));
        };
        if version != "4.1" {
            return Err(MeshError::UnsupportedVersion(version.to_string()));
        }
        if binary_flag != 0 {
            return Err(MeshError::UnsupportedEncoding(
                "binary msh files are unsupported, convert the file to ascii and try again"
                    .to_string(),
            ));
        }
        if size_t != 8 {
            return Err(MeshError::UnsupportedEncoding(f!(
                "msh file size_t must be 8, got {size_t}"
            )));
        }

        let line = lines.require_line("$EndMeshFormat")?;
        if line != "$EndMeshFormat" {
            return Err(MeshError::MalformedHeader(f!(
                "expected $EndMeshFormat, got `{line}`"
            )));
        }

        debug!("Accepted msh format header (v4.1, ascii)");
        Ok(MshVersion::V41)
    }
}

/// Body dispatch and mesh assembly
impl MshReader {
    /// Read the four known sections in any order, then cross-link them
    fn parse_body<R: BufRead>(lines: &mut LineReader<R>) -> Result<Mesh> {
        let mut volumes: Vec<MeshVolume> = Vec::new();
        let mut groups: Vec<Medium> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut elements: Vec<RawTetrahedron> = Vec::new();

        while let Some(line) = lines.next_line()? {
            match line.as_str() {
                // stop reading if we hit another mesh file
                "$MeshFormat" => {
                    debug!("Second $MeshFormat found, ignoring the rest of the stream");
                    break;
                }
                "$Entities" => {
                    volumes = Self::parse_entities(lines)
                        .map_err(|e| e.context("$Entities section"))?;
                }
                "$PhysicalNames" => {
                    groups = Self::parse_physical_names(lines)
                        .map_err(|e| e.context("$PhysicalNames section"))?;
                }
                "$Nodes" => {
                    nodes = Self::parse_nodes(lines).map_err(|e| e.context("$Nodes section"))?;
                }
                "$Elements" => {
                    elements = Self::parse_elements(lines)
                        .map_err(|e| e.context("$Elements section"))?;
                }
                other => {
                    // forward compatibility: skip whole unrecognised sections
                    if let Ok((_, name)) = parsers::section_marker(other) {
                        if !name.starts_with("End") {
                            trace!("Skipping unrecognised section ${name}");
                            Self::skip_section(lines, name)?;
                        }
                    }
                }
            }
        }

        Self::assemble(volumes, groups, nodes, elements)
    }

    /// Skip an unrecognised section through its `$End<Name>` marker
    fn skip_section<R: BufRead>(lines: &mut LineReader<R>, name: &str) -> Result<()> {
        let end_marker = f!("$End{name}");
        loop {
            if lines.require_line(&end_marker)? == end_marker {
                return Ok(());
            }
        }
    }

    /// Cross-link the parsed sections into the final [Mesh]
    ///
    /// Elements resolve their owning volume to a physical group; the group
    /// tag becomes the element's medium tag. Any reference that cannot be
    /// resolved aborts the parse.
    fn assemble(
        volumes: Vec<MeshVolume>,
        groups: Vec<Medium>,
        nodes: Vec<Node>,
        raw_elements: Vec<RawTetrahedron>,
    ) -> Result<Mesh> {
        if volumes.is_empty() {
            return Err(MeshError::MalformedMesh("no volumes were parsed".to_string()));
        }
        if nodes.is_empty() {
            return Err(MeshError::MalformedMesh("no nodes were parsed".to_string()));
        }
        if groups.is_empty() {
            return Err(MeshError::MalformedMesh(
                "no physical groups were parsed".to_string(),
            ));
        }
        if raw_elements.is_empty() {
            return Err(MeshError::MalformedMesh(
                "no tetrahedrons were parsed".to_string(),
            ));
        }

        // every volume must point at a parsed 3d group
        let group_tags: HashSet<i32> = groups.iter().map(|g| g.tag).collect();
        let mut volume_groups: HashMap<i32, i32> = HashMap::with_capacity(volumes.len());
        for volume in &volumes {
            if !group_tags.contains(&volume.group) {
                return Err(MeshError::DanglingReference(f!(
                    "volume {} had unknown physical group tag {}",
                    volume.tag,
                    volume.group
                )));
            }
            volume_groups.insert(volume.tag, volume.group);
        }

        // resolve each element's entity to its medium and canonicalise the
        // node ordering
        let mut elements = Vec::with_capacity(raw_elements.len());
        let mut referenced: HashSet<i32> = HashSet::new();
        for raw in &raw_elements {
            let Some(&group) = volume_groups.get(&raw.volume) else {
                return Err(MeshError::DanglingReference(f!(
                    "tetrahedron {} had unknown volume tag {}",
                    raw.tag,
                    raw.volume
                )));
            };
            let [a, b, c, d] = raw.nodes;
            let tetrahedron = Tetrahedron::new(a, b, c, d)
                .map_err(|e| e.context(&f!("tetrahedron {}", raw.tag)))?;
            referenced.insert(group);
            elements.push(Element {
                medium_tag: group,
                tetrahedron,
            });
        }

        // the mesh exposes only the media actually used by an element
        let media: Vec<Medium> = groups
            .into_iter()
            .filter(|g| referenced.contains(&g.tag))
            .collect();

        debug!(
            "Assembling mesh: {} nodes, {} tetrahedra, {} media",
            nodes.len(),
            elements.len(),
            media.len()
        );
        Mesh::new(elements, nodes, media)
    }
}

/// `$Entities` section
impl MshReader {
    /// Returns the volume entities; volume tags are unique
    ///
    /// Point, curve and surface entities carry no material assignment for a
    /// tetrahedral-only mesh and are skipped without interpretation.
    fn parse_entities<R: BufRead>(lines: &mut LineReader<R>) -> Result<Vec<MeshVolume>> {
        let header = lines.require_line("the entity counts")?;
        let Ok((_, (num_points, num_curves, num_surfaces, num_volumes))) =
            parsers::counts4(&header)
        else {
            return Err(malformed(lines, &header, "expected four entity counts"));
        };
        if num_volumes == 0 {
            return Err(MeshError::MalformedMesh("no volumes found".to_string()));
        }

        // skip to the 3d entities
        for _ in 0..(num_points + num_curves + num_surfaces) {
            lines.require_line("an entity line")?;
        }

        let mut volumes = Vec::with_capacity(num_volumes as usize);
        loop {
            let line = lines.require_line("$EndEntities")?;
            if line == "$EndEntities" {
                break;
            }
            let Ok((_, volume)) = parsers::volume_entity(&line) else {
                return Err(malformed(lines, &line, "3d volume parsing failed"));
            };
            if volume.num_groups == 0 {
                return Err(MeshError::MalformedMesh(f!(
                    "volume {} was not assigned a physical group",
                    volume.tag
                )));
            }
            if volume.num_groups != 1 {
                return Err(MeshError::MalformedMesh(f!(
                    "volume {} has more than one physical group",
                    volume.tag
                )));
            }
            let Some(group) = volume.group else {
                return Err(malformed(lines, &line, "3d volume parsing failed"));
            };
            trace!("[Entities] volume {} -> group {group}", volume.tag);
            volumes.push(MeshVolume {
                tag: volume.tag,
                group,
            });
        }

        if volumes.len() != num_volumes as usize {
            return Err(MeshError::MalformedMesh(f!(
                "expected {num_volumes} volumes but got {}",
                volumes.len()
            )));
        }
        if let Some(tag) = first_duplicate_tag(volumes.iter().map(|v| v.tag)) {
            return Err(MeshError::MalformedMesh(f!(
                "found duplicate volume tag {tag}"
            )));
        }
        Ok(volumes)
    }
}

/// `$PhysicalNames` section
impl MshReader {
    /// Returns the 3d physical groups; group tags are unique
    ///
    /// The declared count covers every dimension so it is not cross-checked
    /// against the number of 3d entries retained.
    fn parse_physical_names<R: BufRead>(lines: &mut LineReader<R>) -> Result<Vec<Medium>> {
        let header = lines.require_line("the physical name count")?;
        let Ok((_, _total)) = parsers::unsigned_int(&header) else {
            return Err(malformed(lines, &header, "expected a total name count"));
        };

        let mut groups: Vec<Medium> = Vec::new();
        loop {
            let line = lines.require_line("$EndPhysicalNames")?;
            if line == "$EndPhysicalNames" {
                break;
            }
            let Ok((_, (dim, tag))) = parsers::physical_name_prefix(&line) else {
                return Err(malformed(lines, &line, "physical group parsing failed"));
            };
            // only 3d groups can name a medium of a volume mesh
            if dim != 3 {
                trace!("[PhysicalNames] ignoring {dim}d group {tag}");
                continue;
            }
            let name = Self::quoted_name(&line, lines.line_number())?;
            trace!("[PhysicalNames] group {tag} \"{name}\"");
            groups.push(Medium { tag, name });
        }

        if let Some(tag) = first_duplicate_tag(groups.iter().map(|g| g.tag)) {
            return Err(MeshError::MalformedMesh(f!(
                "found duplicate physical group tag {tag}"
            )));
        }
        Ok(groups)
    }

    /// Cut the group name out from between the first and last double-quote
    fn quoted_name(line: &str, line_number: usize) -> Result<String> {
        let Some(start) = line.find('"') else {
            return Err(MeshError::MalformedMesh(f!(
                "line {line_number}: physical group names must be quoted: `{line}`"
            )));
        };
        // find succeeded, so rfind is guaranteed a hit
        let end = line.rfind('"').unwrap();
        if end == start {
            return Err(MeshError::MalformedMesh(f!(
                "line {line_number}: couldn't find closing quote for the group name: `{line}`"
            )));
        }
        if end - start == 1 {
            return Err(MeshError::MalformedMesh(f!(
                "line {line_number}: empty physical group name: `{line}`"
            )));
        }
        Ok(line[start + 1..end].to_string())
    }
}

/// `$Nodes` section
impl MshReader {
    /// Returns every node across all blocks; node tags are unique
    fn parse_nodes<R: BufRead>(lines: &mut LineReader<R>) -> Result<Vec<Node>> {
        let header = lines.require_line("the node section metadata")?;
        let Ok((_, (num_blocks, num_nodes, _min_tag, max_tag))) = parsers::counts4(&header)
        else {
            return Err(malformed(
                lines,
                &header,
                "expected `blocks total min max` metadata",
            ));
        };
        if max_tag > i32::MAX as u64 {
            return Err(MeshError::MalformedMesh(f!(
                "max node tag is too large ({max_tag}), limit is {}",
                i32::MAX
            )));
        }

        let mut nodes = Vec::with_capacity(num_nodes as usize);
        for _ in 0..num_blocks {
            Self::parse_node_block(lines, &mut nodes)?;
        }

        if nodes.len() != num_nodes as usize {
            return Err(MeshError::MalformedMesh(f!(
                "expected {num_nodes} nodes but read {}",
                nodes.len()
            )));
        }
        let line = lines.require_line("$EndNodes")?;
        if line != "$EndNodes" {
            return Err(MeshError::MalformedMesh(f!(
                "expected $EndNodes, got `{line}`"
            )));
        }
        if let Some(tag) = first_duplicate_tag(nodes.iter().map(|n| n.tag)) {
            return Err(MeshError::MalformedMesh(f!(
                "found duplicate node tag {tag}"
            )));
        }
        Ok(nodes)
    }

    /// Parse a single entity block of nodes onto the end of `nodes`
    ///
    /// A block lists its node tags first and the coordinates after, in the
    /// same order, so the two runs are zipped by position.
    fn parse_node_block<R: BufRead>(lines: &mut LineReader<R>, nodes: &mut Vec<Node>) -> Result<()> {
        let header = lines.require_line("a node block header")?;
        let Ok((_, (dim, entity, _parametric, block_count))) = parsers::block_header(&header)
        else {
            return Err(malformed(lines, &header, "node block parsing failed"));
        };
        if !(0..=3).contains(&dim) {
            return Err(MeshError::MalformedMesh(f!(
                "node block for entity {entity}: got dimension {dim}, expected 0, 1, 2, or 3"
            )));
        }
        trace!("[Nodes] block for entity {entity}: {block_count} nodes");

        let base = nodes.len();
        for _ in 0..block_count {
            let line = lines.require_line("a node tag")?;
            let Ok((_, tag)) = parsers::unsigned_int(&line) else {
                return Err(malformed(
                    lines,
                    &line,
                    &f!("node tag parsing failed for entity {entity}"),
                ));
            };
            let tag = i32::try_from(tag).map_err(|_| {
                MeshError::MalformedMesh(f!("node tag {tag} is too large, limit is {}", i32::MAX))
            })?;
            nodes.push(Node {
                tag,
                x: 0.0,
                y: 0.0,
                z: 0.0,
            });
        }
        for i in 0..block_count as usize {
            let line = lines.require_line("node coordinates")?;
            let Ok((_, (x, y, z))) = parsers::coordinates(&line) else {
                return Err(malformed(
                    lines,
                    &line,
                    &f!("node coordinate parsing failed for entity {entity}"),
                ));
            };
            let node = &mut nodes[base + i];
            node.x = x;
            node.y = y;
            node.z = z;
        }
        Ok(())
    }
}

/// `$Elements` section
impl MshReader {
    /// Returns every tetrahedron across all 3d blocks; element tags are
    /// unique and at least one tetrahedron must be present
    fn parse_elements<R: BufRead>(lines: &mut LineReader<R>) -> Result<Vec<RawTetrahedron>> {
        let header = lines.require_line("the element section metadata")?;
        // the declared total counts all dimensions, so it cannot be checked
        // against the number of tetrahedra read
        let Ok((_, (num_blocks, _num_elements, _min_tag, _max_tag))) = parsers::counts4(&header)
        else {
            return Err(malformed(
                lines,
                &header,
                "expected `blocks total min max` metadata",
            ));
        };

        let mut elements = Vec::new();
        for _ in 0..num_blocks {
            Self::parse_element_block(lines, &mut elements)?;
        }

        let line = lines.require_line("$EndElements")?;
        if line != "$EndElements" {
            return Err(MeshError::MalformedMesh(f!(
                "expected $EndElements, got `{line}`"
            )));
        }
        if elements.is_empty() {
            return Err(MeshError::MalformedMesh(
                "no tetrahedral elements were read".to_string(),
            ));
        }
        if let Some(tag) = first_duplicate_tag(elements.iter().map(|e| e.tag)) {
            return Err(MeshError::MalformedMesh(f!(
                "found duplicate tetrahedron tag {tag}"
            )));
        }
        Ok(elements)
    }

    /// Parse a single element block onto the end of `elements`
    ///
    /// Blocks of dimension below 3 are read line-for-line and discarded.
    /// 3d blocks must hold linear tetrahedra: a volume partly covered by
    /// other element types would silently lose mass during transport.
    fn parse_element_block<R: BufRead>(
        lines: &mut LineReader<R>,
        elements: &mut Vec<RawTetrahedron>,
    ) -> Result<()> {
        let header = lines.require_line("an element block header")?;
        let Ok((_, (dim, entity, element_type, block_count))) = parsers::block_header(&header)
        else {
            return Err(malformed(lines, &header, "element block parsing failed"));
        };
        if !(0..=3).contains(&dim) {
            return Err(MeshError::MalformedMesh(f!(
                "element block for entity {entity}: got dimension {dim}, expected 0, 1, 2, or 3"
            )));
        }
        if dim != 3 {
            trace!("[Elements] skipping {dim}d block for entity {entity}");
            for _ in 0..block_count {
                lines.require_line("an element line")?;
            }
            return Ok(());
        }
        if element_type != TETRAHEDRON_TYPE {
            return Err(MeshError::UnsupportedElementType(f!(
                "block for entity {entity}: non-tetrahedral element type {element_type}"
            )));
        }
        trace!("[Elements] block for entity {entity}: {block_count} tetrahedra");

        elements.reserve(block_count as usize);
        for _ in 0..block_count {
            let line = lines.require_line("a tetrahedron line")?;
            let Ok((_, (tag, node_tags))) = parsers::element_line(&line) else {
                return Err(malformed(
                    lines,
                    &line,
                    &f!("block for entity {entity}: tetrahedron parsing failed"),
                ));
            };
            let tag = i32::try_from(tag).map_err(|_| {
                MeshError::MalformedMesh(f!(
                    "block for entity {entity}: element tag {tag} out of range"
                ))
            })?;
            if tag < 0 {
                return Err(MeshError::MalformedMesh(f!(
                    "block for entity {entity}: negative element tag {tag}"
                )));
            }
            // node sign is checked by the Tetrahedron constructor during
            // assembly, where it reports as an invalid element
            let mut nodes = [0_i32; 4];
            for (slot, node) in node_tags.into_iter().enumerate() {
                nodes[slot] = i32::try_from(node).map_err(|_| {
                    MeshError::MalformedMesh(f!(
                        "block for entity {entity}: node tag {node} out of range"
                    ))
                })?;
            }
            elements.push(RawTetrahedron {
                tag,
                volume: entity,
                nodes,
            });
        }
        Ok(())
    }
}

/// Position-aware structural error for a line that failed to parse
fn malformed<R: BufRead>(lines: &LineReader<R>, line: &str, what: &str) -> MeshError {
    MeshError::MalformedMesh(f!("line {}: {what}: `{line}`", lines.line_number()))
}

/// Msh format versions understood by the reader
///
/// The header parser produces one of these and the body parse routes on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MshVersion {
    /// Version 4.1, ascii encoding
    V41,
}

/// A model volume paired with its single physical group
///
/// Parse-time only; discarded once every element has resolved its medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MeshVolume {
    tag: i32,
    group: i32,
}

/// A tetrahedron as read from the file, before canonicalisation
///
/// Keeps the owning entity (volume) tag so the assembler can resolve the
/// medium, and the node tags exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawTetrahedron {
    tag: i32,
    volume: i32,
    nodes: [i32; 4],
}

/// Thin line-oriented consumer over the input stream
///
/// Reads one logical line at a time with trailing whitespace trimmed,
/// counts lines for position-aware errors and feeds the progress bar.
struct LineReader<R: BufRead> {
    input: R,
    buffer: String,
    line_number: usize,
    progress: Bar,
}

impl<R: BufRead> LineReader<R> {
    fn new(input: R, progress: Bar) -> Self {
        Self {
            input,
            buffer: String::new(),
            line_number: 0,
            progress,
        }
    }

    /// The next logical line, or `None` at end of stream
    fn next_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        if self.input.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        self.progress.update(1)?;
        Ok(Some(self.buffer.trim_end().to_string()))
    }

    /// The next logical line where the format demands one exist
    fn require_line(&mut self, expected: &str) -> Result<String> {
        self.next_line()?.ok_or_else(|| MeshError::eof(expected))
    }

    /// 1-based number of the last line read
    fn line_number(&self) -> usize {
        self.line_number
    }
}
