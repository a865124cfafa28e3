//! Properties of the face-adjacency builder on generated meshes
//!
//! The reference is a plain O(N²) all-pairs face comparison; the builder
//! must agree with it exactly on conforming meshes of any size. Meshes are
//! generated as Kuhn subdivisions of a cube grid: each cell splits into six
//! tetrahedra around its main diagonal, which glues face-to-face across
//! cells.

use itertools::Itertools;
use tetmesh::mesh::{
    tetrahedron_neighbours, Element, Medium, Mesh, NeighbourTable, Node, Tetrahedron,
};

/// O(N²) neighbour finding to verify the indexed implementation
fn naive_neighbours(elements: &[Tetrahedron]) -> NeighbourTable {
    let mut table: NeighbourTable = vec![[None; 4]; elements.len()];
    for i in 0..elements.len() {
        let faces = elements[i].faces();
        for f in 0..4 {
            if table[i][f].is_some() {
                continue;
            }
            for (j, other) in elements.iter().enumerate() {
                if i == j {
                    continue;
                }
                if let Some(jf) = other.faces().iter().position(|of| *of == faces[f]) {
                    table[i][f] = Some(j);
                    table[j][jf] = Some(i);
                    break;
                }
            }
        }
    }
    table
}

/// Kuhn subdivision of an n³ cube grid: six tetrahedra per cell
fn kuhn_cube_mesh(n: usize) -> Vec<Tetrahedron> {
    let points = n + 1;
    let stride = [1, points, points * points];
    let tag = |i: usize, j: usize, k: usize| (1 + i + j * points + k * points * points) as i32;

    let mut tets = Vec::with_capacity(6 * n * n * n);
    for ci in 0..n {
        for cj in 0..n {
            for ck in 0..n {
                let corner = tag(ci, cj, ck);
                for axes in [0_usize, 1, 2].into_iter().permutations(3) {
                    let mut quad = [corner; 4];
                    let mut node = corner;
                    for (step, axis) in axes.into_iter().enumerate() {
                        node += stride[axis] as i32;
                        quad[step + 1] = node;
                    }
                    tets.push(Tetrahedron::new(quad[0], quad[1], quad[2], quad[3]).unwrap());
                }
            }
        }
    }
    tets
}

/// Grid nodes for [kuhn_cube_mesh], tags contiguous from 1
fn kuhn_cube_nodes(n: usize) -> Vec<Node> {
    let points = n + 1;
    let mut nodes = Vec::with_capacity(points * points * points);
    for k in 0..points {
        for j in 0..points {
            for i in 0..points {
                nodes.push(Node {
                    tag: (1 + i + j * points + k * points * points) as i32,
                    x: i as f64,
                    y: j as f64,
                    z: k as f64,
                });
            }
        }
    }
    nodes
}

#[test]
fn indexed_builder_matches_the_naive_reference() {
    for n in 1..=3 {
        let tets = kuhn_cube_mesh(n);
        let fast = tetrahedron_neighbours(&tets).unwrap();
        assert_eq!(fast, naive_neighbours(&tets), "grid size {n}");
    }
}

#[test]
fn neighbour_reciprocity_holds_with_equal_faces() {
    let tets = kuhn_cube_mesh(3);
    let table = tetrahedron_neighbours(&tets).unwrap();

    for (i, slots) in table.iter().enumerate() {
        for (f, slot) in slots.iter().enumerate() {
            let Some(j) = *slot else { continue };
            let face = tets[i].faces()[f];
            let jf = table[j]
                .iter()
                .position(|s| *s == Some(i))
                .expect("matched slots must be reciprocal");
            assert_eq!(tets[j].faces()[jf], face);
        }
    }
}

#[test]
fn no_element_is_fully_isolated() {
    for n in 1..=3 {
        let tets = kuhn_cube_mesh(n);
        let table = tetrahedron_neighbours(&tets).unwrap();
        for (i, slots) in table.iter().enumerate() {
            assert!(
                slots.iter().any(|s| s.is_some()),
                "element {i} of grid size {n} has no neighbours"
            );
        }
    }
}

#[test]
fn interior_cells_have_no_boundary_faces() {
    // in a 3³ grid the centre cell's six tetrahedra only touch the boundary
    // through other cells, so all their faces must be matched
    let n = 3;
    let tets = kuhn_cube_mesh(n);
    let table = tetrahedron_neighbours(&tets).unwrap();

    let centre_cell = (n + 1) * n + 1;
    for e in 6 * centre_cell..6 * (centre_cell + 1) {
        let interior = table[e].iter().filter(|s| s.is_some()).count();
        assert_eq!(interior, 4, "element {e} should be fully interior");
    }
}

#[test]
fn mesh_construction_agrees_with_the_standalone_builder() {
    let n = 2;
    let tets = kuhn_cube_mesh(n);
    let elements: Vec<Element> = tets
        .iter()
        .map(|t| Element {
            medium_tag: 1,
            tetrahedron: *t,
        })
        .collect();
    let media = vec![Medium {
        tag: 1,
        name: "Water".to_string(),
    }];

    let mesh = Mesh::new(elements, kuhn_cube_nodes(n), media).unwrap();
    assert_eq!(*mesh.neighbour_table(), naive_neighbours(&tets));
}

#[test]
fn a_single_tetrahedron_mesh_is_all_boundary() {
    let tets = vec![Tetrahedron::new(1, 2, 3, 4).unwrap()];
    let table = tetrahedron_neighbours(&tets).unwrap();
    assert_eq!(table, vec![[None; 4]]);
}
