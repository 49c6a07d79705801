//! Tests across all three meshing algorithms.
//!
//! The strongest checks are shared invariants: every algorithm must cover
//! exactly the visible faces (equal total area), wind counterclockwise
//! around its normals, and color faces from the palette.

use alloc::vec::Vec;

use pretty_assertions::assert_eq;
use voxscene::{Palette, Rgba};

use crate::{
    Mesh, mesh_from_paletted_voxels_greedy, mesh_from_paletted_voxels_polygon,
    mesh_from_paletted_voxels_simple,
};

fn palette() -> Palette {
    let mut palette = Palette::default();
    palette.colors[1] = Rgba::new(255, 0, 0, 255);
    palette.colors[2] = Rgba::new(0, 255, 0, 255);
    palette
}

type Meshifier = fn(&[u8], [u32; 3], &Palette) -> Mesh;
const ALGORITHMS: [(&str, Meshifier); 3] = [
    ("simple", mesh_from_paletted_voxels_simple),
    ("greedy", mesh_from_paletted_voxels_greedy),
    ("polygon", mesh_from_paletted_voxels_polygon),
];

/// Total triangle area of the mesh. Faces are unit lattice squares, so
/// this equals the number of visible voxel faces when the mesh is correct.
fn total_area(mesh: &Mesh) -> f32 {
    mesh.indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [
                mesh.vertices[tri[0] as usize].position,
                mesh.vertices[tri[1] as usize].position,
                mesh.vertices[tri[2] as usize].position,
            ];
            let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let cross = [
                ab[1] * ac[2] - ab[2] * ac[1],
                ab[2] * ac[0] - ab[0] * ac[2],
                ab[0] * ac[1] - ab[1] * ac[0],
            ];
            (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt() / 2.0
        })
        .sum()
}

/// Every triangle must wind counterclockwise when viewed against its
/// vertices' shared normal.
#[track_caller]
fn assert_ccw_winding(mesh: &Mesh, context: &str) {
    for tri in mesh.indices.chunks_exact(3) {
        let [va, vb, vc] = [
            mesh.vertices[tri[0] as usize],
            mesh.vertices[tri[1] as usize],
            mesh.vertices[tri[2] as usize],
        ];
        assert_eq!(va.normal, vb.normal, "{context}: mixed normals in one triangle");
        assert_eq!(va.normal, vc.normal, "{context}: mixed normals in one triangle");
        let ab = [
            vb.position[0] - va.position[0],
            vb.position[1] - va.position[1],
            vb.position[2] - va.position[2],
        ];
        let ac = [
            vc.position[0] - va.position[0],
            vc.position[1] - va.position[1],
            vc.position[2] - va.position[2],
        ];
        let cross = [
            ab[1] * ac[2] - ab[2] * ac[1],
            ab[2] * ac[0] - ab[0] * ac[2],
            ab[0] * ac[1] - ab[1] * ac[0],
        ];
        let dot = cross[0] * va.normal[0] + cross[1] * va.normal[1] + cross[2] * va.normal[2];
        assert!(
            dot > 0.0,
            "{context}: triangle winds against its normal {:?}",
            va.normal
        );
    }
}

/// Number of visible faces of a grid, counted directly.
fn visible_face_count(voxels: &[u8], size: [u32; 3]) -> usize {
    let get = |x: i64, y: i64, z: i64| -> u8 {
        let [sx, sy, sz] = size.map(i64::from);
        if x < 0 || y < 0 || z < 0 || x >= sx || y >= sy || z >= sz {
            0
        } else {
            voxels[(x + y * sx + z * sx * sy) as usize]
        }
    };
    let mut count = 0;
    for z in 0..i64::from(size[2]) {
        for y in 0..i64::from(size[1]) {
            for x in 0..i64::from(size[0]) {
                if get(x, y, z) == 0 {
                    continue;
                }
                for (dx, dy, dz) in [
                    (1, 0, 0),
                    (-1, 0, 0),
                    (0, 1, 0),
                    (0, -1, 0),
                    (0, 0, 1),
                    (0, 0, -1),
                ] {
                    if get(x + dx, y + dy, z + dz) == 0 {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

/// Run all three algorithms over a grid and check the shared invariants.
#[track_caller]
fn check_all_algorithms(voxels: &[u8], size: [u32; 3]) {
    let expected_area = visible_face_count(voxels, size) as f32;
    for (name, meshify) in ALGORITHMS {
        let mesh = meshify(voxels, size, &palette());
        assert_ccw_winding(&mesh, name);
        let area = total_area(&mesh);
        assert!(
            (area - expected_area).abs() < 1e-3,
            "{name}: covered area {area}, expected {expected_area}"
        );
    }
}

// -------------------------------------------------------------------------------------------------

#[test]
fn single_voxel() {
    check_all_algorithms(&[1], [1, 1, 1]);

    let simple = mesh_from_paletted_voxels_simple(&[1], [1, 1, 1], &palette());
    assert_eq!(simple.triangle_count(), 12);
    assert!(
        simple
            .vertices
            .iter()
            .all(|v| v.color == Rgba::new(255, 0, 0, 255))
    );

    // The polygon algorithm needs no extra vertices for a lone cube either.
    let polygon = mesh_from_paletted_voxels_polygon(&[1], [1, 1, 1], &palette());
    assert_eq!(polygon.triangle_count(), 12);
}

#[test]
fn empty_grids_produce_empty_meshes() {
    for (name, meshify) in ALGORITHMS {
        assert_eq!(
            meshify(&[], [0, 0, 0], &palette()).triangle_count(),
            0,
            "{name}"
        );
        assert_eq!(
            meshify(&[0; 8], [2, 2, 2], &palette()).triangle_count(),
            0,
            "{name}"
        );
    }
}

#[test]
fn greedy_merges_uniform_slab() {
    // A single-color 2×1×1 bar: greedy emits one quad per cube face.
    let voxels = [1, 1];
    check_all_algorithms(&voxels, [2, 1, 1]);

    let simple = mesh_from_paletted_voxels_simple(&voxels, [2, 1, 1], &palette());
    let greedy = mesh_from_paletted_voxels_greedy(&voxels, [2, 1, 1], &palette());
    assert_eq!(simple.triangle_count(), 20);
    assert_eq!(greedy.triangle_count(), 12);
}

#[test]
fn greedy_does_not_merge_across_colors() {
    let voxels = [1, 2];
    check_all_algorithms(&voxels, [2, 1, 1]);

    let greedy = mesh_from_paletted_voxels_greedy(&voxels, [2, 1, 1], &palette());
    // No merging possible anywhere: same count as the simple algorithm.
    assert_eq!(greedy.triangle_count(), 20);
}

#[test]
fn larger_solid_box() {
    let voxels = vec![1u8; 4 * 3 * 2];
    check_all_algorithms(&voxels, [4, 3, 2]);

    let greedy = mesh_from_paletted_voxels_greedy(&voxels, [4, 3, 2], &palette());
    // One quad per box face regardless of dimensions.
    assert_eq!(greedy.triangle_count(), 12);
}

#[test]
fn plate_with_hole() {
    // A 3×3×1 plate with the center removed: the top and bottom faces are
    // ring-shaped regions, exercising hole detection and bridging.
    let mut voxels = vec![1u8; 9];
    voxels[4] = 0;
    check_all_algorithms(&voxels, [3, 3, 1]);
}

#[test]
fn polygon_keeps_vertices_at_color_boundaries() {
    // 2×2×1 plate: three cells of one color in an L, one of another. The
    // two regions of the bottom face must share the interior lattice
    // corner so their triangulations meet without T-junctions.
    let voxels = [1, 1, 1, 2];
    check_all_algorithms(&voxels, [2, 2, 1]);

    let mesh = mesh_from_paletted_voxels_polygon(&voxels, [2, 2, 1], &palette());
    let corner_uses: Vec<Rgba> = mesh
        .vertices
        .iter()
        .filter(|v| v.position == [1.0, 1.0, 0.0] && v.normal == [0.0, 0.0, -1.0])
        .map(|v| v.color)
        .collect();
    assert!(
        corner_uses.contains(&palette().colors[1])
            && corner_uses.contains(&palette().colors[2]),
        "both regions should touch the shared corner: {corner_uses:?}"
    );
}

#[test]
fn concave_region_triangulates_fully() {
    // An L-shaped 3×3×1 plate (missing one corner cell).
    let voxels = [1, 1, 1, 1, 0, 0, 1, 0, 0];
    check_all_algorithms(&voxels, [3, 3, 1]);
}

#[test]
fn checkerboard() {
    // Worst case for merging: no two same-color cells touch face-on.
    let mut voxels = vec![0u8; 4 * 4];
    for v in 0..4i64 {
        for u in 0..4i64 {
            if (u + v) % 2 == 0 {
                voxels[(u + v * 4) as usize] = 1;
            }
        }
    }
    check_all_algorithms(&voxels, [4, 4, 1]);
}

#[test]
fn remove_duplicate_vertices_merges_and_preserves_triangles() {
    let voxels = [1, 1];
    let mut mesh = mesh_from_paletted_voxels_simple(&voxels, [2, 1, 1], &palette());
    let triangles_before = mesh.triangle_count();
    let area_before = total_area(&mesh);
    let unique_before = mesh.vertices.len();

    mesh.remove_duplicate_vertices();

    assert_eq!(mesh.triangle_count(), triangles_before);
    assert!((total_area(&mesh) - area_before).abs() < 1e-3);
    // Adjacent coplanar quads of the same color share corners.
    assert!(mesh.vertices.len() < unique_before);
    // And the result is self-consistent.
    assert!(
        mesh.indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertices.len())
    );

    // Running it again changes nothing.
    let vertices = mesh.vertices.clone();
    let indices = mesh.indices.clone();
    mesh.remove_duplicate_vertices();
    assert_eq!(mesh.vertices, vertices);
    assert_eq!(mesh.indices, indices);
}
