//! The greedy meshifier: rectangular run expansion over each slab's
//! visible-face mask.

use alloc::vec;
use alloc::vec::Vec;

use voxscene::Palette;

use crate::Mesh;
use crate::grid::{Face, Grid};

/// Mesh a paletted voxel grid by merging equal-color visible faces into
/// maximal axis-aligned rectangles, one quad per rectangle.
///
/// Within each slab, rectangles grow greedily: first along the slab's
/// horizontal axis, then row by row along the vertical axis while every
/// covered cell still matches. The result has far fewer triangles than the
/// simple algorithm but is not free of T-junctions.
///
/// # Panics
///
/// Panics if `voxels.len()` does not equal `size_x * size_y * size_z`.
pub fn mesh_from_paletted_voxels_greedy(
    voxels: &[u8],
    size: [u32; 3],
    palette: &Palette,
) -> Mesh {
    let grid = Grid::new(voxels, size);
    let mut mesh = Mesh::default();

    for face in Face::ALL {
        let (slabs, u_extent, v_extent) = grid.slab_dimensions(face);
        let cells = (u_extent * v_extent) as usize;
        // Per-slab scratch: the visible-face color mask and a visited flag
        // per cell, reused across slabs.
        let mut mask: Vec<Option<u8>> = vec![None; cells];
        let mut visited: Vec<bool> = vec![false; cells];

        for slab in 0..slabs {
            for v in 0..v_extent {
                for u in 0..u_extent {
                    mask[(u + v * u_extent) as usize] = grid.visible_face_color(face, slab, u, v);
                }
            }
            visited.fill(false);

            for v in 0..v_extent {
                for u in 0..u_extent {
                    let cell = (u + v * u_extent) as usize;
                    if visited[cell] {
                        continue;
                    }
                    let Some(color) = mask[cell] else {
                        continue;
                    };

                    // Expand along u as far as the color run continues.
                    let mut width = 1;
                    while u + width < u_extent {
                        let next = (u + width + v * u_extent) as usize;
                        if visited[next] || mask[next] != Some(color) {
                            break;
                        }
                        width += 1;
                    }

                    // Then along v, a full row at a time.
                    let mut height = 1;
                    'grow: while v + height < v_extent {
                        for du in 0..width {
                            let next = (u + du + (v + height) * u_extent) as usize;
                            if visited[next] || mask[next] != Some(color) {
                                break 'grow;
                            }
                        }
                        height += 1;
                    }

                    for dv in 0..height {
                        for du in 0..width {
                            visited[(u + du + (v + dv) * u_extent) as usize] = true;
                        }
                    }

                    let (u0, v0) = (u as i32, v as i32);
                    let (u1, v1) = (u0 + width as i32, v0 + height as i32);
                    let corners = [
                        face.lattice_position(slab, u0, v0),
                        face.lattice_position(slab, u1, v0),
                        face.lattice_position(slab, u1, v1),
                        face.lattice_position(slab, u0, v1),
                    ];
                    let corners = if face.is_positive() {
                        corners
                    } else {
                        [corners[3], corners[2], corners[1], corners[0]]
                    };
                    mesh.push_quad(corners, face.normal(), palette.colors[color as usize]);
                }
            }
        }
    }
    mesh
}
