//! The baseline meshifier: one quad per visible voxel face.

use voxscene::Palette;

use crate::grid::{Face, Grid};
use crate::Mesh;

/// Mesh a paletted voxel grid with two triangles for every face of a solid
/// voxel that borders an empty voxel (or the outside of the grid).
///
/// # Panics
///
/// Panics if `voxels.len()` does not equal `size_x * size_y * size_z`.
pub fn mesh_from_paletted_voxels_simple(
    voxels: &[u8],
    size: [u32; 3],
    palette: &Palette,
) -> Mesh {
    let grid = Grid::new(voxels, size);
    let mut mesh = Mesh::default();

    for face in Face::ALL {
        let (slabs, u_extent, v_extent) = grid.slab_dimensions(face);
        for slab in 0..slabs {
            for v in 0..v_extent {
                for u in 0..u_extent {
                    let Some(color) = grid.visible_face_color(face, slab, u, v) else {
                        continue;
                    };
                    let (u, v) = (u as i32, v as i32);
                    let corners = [
                        face.lattice_position(slab, u, v),
                        face.lattice_position(slab, u + 1, v),
                        face.lattice_position(slab, u + 1, v + 1),
                        face.lattice_position(slab, u, v + 1),
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
