//! Read-only view over a paletted voxel grid, and the face-direction
//! arithmetic shared by all three meshing algorithms.

/// One of the six cardinal face directions.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// The axis this face is perpendicular to: 0, 1, or 2.
    pub fn axis(self) -> usize {
        match self {
            Face::PosX | Face::NegX => 0,
            Face::PosY | Face::NegY => 1,
            Face::PosZ | Face::NegZ => 2,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Face::PosX | Face::PosY | Face::PosZ)
    }

    pub fn normal(self) -> [f32; 3] {
        let mut normal = [0.0; 3];
        normal[self.axis()] = if self.is_positive() { 1.0 } else { -1.0 };
        normal
    }

    /// The two in-plane axes, ordered so that `u_axis × v_axis` points
    /// along the *positive* direction of [`Face::axis`]. Negative faces
    /// therefore reverse their winding when emitting.
    pub fn plane_axes(self) -> (usize, usize) {
        let axis = self.axis();
        ((axis + 1) % 3, (axis + 2) % 3)
    }

    /// Map slab-plane coordinates back to a 3D lattice position. `slab` is
    /// the voxel layer index; the face's plane sits on its far side for
    /// positive directions and its near side for negative ones.
    pub fn lattice_position(self, slab: u32, u: i32, v: i32) -> [f32; 3] {
        let (u_axis, v_axis) = self.plane_axes();
        let plane = slab + u32::from(self.is_positive());
        let mut position = [0.0; 3];
        position[self.axis()] = plane as f32;
        position[u_axis] = u as f32;
        position[v_axis] = v as f32;
        position
    }
}

/// A borrowed dense voxel grid. Out-of-bounds lookups read as empty, which
/// makes boundary faces of the grid visible without special cases.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Grid<'a> {
    voxels: &'a [u8],
    size: [u32; 3],
}

impl<'a> Grid<'a> {
    /// # Panics
    ///
    /// Panics if `voxels.len()` does not match the dimensions, which is a
    /// caller bug.
    pub fn new(voxels: &'a [u8], size: [u32; 3]) -> Self {
        let expected = size.iter().map(|&d| d as usize).product::<usize>();
        assert_eq!(
            voxels.len(),
            expected,
            "voxel grid length does not match dimensions {size:?}"
        );
        Grid { voxels, size }
    }

    pub fn size(&self) -> [u32; 3] {
        self.size
    }

    /// The color index at a position, or 0 (empty) outside the grid.
    pub fn voxel(&self, x: i64, y: i64, z: i64) -> u8 {
        let [sx, sy, sz] = self.size.map(i64::from);
        if x < 0 || y < 0 || z < 0 || x >= sx || y >= sy || z >= sz {
            return 0;
        }
        self.voxels[(x + y * sx + z * sx * sy) as usize]
    }

    /// The color of the face of the voxel at slab-plane coordinates
    /// `(slab, u, v)`, if that face is visible: the voxel is solid and its
    /// neighbor through the face is empty or outside the grid.
    pub fn visible_face_color(&self, face: Face, slab: u32, u: u32, v: u32) -> Option<u8> {
        let (u_axis, v_axis) = face.plane_axes();
        let mut position = [0i64; 3];
        position[face.axis()] = i64::from(slab);
        position[u_axis] = i64::from(u);
        position[v_axis] = i64::from(v);

        let color = self.voxel(position[0], position[1], position[2]);
        if color == 0 {
            return None;
        }
        let mut neighbor = position;
        neighbor[face.axis()] += if face.is_positive() { 1 } else { -1 };
        (self.voxel(neighbor[0], neighbor[1], neighbor[2]) == 0).then_some(color)
    }

    /// Slab-plane dimensions `(slab_count, u_extent, v_extent)` for a face
    /// direction.
    pub fn slab_dimensions(&self, face: Face) -> (u32, u32, u32) {
        let (u_axis, v_axis) = face.plane_axes();
        (self.size[face.axis()], self.size[u_axis], self.size[v_axis])
    }
}
