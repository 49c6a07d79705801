//! Voxel models: dense paletted grids with explicit dimensions.

use std::fmt;

/// A dense 3-dimensional grid of voxels.
///
/// Each voxel is an 8-bit color index into the scene's
/// [`Palette`](crate::Palette); index 0 means empty. Voxels are stored in
/// x-then-y-then-z order:
/// `index = x + y * size_x + z * size_x * size_y`.
#[derive(Clone, Eq, PartialEq)]
pub struct Model {
    size: [u32; 3],
    voxels: Vec<u8>,
    /// Content hash over `voxels`, computed once at construction to
    /// accelerate duplicate-model detection.
    hash: u32,
}

impl Model {
    /// Construct a model from its dimensions and voxel grid.
    ///
    /// # Panics
    ///
    /// Panics if `voxels.len()` does not equal the product of the
    /// dimensions. (This is a caller bug, not a property of file input;
    /// the reader always constructs consistent grids.)
    pub fn new(size: [u32; 3], voxels: Vec<u8>) -> Self {
        let expected = size.iter().map(|&d| d as usize).product::<usize>();
        assert_eq!(
            voxels.len(),
            expected,
            "voxel grid length does not match dimensions {size:?}"
        );
        let hash = grid_hash(&voxels);
        Model { size, voxels, hash }
    }

    /// Dimensions as `[size_x, size_y, size_z]`.
    pub fn size(&self) -> [u32; 3] {
        self.size
    }

    /// The voxel grid in x-then-y-then-z order.
    pub fn voxels(&self) -> &[u8] {
        &self.voxels
    }

    /// The color index at `(x, y, z)`, which must be within [`Model::size`].
    pub fn voxel(&self, x: u32, y: u32, z: u32) -> u8 {
        debug_assert!(x < self.size[0] && y < self.size[1] && z < self.size[2]);
        self.voxels[(x + y * self.size[0] + z * self.size[0] * self.size[1]) as usize]
    }

    /// Whether every voxel in the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.voxels.iter().all(|&v| v == 0)
    }

    /// Number of voxels with a nonzero color index.
    pub fn solid_voxel_count(&self) -> usize {
        self.voxels.iter().filter(|&&v| v != 0).count()
    }

    /// The content hash of the grid.
    pub fn content_hash(&self) -> u32 {
        self.hash
    }

    /// Content-wise equality: same hash, same dimensions, same bytes.
    ///
    /// The hash comparison is the cheap early-out; matching hashes are
    /// confirmed against the actual grids.
    pub(crate) fn content_equal(&self, other: &Model) -> bool {
        self.hash == other.hash && self.size == other.size && self.voxels == other.voxels
    }

    /// Rewrite every nonzero voxel through `remap`, updating the hash.
    pub(crate) fn remap_colors(&mut self, remap: impl Fn(u8) -> u8) {
        for v in &mut self.voxels {
            if *v != 0 {
                *v = remap(*v);
            }
        }
        self.hash = grid_hash(&self.voxels);
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The grid itself is too large to print usefully.
        f.debug_struct("Model")
            .field("size", &self.size)
            .field("solid_voxel_count", &self.solid_voxel_count())
            .field("hash", &format_args!("{:#010x}", self.hash))
            .finish_non_exhaustive()
    }
}

/// Hash of a voxel grid's bytes: `h = byte + h * 65559`, the multiplier the
/// `.vox` ecosystem settled on for this purpose.
fn grid_hash(voxels: &[u8]) -> u32 {
    voxels
        .iter()
        .fold(0u32, |h, &b| u32::from(b).wrapping_add(h.wrapping_mul(65559)))
}

// -------------------------------------------------------------------------------------------------
