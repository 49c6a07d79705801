//! Error types for the scene codec.

use crate::chunk::{MAX_DICT_BYTES, MAX_DICT_PAIRS};

/// Errors that may occur while parsing `.vox` data.
///
/// Any of these means the input is malformed and no scene is produced;
/// tolerable anomalies (such as a shape referring to a missing model) are
/// instead logged and repaired. See the module documentation of
/// [`crate::read_scene`] for the distinction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The buffer ended in the middle of a chunk or header.
    #[error("unexpected end of file at offset {offset}")]
    UnexpectedEof {
        /// Byte offset at which more data was required.
        offset: usize,
    },

    /// The buffer does not start with the `VOX ` magic.
    #[error("not a MagicaVoxel .vox file (bad magic)")]
    BadMagic,

    /// The file declares a version this crate does not read.
    #[error("unsupported .vox file version {0}")]
    UnsupportedVersion(u32),

    /// A chunk dictionary exceeds the byte budget.
    #[error("dictionary exceeds {MAX_DICT_BYTES} bytes of key/value data")]
    DictTooLarge,

    /// A chunk dictionary declares too many key/value pairs.
    #[error("dictionary declares {0} pairs, more than the limit of {MAX_DICT_PAIRS}")]
    DictTooManyPairs(u32),

    /// A voxel chunk arrived with no dimensions established for it.
    #[error("XYZI chunk appeared before any SIZE chunk")]
    MissingSize,

    /// A voxel's coordinates fall outside its model's dimensions.
    #[error("voxel at ({x}, {y}, {z}) lies outside its {size_x}×{size_y}×{size_z} model grid")]
    #[allow(missing_docs)]
    VoxelOutOfBounds {
        x: u8,
        y: u8,
        z: u8,
        size_x: u32,
        size_y: u32,
        size_z: u32,
    },

    /// A reserved field does not hold its required value.
    #[error("reserved field of {chunk} chunk holds {value:#x} instead of the required all-ones")]
    ReservedField {
        /// Chunk identifier as ASCII, e.g. `"nTRN"`.
        chunk: &'static str,
        /// The value found.
        value: u32,
    },

    /// A transform node declares zero animation frames.
    #[error("nTRN chunk declares zero frames")]
    NoFrames,

    /// Model dimensions larger than voxel coordinates can ever address.
    #[error(
        "SIZE chunk claims {size_x}×{size_y}×{size_z}, larger than voxel coordinates can address"
    )]
    #[allow(missing_docs)]
    ModelSizeInvalid {
        size_x: u32,
        size_y: u32,
        size_z: u32,
    },

    /// A scene-graph node id too large to be anything but corruption.
    #[error("scene-graph node id {0} is unreasonably large")]
    NodeIdOutOfRange(u32),
}

/// Errors that may occur while serializing a [`Scene`](crate::Scene).
///
/// The writer refuses to emit a file that MagicaVoxel would reject.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WriteError {
    /// A model exceeds the format's 126-voxel axis limit.
    #[error("model {index} size {size_x}×{size_y}×{size_z} exceeds the 126-voxel axis limit")]
    #[allow(missing_docs)]
    ModelTooLarge {
        index: usize,
        size_x: u32,
        size_y: u32,
        size_z: u32,
    },

    /// An instance's rotation cannot be packed into the format's
    /// single-byte encoding.
    #[error("rotation of instance {index} is not one of the 24 encodable axis permutations")]
    UnencodableRotation {
        /// Index into [`Scene::instances`](crate::Scene::instances).
        index: usize,
    },
}

/// Errors that may occur while merging scenes.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MergeError {
    /// The explicit target palette has more colors than the 255 non-empty
    /// palette slots.
    #[error("target palette of {0} colors exceeds the 255 usable entries")]
    PaletteTooLarge(usize),
}
