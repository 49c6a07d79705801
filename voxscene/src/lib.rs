//! Reading, writing, and merging of MagicaVoxel `.vox` scene files.
//!
//! A `.vox` file is a chunk-structured binary format storing voxel models,
//! their placements within a transform/group/shape scene graph, animation
//! keyframes, a 256-entry color palette, layers, and materials. This crate
//! parses such files into a [`Scene`] value — flattening the scene graph
//! into concrete [`Instance`]s, deduplicating identical models, and
//! normalizing palette order — and serializes scenes back out in a form
//! MagicaVoxel accepts. Scenes can also be merged, fitting their palettes
//! onto a common one.
//!
//! The crate works purely on in-memory byte buffers; file I/O belongs to
//! the caller. Conversion of scene models to triangle meshes lives in the
//! companion crate `voxscene-mesh`.
//!
//! # Getting started
//!
//! ```
//! use voxscene::{read_scene, write_scene, ReadOptions};
//!
//! # fn example(bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
//! let scene = read_scene(bytes, ReadOptions::default())?;
//! for instance in &scene.instances {
//!     let model = &scene.models[instance.model_index];
//!     println!("{:?} at {:?}", model.size(), instance.transform.translation());
//! }
//! let bytes_again: Vec<u8> = write_scene(&scene)?;
//! # Ok(())
//! # }
//! ```
//!
//! Failures never panic across the crate boundary: malformed input surfaces
//! as [`ReadError`], and a scene the file format cannot represent surfaces
//! as [`WriteError`]. Recoverable oddities in a file (such as a shape
//! referring to a model that does not exist) are repaired and reported
//! through the [`log`] facade instead.

// Basic lint settings, which should be identical across all voxscene crates.
// This list is sorted.
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::needless_update)]
#![allow(clippy::single_match)]
#![deny(rust_2018_idioms)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::doc_markdown)]
#![warn(clippy::exhaustive_enums)]
#![warn(clippy::exhaustive_structs)]
#![warn(clippy::uninlined_format_args)]
#![warn(missing_debug_implementations)]
#![warn(unused_lifetimes)]
// Lenience for tests.
#![cfg_attr(test, allow(clippy::float_cmp))] // deterministic tests
// Crate-specific lint settings.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod error;
pub use error::{MergeError, ReadError, WriteError};
mod merge;
pub use merge::merge_scenes;
mod model;
pub use model::Model;
mod palette;
pub use palette::{Palette, Rgba};
mod read;
pub use read::{ReadOptions, read_scene};
mod scene;
pub use scene::{Group, Instance, Layer, ModelFrame, Scene, TransformFrame};
mod transform;
pub use transform::Transform;
mod write;
pub use write::write_scene;
