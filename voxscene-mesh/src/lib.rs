//! Algorithms for converting [`voxscene`] paletted voxel grids to triangle
//! meshes.
//!
//! Three polygonalization algorithms are provided, trading triangle count
//! against mesh quality:
//!
//! * [`mesh_from_paletted_voxels_simple`] — two triangles for every visible
//!   voxel face. Fast and predictable; the largest output.
//! * [`mesh_from_paletted_voxels_greedy`] — merges equal-color faces into
//!   maximal rectangles before triangulating. Far fewer triangles, but the
//!   output contains T-junctions (places where a triangle edge meets a
//!   vertex rather than another edge), which can show as pixel cracks.
//! * [`mesh_from_paletted_voxels_polygon`] — traces each color-connected
//!   face region as a polygon with holes and ear-clips it, placing interior
//!   vertices only where boundary colors change.
//!
//! All three emit counterclockwise winding (viewed from outside the
//! surface) with one of the six cardinal unit normals per vertex, so a
//! single render pipeline can cull backfaces for any of them. None of the
//! algorithms share vertices between faces; apply
//! [`Mesh::remove_duplicate_vertices`] afterwards if the consumer wants an
//! indexed mesh without repeats.

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
#![no_std]

extern crate alloc;
#[cfg(test)]
#[macro_use]
extern crate std;

use alloc::vec::Vec;

use bytemuck::{Pod, Zeroable};
use voxscene::Rgba;

mod grid;
mod greedy;
pub use greedy::mesh_from_paletted_voxels_greedy;
mod polygon;
pub use polygon::mesh_from_paletted_voxels_polygon;
mod simple;
pub use simple::mesh_from_paletted_voxels_simple;

#[cfg(test)]
mod tests;

/// One mesh vertex: a lattice-corner position (integer-valued), a cardinal
/// unit normal, and the color of the face it belongs to.
///
/// The layout is `repr(C)` and [`Pod`] so vertex buffers can be uploaded
/// byte-for-byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
#[allow(clippy::exhaustive_structs)]
pub struct MeshVertex {
    /// Position in the grid's lattice coordinates.
    pub position: [f32; 3],
    /// Unit normal along one of the six cardinal axes.
    pub normal: [f32; 3],
    /// Face color, resolved through the palette.
    pub color: Rgba,
}

/// A triangle mesh: vertices plus an index list, three indices per
/// triangle.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<MeshVertex>,
    /// Triangle corner indices into [`Mesh::vertices`], in
    /// counterclockwise order viewed from outside.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Collapse exactly-identical vertices (position, normal, and color all
    /// equal) into one, rewriting the index list. Vertex order is preserved
    /// for the survivors.
    pub fn remove_duplicate_vertices(&mut self) {
        let mut first_occurrence: hashbrown::HashMap<[u8; size_of::<MeshVertex>()], u32> =
            hashbrown::HashMap::with_capacity(self.vertices.len());
        let mut remap: Vec<u32> = Vec::with_capacity(self.vertices.len());
        let mut kept: Vec<MeshVertex> = Vec::new();

        for vertex in &self.vertices {
            let key: [u8; size_of::<MeshVertex>()] =
                bytemuck::bytes_of(vertex).try_into().unwrap();
            let index = *first_occurrence.entry(key).or_insert_with(|| {
                kept.push(*vertex);
                (kept.len() - 1) as u32
            });
            remap.push(index);
        }

        self.vertices = kept;
        for index in &mut self.indices {
            *index = remap[*index as usize];
        }
    }

    /// Append one rectangular face as two triangles. `corners` must be in
    /// counterclockwise order viewed from outside.
    pub(crate) fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3], color: Rgba) {
        let base = self.vertices.len() as u32;
        for position in corners {
            self.vertices.push(MeshVertex {
                position,
                normal,
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Append one triangle with per-call vertices.
    pub(crate) fn push_triangle(&mut self, corners: [[f32; 3]; 3], normal: [f32; 3], color: Rgba) {
        let base = self.vertices.len() as u32;
        for position in corners {
            self.vertices.push(MeshVertex {
                position,
                normal,
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2]);
    }
}
