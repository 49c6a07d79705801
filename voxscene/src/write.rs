//! The scene writer: deterministic re-serialization of a [`Scene`] to the
//! chunk layout MagicaVoxel expects.
//!
//! The emitted scene graph is minimal: one root transform, one root group,
//! one shape per model, and one transform per instance. Group hierarchy and
//! animation are flattened — every instance is written at its composed
//! global transform at frame 0 — which the reader round-trips to an
//! equivalent flat scene.

use crate::chunk::{ChunkWriter, dict_pair_size, id};
use crate::error::WriteError;
use crate::model::Model;
use crate::scene::Scene;
use crate::transform::Transform;

/// Largest model axis MagicaVoxel will load.
const MAX_WRITE_AXIS: u32 = 126;

/// Serialize `scene` to `.vox` bytes.
///
/// Fails — without emitting anything — if a model exceeds 126 voxels on any
/// axis or an instance's rotation is not one of the 24 encodable axis
/// permutations; either would produce a file the authoring tool rejects.
pub fn write_scene(scene: &Scene) -> Result<Vec<u8>, WriteError> {
    // Validate everything up front so failure cannot leave a partial file.
    for (index, model) in scene.models.iter().enumerate() {
        let [size_x, size_y, size_z] = model.size();
        if size_x > MAX_WRITE_AXIS || size_y > MAX_WRITE_AXIS || size_z > MAX_WRITE_AXIS {
            return Err(WriteError::ModelTooLarge {
                index,
                size_x,
                size_y,
                size_z,
            });
        }
    }
    let placements: Vec<(Transform, u8)> = scene
        .instances
        .iter()
        .enumerate()
        .map(|(index, instance)| {
            let transform = scene.instance_transform_global(instance, 0);
            let rotation = transform
                .packed_rotation()
                .ok_or(WriteError::UnencodableRotation { index })?;
            Ok((transform, rotation))
        })
        .collect::<Result<_, WriteError>>()?;

    let mut w = ChunkWriter::new();
    w.put_u32(id::VOX_);
    w.put_u32(150);

    w.put_chunk_header(id::MAIN, 0);
    // Everything after this offset counts toward MAIN's children size,
    // which gets back-patched once the total is known.
    let offset_post_main = w.offset();

    for model in &scene.models {
        put_model(&mut w, model);
    }

    // Fixed node-id layout: 0 is the root transform, 1 the root group,
    // then one shape per model, then one transform per instance.
    let first_shape_id = 2;
    let first_instance_id = first_shape_id + scene.models.len() as u32;

    put_ntrn(&mut w, 0, 1, None, false, None, u32::MAX);

    {
        let num_children = scene.instances.len() as u32;
        let content_size = 4  // node_id
            + 4  // empty node dictionary
            + 4  // num_children
            + 4 * num_children;
        w.put_chunk_header(id::NGRP, content_size);
        w.put_u32(1); // node_id
        w.put_u32(0); // empty node dictionary
        w.put_u32(num_children);
        for i in 0..num_children {
            w.put_u32(first_instance_id + i);
        }
    }

    for model_index in 0..scene.models.len() as u32 {
        // node_id, empty dict, num_models, model_id, empty model dict
        w.put_chunk_header(id::NSHP, 5 * 4);
        w.put_u32(first_shape_id + model_index);
        w.put_u32(0);
        w.put_u32(1);
        w.put_u32(model_index);
        w.put_u32(0);
    }

    for (index, (instance, &(transform, rotation))) in
        scene.instances.iter().zip(&placements).enumerate()
    {
        put_ntrn(
            &mut w,
            first_instance_id + index as u32,
            first_shape_id + instance.model_index as u32,
            instance.name.as_deref(),
            instance.hidden,
            Some((&transform, rotation)),
            instance.layer_index as u32,
        );
    }

    {
        let file_colors = scene.palette.rotated_for_file();
        w.put_chunk_header(id::RGBA, 1024);
        w.put_bytes(bytemuck::cast_slice(&file_colors));
    }

    for (index, layer) in scene.layers.iter().enumerate() {
        let name = layer.name.as_deref();
        let hidden = layer.hidden.then_some("1");
        let color = layer
            .color
            .map(|c| format!("{} {} {}", c.r, c.g, c.b));
        let content_size = 4  // layer_id
            + 4  // pair count
            + dict_pair_size("_name", name)
            + dict_pair_size("_hidden", hidden)
            + dict_pair_size("_color", color.as_deref())
            + 4; // reserved
        w.put_chunk_header(id::LAYR, content_size);
        w.put_u32(index as u32);
        w.put_dict(&[
            ("_name", name),
            ("_hidden", hidden),
            ("_color", color.as_deref()),
        ]);
        w.put_i32(-1);
    }

    let total = w.offset();
    w.patch_u32(offset_post_main - 4, (total - offset_post_main) as u32);
    Ok(w.into_bytes())
}

/// Emit a model as its `SIZE` and `XYZI` chunk pair. Voxels are written in
/// z-then-y-then-x order to keep the output canonical.
fn put_model(w: &mut ChunkWriter, model: &Model) {
    let [size_x, size_y, size_z] = model.size();

    w.put_chunk_header(id::SIZE, 12);
    w.put_u32(size_x);
    w.put_u32(size_y);
    w.put_u32(size_z);

    let num_solid = model.solid_voxel_count() as u32;
    w.put_chunk_header(id::XYZI, 4 + 4 * num_solid);
    w.put_u32(num_solid);
    for z in 0..size_z {
        for y in 0..size_y {
            for x in 0..size_x {
                let color_index = model.voxel(x, y, z);
                if color_index != 0 {
                    w.put_u8(x as u8);
                    w.put_u8(y as u8);
                    w.put_u8(z as u8);
                    w.put_u8(color_index);
                }
            }
        }
    }
}

/// Emit an `nTRN` chunk. Dictionary keys whose value is the default are
/// omitted: `_t` for a zero translation, `_r` for the identity rotation,
/// `_name` when unset, `_hidden` when false.
fn put_ntrn(
    w: &mut ChunkWriter,
    node_id: u32,
    child_node_id: u32,
    name: Option<&str>,
    hidden: bool,
    placement: Option<(&Transform, u8)>,
    layer_id: u32,
) {
    let hidden = hidden.then_some("1");
    let (t_value, r_value) = match placement {
        None => (None, None),
        Some((transform, rotation)) => {
            let [tx, ty, tz] = transform.translation();
            let t = ([tx, ty, tz] != [0.0, 0.0, 0.0])
                .then(|| format!("{} {} {}", tx as i32, ty as i32, tz as i32));
            let r = (rotation != Transform::IDENTITY_ROTATION_BITS)
                .then(|| rotation.to_string());
            (t, r)
        }
    };

    let node_dict_size = 4 + dict_pair_size("_name", name) + dict_pair_size("_hidden", hidden);
    let frame_dict_size = 4
        + dict_pair_size("_r", r_value.as_deref())
        + dict_pair_size("_t", t_value.as_deref());
    let content_size = 4            // node_id
        + node_dict_size
        + 4 * 4                     // child, reserved, layer, num_frames
        + frame_dict_size;

    w.put_chunk_header(id::NTRN, content_size);
    w.put_u32(node_id);
    w.put_dict(&[("_name", name), ("_hidden", hidden)]);
    w.put_u32(child_node_id);
    w.put_u32(u32::MAX); // reserved, must be all-ones
    w.put_u32(layer_id);
    w.put_u32(1); // a single (static) frame
    w.put_dict(&[("_r", r_value.as_deref()), ("_t", t_value.as_deref())]);
}
