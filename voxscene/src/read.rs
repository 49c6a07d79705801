//! The scene reader: chunk dispatch, scene-graph assembly, and the
//! post-processing passes that turn a raw chunk stream into a normalized
//! [`Scene`].
//!
//! Failures fall into two classes. Structurally malformed input — short
//! reads, a bad magic, an oversized dictionary, a reserved-field violation —
//! aborts the whole parse with a [`ReadError`]. Semantic anomalies — a shape
//! referring to a model that was never defined, a dangling child node id, a
//! missing root — are tolerated: the reader repairs what it can, reports the
//! rest through [`log`], and still produces a scene.

use std::fmt;
use std::ops::Range;

use arcstr::ArcStr;

use crate::chunk::{Cursor, Dict, id};
use crate::error::ReadError;
use crate::model::Model;
use crate::palette::{DEFAULT_FILE_PALETTE, Palette, Rgba};
use crate::scene::{Group, Instance, Layer, Scene, TransformFrame};
use crate::transform::Transform;

/// File versions the reader accepts.
const SUPPORTED_VERSIONS: [u32; 2] = [150, 200];

/// Voxel coordinates on disk are single bytes, so no axis of a meaningful
/// model exceeds 256; a `SIZE` chunk claiming more is treated as malformed
/// rather than honored with a giant allocation.
const MAX_MODEL_AXIS: u32 = 256;

/// Node ids index a dense table; a bound keeps a corrupt id from turning
/// into an allocation of gigabytes.
const MAX_NODE_ID: u32 = 1 << 20;

/// Same concern for layer ids.
const MAX_LAYER_ID: i32 = 1 << 16;

/// Bound on scene-graph depth during flattening, past which a cycle is
/// assumed and the branch is abandoned.
const MAX_WALK_DEPTH: u32 = 1024;

/// Options controlling the reader's post-processing passes.
///
/// Core parsing is the same regardless of options; each flag only keeps
/// information the default passes would normalize away. The default —
/// everything off — deduplicates models, strips empty models and the
/// instances referring to them, flattens the group hierarchy into composed
/// world transforms, and keeps only the first animation frame.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct ReadOptions {
    /// Keep models with no solid voxels, and the instances that use them.
    pub keep_empty_models: bool,
    /// Keep content-identical models distinct instead of collapsing them.
    pub keep_duplicate_models: bool,
    /// Preserve the group hierarchy as first-class [`Group`]s. Instance and
    /// group transforms are then local to their parent group rather than
    /// composed to world space.
    pub groups: bool,
    /// Preserve per-frame transforms and model swaps on animated nodes.
    pub keyframes: bool,
}

/// Parse a `.vox` byte buffer into a [`Scene`].
///
/// The buffer may be dropped afterwards; the scene owns all of its data.
/// See [`ReadOptions`] for the post-processing knobs and the
/// [module documentation](self) for which inputs fail versus which are
/// repaired.
pub fn read_scene(bytes: &[u8], options: ReadOptions) -> Result<Scene, ReadError> {
    let mut parser = Parser {
        cursor: Cursor::new(bytes),
        options,
        models: Vec::new(),
        nodes: Vec::new(),
        child_ids: Vec::new(),
        layer_table: Vec::new(),
        file_palette: DEFAULT_FILE_PALETTE,
        index_map: None,
        current_size: None,
    };
    parser.check_header()?;
    while !parser.cursor.is_at_end() {
        parser.dispatch_chunk()?;
    }
    Ok(parser.finish())
}

// -------------------------------------------------------------------------------------------------

/// A scene-graph node, as referenced by id from `nTRN`/`nGRP`/`nSHP`
/// chunks. Ids may be sparse and forward-referencing, so the table is
/// grown on first reference and holds [`SceneNode::Unparsed`] in gaps.
#[derive(Debug, Default)]
enum SceneNode {
    #[default]
    Unparsed,
    Transform(TransformNode),
    /// Children are a range into the shared [`Parser::child_ids`] pool,
    /// avoiding a per-group allocation.
    Group {
        children: Range<usize>,
        hidden: bool,
    },
    Shape { models: Vec<ShapeModel> },
}

#[derive(Debug)]
struct TransformNode {
    name: Option<ArcStr>,
    hidden: bool,
    child: u32,
    /// Layer id as stored; `u32::MAX` means "no layer".
    layer_id: u32,
    /// At least one entry; entry 0 doubles as the static transform.
    frames: Vec<TransformFrame>,
}

#[derive(Debug)]
struct ShapeModel {
    model_id: u32,
    frame_index: u32,
}

/// One pending step of the depth-first flattening walk.
struct WalkItem {
    node_id: u32,
    depth: u32,
    /// Accumulated transform: world space when flattening, local to
    /// `group_index` when groups are preserved.
    transform: Transform,
    /// Keyframes of the nearest enclosing transform node, already composed
    /// with the static transform accumulated above it.
    frames: Vec<TransformFrame>,
    layer_id: u32,
    name: Option<ArcStr>,
    /// Hidden flag of the nearest enclosing transform node; each transform
    /// replaces it on the way down.
    hidden: bool,
    /// OR of the hidden flags of enclosing group nodes, accumulated only
    /// when the hierarchy is being flattened.
    group_hidden: bool,
    group_index: usize,
}

struct Parser<'a> {
    cursor: Cursor<'a>,
    options: ReadOptions,
    /// `None` marks a placeholder from an empty `XYZI` chunk (compacted
    /// away at the end) or a model freed by deduplication.
    models: Vec<Option<Model>>,
    nodes: Vec<SceneNode>,
    child_ids: Vec<u32>,
    layer_table: Vec<Option<Layer>>,
    file_palette: [Rgba; 256],
    index_map: Option<[u8; 256]>,
    /// Dimensions from the most recent `SIZE` chunk, consumed by `XYZI`.
    current_size: Option<[u32; 3]>,
}

impl Parser<'_> {
    fn check_header(&mut self) -> Result<(), ReadError> {
        if self.cursor.read_u32()? != id::VOX_ {
            return Err(ReadError::BadMagic);
        }
        let version = self.cursor.read_u32()?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ReadError::UnsupportedVersion(version));
        }
        Ok(())
    }

    /// Read one `(chunk_id, content_size, children_size)` header and its
    /// payload. Unknown chunk ids skip their content; nested chunk
    /// boundaries are ignored throughout, since the format nests only by
    /// convention.
    fn dispatch_chunk(&mut self) -> Result<(), ReadError> {
        let chunk_id = self.cursor.read_u32()?;
        let content_size = self.cursor.read_u32()?;
        let _children_size = self.cursor.read_u32()?;

        match chunk_id {
            id::MAIN => {}
            id::SIZE => {
                let x = self.cursor.read_u32()?;
                let y = self.cursor.read_u32()?;
                let z = self.cursor.read_u32()?;
                if x > MAX_MODEL_AXIS || y > MAX_MODEL_AXIS || z > MAX_MODEL_AXIS {
                    return Err(ReadError::ModelSizeInvalid {
                        size_x: x,
                        size_y: y,
                        size_z: z,
                    });
                }
                self.current_size = Some([x, y, z]);
            }
            id::XYZI => self.parse_xyzi()?,
            id::RGBA => {
                let bytes = self.cursor.take(1024)?;
                self.file_palette = *bytemuck::from_bytes::<[Rgba; 256]>(bytes);
            }
            id::NTRN => self.parse_transform_node()?,
            id::NGRP => self.parse_group_node()?,
            id::NSHP => self.parse_shape_node()?,
            id::IMAP => {
                let bytes = self.cursor.take(256)?;
                self.index_map = Some(bytes.try_into().unwrap());
            }
            id::LAYR => self.parse_layer()?,
            // Materials carry data this crate does not model.
            id::MATL | id::MATT => self.cursor.skip(content_size as usize),
            // Anything unrecognized is skipped whole too.
            _ => self.cursor.skip(content_size as usize),
        }
        Ok(())
    }

    fn parse_xyzi(&mut self) -> Result<(), ReadError> {
        let num_voxels = self.cursor.read_u32()?;
        if num_voxels == 0 {
            // A model authored and then fully erased. Keep a placeholder so
            // later model ids still line up; it is either materialized as a
            // genuinely empty grid or compacted away at the end.
            self.models.push(match self.current_size {
                Some(size) if self.options.keep_empty_models => {
                    let voxel_count = size.iter().map(|&d| d as usize).product();
                    Some(Model::new(size, vec![0; voxel_count]))
                }
                _ => None,
            });
            return Ok(());
        }

        let [size_x, size_y, size_z] = self.current_size.ok_or(ReadError::MissingSize)?;
        let mut voxels = vec![0u8; (size_x * size_y * size_z) as usize];
        let packed = self.cursor.take(num_voxels as usize * 4)?;
        for quad in packed.chunks_exact(4) {
            let [x, y, z, color_index] = [quad[0], quad[1], quad[2], quad[3]];
            if u32::from(x) >= size_x || u32::from(y) >= size_y || u32::from(z) >= size_z {
                return Err(ReadError::VoxelOutOfBounds {
                    x,
                    y,
                    z,
                    size_x,
                    size_y,
                    size_z,
                });
            }
            let index = u32::from(x) + u32::from(y) * size_x + u32::from(z) * size_x * size_y;
            voxels[index as usize] = color_index;
        }
        self.models
            .push(Some(Model::new([size_x, size_y, size_z], voxels)));
        Ok(())
    }

    fn parse_transform_node(&mut self) -> Result<(), ReadError> {
        let node_id = self.cursor.read_u32()?;

        let node_dict = Dict::parse(&mut self.cursor)?;
        note_unknown_keys(
            format_args!("transform node {node_id}"),
            &node_dict,
            &["_name", "_hidden"],
        );
        let name = name_from_dict(&node_dict);
        let hidden = hidden_from_dict(&node_dict);

        let child = self.cursor.read_u32()?;
        let reserved = self.cursor.read_u32()?;
        if reserved != u32::MAX {
            return Err(ReadError::ReservedField {
                chunk: "nTRN",
                value: reserved,
            });
        }
        let layer_id = self.cursor.read_u32()?;
        let num_frames = self.cursor.read_u32()?;
        if num_frames == 0 {
            return Err(ReadError::NoFrames);
        }

        let mut frames = Vec::new();
        for i in 0..num_frames {
            let frame_dict = Dict::parse(&mut self.cursor)?;
            note_unknown_keys(
                format_args!("frame {i} of transform node {node_id}"),
                &frame_dict,
                &["_r", "_t", "_f"],
            );
            // Frames past the first only matter when keyframes are kept,
            // but every frame dictionary must still be consumed.
            if i == 0 || self.options.keyframes {
                frames.push(TransformFrame {
                    frame_index: frame_index_from_dict(&frame_dict, i),
                    transform: transform_from_dict(&frame_dict),
                });
            }
        }

        *self.node_slot(node_id)? = SceneNode::Transform(TransformNode {
            name,
            hidden,
            child,
            layer_id,
            frames,
        });
        Ok(())
    }

    fn parse_group_node(&mut self) -> Result<(), ReadError> {
        let node_id = self.cursor.read_u32()?;
        let node_dict = Dict::parse(&mut self.cursor)?;
        note_unknown_keys(format_args!("group node {node_id}"), &node_dict, &["_hidden"]);
        let hidden = hidden_from_dict(&node_dict);

        let num_children = self.cursor.read_u32()?;
        let start = self.child_ids.len();
        for _ in 0..num_children {
            let child = self.cursor.read_u32()?;
            self.child_ids.push(child);
        }
        let children = start..self.child_ids.len();

        *self.node_slot(node_id)? = SceneNode::Group { children, hidden };
        Ok(())
    }

    fn parse_shape_node(&mut self) -> Result<(), ReadError> {
        let node_id = self.cursor.read_u32()?;
        let node_dict = Dict::parse(&mut self.cursor)?;
        note_unknown_keys(format_args!("shape node {node_id}"), &node_dict, &[]);

        // One model for static scenes; several when the shape swaps models
        // across animation frames.
        let num_models = self.cursor.read_u32()?;
        let mut models = Vec::new();
        for i in 0..num_models {
            let model_id = self.cursor.read_u32()?;
            let model_dict = Dict::parse(&mut self.cursor)?;
            note_unknown_keys(
                format_args!("model {i} of shape node {node_id}"),
                &model_dict,
                &["_f"],
            );
            models.push(ShapeModel {
                model_id,
                frame_index: frame_index_from_dict(&model_dict, i),
            });
        }

        *self.node_slot(node_id)? = SceneNode::Shape { models };
        Ok(())
    }

    fn parse_layer(&mut self) -> Result<(), ReadError> {
        let layer_id = self.cursor.read_i32()?;
        let dict = Dict::parse(&mut self.cursor)?;
        note_unknown_keys(
            format_args!("layer {layer_id}"),
            &dict,
            &["_name", "_hidden", "_color"],
        );
        let reserved = self.cursor.read_i32()?;
        if reserved != -1 {
            return Err(ReadError::ReservedField {
                chunk: "LAYR",
                value: reserved as u32,
            });
        }

        if layer_id < 0 || layer_id >= MAX_LAYER_ID {
            log::warn!("ignoring LAYR chunk with out-of-range id {layer_id}");
            return Ok(());
        }
        let index = layer_id as usize;
        if self.layer_table.len() <= index {
            self.layer_table.resize_with(index + 1, || None);
        }
        self.layer_table[index] = Some(Layer {
            name: name_from_dict(&dict),
            hidden: hidden_from_dict(&dict),
            color: dict.get("_color").and_then(parse_color),
        });
        Ok(())
    }

    /// The node-table slot for `node_id`, growing the table if this is the
    /// first reference to it.
    fn node_slot(&mut self, node_id: u32) -> Result<&mut SceneNode, ReadError> {
        if node_id >= MAX_NODE_ID {
            return Err(ReadError::NodeIdOutOfRange(node_id));
        }
        let index = node_id as usize;
        if self.nodes.len() <= index {
            self.nodes.resize_with(index + 1, SceneNode::default);
        }
        Ok(&mut self.nodes[index])
    }

    // ---------------------------------------------------------------------------------------------
    // Post-processing. Chunks may reference chunks later in the file, so
    // none of this can happen during the chunk loop.

    fn finish(mut self) -> Scene {
        let mut instances = Vec::new();
        let mut groups = vec![Group::default()];

        if !self.nodes.is_empty() {
            self.walk_graph(&mut instances, &mut groups);
        } else if self.models.len() == 1 && self.models[0].is_some() {
            // Very old files carry a single model and no scene graph.
            instances.push(Instance::new(0, Transform::IDENTITY));
        }

        self.apply_index_map();
        let palette = Palette::rotated_from_file(&self.file_palette);

        let mut models = std::mem::take(&mut self.models);
        if !self.options.keep_duplicate_models {
            deduplicate_models(&mut models, &mut instances);
        }
        let models = compact_models(models, &mut instances);
        let layers = self.finish_layers(&mut instances, &mut groups);
        instances.sort_by_key(|instance| instance.model_index);

        Scene {
            palette,
            models,
            instances,
            layers,
            groups,
        }
    }

    /// Flatten the node graph depth-first from node 0, emitting instances
    /// and (when preserved) groups. An explicit work stack bounds call
    /// depth on adversarial inputs; children are pushed reversed so they
    /// pop in file order and output stays deterministic.
    fn walk_graph(&self, instances: &mut Vec<Instance>, groups: &mut Vec<Group>) {
        // The first group node visited — the topmost one, given depth-first
        // order — becomes the root group rather than a child of it.
        let mut root_group_filled = false;
        let mut stack = vec![WalkItem {
            node_id: 0,
            depth: 0,
            transform: Transform::IDENTITY,
            frames: Vec::new(),
            layer_id: u32::MAX,
            name: None,
            hidden: false,
            group_hidden: false,
            group_index: 0,
        }];

        while let Some(item) = stack.pop() {
            if item.depth > MAX_WALK_DEPTH {
                log::warn!("scene graph exceeds depth {MAX_WALK_DEPTH}; assuming a cycle");
                continue;
            }
            match self.nodes.get(item.node_id as usize) {
                None | Some(SceneNode::Unparsed) => {
                    log::warn!(
                        "scene graph refers to node {} which the file does not define",
                        item.node_id
                    );
                }
                Some(SceneNode::Transform(node)) => {
                    let composed = node.frames[0].transform.then(&item.transform);
                    let frames = if node.frames.len() > 1 {
                        // Keyframes compose with the static transform
                        // accumulated above; animated ancestors are sampled
                        // through the group chain instead.
                        node.frames
                            .iter()
                            .map(|f| TransformFrame {
                                frame_index: f.frame_index,
                                transform: f.transform.then(&item.transform),
                            })
                            .collect()
                    } else {
                        Vec::new()
                    };
                    stack.push(WalkItem {
                        node_id: node.child,
                        depth: item.depth + 1,
                        transform: composed,
                        frames,
                        layer_id: node.layer_id,
                        // The innermost non-empty name wins, and the
                        // innermost transform's hidden flag likewise
                        // replaces whatever was above it.
                        name: node.name.clone().or(item.name),
                        hidden: node.hidden,
                        group_hidden: item.group_hidden,
                        group_index: item.group_index,
                    });
                }
                Some(&SceneNode::Group {
                    ref children,
                    hidden: group_node_hidden,
                }) => {
                    let group_index = if self.options.groups {
                        let group = Group {
                            name: item.name.clone(),
                            hidden: item.hidden | group_node_hidden,
                            layer_index: normalize_layer_id(item.layer_id),
                            parent: root_group_filled.then_some(item.group_index),
                            transform: item.transform,
                            transform_frames: item.frames.clone(),
                        };
                        if root_group_filled {
                            groups.push(group);
                            groups.len() - 1
                        } else {
                            root_group_filled = true;
                            groups[0] = group;
                            0
                        }
                    } else {
                        item.group_index
                    };
                    for &child in self.child_ids[children.clone()].iter().rev() {
                        stack.push(if self.options.groups {
                            // Start a fresh local frame under the new group;
                            // its visibility travels with the group entity.
                            WalkItem {
                                node_id: child,
                                depth: item.depth + 1,
                                transform: Transform::IDENTITY,
                                frames: Vec::new(),
                                layer_id: item.layer_id,
                                name: None,
                                hidden: false,
                                group_hidden: false,
                                group_index,
                            }
                        } else {
                            // Flattening: the group's own hidden flag ORs
                            // into the effective visibility of everything
                            // below it.
                            WalkItem {
                                node_id: child,
                                depth: item.depth + 1,
                                transform: item.transform,
                                frames: Vec::new(),
                                layer_id: item.layer_id,
                                name: item.name.clone(),
                                hidden: item.hidden,
                                group_hidden: item.group_hidden | group_node_hidden,
                                group_index,
                            }
                        });
                    }
                }
                Some(SceneNode::Shape { models }) => {
                    self.emit_shape_instances(&item, models, instances);
                }
            }
        }
    }

    fn emit_shape_instances(
        &self,
        item: &WalkItem,
        shape_models: &[ShapeModel],
        instances: &mut Vec<Instance>,
    ) {
        let usable: Vec<&ShapeModel> = shape_models
            .iter()
            .filter(|entry| {
                let defined = self
                    .models
                    .get(entry.model_id as usize)
                    .is_some_and(Option::is_some);
                if !defined {
                    log::warn!(
                        "shape refers to model {} which the file does not define",
                        entry.model_id
                    );
                }
                defined
            })
            .collect();
        let Some(first) = usable.first() else {
            return;
        };

        let mut instance = Instance::new(first.model_id as usize, item.transform);
        instance.name = item.name.clone();
        instance.hidden = item.hidden | item.group_hidden;
        instance.layer_index = normalize_layer_id(item.layer_id);
        instance.group_index = item.group_index;
        instance.transform_frames = item.frames.clone();
        if self.options.keyframes && usable.len() > 1 {
            instance.model_frames = usable
                .iter()
                .map(|entry| crate::scene::ModelFrame {
                    frame_index: entry.frame_index,
                    model_index: entry.model_id as usize,
                })
                .collect();
        }
        instances.push(instance);
    }

    /// Reorder the palette and rewrite voxel indices so that stored indices
    /// match the order the artist sees in the authoring tool's palette
    /// window. (The tool persists palette reordering as a display→actual
    /// index map instead of rewriting models itself.)
    ///
    /// Runs on the file-order palette, before the final rotation.
    fn apply_index_map(&mut self) {
        let Some(map) = self.index_map else {
            return;
        };

        let mut inverse = [0u8; 256];
        for (display, &actual) in map.iter().enumerate() {
            inverse[actual as usize] = display as u8;
        }

        let old = self.file_palette;
        for (display, color) in self.file_palette.iter_mut().enumerate() {
            *color = old[(map[display] as usize + 255) & 255];
        }

        for model in self.models.iter_mut().flatten() {
            model.remap_colors(|v| 1u8.wrapping_add(inverse[v as usize]));
        }
    }

    /// Produce the final layer list and clamp every instance and group onto
    /// it. A file with no `LAYR` chunks gets one default layer, with all
    /// instances mapped to it.
    fn finish_layers(&mut self, instances: &mut [Instance], groups: &mut [Group]) -> Vec<Layer> {
        let layers: Vec<Layer> = self
            .layer_table
            .drain(..)
            .map(Option::unwrap_or_default)
            .collect();

        if layers.is_empty() {
            for instance in instances.iter_mut() {
                instance.layer_index = 0;
            }
            for group in groups.iter_mut() {
                group.layer_index = 0;
            }
            return vec![Layer::default()];
        }

        let clamp = |layer_index: &mut usize, what: &str| {
            if *layer_index >= layers.len() {
                log::warn!(
                    "{what} refers to layer {layer_index} of {}; moving it to layer 0",
                    layers.len()
                );
                *layer_index = 0;
            }
        };
        for instance in instances.iter_mut() {
            clamp(&mut instance.layer_index, "instance");
        }
        for group in groups.iter_mut() {
            clamp(&mut group.layer_index, "group");
        }
        layers
    }
}

/// Map the on-disk "no layer" sentinel to the default layer.
fn normalize_layer_id(layer_id: u32) -> usize {
    if layer_id == u32::MAX {
        0
    } else {
        layer_id as usize
    }
}

/// Collapse content-identical models pair-wise, keeping the earlier one and
/// remapping instances (and their model keyframes) that referred to the
/// later one. The content hash makes the quadratic scan cheap in practice.
fn deduplicate_models(models: &mut [Option<Model>], instances: &mut [Instance]) {
    for i in 0..models.len() {
        if models[i].is_none() {
            continue;
        }
        for j in i + 1..models.len() {
            let duplicate = match (&models[i], &models[j]) {
                (Some(a), Some(b)) => a.content_equal(b),
                _ => false,
            };
            if duplicate {
                models[j] = None;
                for instance in instances.iter_mut() {
                    if instance.model_index == j {
                        instance.model_index = i;
                    }
                    for frame in &mut instance.model_frames {
                        if frame.model_index == j {
                            frame.model_index = i;
                        }
                    }
                }
            }
        }
    }
}

/// Remove placeholder and freed entries from the model array, rewriting
/// instance model indices through a remap table. Instances left pointing at
/// a removed model (possible only for files with undefined-model anomalies)
/// are dropped with a diagnostic.
fn compact_models(models: Vec<Option<Model>>, instances: &mut Vec<Instance>) -> Vec<Model> {
    let mut remap: Vec<Option<usize>> = vec![None; models.len()];
    let mut compacted = Vec::new();
    for (index, model) in models.into_iter().enumerate() {
        if let Some(model) = model {
            remap[index] = Some(compacted.len());
            compacted.push(model);
        }
    }

    instances.retain_mut(|instance| {
        let Some(new_index) = remap.get(instance.model_index).copied().flatten() else {
            log::warn!(
                "dropping instance of removed model {}",
                instance.model_index
            );
            return false;
        };
        instance.model_index = new_index;
        instance.model_frames.retain_mut(|frame| {
            match remap.get(frame.model_index).copied().flatten() {
                Some(new_index) => {
                    frame.model_index = new_index;
                    true
                }
                None => {
                    log::warn!("dropping keyframe of removed model {}", frame.model_index);
                    false
                }
            }
        });
        true
    });
    compacted
}

// -------------------------------------------------------------------------------------------------
// Dictionary value decoding.

fn note_unknown_keys(what: fmt::Arguments<'_>, dict: &Dict, expected: &[&str]) {
    let unexpected: Vec<&str> = dict.keys().filter(|key| !expected.contains(key)).collect();
    if !unexpected.is_empty() {
        log::info!("{what} carries unrecognized attributes {unexpected:?}");
    }
}

fn name_from_dict(dict: &Dict) -> Option<ArcStr> {
    dict.get("_name")
        .filter(|name| !name.is_empty())
        .map(ArcStr::from)
}

fn hidden_from_dict(dict: &Dict) -> bool {
    dict.get("_hidden")
        .is_some_and(|value| value.starts_with('1'))
}

fn frame_index_from_dict(dict: &Dict, position: u32) -> u32 {
    match dict.get("_f") {
        None => position,
        Some(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("unparseable frame index {value:?}; using sequence position");
            position
        }),
    }
}

/// Decode `_r`/`_t` into a transform. Unparseable values degrade to the
/// identity with a diagnostic, matching the tolerance for semantic
/// anomalies.
fn transform_from_dict(dict: &Dict) -> Transform {
    let mut transform = match dict.get("_r") {
        None => Transform::IDENTITY,
        Some(value) => value
            .parse::<u8>()
            .ok()
            .and_then(Transform::from_packed_rotation)
            .unwrap_or_else(|| {
                log::warn!("unparseable rotation {value:?}; using identity");
                Transform::IDENTITY
            }),
    };
    if let Some(value) = dict.get("_t") {
        match parse_i32_triple(value) {
            Some([x, y, z]) => transform.set_translation([x as f32, y as f32, z as f32]),
            None => log::warn!("unparseable translation {value:?}; using zero"),
        }
    }
    transform
}

fn parse_i32_triple(value: &str) -> Option<[i32; 3]> {
    let mut parts = value.split(' ').map(str::parse::<i32>);
    let triple = [
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
    ];
    parts.next().is_none().then_some(triple)
}

/// `_color` holds three space-separated decimal components.
fn parse_color(value: &str) -> Option<Rgba> {
    let mut parts = value.split(' ').map(str::parse::<u8>);
    let color = Rgba::new(
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        parts.next()?.ok()?,
        255,
    );
    parts.next().is_none().then_some(color)
}
