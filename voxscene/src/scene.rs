//! The scene value: palette, models, instances, layers, and groups.

use arcstr::ArcStr;

use crate::model::Model;
use crate::palette::Palette;
use crate::transform::Transform;

/// A complete voxel scene, as parsed from (or writable to) a `.vox` file.
///
/// A scene is immutable by convention once produced by the reader: the
/// reader's postconditions (deduplicated models, in-range indices,
/// instances sorted by model index, `palette.colors[0].a == 0`) are only
/// guaranteed as long as it is not restructured. All parts of the scene are
/// owned; dropping the scene releases everything, and instance/layer names
/// are cheaply-shared [`ArcStr`]s whose storage lives as long as any clone
/// of the scene that uses them.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Scene {
    /// The color palette, in runtime order (entry 0 = empty).
    pub palette: Palette,
    /// Voxel models, with no duplicates or fully-empty entries unless the
    /// reader was asked to keep them.
    pub models: Vec<Model>,
    /// Model placements, sorted by [`Instance::model_index`].
    pub instances: Vec<Instance>,
    /// Layers, indexed by [`Instance::layer_index`]. Never empty for reader
    /// output; a default layer is synthesized when the file stores none.
    pub layers: Vec<Layer>,
    /// Scene-graph groups, indexed by [`Instance::group_index`]. The root
    /// group comes first and every group's parent precedes it.
    pub groups: Vec<Group>,
}

impl Scene {
    /// An empty scene with the default palette, no models, and the single
    /// root group and default layer that reader output always carries.
    pub fn new() -> Self {
        Scene {
            palette: Palette::default(),
            models: Vec::new(),
            instances: Vec::new(),
            layers: vec![Layer::default()],
            groups: vec![Group::default()],
        }
    }

    /// The world transform of `instance` at animation frame `frame`:
    /// the instance's sampled local transform composed through its ancestor
    /// groups' sampled transforms, child-first.
    ///
    /// For scenes read without group preservation this equals
    /// [`Instance::transform_at`], since instance transforms are then
    /// already composed and the root group is the identity.
    pub fn instance_transform_global(&self, instance: &Instance, frame: u32) -> Transform {
        let mut world = instance.transform_at(frame);
        let mut ancestor = Some(instance.group_index);
        while let Some(index) = ancestor {
            let group = &self.groups[index];
            world = world.then(&group.transform_at(frame));
            ancestor = group.parent;
        }
        world
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new()
    }
}

// -------------------------------------------------------------------------------------------------

/// One placement of a [`Model`] within a [`Scene`].
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Instance {
    /// Name given to this placement in the authoring tool, if any.
    pub name: Option<ArcStr>,
    /// Placement transform. Composed down to world space when the scene was
    /// read without group preservation; local to the owning group otherwise.
    pub transform: Transform,
    /// Index into [`Scene::models`].
    pub model_index: usize,
    /// Index into [`Scene::layers`].
    pub layer_index: usize,
    /// Index into [`Scene::groups`].
    pub group_index: usize,
    /// Whether this instance is hidden in the authoring tool.
    pub hidden: bool,
    /// Transform keyframes, earliest first. Empty unless the scene was read
    /// with keyframes enabled and the file animates this instance.
    pub transform_frames: Vec<TransformFrame>,
    /// Model-swap keyframes, earliest first. Empty unless the scene was
    /// read with keyframes enabled and the file animates this instance.
    pub model_frames: Vec<ModelFrame>,
}

impl Instance {
    /// A static instance of `model_index` at `transform`, on the first
    /// layer and under the root group.
    pub fn new(model_index: usize, transform: Transform) -> Self {
        Instance {
            name: None,
            transform,
            model_index,
            layer_index: 0,
            group_index: 0,
            hidden: false,
            transform_frames: Vec::new(),
            model_frames: Vec::new(),
        }
    }

    /// The local transform at animation frame `frame`: the keyframe with
    /// the greatest frame index not exceeding `frame` (the first keyframe
    /// when `frame` precedes all of them; the static transform when there
    /// are no keyframes).
    pub fn transform_at(&self, frame: u32) -> Transform {
        sample_frames(&self.transform_frames, frame)
            .map(|f| f.transform)
            .unwrap_or(self.transform)
    }

    /// The model displayed at animation frame `frame`, by the same
    /// selection rule as [`Instance::transform_at`].
    pub fn model_at(&self, frame: u32) -> usize {
        sample_frames(&self.model_frames, frame)
            .map(|f| f.model_index)
            .unwrap_or(self.model_index)
    }
}

/// A transform keyframe of an animated [`Instance`] or [`Group`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct TransformFrame {
    /// Animation frame this keyframe takes effect on.
    pub frame_index: u32,
    /// The local transform from this frame onward.
    pub transform: Transform,
}

/// A model-swap keyframe of an animated [`Instance`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct ModelFrame {
    /// Animation frame this keyframe takes effect on.
    pub frame_index: u32,
    /// Index into [`Scene::models`] displayed from this frame onward.
    pub model_index: usize,
}

/// Keyframe selection shared by transforms and model swaps: latest keyframe
/// at or before `frame`, else the first.
fn sample_frames<T: HasFrameIndex>(frames: &[T], frame: u32) -> Option<&T> {
    frames
        .iter()
        .take_while(|f| f.frame_index() <= frame)
        .last()
        .or_else(|| frames.first())
}

trait HasFrameIndex {
    fn frame_index(&self) -> u32;
}
impl HasFrameIndex for TransformFrame {
    fn frame_index(&self) -> u32 {
        self.frame_index
    }
}
impl HasFrameIndex for ModelFrame {
    fn frame_index(&self) -> u32 {
        self.frame_index
    }
}

// -------------------------------------------------------------------------------------------------

/// An artist-facing grouping of instances, carrying visibility.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Layer {
    /// Layer name, if one was assigned.
    pub name: Option<ArcStr>,
    /// Whether the layer is hidden in the authoring tool.
    pub hidden: bool,
    /// The layer's editor color, if one was assigned.
    pub color: Option<crate::Rgba>,
}

/// A scene-graph grouping node.
///
/// Reader output always contains at least the root group (index 0, no
/// parent, identity transform); the full authored hierarchy is preserved
/// only when requested via [`ReadOptions::groups`](crate::ReadOptions).
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Group {
    /// Name of the transform node above this group, if any.
    pub name: Option<ArcStr>,
    /// Whether the group is hidden in the authoring tool.
    pub hidden: bool,
    /// Index into [`Scene::layers`].
    pub layer_index: usize,
    /// Index of the parent group, or [`None`] for the root. Always less
    /// than this group's own index.
    pub parent: Option<usize>,
    /// Transform local to the parent group.
    pub transform: Transform,
    /// Transform keyframes, earliest first; empty for static groups.
    pub transform_frames: Vec<TransformFrame>,
}

impl Group {
    /// The local transform at animation frame `frame`, by the same
    /// selection rule as [`Instance::transform_at`].
    pub fn transform_at(&self, frame: u32) -> Transform {
        sample_frames(&self.transform_frames, frame)
            .map(|f| f.transform)
            .unwrap_or(self.transform)
    }
}

impl Default for Group {
    /// The root group: no parent, identity transform, first layer.
    fn default() -> Self {
        Group {
            name: None,
            hidden: false,
            layer_index: 0,
            parent: None,
            transform: Transform::IDENTITY,
            transform_frames: Vec::new(),
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(frame_index: u32, tx: f32) -> TransformFrame {
        TransformFrame {
            frame_index,
            transform: Transform::from_translation([tx, 0.0, 0.0]),
        }
    }

    #[test]
    fn keyframe_sampling_picks_latest_not_after() {
        let mut instance = Instance::new(0, Transform::IDENTITY);
        instance.transform_frames = vec![frame(2, 20.0), frame(5, 50.0), frame(9, 90.0)];

        // Before the first keyframe, the first applies.
        assert_eq!(instance.transform_at(0).translation()[0], 20.0);
        assert_eq!(instance.transform_at(2).translation()[0], 20.0);
        assert_eq!(instance.transform_at(4).translation()[0], 20.0);
        assert_eq!(instance.transform_at(5).translation()[0], 50.0);
        assert_eq!(instance.transform_at(100).translation()[0], 90.0);
    }

    #[test]
    fn static_instance_samples_its_transform() {
        let instance = Instance::new(3, Transform::from_translation([1.0, 2.0, 3.0]));
        assert_eq!(instance.transform_at(7), instance.transform);
        assert_eq!(instance.model_at(7), 3);
    }

    #[test]
    fn global_transform_composes_group_chain() {
        let mut scene = Scene::new();
        scene.groups.push(Group {
            parent: Some(0),
            transform: Transform::from_translation([0.0, 5.0, 0.0]),
            ..Group::default()
        });
        let mut instance = Instance::new(0, Transform::from_translation([1.0, 0.0, 0.0]));
        instance.group_index = 1;

        let world = scene.instance_transform_global(&instance, 0);
        assert_eq!(world.translation(), [1.0, 5.0, 0.0]);
    }

    #[test]
    fn global_transform_samples_ancestor_keyframes() {
        let mut scene = Scene::new();
        scene.groups.push(Group {
            parent: Some(0),
            transform_frames: vec![frame(0, 0.0), frame(10, 100.0)],
            ..Group::default()
        });
        let mut instance = Instance::new(0, Transform::IDENTITY);
        instance.group_index = 1;

        assert_eq!(
            scene.instance_transform_global(&instance, 10).translation(),
            [100.0, 0.0, 0.0]
        );
    }
}
