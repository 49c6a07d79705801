//! Merging several scenes into one, fitting their palettes onto a single
//! output palette.

use crate::error::MergeError;
use crate::palette::{Palette, Rgba};
use crate::scene::{Layer, Scene};

/// Merge `scenes` into a single scene.
///
/// With `target_palette` given (at most 255 colors), every source color is
/// fitted onto it; otherwise the output palette is the union of the source
/// palettes, admitting colors first-come-first-served until the 255 usable
/// entries are full. Either way, each source color maps to its exact match
/// in the output palette when one exists and to the nearest color by
/// squared RGB distance when none does; alpha does not participate in the
/// distance.
///
/// Models, instances, layers, and groups are concatenated in source order
/// with their indices offset; each source's group tree is reparented under
/// a single fresh root group.
pub fn merge_scenes(
    scenes: &[&Scene],
    target_palette: Option<&[Rgba]>,
) -> Result<Scene, MergeError> {
    let palette = build_palette(scenes, target_palette)?;
    let mut merged = Scene::new();
    merged.palette = palette;
    // Source layers are preserved as-is rather than hung under a synthetic
    // default, so the seeded layer list starts empty.
    merged.layers.clear();

    for scene in scenes {
        let remap = color_remap(&scene.palette, &merged.palette);
        let model_base = merged.models.len();
        let layer_base = merged.layers.len();
        let group_base = merged.groups.len();

        for model in &scene.models {
            let mut model = model.clone();
            model.remap_colors(|v| remap[v as usize]);
            merged.models.push(model);
        }

        for instance in &scene.instances {
            let mut instance = instance.clone();
            instance.model_index += model_base;
            instance.layer_index += layer_base;
            instance.group_index += group_base;
            for frame in &mut instance.model_frames {
                frame.model_index += model_base;
            }
            merged.instances.push(instance);
        }

        merged.layers.extend(scene.layers.iter().cloned());

        for group in &scene.groups {
            let mut group = group.clone();
            group.parent = match group.parent {
                // The source's root hangs off the merged scene's root.
                None => Some(0),
                Some(parent) => Some(parent + group_base),
            };
            group.layer_index += layer_base;
            merged.groups.push(group);
        }
    }

    if merged.layers.is_empty() {
        merged.layers.push(Layer::default());
    }
    Ok(merged)
}

/// Resolve the output palette per the rules of [`merge_scenes`]. Slots not
/// claimed by a target or union color keep the default palette's color for
/// that slot; slot 0 stays the empty color.
fn build_palette(
    scenes: &[&Scene],
    target_palette: Option<&[Rgba]>,
) -> Result<Palette, MergeError> {
    let mut palette = Palette::default();

    match target_palette {
        Some(colors) => {
            if colors.len() > 255 {
                return Err(MergeError::PaletteTooLarge(colors.len()));
            }
            palette.colors[1..=colors.len()].copy_from_slice(colors);
        }
        None => {
            let mut used = 0usize;
            'sources: for scene in scenes {
                for &color in &scene.palette.colors[1..] {
                    if palette.colors[1..=used].contains(&color) {
                        continue;
                    }
                    if used == 255 {
                        log::warn!("merged palette is full; remaining colors map to nearest");
                        break 'sources;
                    }
                    used += 1;
                    palette.colors[used] = color;
                }
            }
        }
    }
    Ok(palette)
}

/// For each source color index, the output index holding its exact match,
/// or failing that the nearest color by squared RGB distance (ties go to
/// the lower index). Index 0 maps to 0.
fn color_remap(source: &Palette, output: &Palette) -> [u8; 256] {
    let mut remap = [0u8; 256];
    for (index, slot) in remap.iter_mut().enumerate().skip(1) {
        let color = source.colors[index];
        let nearest = output.colors[1..]
            .iter()
            .enumerate()
            .min_by_key(|&(_, &candidate)| color.distance_squared_rgb(candidate))
            .map(|(i, _)| i + 1)
            .unwrap();
        *slot = nearest as u8;
    }
    remap
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn remap_prefers_exact_match() {
        let mut source = Palette::default();
        let mut output = Palette::default();
        source.colors[3] = Rgba::new(10, 20, 30, 255);
        output.colors[200] = Rgba::new(10, 20, 30, 255);
        // Drop the default palette's identical entry so the exact match is
        // unique.
        output.colors[3] = Rgba::new(0, 0, 0, 255);

        let remap = color_remap(&source, &output);
        assert_eq!(remap[3], 200);
        assert_eq!(remap[0], 0);
    }

    #[test]
    fn remap_falls_back_to_nearest() {
        let mut output = Palette::default();
        for color in &mut output.colors[1..] {
            *color = Rgba::new(0, 0, 0, 255);
        }
        output.colors[7] = Rgba::new(200, 0, 0, 255);

        let mut source = Palette::default();
        source.colors[1] = Rgba::new(255, 0, 0, 255);

        let remap = color_remap(&source, &output);
        assert_eq!(remap[1], 7);
    }

    #[test]
    fn oversized_target_palette_is_rejected() {
        let colors = vec![Rgba::new(1, 2, 3, 255); 256];
        assert!(matches!(
            merge_scenes(&[], Some(&colors)),
            Err(MergeError::PaletteTooLarge(256))
        ));
    }
}
