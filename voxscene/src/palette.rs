//! Colors and the 256-entry scene palette, including the palette-order
//! conventions that differ between the file and the runtime.
//!
//! On disk, the RGBA chunk's entry 0 colors voxel index **1**: the file
//! treats slot 1 as the first palette entry while the runtime treats index 0
//! as the empty voxel. The reader therefore rotates the palette one step on
//! input and the writer rotates it back on output; the two rotations live
//! side by side here ([`Palette::rotated_from_file`] /
//! [`Palette::rotated_for_file`]) because they must stay exact mirror
//! images or interchange with other tools breaks.

use bytemuck::{Pod, Zeroable};

/// A color with 8-bit red, green, blue, and alpha components.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Pod, Zeroable)]
#[repr(C)]
#[allow(clippy::exhaustive_structs)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 0 is fully transparent.
    pub a: u8,
}

impl Rgba {
    /// Construct a color from its components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    /// Squared Euclidean distance in RGB; alpha is ignored.
    ///
    /// Used by the merger's nearest-color fitting.
    pub(crate) fn distance_squared_rgb(self, other: Rgba) -> u32 {
        let d = |a: u8, b: u8| {
            let d = i32::from(a) - i32::from(b);
            (d * d) as u32
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }
}

/// The 256-color palette of a scene, in runtime order: entry 0 is the
/// "empty voxel" color and always has zero alpha in reader output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Palette {
    /// Colors indexed directly by voxel value.
    pub colors: [Rgba; 256],
}

impl Palette {
    /// Construct a palette from file-order colors (as stored in an RGBA
    /// chunk), rotating one step so that voxel indices map straight in:
    /// runtime entry `i` holds file entry `i − 1`, and entry 0 receives the
    /// file's last color with alpha forced to zero.
    pub(crate) fn rotated_from_file(file_colors: &[Rgba; 256]) -> Palette {
        let mut colors = [Rgba::default(); 256];
        for i in 1..256 {
            colors[i] = file_colors[i - 1];
        }
        colors[0] = Rgba {
            a: 0,
            ..file_colors[255]
        };
        Palette { colors }
    }

    /// The inverse of [`Palette::rotated_from_file`]: file-order colors for
    /// an RGBA chunk, with file entry `i` holding runtime entry `i + 1`.
    pub(crate) fn rotated_for_file(&self) -> [Rgba; 256] {
        let mut file_colors = [Rgba::default(); 256];
        for (i, out) in file_colors.iter_mut().enumerate() {
            *out = self.colors[(i + 1) & 255];
        }
        file_colors
    }
}

impl Default for Palette {
    /// The default MagicaVoxel palette, in runtime order.
    fn default() -> Self {
        Palette::rotated_from_file(&DEFAULT_FILE_PALETTE)
    }
}

/// The palette MagicaVoxel uses when a file stores none, in file order.
///
/// The layout is a 6-level RGB cube (levels descending from `0xff` to `0x00`,
/// blue fastest) with its trailing black dropped, followed by 10-step pure
/// red, green, blue, and gray ramps, and a final black.
pub(crate) const DEFAULT_FILE_PALETTE: [Rgba; 256] = {
    const LEVELS: [u8; 6] = [0xff, 0xcc, 0x99, 0x66, 0x33, 0x00];
    const RAMP: [u8; 10] = [0xee, 0xdd, 0xbb, 0xaa, 0x88, 0x77, 0x55, 0x44, 0x22, 0x11];

    let mut colors = [Rgba::new(0, 0, 0, 0xff); 256];
    let mut i = 0;
    while i < 215 {
        colors[i] = Rgba::new(LEVELS[i / 36], LEVELS[(i / 6) % 6], LEVELS[i % 6], 0xff);
        i += 1;
    }
    let mut s = 0;
    while s < 10 {
        colors[215 + s] = Rgba::new(RAMP[s], 0, 0, 0xff);
        colors[225 + s] = Rgba::new(0, RAMP[s], 0, 0xff);
        colors[235 + s] = Rgba::new(0, 0, RAMP[s], 0xff);
        colors[245 + s] = Rgba::new(RAMP[s], RAMP[s], RAMP[s], 0xff);
        s += 1;
    }
    // colors[255] stays black.
    colors
};

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_file_palette_spot_checks() {
        assert_eq!(DEFAULT_FILE_PALETTE[0], Rgba::new(0xff, 0xff, 0xff, 0xff));
        assert_eq!(DEFAULT_FILE_PALETTE[1], Rgba::new(0xff, 0xff, 0xcc, 0xff));
        assert_eq!(DEFAULT_FILE_PALETTE[6], Rgba::new(0xff, 0xcc, 0xff, 0xff));
        assert_eq!(DEFAULT_FILE_PALETTE[214], Rgba::new(0x00, 0x00, 0x33, 0xff));
        assert_eq!(DEFAULT_FILE_PALETTE[215], Rgba::new(0xee, 0x00, 0x00, 0xff));
        assert_eq!(DEFAULT_FILE_PALETTE[254], Rgba::new(0x11, 0x11, 0x11, 0xff));
        assert_eq!(DEFAULT_FILE_PALETTE[255], Rgba::new(0x00, 0x00, 0x00, 0xff));
    }

    #[test]
    fn rotations_are_inverses() {
        let palette = Palette::default();
        assert_eq!(palette.colors[0].a, 0);
        assert_eq!(
            Palette::rotated_from_file(&palette.rotated_for_file()),
            palette
        );
        // Runtime entry 1 is the file's first color.
        assert_eq!(palette.colors[1], DEFAULT_FILE_PALETTE[0]);
    }

    #[test]
    fn rgb_distance_ignores_alpha() {
        let red = Rgba::new(255, 0, 0, 255);
        let translucent_red = Rgba::new(255, 0, 0, 7);
        assert_eq!(red.distance_squared_rgb(translucent_red), 0);
        assert_eq!(
            red.distance_squared_rgb(Rgba::new(250, 0, 10, 255)),
            25 + 100
        );
    }
}
