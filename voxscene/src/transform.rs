//! The 4×4 column-major transform used for instance and group placement,
//! and the packed-rotation byte codec used by `nTRN` frame dictionaries.

use std::fmt;

/// A 4×4 column-major homogeneous transform.
///
/// Column 3 carries the translation; the last row is always `(0, 0, 0, 1)`.
/// Rotations that come from (or go to) a `.vox` file are restricted to the
/// 24 signed axis permutations — see [`Transform::from_packed_rotation`] and
/// [`Transform::packed_rotation`] — but in memory any matrix may be held.
#[derive(Clone, Copy, PartialEq)]
pub struct Transform {
    /// Matrix entries: `cols[c][r]` is column `c`, row `r`.
    pub cols: [[f32; 4]; 4],
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Transform = Transform {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// The packed-rotation byte that encodes the identity rotation.
    pub const IDENTITY_ROTATION_BITS: u8 = 0x04;

    /// A pure translation.
    pub fn from_translation(t: [f32; 3]) -> Transform {
        let mut m = Transform::IDENTITY;
        m.cols[3][0] = t[0];
        m.cols[3][1] = t[1];
        m.cols[3][2] = t[2];
        m
    }

    /// The translation column.
    pub fn translation(&self) -> [f32; 3] {
        [self.cols[3][0], self.cols[3][1], self.cols[3][2]]
    }

    /// Replace the translation column, leaving the rotation part alone.
    pub fn set_translation(&mut self, t: [f32; 3]) {
        self.cols[3][0] = t[0];
        self.cols[3][1] = t[1];
        self.cols[3][2] = t[2];
    }

    /// Compose two transforms so that `self` applies first and `outer`
    /// second: the result maps `v` to `outer * (self * v)`.
    ///
    /// Scene-graph flattening composes a node's local transform with the
    /// world transform accumulated above it as `local.then(world)`.
    #[must_use]
    pub fn then(&self, outer: &Transform) -> Transform {
        let mut result = [[0.0f32; 4]; 4];
        for (c, col) in result.iter_mut().enumerate() {
            for (r, entry) in col.iter_mut().enumerate() {
                *entry = (0..4).map(|k| outer.cols[k][r] * self.cols[c][k]).sum();
            }
        }
        Transform { cols: result }
    }

    /// Decode a packed-rotation byte into a pure rotation transform.
    ///
    /// The encoding (one of 24 signed axis permutations):
    /// - bits 0–1: column index of the nonzero entry in row 0,
    /// - bits 2–3: column index of the nonzero entry in row 1 (must differ),
    /// - bits 4/5/6: sign of the nonzero entry in rows 0/1/2.
    ///
    /// Row 2's column falls out by elimination. Returns [`None`] when either
    /// column index is 3 or the two indices coincide (no such rotation
    /// exists), or when bit 7 is set.
    pub fn from_packed_rotation(bits: u8) -> Option<Transform> {
        if bits & 0x80 != 0 {
            return None;
        }
        let row0_col = usize::from(bits & 3);
        let row1_col = usize::from((bits >> 2) & 3);
        if row0_col == 3 || row1_col == 3 || row0_col == row1_col {
            return None;
        }
        let row2_col = 3 - row0_col - row1_col;

        let mut m = Transform {
            cols: [[0.0; 4], [0.0; 4], [0.0; 4], [0.0, 0.0, 0.0, 1.0]],
        };
        let sign = |bit: u8| if bits & (1 << bit) != 0 { -1.0 } else { 1.0 };
        m.cols[row0_col][0] = sign(4);
        m.cols[row1_col][1] = sign(5);
        m.cols[row2_col][2] = sign(6);
        Some(m)
    }

    /// Encode this transform's rotation part as a packed-rotation byte.
    ///
    /// Returns [`None`] unless every row of the upper-left 3×3 is a unit
    /// vector exactly aligned on one cardinal axis and the three rows cover
    /// all three axes. Translation and the rest of the matrix are ignored.
    pub fn packed_rotation(&self) -> Option<u8> {
        let row_bits = |r: usize| -> Option<(u8, bool)> {
            let mut found: Option<(u8, bool)> = None;
            for c in 0..3 {
                let entry = self.cols[c][r];
                if entry == 0.0 {
                    continue;
                }
                if (entry != 1.0 && entry != -1.0) || found.is_some() {
                    return None;
                }
                found = Some((c as u8, entry < 0.0));
            }
            found
        };
        let (row0_col, row0_neg) = row_bits(0)?;
        let (row1_col, row1_neg) = row_bits(1)?;
        let (row2_col, row2_neg) = row_bits(2)?;
        if (1 << row0_col) | (1 << row1_col) | (1 << row2_col) != 0b111u32 {
            return None;
        }
        Some(
            row0_col
                | (row1_col << 2)
                | (u8::from(row0_neg) << 4)
                | (u8::from(row1_neg) << 5)
                | (u8::from(row2_neg) << 6),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // One row per line regardless of prettyprinting, since the
        // column-major storage order is unreadable as a flat list.
        write!(f, "Transform[")?;
        for r in 0..4 {
            write!(
                f,
                "{}({} {} {} {})",
                if r == 0 { "" } else { ", " },
                self.cols[0][r],
                self.cols[1][r],
                self.cols[2][r],
                self.cols[3][r],
            )?;
        }
        write!(f, "]")
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// All byte values the packed-rotation codec accepts.
    fn valid_codes() -> impl Iterator<Item = u8> {
        (0u8..0x80).filter(|bits| {
            let r0 = bits & 3;
            let r1 = (bits >> 2) & 3;
            r0 != 3 && r1 != 3 && r0 != r1
        })
    }

    #[test]
    fn identity_rotation_code() {
        assert_eq!(
            Transform::from_packed_rotation(Transform::IDENTITY_ROTATION_BITS).unwrap(),
            Transform::IDENTITY
        );
        assert_eq!(
            Transform::IDENTITY.packed_rotation(),
            Some(Transform::IDENTITY_ROTATION_BITS)
        );
    }

    #[test]
    fn pack_unpack_round_trips_every_valid_code() {
        let mut count = 0;
        for bits in valid_codes() {
            let m = Transform::from_packed_rotation(bits).unwrap();
            assert_eq!(m.packed_rotation(), Some(bits), "code {bits:#04x}");
            count += 1;
        }
        // 6 axis permutations × 8 sign combinations. (The 24 proper
        // rotations are the half of these with determinant +1; the file
        // format encodes reflections just as well.)
        assert_eq!(count, 6 * 8);
    }

    #[test]
    fn unpack_pack_round_trips_all_permutation_matrices() {
        for bits in valid_codes() {
            let m = Transform::from_packed_rotation(bits).unwrap();
            let packed = m.packed_rotation().unwrap();
            assert_eq!(Transform::from_packed_rotation(packed).unwrap(), m);
        }
    }

    #[test]
    fn invalid_codes_rejected() {
        // 0x00/0x05/0x0a have coinciding row indices; 0x03/0x0f use
        // index 3; 0x84 sets bit 7.
        for bits in [0x00u8, 0x03, 0x05, 0x0a, 0x0f, 0x84] {
            assert_eq!(Transform::from_packed_rotation(bits), None, "{bits:#04x}");
        }
    }

    #[test]
    fn pack_rejects_non_axis_aligned() {
        let mut m = Transform::IDENTITY;
        m.cols[0][0] = 0.5;
        assert_eq!(m.packed_rotation(), None);

        // Two rows on the same axis.
        let mut m = Transform::IDENTITY;
        m.cols[1][1] = 0.0;
        m.cols[0][1] = 1.0;
        assert_eq!(m.packed_rotation(), None);
    }

    #[test]
    fn composition_is_child_first() {
        let rot = Transform::from_packed_rotation(17).unwrap();
        let shift = Transform::from_translation([10.0, 0.0, 0.0]);

        // Rotate first, then translate: translation is unaffected.
        let m = rot.then(&shift);
        assert_eq!(m.translation(), [10.0, 0.0, 0.0]);
        assert_eq!(m.cols[0][..3], [0.0, 1.0, 0.0]);
        assert_eq!(m.cols[1][..3], [-1.0, 0.0, 0.0]);

        // Translate first, then rotate: the offset is rotated too.
        let m = shift.then(&rot);
        assert_eq!(m.translation(), [0.0, 10.0, 0.0]);
    }

    /// `_r = 17` sets row 0 to −Y, row 1 to +X, and row 2 to +Z by
    /// elimination; the file stores rows, so the columns are the transpose.
    #[test]
    fn example_rotation_17() {
        let m = Transform::from_packed_rotation(17).unwrap();
        assert_eq!(m.cols[0][..3], [0.0, 1.0, 0.0]);
        assert_eq!(m.cols[1][..3], [-1.0, 0.0, 0.0]);
        assert_eq!(m.cols[2][..3], [0.0, 0.0, 1.0]);
    }
}
