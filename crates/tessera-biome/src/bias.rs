//! Per-cell Voronoi jitter derived from the world biome seed.
//!
//! Each biome cell's center is displaced by a small, deterministic offset per
//! axis so region borders come out irregular instead of following the grid.

use crate::lcg;

/// Number of bits taken from the mixed seed for one bias component.
const BIAS_MASK: i64 = 1023;

/// Bit position of the bias component within the mixed seed.
const BIAS_SHIFT: u32 = 24;

/// Signed jitter of one biome cell, one component per axis in `[-512, 511]`.
///
/// The three components are stored next to each other so the Voronoi search
/// touches a single cache line per candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellBias {
    /// Jitter along X.
    pub x: i16,
    /// Jitter along Y.
    pub y: i16,
    /// Jitter along Z.
    pub z: i16,
}

impl CellBias {
    /// Zero jitter. Border cells of a slice keep this value.
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Converts all three components into cell-width offsets.
    #[inline]
    pub fn offsets(self) -> [f32; 3] {
        [
            bias_to_offset(self.x),
            bias_to_offset(self.y),
            bias_to_offset(self.z),
        ]
    }
}

/// Converts a raw bias component into a displacement in cell widths.
///
/// The result lies in `[-0.45, 0.45)`, which keeps every perturbed center
/// strictly inside its own cell.
#[inline]
pub fn bias_to_offset(bias: i16) -> f32 {
    (bias as f32 * (1.0 / 1024.0)) * 0.9
}

/// Extracts one bias component from a mixed seed.
///
/// The seed has to be re-mixed before extracting the next component.
#[inline]
pub fn bias_from_seed(seed: i64) -> i16 {
    (((seed >> BIAS_SHIFT) & BIAS_MASK) - 512) as i16
}

/// Finishes the bias of a cell whose seed already has the world cell
/// coordinate folded in once.
///
/// The coordinate is folded a second time before extraction; both folds are
/// required to reproduce the reference field.
#[inline]
pub fn finish_cell_bias(cell_seed: i64, x: i32, y: i32, z: i32, biome_seed: i64) -> CellBias {
    let mut seed = lcg::fold_cell(cell_seed, x, y, z);

    let bias_x = bias_from_seed(seed);
    seed = lcg::next(seed, biome_seed);
    let bias_y = bias_from_seed(seed);
    seed = lcg::next(seed, biome_seed);
    let bias_z = bias_from_seed(seed);

    CellBias {
        x: bias_x,
        y: bias_y,
        z: bias_z,
    }
}

/// Computes the bias of the world cell `(x, y, z)` from scratch.
///
/// Slice rebuilds share the X and XY folds across their inner loops; this is
/// the equivalent per-cell form.
pub fn cell_bias(biome_seed: i64, x: i32, y: i32, z: i32) -> CellBias {
    let cell_seed = lcg::fold_cell(biome_seed, x, y, z);
    finish_cell_bias(cell_seed, x, y, z, biome_seed)
}
