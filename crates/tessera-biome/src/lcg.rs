//! Linear congruential seed mixing used to derive per-cell biome jitter.
//!
//! The recurrence is pinned: renderers that disagree on a single bit produce
//! visibly different biome borders, so values are tested against fixed
//! reference outputs.

/// Multiplier of the mixing recurrence.
pub const MULTIPLIER: i64 = 6_364_136_223_846_793_005;

/// Increment of the mixing recurrence.
pub const INCREMENT: i64 = 1_442_695_040_888_963_407;

/// Advances `seed` by one step of the mixing recurrence, folding in `salt`.
///
/// Computes `seed * (seed * MULTIPLIER + INCREMENT) + salt` with two's
/// complement wrapping on every operation.
#[inline]
pub const fn next(seed: i64, salt: i64) -> i64 {
    seed.wrapping_mul(seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT))
        .wrapping_add(salt)
}

/// Folds a world cell coordinate into `seed`, X then Y then Z.
#[inline]
pub const fn fold_cell(seed: i64, x: i32, y: i32, z: i32) -> i64 {
    next(next(next(seed, x as i64), y as i64), z as i64)
}
