//! Biome slice: a frozen snapshot of the biome field around one render region.
//!
//! A slice covers the 3×3×3 sections around a center section at biome-cell
//! resolution (12³ cells). It is rebuilt once per region update and then
//! answers point queries read-only. Queries resolve through a Voronoi search
//! over jittered cell centers, short-circuited for cells whose whole 3×3×3
//! neighborhood holds one biome.

use std::fmt;

use glam::IVec3;

use crate::bias::{self, CellBias};
use crate::lcg;
use crate::section::{
    NEIGHBORHOOD_SIZE, SECTION_BLOCKS, SECTION_CELLS, SectionBiomeSource, SectionNeighborhood,
};
use crate::BiomeId;

/// Cells along one axis of a slice.
pub const SLICE_SIZE: i32 = NEIGHBORHOOD_SIZE * SECTION_CELLS;

/// Number of cells in a slice.
pub const SLICE_VOLUME: usize = (SLICE_SIZE * SLICE_SIZE * SLICE_SIZE) as usize;

/// Cells that receive a bias: the slice minus its outermost layer.
const BIAS_RANGE: std::ops::Range<i32> = 1..SLICE_SIZE - 1;

/// Cells whose uniformity is tracked: every neighbor of these exists inside the slice.
const UNIFORM_RANGE: std::ops::Range<i32> = 2..SLICE_SIZE - 2;

/// Half a cell in blocks. Cell centers sit this far from the cell corner.
const HALF_CELL: i32 = 2;

/// Index of a cell, ZYX-major: `x * 144 + y * 12 + z`.
///
/// Shared by all three per-cell arrays.
#[inline]
fn cell_index(x: i32, y: i32, z: i32) -> usize {
    debug_assert!(
        (0..SLICE_SIZE).contains(&x) && (0..SLICE_SIZE).contains(&y) && (0..SLICE_SIZE).contains(&z),
        "cell ({x}, {y}, {z}) lies outside the slice"
    );
    (x * SLICE_SIZE * SLICE_SIZE + y * SLICE_SIZE + z) as usize
}

/// Block coordinate to cell coordinate.
#[inline]
const fn quart(block: i32) -> i32 {
    block >> 2
}

/// Position of a block inside its cell, in `0..4`.
#[inline]
const fn quart_local(block: i32) -> i32 {
    block & 3
}

#[inline]
fn square(v: f32) -> f32 {
    v * v
}

/// Snapshot of the biome field around a render region.
///
/// All storage is allocated by [`BiomeSlice::new`] and reused by every
/// [`BiomeSlice::update`].
#[derive(Clone, PartialEq)]
pub struct BiomeSlice {
    biomes: Box<[Option<BiomeId>]>,
    uniform: Box<[bool]>,
    bias: Box<[CellBias]>,
    biome_seed: i64,
    origin: IVec3,
    is_3d: bool,
}

impl BiomeSlice {
    /// Creates an empty slice. With `is_3d == false` the queried Y is ignored.
    pub fn new(is_3d: bool) -> Self {
        Self {
            biomes: vec![None; SLICE_VOLUME].into_boxed_slice(),
            uniform: vec![false; SLICE_VOLUME].into_boxed_slice(),
            bias: vec![CellBias::ZERO; SLICE_VOLUME].into_boxed_slice(),
            biome_seed: 0,
            origin: IVec3::ZERO,
            is_3d,
        }
    }

    /// Creates a slice and immediately builds it from `neighborhood`.
    pub fn build<S: SectionBiomeSource>(
        neighborhood: &SectionNeighborhood<S>,
        biome_seed: i64,
        is_3d: bool,
    ) -> Self {
        let mut slice = Self::new(is_3d);
        slice.update(neighborhood, biome_seed);
        slice
    }

    /// Rebuilds the slice around the neighborhood's center section.
    ///
    /// Copies the biome cells, then derives the bias field, then the
    /// uniformity field. Both derived passes read the fully copied biomes.
    pub fn update<S: SectionBiomeSource>(
        &mut self,
        neighborhood: &SectionNeighborhood<S>,
        biome_seed: i64,
    ) {
        let min = neighborhood.center().min_block();
        self.origin = IVec3::new(
            min.x - SECTION_BLOCKS,
            (if self.is_3d { min.y } else { 0 }) - SECTION_BLOCKS,
            min.z - SECTION_BLOCKS,
        );
        self.biome_seed = biome_seed;

        self.copy_biome_data(neighborhood);
        self.calculate_bias();
        self.calculate_uniform();

        tracing::trace!(
            origin = ?self.origin,
            is_3d = self.is_3d,
            "rebuilt biome slice"
        );
    }

    fn copy_biome_data<S: SectionBiomeSource>(&mut self, neighborhood: &SectionNeighborhood<S>) {
        // The origin is section aligned, so this division is exact.
        let quart_y = self.origin.y / 4;
        let mut missing = 0;

        for section_x in 0..NEIGHBORHOOD_SIZE {
            for section_y in 0..NEIGHBORHOOD_SIZE {
                for section_z in 0..NEIGHBORHOOD_SIZE {
                    let section = neighborhood.section(section_x, section_y, section_z);
                    if section.is_none() {
                        missing += 1;
                    }

                    for x in 0..SECTION_CELLS {
                        for y in 0..SECTION_CELLS {
                            for z in 0..SECTION_CELLS {
                                let idx = cell_index(
                                    section_x * SECTION_CELLS + x,
                                    section_y * SECTION_CELLS + y,
                                    section_z * SECTION_CELLS + z,
                                );
                                let source_y = y + section_y * SECTION_CELLS + quart_y;
                                self.biomes[idx] = section.map(|s| s.biome(x, source_y, z));
                            }
                        }
                    }
                }
            }
        }

        if missing > 0 {
            tracing::debug!(
                missing,
                center = ?neighborhood.center(),
                "biome slice built with missing sections"
            );
        }
    }

    fn calculate_bias(&mut self) {
        let offset_x = quart(self.origin.x);
        let offset_y = quart(self.origin.y);
        let offset_z = quart(self.origin.z);

        let seed = self.biome_seed;

        for cell_x in BIAS_RANGE {
            let world_x = offset_x + cell_x;
            let seed_x = lcg::next(seed, world_x as i64);

            for cell_y in BIAS_RANGE {
                let world_y = offset_y + cell_y;
                let seed_xy = lcg::next(seed_x, world_y as i64);

                for cell_z in BIAS_RANGE {
                    let world_z = offset_z + cell_z;
                    let seed_xyz = lcg::next(seed_xy, world_z as i64);

                    self.bias[cell_index(cell_x, cell_y, cell_z)] =
                        bias::finish_cell_bias(seed_xyz, world_x, world_y, world_z, seed);
                }
            }
        }
    }

    fn calculate_uniform(&mut self) {
        for x in UNIFORM_RANGE {
            for y in UNIFORM_RANGE {
                for z in UNIFORM_RANGE {
                    self.uniform[cell_index(x, y, z)] = self.has_uniform_neighbors(x, y, z);
                }
            }
        }
    }

    fn has_uniform_neighbors(&self, x: i32, y: i32, z: i32) -> bool {
        let biome = self.biomes[cell_index(x, y, z)];

        for adj_x in x - 1..=x + 1 {
            for adj_y in y - 1..=y + 1 {
                for adj_z in z - 1..=z + 1 {
                    if self.biomes[cell_index(adj_x, adj_y, adj_z)] != biome {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Returns the biome at block `(x, y, z)`.
    ///
    /// The block must lie in the region covered by the center section and its
    /// immediate surroundings; debug builds assert this.
    pub fn biome(&self, x: i32, y: i32, z: i32) -> Option<BiomeId> {
        let rel = self.relative(x, y, z);

        let center = cell_index(
            quart(rel.x - HALF_CELL),
            quart(rel.y - HALF_CELL),
            quart(rel.z - HALF_CELL),
        );

        if self.uniform[center] {
            return self.biomes[center];
        }

        self.biome_using_voronoi(rel)
    }

    /// Returns the biome at block `(x, y, z)` without the uniformity shortcut.
    pub fn biome_voronoi(&self, x: i32, y: i32, z: i32) -> Option<BiomeId> {
        self.biome_using_voronoi(self.relative(x, y, z))
    }

    /// Returns `true` if a query at block `(x, y, z)` takes the O(1) path.
    pub fn is_uniform_at(&self, x: i32, y: i32, z: i32) -> bool {
        let rel = self.relative(x, y, z);
        self.uniform[cell_index(
            quart(rel.x - HALF_CELL),
            quart(rel.y - HALF_CELL),
            quart(rel.z - HALF_CELL),
        )]
    }

    #[inline]
    fn relative(&self, x: i32, y: i32, z: i32) -> IVec3 {
        let y = if self.is_3d { y } else { 0 };
        IVec3::new(x, y, z) - self.origin
    }

    fn biome_using_voronoi(&self, rel: IVec3) -> Option<BiomeId> {
        let x = rel.x - HALF_CELL;
        let y = rel.y - HALF_CELL;
        let z = rel.z - HALF_CELL;

        let int_x = quart(x);
        let int_y = quart(y);
        let int_z = quart(z);

        let frac_x = quart_local(x) as f32 * 0.25;
        let frac_y = quart_local(y) as f32 * 0.25;
        let frac_z = quart_local(z) as f32 * 0.25;

        let mut closest_distance = f32::INFINITY;
        let mut closest_index = 0;

        // Candidates are the 8 corners of the enclosing cell cube, ordered by
        // bit2 = X, bit1 = Y, bit0 = Z. Strict comparison keeps the first on ties.
        for index in 0..8 {
            let dir_x = (index & 4) != 0;
            let dir_y = (index & 2) != 0;
            let dir_z = (index & 1) != 0;

            let cell = cell_index(
                int_x + dir_x as i32,
                int_y + dir_y as i32,
                int_z + dir_z as i32,
            );

            let adj_frac_x = frac_x - if dir_x { 1.0 } else { 0.0 };
            let adj_frac_y = frac_y - if dir_y { 1.0 } else { 0.0 };
            let adj_frac_z = frac_z - if dir_z { 1.0 } else { 0.0 };

            let [bias_x, bias_y, bias_z] = self.bias[cell].offsets();

            let distance = square(adj_frac_x + bias_x)
                + square(adj_frac_y + bias_y)
                + square(adj_frac_z + bias_z);

            if closest_distance > distance {
                closest_index = cell;
                closest_distance = distance;
            }
        }

        self.biomes[closest_index]
    }

    /// Block coordinate of cell `(0, 0, 0)`.
    pub fn origin(&self) -> IVec3 {
        self.origin
    }

    /// Seed the bias field was derived from.
    pub fn biome_seed(&self) -> i64 {
        self.biome_seed
    }

    /// Whether queries honor Y.
    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    /// Biome stored for slice cell `(x, y, z)`, each in `0..12`.
    pub fn cell_biome(&self, x: i32, y: i32, z: i32) -> Option<BiomeId> {
        self.biomes[cell_index(x, y, z)]
    }

    /// Whether slice cell `(x, y, z)` is uniform. Always `false` outside `2..10`.
    pub fn cell_uniform(&self, x: i32, y: i32, z: i32) -> bool {
        self.uniform[cell_index(x, y, z)]
    }

    /// Bias of slice cell `(x, y, z)`. Zero on the outermost layer.
    pub fn cell_bias(&self, x: i32, y: i32, z: i32) -> CellBias {
        self.bias[cell_index(x, y, z)]
    }

    /// Fraction of tracked interior cells that are uniform.
    pub fn uniform_ratio(&self) -> f32 {
        let tracked = UNIFORM_RANGE.len().pow(3);
        let uniform = self.uniform.iter().filter(|&&u| u).count();
        uniform as f32 / tracked as f32
    }
}

impl fmt::Debug for BiomeSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiomeSlice")
            .field("origin", &self.origin)
            .field("biome_seed", &self.biome_seed)
            .field("is_3d", &self.is_3d)
            .field("uniform_ratio", &self.uniform_ratio())
            .finish_non_exhaustive()
    }
}
