//! Chunk-section biome sources and the 3×3×3 neighborhood a slice is built from.

use std::sync::Arc;

use glam::IVec3;

use crate::BiomeId;

/// Biome cells along one axis of a chunk section (one cell per 4 blocks).
pub const SECTION_CELLS: i32 = 4;

/// Blocks along one axis of a chunk section.
pub const SECTION_BLOCKS: i32 = 16;

/// Sections along one axis of a neighborhood.
pub const NEIGHBORHOOD_SIZE: i32 = 3;

/// Number of sections in a neighborhood.
pub const NEIGHBORHOOD_VOLUME: usize = 27;

/// Provides the biome of a chunk section at quarter-block resolution.
///
/// `x` and `z` are local to the section (`0..4`). `y` is the cell's absolute
/// quart Y, so sources that store a single section should reduce it with
/// `y & 3`; column sources (2D biomes) may ignore it.
pub trait SectionBiomeSource {
    /// Returns the biome of the cell at `(x, y, z)`.
    fn biome(&self, x: i32, y: i32, z: i32) -> BiomeId;
}

impl<T: SectionBiomeSource + ?Sized> SectionBiomeSource for &T {
    fn biome(&self, x: i32, y: i32, z: i32) -> BiomeId {
        (**self).biome(x, y, z)
    }
}

impl<T: SectionBiomeSource + ?Sized> SectionBiomeSource for Arc<T> {
    fn biome(&self, x: i32, y: i32, z: i32) -> BiomeId {
        (**self).biome(x, y, z)
    }
}

/// Position of a chunk section, in section units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SectionPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SectionPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Section containing the given block.
    pub const fn from_block(x: i32, y: i32, z: i32) -> Self {
        Self::new(x >> 4, y >> 4, z >> 4)
    }

    /// Smallest block coordinate inside the section.
    pub fn min_block(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z) * SECTION_BLOCKS
    }

    /// Section offset by `(dx, dy, dz)`.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// An owned copy of one section's 4×4×4 biome cells.
///
/// This is what a renderer clones off the world before handing a region to a
/// worker thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionBiomes {
    /// Cells in XYZ-major order, `(x * 4 + y) * 4 + z`.
    cells: [BiomeId; 64],
}

impl SectionBiomes {
    /// A section filled with a single biome.
    pub fn filled(biome: BiomeId) -> Self {
        Self { cells: [biome; 64] }
    }

    /// A section whose cells are produced by `f(x, y, z)` with local coordinates.
    pub fn from_fn(mut f: impl FnMut(i32, i32, i32) -> BiomeId) -> Self {
        let mut cells = [BiomeId(0); 64];
        for x in 0..SECTION_CELLS {
            for y in 0..SECTION_CELLS {
                for z in 0..SECTION_CELLS {
                    cells[Self::index(x, y, z)] = f(x, y, z);
                }
            }
        }
        Self { cells }
    }

    /// Overwrites one cell.
    pub fn set(&mut self, x: i32, y: i32, z: i32, biome: BiomeId) {
        self.cells[Self::index(x & 3, y & 3, z & 3)] = biome;
    }

    /// Returns `true` if every cell holds the same biome.
    pub fn is_single_biome(&self) -> bool {
        self.cells.iter().all(|&b| b == self.cells[0])
    }

    #[inline]
    fn index(x: i32, y: i32, z: i32) -> usize {
        ((x * SECTION_CELLS + y) * SECTION_CELLS + z) as usize
    }
}

impl SectionBiomeSource for SectionBiomes {
    #[inline]
    fn biome(&self, x: i32, y: i32, z: i32) -> BiomeId {
        self.cells[Self::index(x & 3, y & 3, z & 3)]
    }
}

/// Index of a section within a neighborhood, each axis in `0..3`.
#[inline]
pub const fn local_section_index(x: i32, y: i32, z: i32) -> usize {
    ((x * NEIGHBORHOOD_SIZE + y) * NEIGHBORHOOD_SIZE + z) as usize
}

/// The 3×3×3 block of sections surrounding `center`.
///
/// Absent sections (unloaded or outside the world) are `None`; the cells they
/// cover come out of a slice rebuild as `None` rather than failing it.
#[derive(Clone, Debug)]
pub struct SectionNeighborhood<S> {
    center: SectionPos,
    sections: [Option<S>; NEIGHBORHOOD_VOLUME],
}

impl<S> SectionNeighborhood<S> {
    /// A neighborhood with every section missing.
    pub fn empty(center: SectionPos) -> Self {
        Self {
            center,
            sections: std::array::from_fn(|_| None),
        }
    }

    /// Builds a neighborhood from `f(dx, dy, dz)`, each offset in `0..3`
    /// relative to the section at `center - 1`.
    pub fn from_fn(center: SectionPos, mut f: impl FnMut(i32, i32, i32) -> Option<S>) -> Self {
        let mut neighborhood = Self::empty(center);
        for x in 0..NEIGHBORHOOD_SIZE {
            for y in 0..NEIGHBORHOOD_SIZE {
                for z in 0..NEIGHBORHOOD_SIZE {
                    neighborhood.sections[local_section_index(x, y, z)] = f(x, y, z);
                }
            }
        }
        neighborhood
    }

    /// Position of the center section.
    pub fn center(&self) -> SectionPos {
        self.center
    }

    /// Section at local offset `(x, y, z)`, each in `0..3`.
    pub fn section(&self, x: i32, y: i32, z: i32) -> Option<&S> {
        self.sections[local_section_index(x, y, z)].as_ref()
    }

    /// Replaces the section at local offset `(x, y, z)`.
    pub fn set_section(&mut self, x: i32, y: i32, z: i32, section: Option<S>) {
        self.sections[local_section_index(x, y, z)] = section;
    }

    /// Number of sections present.
    pub fn present_count(&self) -> usize {
        self.sections.iter().filter(|s| s.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_pos_from_negative_block() {
        assert_eq!(SectionPos::from_block(-1, 0, 15), SectionPos::new(-1, 0, 0));
        assert_eq!(SectionPos::from_block(16, -17, 31), SectionPos::new(1, -2, 1));
        assert_eq!(SectionPos::new(-2, 3, 0).min_block(), IVec3::new(-32, 48, 0));
    }

    #[test]
    fn test_section_biomes_masks_absolute_y() {
        let section = SectionBiomes::from_fn(|_, y, _| BiomeId(y as u16));
        assert_eq!(section.biome(0, 1, 0), BiomeId(1));
        assert_eq!(section.biome(0, 5, 0), BiomeId(1));
        assert_eq!(section.biome(0, -3, 0), BiomeId(1));
        assert_eq!(section.biome(0, -4, 0), BiomeId(0));
    }

    #[test]
    fn test_section_set_and_single_biome() {
        let mut section = SectionBiomes::filled(BiomeId(3));
        assert!(section.is_single_biome());
        section.set(1, 2, 3, BiomeId(4));
        assert!(!section.is_single_biome());
        assert_eq!(section.biome(1, 2, 3), BiomeId(4));
    }

    #[test]
    fn test_neighborhood_indexing() {
        let n = SectionNeighborhood::from_fn(SectionPos::default(), |x, y, z| {
            Some(local_section_index(x, y, z))
        });
        assert_eq!(n.present_count(), NEIGHBORHOOD_VOLUME);
        assert_eq!(n.section(2, 1, 0), Some(&local_section_index(2, 1, 0)));
        assert_eq!(local_section_index(2, 2, 2), 26);
    }

    #[test]
    fn test_neighborhood_missing_sections() {
        let mut n: SectionNeighborhood<SectionBiomes> =
            SectionNeighborhood::empty(SectionPos::new(4, 0, -4));
        assert_eq!(n.present_count(), 0);
        n.set_section(1, 1, 1, Some(SectionBiomes::filled(BiomeId(1))));
        assert_eq!(n.present_count(), 1);
        assert!(n.section(0, 0, 0).is_none());
        assert_eq!(n.center(), SectionPos::new(4, 0, -4));
    }
}
