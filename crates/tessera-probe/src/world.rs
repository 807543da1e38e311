//! A synthetic banded world standing in for the host's chunk storage.

use std::sync::Arc;

use tessera_biome::{
    BiomeId, BiomeRegistry, SECTION_CELLS, SectionBiomes, SectionNeighborhood, SectionPos,
};

/// Diagonal biome bands, `BAND_WIDTH` cells wide, cycling through the registry.
///
/// Below quart Y 0 everything is ocean, so 3D sampling shows a floor.
pub struct BandedWorld {
    bands: Vec<BiomeId>,
    ocean: BiomeId,
}

const BAND_WIDTH: i32 = 5;

impl BandedWorld {
    /// Uses every registered biome except "ocean" as a band.
    ///
    /// Returns `None` if the registry has no ocean or no other biome.
    pub fn new(registry: &BiomeRegistry) -> Option<Self> {
        let ocean = registry.lookup_by_name("ocean")?;
        let bands: Vec<_> = registry
            .iter()
            .map(|(id, _)| id)
            .filter(|&id| id != ocean)
            .collect();
        (!bands.is_empty()).then_some(Self { bands, ocean })
    }

    /// Biome of the world cell at quart coordinates.
    pub fn biome_at(&self, qx: i32, qy: i32, qz: i32) -> BiomeId {
        if qy < 0 {
            return self.ocean;
        }
        let band = (qx + qz / 2).div_euclid(BAND_WIDTH);
        self.bands[band.rem_euclid(self.bands.len() as i32) as usize]
    }

    /// Clones the cells of one section.
    pub fn section(&self, pos: SectionPos) -> SectionBiomes {
        SectionBiomes::from_fn(|x, y, z| {
            self.biome_at(
                pos.x * SECTION_CELLS + x,
                pos.y * SECTION_CELLS + y,
                pos.z * SECTION_CELLS + z,
            )
        })
    }

    /// Snapshots the 27 sections around `center`.
    pub fn neighborhood(&self, center: SectionPos) -> SectionNeighborhood<Arc<SectionBiomes>> {
        SectionNeighborhood::from_fn(center, |dx, dy, dz| {
            Some(Arc::new(self.section(center.offset(dx - 1, dy - 1, dz - 1))))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_biome::{BiomeSlice, SectionBiomeSource};

    #[test]
    fn test_requires_ocean() {
        assert!(BandedWorld::new(&BiomeRegistry::new()).is_none());
        assert!(BandedWorld::new(&BiomeRegistry::with_defaults()).is_some());
    }

    #[test]
    fn test_bands_cycle() {
        let registry = BiomeRegistry::with_defaults();
        let world = BandedWorld::new(&registry).unwrap();
        assert_eq!(world.biome_at(0, 0, 0), world.biome_at(4, 0, 0));
        assert_ne!(world.biome_at(0, 0, 0), world.biome_at(5, 0, 0));
        assert_eq!(world.biome_at(0, 0, 0), world.biome_at(20, 0, 0));
        assert_eq!(world.biome_at(3, -1, 3), registry.lookup_by_name("ocean").unwrap());
    }

    #[test]
    fn test_section_matches_world() {
        let world = BandedWorld::new(&BiomeRegistry::with_defaults()).unwrap();
        let pos = SectionPos::new(-2, 1, 3);
        let section = world.section(pos);
        for x in 0..4 {
            for z in 0..4 {
                assert_eq!(
                    section.biome(x, 2, z),
                    world.biome_at(pos.x * 4 + x, pos.y * 4 + 2, pos.z * 4 + z)
                );
            }
        }
    }

    #[test]
    fn test_slice_reproduces_uniform_band_interior() {
        let world = BandedWorld::new(&BiomeRegistry::with_defaults()).unwrap();
        let center = SectionPos::new(0, 2, 0);
        let slice = BiomeSlice::build(&world.neighborhood(center), 1, true);

        // Every uniform query must agree with the cell it sits in.
        let min = center.min_block();
        for x in 0..16 {
            for z in 0..16 {
                let (bx, by, bz) = (min.x + x, min.y + 8, min.z + z);
                if slice.is_uniform_at(bx, by, bz) {
                    let expected = world.biome_at((bx - 2) >> 2, (by - 2) >> 2, (bz - 2) >> 2);
                    assert_eq!(slice.biome(bx, by, bz), Some(expected));
                }
            }
        }
    }
}
