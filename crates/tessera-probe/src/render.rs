//! Text rendering of a sampled slice layer.

use tessera_biome::{BiomeRegistry, BiomeSlice, SECTION_BLOCKS, SectionPos};

/// Statistics over the center section of a slice.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QueryStats {
    /// Blocks sampled.
    pub queries: u32,
    /// Blocks answered by the uniform shortcut.
    pub uniform_hits: u32,
    /// Blocks whose biome was missing.
    pub missing: u32,
}

impl QueryStats {
    /// Share of queries answered without a Voronoi search.
    pub fn uniform_ratio(&self) -> f32 {
        if self.queries == 0 {
            0.0
        } else {
            self.uniform_hits as f32 / self.queries as f32
        }
    }
}

/// Samples every block of the center section.
pub fn center_stats(slice: &BiomeSlice, center: SectionPos) -> QueryStats {
    let min = center.min_block();
    let mut stats = QueryStats::default();
    for x in 0..SECTION_BLOCKS {
        for y in 0..SECTION_BLOCKS {
            for z in 0..SECTION_BLOCKS {
                let (bx, by, bz) = (min.x + x, min.y + y, min.z + z);
                stats.queries += 1;
                if slice.is_uniform_at(bx, by, bz) {
                    stats.uniform_hits += 1;
                }
                if slice.biome(bx, by, bz).is_none() {
                    stats.missing += 1;
                }
            }
        }
    }
    stats
}

/// One character per block of the center section at `layer_y`, rows along Z.
///
/// Biomes print as the first letter of their name; missing biomes as `?`.
pub fn layer_map(
    slice: &BiomeSlice,
    registry: &BiomeRegistry,
    center: SectionPos,
    layer_y: i32,
) -> String {
    let min = center.min_block();
    let y = min.y + layer_y.clamp(0, SECTION_BLOCKS - 1);
    let mut out = String::with_capacity((SECTION_BLOCKS * (SECTION_BLOCKS + 1)) as usize);

    for z in 0..SECTION_BLOCKS {
        for x in 0..SECTION_BLOCKS {
            let glyph = slice
                .biome(min.x + x, y, min.z + z)
                .and_then(|id| registry.get(id))
                .and_then(|def| def.name.chars().next())
                .unwrap_or('?');
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// Legend line listing each registered biome's glyph.
pub fn legend(registry: &BiomeRegistry) -> String {
    registry
        .iter()
        .filter_map(|(_, def)| def.name.chars().next().map(|c| format!("{c}={}", def.name)))
        .collect::<Vec<_>>()
        .join("  ")
}
