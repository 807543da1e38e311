//! Biome sampling for chunk rendering: per-region biome slices with a
//! seeded Voronoi lookup, a biome registry, and background slice rebuilds.
//!
//! A renderer snapshots the 3×3×3 chunk sections around a render region,
//! builds a [`BiomeSlice`] from them, and then queries it per block while
//! meshing.

mod async_build;
mod registry;
mod section;
mod slice;

pub mod bias;
pub mod lcg;

pub use async_build::{AsyncSliceBuilder, BuiltSlice, SliceTask, SubmitError};
pub use bias::CellBias;
pub use registry::{BiomeDef, BiomeId, BiomeRegistry, BiomeRegistryError};
pub use section::{
    NEIGHBORHOOD_VOLUME, SECTION_BLOCKS, SECTION_CELLS, SectionBiomeSource, SectionBiomes,
    SectionNeighborhood, SectionPos, local_section_index,
};
pub use slice::{BiomeSlice, SLICE_SIZE, SLICE_VOLUME};
