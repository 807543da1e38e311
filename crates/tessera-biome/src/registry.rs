//! Biome registry: maps [`BiomeId`] to [`BiomeDef`] with name-based lookup.

use hashbrown::HashMap;

/// Unique identifier for a biome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

/// Descriptor for a biome type as seen by the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeDef {
    /// Human-readable biome name (e.g., "plains").
    pub name: String,
    /// Grass tint as packed `0xRRGGBB`.
    pub grass_color: u32,
    /// Foliage tint as packed `0xRRGGBB`.
    pub foliage_color: u32,
    /// Water tint as packed `0xRRGGBB`.
    pub water_color: u32,
}

impl BiomeDef {
    /// Creates a definition with the given name and tints.
    pub fn new(name: impl Into<String>, grass_color: u32, foliage_color: u32, water_color: u32) -> Self {
        Self {
            name: name.into(),
            grass_color,
            foliage_color,
            water_color,
        }
    }
}

/// Errors that can occur when registering biomes.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRegistryError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// The registry has handed out every available ID.
    #[error("biome registry is full ({0} entries)")]
    Full(usize),
}

/// Stores all registered biome definitions with O(1) lookup by ID.
///
/// Owned by whoever drives the renderer and passed to consumers explicitly.
#[derive(Clone, Debug)]
pub struct BiomeRegistry {
    biomes: Vec<BiomeDef>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Creates a registry preloaded with a small set of common biomes.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for def in [
            BiomeDef::new("plains", 0x91BD59, 0x77AB2F, 0x3F76E4),
            BiomeDef::new("forest", 0x79C05A, 0x59AE30, 0x3F76E4),
            BiomeDef::new("desert", 0xBFB755, 0xAEA42A, 0x3F76E4),
            BiomeDef::new("taiga", 0x86B783, 0x68A464, 0x287082),
            BiomeDef::new("ocean", 0x8EB971, 0x71A74D, 0x3F76E4),
        ] {
            // Names above are distinct and the registry starts empty.
            let _ = registry.register(def);
        }
        registry
    }

    /// Registers a new biome definition, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRegistryError::DuplicateName`] if a biome with the same name exists,
    /// or [`BiomeRegistryError::Full`] once all `u16` IDs are taken.
    pub fn register(&mut self, def: BiomeDef) -> Result<BiomeId, BiomeRegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(BiomeRegistryError::DuplicateName(def.name));
        }
        let id = u16::try_from(self.biomes.len())
            .map(BiomeId)
            .map_err(|_| BiomeRegistryError::Full(self.biomes.len()))?;
        self.name_to_id.insert(def.name.clone(), id);
        self.biomes.push(def);
        Ok(id)
    }

    /// Returns the definition for the given biome ID, if registered.
    pub fn get(&self, id: BiomeId) -> Option<&BiomeDef> {
        self.biomes.get(id.0 as usize)
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Iterates over all registered biomes in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &BiomeDef)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, def)| (BiomeId(i as u16), def))
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut reg = BiomeRegistry::new();
        let a = reg
            .register(BiomeDef::new("a", 0x111111, 0x222222, 0x333333))
            .unwrap();
        let b = reg
            .register(BiomeDef::new("b", 0x444444, 0x555555, 0x666666))
            .unwrap();
        assert_eq!(a, BiomeId(0));
        assert_eq!(b, BiomeId(1));
        assert_eq!(reg.get(b).unwrap().foliage_color, 0x555555);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut reg = BiomeRegistry::new();
        reg.register(BiomeDef::new("desert", 0, 0, 0)).unwrap();
        let result = reg.register(BiomeDef::new("desert", 1, 1, 1));
        assert!(matches!(result, Err(BiomeRegistryError::DuplicateName(name)) if name == "desert"));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_defaults_contain_expected() {
        let reg = BiomeRegistry::with_defaults();
        assert_eq!(reg.len(), 5);
        for name in ["plains", "forest", "desert", "taiga", "ocean"] {
            assert!(reg.lookup_by_name(name).is_some(), "missing {name}");
        }
        assert!(reg.lookup_by_name("nether").is_none());
    }

    #[test]
    fn test_unknown_id_is_none() {
        let reg = BiomeRegistry::with_defaults();
        assert!(reg.get(BiomeId(999)).is_none());
    }

    #[test]
    fn test_iter_matches_ids() {
        let reg = BiomeRegistry::with_defaults();
        for (id, def) in reg.iter() {
            assert_eq!(reg.lookup_by_name(&def.name), Some(id));
        }
        assert!(!reg.is_empty());
    }
}
