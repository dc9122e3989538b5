use std::path::Path;

use anyhow::Context;
use log::info;

use crate::{
    config::EngineConfig,
    error::{TerrainError, TerrainResult},
    height::HeightRange,
    terrain::{TerrainDefs, TerrainHandle, TerrainSet, TerrainTable, TerrainType},
};

/// Settings map operations need beyond the terrain lookups.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileSettings {
    pub tile_size: u32,
    pub height_scale: f32,
    pub heights: HeightRange,
    pub empty_terrain: TerrainHandle,
    /// Terrain used to fill fresh vertices.
    pub background_terrain: TerrainHandle,
}

/// Resource lookups the map needs. Implemented by [`TerrainEngine`]; editors
/// embedding the map in their own resource system implement it themselves.
pub trait TerrainResolver {
    fn terrain(&self, handle: TerrainHandle) -> Option<&TerrainType>;

    fn terrain_by_id(&self, id: &str) -> Option<TerrainHandle>;

    fn terrain_set_by_id(&self, id: &str) -> Option<&TerrainSet>;

    fn tile_settings(&self) -> TileSettings;
}

#[derive(Debug, Clone)]
pub struct TerrainEngine {
    config: EngineConfig,
    table: TerrainTable,
    background: TerrainHandle,
}

impl TerrainEngine {
    /// Builds the context. The table must have been created with the
    /// config's empty terrain id.
    pub fn new(config: EngineConfig, table: TerrainTable) -> TerrainResult<Self> {
        if table.handle(&config.empty_terrain) != Some(TerrainHandle::EMPTY) {
            return Err(TerrainError::UnknownTerrain(config.empty_terrain.clone()));
        }
        let background = match &config.background_terrain {
            Some(id) => {
                table.handle(id).ok_or_else(|| TerrainError::UnknownTerrain(id.clone()))?
            }
            None => TerrainHandle::EMPTY,
        };
        Ok(TerrainEngine { config, table, background })
    }

    pub fn from_defs(config: EngineConfig, defs: &TerrainDefs) -> TerrainResult<Self> {
        let table = TerrainTable::from_defs(defs, &config.empty_terrain)?;
        Self::new(config, table)
    }

    /// Loads the terrain definitions at `defs_path` and, if given, the config
    /// at `config_path`.
    pub fn load(config_path: Option<&Path>, defs_path: &Path) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        let text = std::fs::read_to_string(defs_path)
            .with_context(|| {
                format!("Failed to read terrain definitions {}", defs_path.display())
            })?;
        let defs = TerrainDefs::from_toml_str(&text)
            .with_context(|| format!("Failed to parse {}", defs_path.display()))?;
        let engine = Self::from_defs(config, &defs)
            .with_context(|| format!("Invalid terrain definitions in {}", defs_path.display()))?;
        info!(
            target: "terrain",
            "Loaded {} terrains from {}",
            engine.table.len() - 1,
            defs_path.display()
        );
        Ok(engine)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn table(&self) -> &TerrainTable {
        &self.table
    }
}

impl TerrainResolver for TerrainEngine {
    fn terrain(&self, handle: TerrainHandle) -> Option<&TerrainType> {
        self.table.get(handle)
    }

    fn terrain_by_id(&self, id: &str) -> Option<TerrainHandle> {
        self.table.handle(id)
    }

    fn terrain_set_by_id(&self, id: &str) -> Option<&TerrainSet> {
        self.table.set(id)
    }

    fn tile_settings(&self) -> TileSettings {
        TileSettings {
            tile_size: self.config.tile_size,
            height_scale: self.config.height_scale,
            heights: self.config.height_range(),
            empty_terrain: TerrainHandle::EMPTY,
            background_terrain: self.background,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::terrain::TerrainDefs;

    /// Three terrains stacked dirt < grass < snow, with rock as the cliff
    /// terrain. Every authored mask has exactly one tile, numbered by mask.
    pub(crate) const TEST_DEFS: &str = r#"
        [[terrain]]
        id = "dirt"
        tileset = "dirt"
        tags = ["soft"]
        tiles = [
            { mask = 1, tile = 1 }, { mask = 2, tile = 2 }, { mask = 3, tile = 3 },
            { mask = 4, tile = 4 }, { mask = 5, tile = 5 }, { mask = 6, tile = 6 },
            { mask = 7, tile = 7 }, { mask = 8, tile = 8 }, { mask = 9, tile = 9 },
            { mask = 10, tile = 10 }, { mask = 11, tile = 11 }, { mask = 12, tile = 12 },
            { mask = 13, tile = 13 }, { mask = 14, tile = 14 }, { mask = 15, tile = 15 },
        ]

        [[terrain]]
        id = "grass"
        tileset = "grass"
        tags = ["soft", "green"]
        tiles = [
            { mask = 1, tile = 1 }, { mask = 2, tile = 2 }, { mask = 3, tile = 3 },
            { mask = 4, tile = 4 }, { mask = 5, tile = 5 }, { mask = 6, tile = 6 },
            { mask = 7, tile = 7 }, { mask = 8, tile = 8 }, { mask = 9, tile = 9 },
            { mask = 10, tile = 10 }, { mask = 11, tile = 11 }, { mask = 12, tile = 12 },
            { mask = 13, tile = 13 }, { mask = 14, tile = 14 }, { mask = 15, tile = 15 },
        ]

        [[terrain]]
        id = "snow"
        tileset = "snow"
        tags = ["cold"]
        tiles = [{ mask = 15, tile = 15 }]

        [[terrain]]
        id = "rock"
        tileset = "rock"
        tiles = [
            { mask = 1, tile = 1 }, { mask = 2, tile = 2 }, { mask = 3, tile = 3 },
            { mask = 4, tile = 4 }, { mask = 5, tile = 5 }, { mask = 6, tile = 6 },
            { mask = 7, tile = 7 }, { mask = 8, tile = 8 }, { mask = 9, tile = 9 },
            { mask = 10, tile = 10 }, { mask = 11, tile = 11 }, { mask = 12, tile = 12 },
            { mask = 13, tile = 13 }, { mask = 14, tile = 14 }, { mask = 15, tile = 15 },
        ]

        [terrain.cliff-faces]
        right = [20]
        bottom = [21]
        uphill = [22]
        downhill = [23]

        [[terrain-set]]
        id = "temperate"
        terrains = ["dirt", "grass", "snow"]
        cliff = "rock"
    "#;

    pub(crate) fn test_engine() -> TerrainEngine {
        test_engine_with(EngineConfig::default())
    }

    pub(crate) fn test_engine_with(config: EngineConfig) -> TerrainEngine {
        let defs = TerrainDefs::from_toml_str(TEST_DEFS).unwrap();
        TerrainEngine::from_defs(config, &defs).unwrap()
    }

    #[test]
    fn settings_follow_config() {
        let defs = TerrainDefs::from_toml_str(TEST_DEFS).unwrap();
        let config = EngineConfig {
            max_height: 64,
            background_terrain: Some("grass".to_string()),
            ..EngineConfig::default()
        };
        let engine = TerrainEngine::from_defs(config, &defs).unwrap();
        let settings = engine.tile_settings();

        assert_eq!(settings.heights.max, 64);
        assert_eq!(Some(settings.background_terrain), engine.terrain_by_id("grass"));
        assert_eq!(settings.empty_terrain, TerrainHandle::EMPTY);
    }

    #[test]
    fn unknown_background_is_rejected() {
        let defs = TerrainDefs::from_toml_str(TEST_DEFS).unwrap();
        let config = EngineConfig {
            background_terrain: Some("lava".to_string()),
            ..EngineConfig::default()
        };

        assert_eq!(
            TerrainEngine::from_defs(config, &defs).unwrap_err(),
            TerrainError::UnknownTerrain("lava".to_string())
        );
    }

    #[test]
    fn resolves_sets() {
        let engine = test_engine();
        let set = engine.terrain_set_by_id("temperate").unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.cliff_terrain(), engine.terrain_by_id("rock"));
        assert!(engine.terrain_set_by_id("arctic").is_none());
    }
}
