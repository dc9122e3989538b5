//! The terrain resource table and its TOML definition format.
//!
//! ```toml
//! [[terrain]]
//! id = "grass"
//! tileset = "grass_tiles"
//! tags = ["soft"]
//! tiles = [{ mask = 15, tile = 0 }, { mask = 15, tile = 1 }, { mask = 1, tile = 2 }]
//!
//! [terrain.cliff-faces]
//! right = [16]
//!
//! [[terrain-set]]
//! id = "temperate"
//! terrains = ["dirt", "grass"]
//! cliff = "rock"
//! ```

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{TerrainError, TerrainResult},
    terrain::{CliffFaceTiles, TerrainHandle, TerrainSet, TerrainType, TilesetId, TransitionTable},
    transition::CornerMask,
};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TerrainDefs {
    #[serde(default)]
    pub terrain: Vec<TerrainDef>,
    #[serde(default)]
    pub terrain_set: Vec<TerrainSetDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TerrainDef {
    pub id: String,
    pub tileset: TilesetId,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tiles: Vec<TransitionDef>,
    #[serde(default)]
    pub cliff_faces: CliffFaceTiles,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct TransitionDef {
    pub mask: u8,
    pub tile: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TerrainSetDef {
    pub id: String,
    pub terrains: Vec<String>,
    #[serde(default)]
    pub cliff: Option<String>,
}

impl TerrainDefs {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

/// Owns every loaded terrain and terrain set. Handle 0 is always the empty
/// terrain.
#[derive(Clone, Debug)]
pub struct TerrainTable {
    terrains: Vec<TerrainType>,
    by_id: HashMap<String, TerrainHandle>,
    sets: HashMap<String, TerrainSet>,
}

impl TerrainTable {
    /// A table holding only the empty terrain.
    pub fn new(empty_id: &str) -> Self {
        TerrainTable {
            terrains: vec![TerrainType::empty(empty_id)],
            by_id: HashMap::from([(empty_id.to_string(), TerrainHandle::EMPTY)]),
            sets: HashMap::new(),
        }
    }

    pub fn from_defs(defs: &TerrainDefs, empty_id: &str) -> TerrainResult<Self> {
        let mut table = TerrainTable::new(empty_id);
        for def in &defs.terrain {
            table.insert_def(def)?;
        }
        for set in &defs.terrain_set {
            table.insert_set_def(set)?;
        }
        debug!(
            target: "terrain",
            "Loaded {} terrains and {} terrain sets",
            table.terrains.len() - 1,
            table.sets.len()
        );
        Ok(table)
    }

    pub fn insert(&mut self, terrain: TerrainType) -> TerrainResult<TerrainHandle> {
        if self.by_id.contains_key(&terrain.id) {
            return Err(TerrainError::DuplicateId(terrain.id));
        }
        let handle = TerrainHandle(self.terrains.len() as u32);
        self.by_id.insert(terrain.id.clone(), handle);
        self.terrains.push(terrain);
        Ok(handle)
    }

    fn insert_def(&mut self, def: &TerrainDef) -> TerrainResult<TerrainHandle> {
        let mut transitions = TransitionTable::default();
        for &TransitionDef { mask, tile } in &def.tiles {
            let mask = CornerMask::new(mask)
                .filter(|m| !m.is_none())
                .ok_or(TerrainError::InvalidMask(mask))?;
            transitions.push(mask, tile);
        }
        self.insert(TerrainType {
            id: def.id.clone(),
            tileset: def.tileset.clone(),
            tags: def.tags.clone(),
            transitions,
            cliff_faces: def.cliff_faces.clone(),
        })
    }

    pub fn insert_set(&mut self, set: TerrainSet) -> TerrainResult<()> {
        if self.sets.contains_key(&set.id) {
            return Err(TerrainError::DuplicateId(set.id));
        }
        self.sets.insert(set.id.clone(), set);
        Ok(())
    }

    fn insert_set_def(&mut self, def: &TerrainSetDef) -> TerrainResult<()> {
        let lookup = |id: &String| {
            self.handle(id)
                .filter(|h| !h.is_empty())
                .ok_or_else(|| TerrainError::UnknownTerrain(id.clone()))
        };
        let terrains = def.terrains.iter().map(lookup).collect::<TerrainResult<Vec<_>>>()?;
        let cliff = def.cliff.as_ref().map(lookup).transpose()?;
        self.insert_set(TerrainSet::new(def.id.clone(), terrains, cliff))
    }

    pub fn handle(&self, id: &str) -> Option<TerrainHandle> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, handle: TerrainHandle) -> Option<&TerrainType> {
        self.terrains.get(handle.index())
    }

    pub fn set(&self, id: &str) -> Option<&TerrainSet> {
        self.sets.get(id)
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.len() <= 1
    }
}

#[cfg(test)]
mod tests {
    use assertables::*;

    use super::*;

    const DEFS: &str = r#"
        [[terrain]]
        id = "dirt"
        tileset = "dirt_tiles"
        tiles = [{ mask = 15, tile = 0 }]

        [[terrain]]
        id = "grass"
        tileset = "grass_tiles"
        tags = ["soft", "green"]
        tiles = [{ mask = 15, tile = 0 }, { mask = 15, tile = 1 }, { mask = 3, tile = 7 }]

        [[terrain-set]]
        id = "temperate"
        terrains = ["dirt", "grass"]
    "#;

    #[test]
    fn parse_defs() {
        let defs = TerrainDefs::from_toml_str(DEFS).unwrap();
        let table = TerrainTable::from_defs(&defs, "empty").unwrap();

        let grass = table.handle("grass").unwrap();
        let terrain = table.get(grass).unwrap();
        assert_eq!(terrain.transitions.variants(CornerMask::ALL), &[0, 1]);
        assert_eq!(terrain.transitions.variants(CornerMask::new(3).unwrap()), &[7]);
        assert!(terrain.has_tag("green"));

        let set = table.set("temperate").unwrap();
        assert_eq!(set.terrains(), &[table.handle("dirt").unwrap(), grass]);
        assert_eq!(table.handle("empty"), Some(TerrainHandle::EMPTY));
    }

    #[test]
    fn rejects_unknown_terrain_in_set() {
        let mut defs = TerrainDefs::from_toml_str(DEFS).unwrap();
        defs.terrain_set[0].terrains.push("lava".to_string());

        let err = TerrainTable::from_defs(&defs, "empty").unwrap_err();
        assert_eq!(err, TerrainError::UnknownTerrain("lava".to_string()));
    }

    #[test]
    fn rejects_none_mask() {
        let mut defs = TerrainDefs::from_toml_str(DEFS).unwrap();
        defs.terrain[0].tiles.push(TransitionDef { mask: 0, tile: 3 });

        assert_matches!(TerrainTable::from_defs(&defs, "empty"), Err(TerrainError::InvalidMask(0)));
    }

    #[test]
    fn rejects_duplicates() {
        let mut defs = TerrainDefs::from_toml_str(DEFS).unwrap();
        defs.terrain.push(defs.terrain[0].clone());

        assert_matches!(
            TerrainTable::from_defs(&defs, "empty"),
            Err(TerrainError::DuplicateId(id)) if id == "dirt"
        );
    }
}
