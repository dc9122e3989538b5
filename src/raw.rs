//! The persisted form of a terrain map.
//!
//! Raw maps reference their terrain set by id and their terrains by position
//! in that set, so they stay valid as long as the set keeps its order. Large
//! arrays may be stored packed; see [`PackedArray`].

mod packed;

use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub use packed::{PackedArray, PackedInt, Packing};

use crate::{
    cliff::{CliffFlags, CliffGrid},
    engine::TerrainResolver,
    error::{TerrainError, TerrainResult},
    height::{SAMPLES_PER_TILE, TileHeights},
    map::{MapParts, TerrainMap},
    math::Grid,
    terrain::{TerrainHandle, TerrainSet, TilesetId},
    tile_layer::TileLayer,
};

/// A tile layer as global ids, `width` tiles per row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct RawTileMap {
    pub width: usize,
    #[serde(default)]
    pub tilesets: Vec<TilesetId>,
    pub tiles: PackedArray<u32>,
}

impl RawTileMap {
    fn from_layer(layer: &TileLayer, packing: Packing) -> TerrainResult<Self> {
        Ok(RawTileMap {
            width: layer.dims().width,
            tilesets: layer.tilesets().to_vec(),
            tiles: PackedArray::pack(&layer.gids()?, packing)?,
        })
    }

    fn to_layer(&self, name: &str) -> TerrainResult<TileLayer> {
        TileLayer::from_gids(name, self.width, self.tilesets.clone(), self.tiles.unpack()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawTerrainMap {
    pub terrainset: String,
    /// `0` for the empty terrain, `i + 1` for the set's terrain `i`. May be
    /// left empty to fill every vertex with the empty terrain.
    #[serde(default)]
    pub terrain_vertex: PackedArray<u16>,
    pub vertex_height: PackedArray<u8>,
    #[serde(default)]
    pub cliffs: PackedArray<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terrain_layers: Vec<RawTileMap>,
    pub tile_layer: RawTileMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliff_layer: Option<RawTileMap>,
}

impl RawTerrainMap {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse raw terrain map")
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("Failed to serialize raw terrain map")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read map {}", path.display()))?;
        let raw = Self::from_toml_str(&text).with_context(|| format!("In {}", path.display()))?;
        info!(target: "raw_map", "Read raw map {}", path.display());
        Ok(raw)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("Failed to write map {}", path.display()))?;
        info!(target: "raw_map", "Wrote raw map {}", path.display());
        Ok(())
    }
}

fn vertex_index(set: &TerrainSet, terrain: TerrainHandle) -> TerrainResult<u16> {
    let index = set.stack_index(terrain).map_or(0, |i| i + 1);
    u16::try_from(index)
        .map_err(|_| TerrainError::VertexIndexOutOfRange { index: u16::MAX, max: set.len() })
}

fn vertex_terrain(set: &TerrainSet, index: u16) -> TerrainResult<TerrainHandle> {
    match index {
        0 => Ok(TerrainHandle::EMPTY),
        i => set
            .get(i as usize - 1)
            .ok_or(TerrainError::VertexIndexOutOfRange { index, max: set.len() }),
    }
}

/// Converts `map` to its persisted form, including every generated layer.
pub fn to_raw_terrain_map(
    map: &TerrainMap,
    ctx: &dyn TerrainResolver,
    packing: Packing,
) -> TerrainResult<RawTerrainMap> {
    let set = map.terrain_set();
    if ctx.terrain_set_by_id(&set.id).is_none() {
        return Err(TerrainError::UnknownTerrainSet(set.id.clone()));
    }
    let vertices =
        map.vertices().iter().map(|&t| vertex_index(set, t)).collect::<TerrainResult<Vec<_>>>()?;
    let heights = map.heights().iter().flat_map(TileHeights::samples).collect::<Vec<_>>();
    let cliffs = map.cliffs().as_grid().iter().map(|f| f.bits()).collect::<Vec<_>>();

    let raw = RawTerrainMap {
        terrainset: set.id.clone(),
        terrain_vertex: PackedArray::pack(&vertices, packing)?,
        vertex_height: PackedArray::pack(&heights, packing)?,
        cliffs: PackedArray::pack(&cliffs, packing)?,
        terrain_layers: map
            .terrain_layers()
            .iter()
            .map(|layer| RawTileMap::from_layer(layer, packing))
            .collect::<TerrainResult<_>>()?,
        tile_layer: RawTileMap::from_layer(map.base_layer(), packing)?,
        cliff_layer: Some(RawTileMap::from_layer(map.cliff_layer(), packing)?),
    };
    debug!(target: "raw_map", "Converted {} map to raw ({packing:?})", map.get_size());
    Ok(raw)
}

/// Builds a map from its persisted form. Every check runs before the map is
/// built; the first failure aborts the load.
pub fn to_terrain_map(raw: &RawTerrainMap, ctx: &dyn TerrainResolver) -> TerrainResult<TerrainMap> {
    let set = ctx
        .terrain_set_by_id(&raw.terrainset)
        .ok_or_else(|| TerrainError::UnknownTerrainSet(raw.terrainset.clone()))?;

    let base_layer = raw.tile_layer.to_layer("tile-layer")?;
    let size = base_layer.dims();
    if size.empty() {
        return Err(TerrainError::MalformedTileLayer {
            layer: "tile-layer".to_string(),
            len: 0,
            width: raw.tile_layer.width,
        });
    }

    let vertex_indices = raw.terrain_vertex.unpack()?;
    let vertex_dims = size.vertex_dims();
    let vertices = if vertex_indices.is_empty() {
        Grid::new_fill(vertex_dims, TerrainHandle::EMPTY)
    } else {
        let terrains = vertex_indices
            .iter()
            .map(|&i| vertex_terrain(set, i))
            .collect::<TerrainResult<Vec<_>>>()?;
        let found = terrains.len();
        Grid::try_from_vec(vertex_dims, terrains).ok_or(TerrainError::VertexCountMismatch {
            expected: vertex_dims.area(),
            found,
        })?
    };

    let samples = raw.vertex_height.unpack()?;
    let expected = size.area() * SAMPLES_PER_TILE;
    if samples.len() != expected {
        return Err(TerrainError::HeightCountMismatch { expected, found: samples.len() });
    }
    let heights = samples
        .chunks_exact(SAMPLES_PER_TILE)
        .map(|chunk| {
            let mut tile = TileHeights::default();
            tile.0.copy_from_slice(chunk);
            tile
        })
        .collect::<Vec<_>>();
    let heights = Grid::try_from_vec(size, heights)
        .ok_or(TerrainError::HeightCountMismatch { expected, found: samples.len() })?;
    let range = ctx.tile_settings().heights;
    for (tile, tile_heights) in heights.enumerate() {
        if let Some(&value) = tile_heights.0.iter().find(|&&h| h < range.min || h > range.max) {
            return Err(TerrainError::HeightOutOfRange {
                tile,
                value,
                min: range.min,
                max: range.max,
            });
        }
    }

    let records = raw.cliffs.unpack()?;
    if records.len() != size.area() {
        return Err(TerrainError::CliffCountMismatch {
            expected: size.area(),
            found: records.len(),
        });
    }
    let flags = records
        .iter()
        .map(|&bits| {
            CliffFlags::from_bits(bits)
                .ok_or_else(|| TerrainError::Codec(format!("unknown cliff bits {bits:#04x}")))
        })
        .collect::<TerrainResult<Vec<_>>>()?;
    let cliffs = Grid::try_from_vec(size, flags).map(CliffGrid::from_grid).ok_or(
        TerrainError::CliffCountMismatch { expected: size.area(), found: records.len() },
    )?;

    let terrain_layers = raw
        .terrain_layers
        .iter()
        .enumerate()
        .map(|(i, layer)| layer.to_layer(&format!("terrain-layers[{i}]")))
        .collect::<TerrainResult<Vec<_>>>()?;
    let cliff_layer = raw.cliff_layer.as_ref().map(|l| l.to_layer("cliff-layer")).transpose()?;

    let map = TerrainMap::from_parts(
        MapParts {
            terrain_set: set.clone(),
            vertices,
            heights,
            cliffs,
            base_layer,
            terrain_layers,
            cliff_layer,
        },
        ctx,
    )?;
    info!(target: "raw_map", "Loaded {size} map with terrain set `{}`", raw.terrainset);
    Ok(map)
}
