use std::fmt::{Display, Formatter};

use crate::{
    error::{TerrainError, TerrainResult},
    math::{Dimensions, Grid, Point},
    terrain::{TileRef, TilesetId},
};

const TILE_BITS: u32 = 16;
const TILE_MASK: u32 = (1 << TILE_BITS) - 1;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayerTile {
    /// Index into the owning layer's tileset list.
    pub slot: usize,
    pub tile: u32,
}

impl LayerTile {
    /// `(slot << 16 | tile) + 1`. Zero is left for empty cells.
    pub fn gid(self) -> TerrainResult<u32> {
        let out_of_range = || TerrainError::TileOutOfRange { slot: self.slot, tile: self.tile };
        let slot = u32::try_from(self.slot)
            .ok()
            .filter(|&s| s <= TILE_MASK)
            .ok_or_else(out_of_range)?;
        if self.tile > TILE_MASK {
            return Err(out_of_range());
        }
        (slot << TILE_BITS | self.tile).checked_add(1).ok_or_else(out_of_range)
    }

    pub fn from_gid(gid: u32) -> Option<LayerTile> {
        let value = gid.checked_sub(1)?;
        Some(LayerTile { slot: (value >> TILE_BITS) as usize, tile: value & TILE_MASK })
    }
}

/// Which of a map's layers an upload refers to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LayerSlot {
    Base,
    /// A resolved terrain layer, by stacking index (bottom is 0).
    Terrain(usize),
    Cliff,
}

impl Display for LayerSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerSlot::Base => f.write_str("base"),
            LayerSlot::Terrain(i) => write!(f, "terrain-{i}"),
            LayerSlot::Cliff => f.write_str("cliff"),
        }
    }
}

/// Receives resolved layers for drawing.
pub trait TileMapSink {
    fn upload(&mut self, slot: LayerSlot, tilesets: &[TilesetId], tiles: &[u32], width: usize);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayer {
    tilesets: Vec<TilesetId>,
    tiles: Grid<Option<LayerTile>>,
}

impl TileLayer {
    pub fn new(dims: Dimensions) -> Self {
        TileLayer { tilesets: Vec::new(), tiles: Grid::new(dims) }
    }

    /// A layer drawing from a single tileset, as every terrain layer does.
    pub fn with_tileset(dims: Dimensions, tileset: TilesetId) -> Self {
        TileLayer { tilesets: vec![tileset], tiles: Grid::new(dims) }
    }

    /// Decodes a layer from global ids laid out in rows of `width`.
    ///
    /// `name` only labels errors.
    pub fn from_gids(
        name: &str,
        width: usize,
        tilesets: Vec<TilesetId>,
        gids: Vec<u32>,
    ) -> TerrainResult<Self> {
        let malformed =
            || TerrainError::MalformedTileLayer { layer: name.to_string(), len: gids.len(), width };
        if width == 0 || gids.len() % width != 0 {
            return Err(malformed());
        }
        let dims = Dimensions::new(width, gids.len() / width);
        let tiles = gids
            .iter()
            .map(|&gid| match LayerTile::from_gid(gid) {
                Some(tile) if tile.slot >= tilesets.len() => {
                    Err(TerrainError::TileOutOfRange { slot: tile.slot, tile: tile.tile })
                }
                tile => Ok(tile),
            })
            .collect::<TerrainResult<Vec<_>>>()?;
        let tiles = Grid::try_from_vec(dims, tiles).ok_or_else(malformed)?;
        Ok(TileLayer { tilesets, tiles })
    }

    pub fn gids(&self) -> TerrainResult<Vec<u32>> {
        self.tiles.iter().map(|tile| tile.map_or(Ok(0), LayerTile::gid)).collect()
    }

    pub fn dims(&self) -> Dimensions {
        self.tiles.dims()
    }

    pub fn tilesets(&self) -> &[TilesetId] {
        &self.tilesets
    }

    /// The slot of `tileset`, registering it if the layer does not use it yet.
    pub fn tileset_slot(&mut self, tileset: &TilesetId) -> usize {
        match self.tilesets.iter().position(|t| t == tileset) {
            Some(slot) => slot,
            None => {
                self.tilesets.push(tileset.clone());
                self.tilesets.len() - 1
            }
        }
    }

    pub fn get(&self, pos: Point) -> Option<LayerTile> {
        self.tiles.get(pos).copied().flatten()
    }

    pub fn tile_ref(&self, pos: Point) -> Option<TileRef<'_>> {
        let tile = self.get(pos)?;
        Some(TileRef { tileset: self.tilesets.get(tile.slot)?, tile: tile.tile })
    }

    /// Stores `tile` at `pos`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, pos: Point, tile: Option<LayerTile>) {
        self.tiles.set(pos, tile);
    }

    /// Stores a resolved tile reference, registering its tileset.
    pub fn set_ref(&mut self, pos: Point, tile: Option<TileRef<'_>>) {
        let tile = tile.map(|r| LayerTile { slot: self.tileset_slot(r.tileset), tile: r.tile });
        self.set(pos, tile);
    }

    pub fn clear(&mut self) {
        self.tiles = Grid::new(self.dims());
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.iter().all(Option::is_none)
    }

    pub fn merged(&self, dims: Dimensions, offset: Point) -> TileLayer {
        TileLayer { tilesets: self.tilesets.clone(), tiles: self.tiles.merged(dims, offset, None) }
    }

    pub fn submit(&self, slot: LayerSlot, sink: &mut dyn TileMapSink) -> TerrainResult<()> {
        let gids = self.gids()?;
        sink.upload(slot, &self.tilesets, &gids, self.dims().width);
        Ok(())
    }
}
