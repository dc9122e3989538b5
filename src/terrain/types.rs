use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use crate::transition::{CornerMask, TRANSITION_SLOTS};

/// Strongly typed index into a [`TerrainTable`][crate::terrain::TerrainTable].
///
/// The table owns the terrains; maps only ever hold handles.
#[derive(Copy, Clone, Debug, Default)]
#[derive(PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct TerrainHandle(pub(crate) u32);

impl TerrainHandle {
    /// The reserved "no terrain" entry, present in every table.
    pub const EMPTY: TerrainHandle = TerrainHandle(0);

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[derive(Clone, Debug, Default)]
#[derive(PartialEq, Eq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
#[derive(Deref, From)]
#[serde(transparent)]
pub struct TilesetId(pub String);

impl From<&str> for TilesetId {
    fn from(value: &str) -> Self {
        TilesetId(value.to_string())
    }
}

/// A resolved tile: a tile index within a tileset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TileRef<'a> {
    pub tileset: &'a TilesetId,
    pub tile: u32,
}

/// Authored transition tiles, indexed by corner mask.
///
/// Slot 0 ("none") is never filled or looked up; slot 15 holds the tiles fully
/// covered by the terrain. Several tiles in one slot are variants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionTable([Vec<u32>; TRANSITION_SLOTS]);

impl TransitionTable {
    pub fn push(&mut self, mask: CornerMask, tile: u32) {
        if !mask.is_none() {
            self.0[mask.index()].push(tile);
        }
    }

    pub fn variants(&self, mask: CornerMask) -> &[u32] {
        if mask.is_none() { &[] } else { &self.0[mask.index()] }
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Vec::is_empty)
    }
}

/// Tiles drawn on the vertical faces of cliffs. Only the cliff terrain of a
/// terrain set needs these.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CliffFaceTiles {
    pub right: Vec<u32>,
    pub bottom: Vec<u32>,
    pub uphill: Vec<u32>,
    pub downhill: Vec<u32>,
}

/// One terrain material. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainType {
    pub id: String,
    pub tileset: TilesetId,
    pub tags: Vec<String>,
    pub transitions: TransitionTable,
    pub cliff_faces: CliffFaceTiles,
}

impl TerrainType {
    /// The reserved empty terrain: no tags, no tiles.
    pub fn empty(id: impl Into<String>) -> Self {
        TerrainType {
            id: id.into(),
            tileset: TilesetId::default(),
            tags: Vec::new(),
            transitions: TransitionTable::default(),
            cliff_faces: CliffFaceTiles::default(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
