use thiserror::Error;

use crate::{
    cliff::CliffEdge,
    math::{Dimensions, Point},
};

/// Malformed data or a failed lookup. The map is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    #[error("tile layer `{layer}` is empty or not rectangular ({len} tiles, width {width})")]
    MalformedTileLayer { layer: String, len: usize, width: usize },
    #[error("terrain vertex array has {found} entries, expected {expected} or none")]
    VertexCountMismatch { expected: usize, found: usize },
    #[error("vertex height array has {found} samples, expected {expected}")]
    HeightCountMismatch { expected: usize, found: usize },
    #[error("height {value} of tile {tile} lies outside {min}..={max}")]
    HeightOutOfRange { tile: Point, value: u8, min: u8, max: u8 },
    #[error("cliff array has {found} entries, expected {expected}")]
    CliffCountMismatch { expected: usize, found: usize },
    #[error("tile layer `{layer}` is {found}, expected {expected}")]
    LayerSizeMismatch { layer: String, expected: Dimensions, found: Dimensions },
    #[error("map size {0} has no tiles")]
    EmptyMap(Dimensions),
    #[error("unknown terrain set `{0}`")]
    UnknownTerrainSet(String),
    #[error("unknown terrain `{0}`")]
    UnknownTerrain(String),
    #[error("duplicate resource id `{0}`")]
    DuplicateId(String),
    #[error("terrain vertex index {index} exceeds the terrain set size {max}")]
    VertexIndexOutOfRange { index: u16, max: usize },
    #[error("terrain `{0}` is not part of the map's terrain set")]
    TerrainNotInSet(String),
    #[error("position {0} lies outside the map")]
    OutOfBounds(Point),
    #[error("tile {tile} in tileset slot {slot} cannot be encoded")]
    TileOutOfRange { slot: usize, tile: u32 },
    #[error("transition mask {0} is not a valid authored mask (1..=15)")]
    InvalidMask(u8),
    #[error("packed array could not be decoded: {0}")]
    Codec(String),
    #[error("cliff invariant violated at {at}: {rule}")]
    CliffInvariant { rule: CliffRule, at: Point },
    #[error(transparent)]
    Logic(#[from] LogicError),
}

/// Caller misuse. These indicate bugs rather than bad data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    #[error("cannot swap the triangulation of tile {0} while it carries a diagonal cliff")]
    SwapUnderDiagonalCliff(Point),
    #[error("edge {edge:?} does not touch vertex {vertex}")]
    EdgeNotAtVertex { edge: CliffEdge, vertex: Point },
    #[error("vertex {0} has more cliffs than any legal placement allows")]
    TooManyCliffs(Point),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CliffRule {
    VertexDegree,
    BorderVertexDegree,
    BorderEdge,
    Incompatible,
    DoubleDiagonal,
    InconsistentFlags,
}

impl std::fmt::Display for CliffRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CliffRule::VertexDegree => "more than 2 cliffs meet at a vertex",
            CliffRule::BorderVertexDegree => "more than 1 cliff meets at a border vertex",
            CliffRule::BorderEdge => "cliff runs along the world border",
            CliffRule::Incompatible => "cliffs meeting at a vertex face the same way",
            CliffRule::DoubleDiagonal => "tile carries both diagonal cliffs",
            CliffRule::InconsistentFlags => "diagonal flags disagree with the triangulation",
        })
    }
}

pub type TerrainResult<T> = Result<T, TerrainError>;
