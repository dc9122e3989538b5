mod set;
mod table;
mod types;

pub use set::TerrainSet;
pub use table::{TerrainDef, TerrainDefs, TerrainSetDef, TerrainTable, TransitionDef};
pub use types::{CliffFaceTiles, TerrainHandle, TerrainType, TileRef, TilesetId, TransitionTable};
