//! Height-field terrain maps built from shared terrain vertices, per-tile
//! triangle heights and cliff edges, resolved into stacks of transition tiles.

pub mod cliff;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod height;
pub mod map;
pub mod math;
pub mod projector;
pub mod raw;
pub mod terrain;
pub mod tile_layer;
pub mod transition;

pub use config::EngineConfig;
pub use engine::{TerrainEngine, TerrainResolver, TileSettings};
pub use error::{LogicError, TerrainError, TerrainResult};
pub use map::{TerrainMap, background_fill, get_size, get_tags_at};
pub use math::within_world;
pub use projector::{Projector, project_onto_terrain};
pub use raw::{Packing, RawTerrainMap, RawTileMap, to_raw_terrain_map, to_terrain_map};
pub use tile_layer::{LayerSlot, TileLayer, TileMapSink};
