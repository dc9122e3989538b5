mod edge;
pub mod faces;
mod flags;
mod grid;
pub mod ring;
mod rules;

pub use edge::{CliffEdge, EdgeKind, EdgeSide, TileEdge, nearest_edge};
pub use flags::CliffFlags;
pub use grid::{CliffGrid, VertexCliffs};
pub use rules::CliffAnchor;
