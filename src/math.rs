pub mod dimensions;
pub mod grid;
pub mod point;
pub mod vec2;

pub use dimensions::Dimensions;
pub use grid::Grid;
pub use point::Point;
pub use vec2::Vec2;

/// Whether the tile position `pos` lies inside a map of `size` tiles.
pub const fn within_world(pos: Point, size: Dimensions) -> bool {
    size.contains(pos)
}
