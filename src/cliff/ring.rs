//! The ring of height samples around a vertex.
//!
//! The eight directions around a vertex split its surroundings into eight
//! half-sectors, half `k` lying clockwise between direction `k` and `k + 1`.
//! Each half is one height sample of one of the four tiles touching the
//! vertex. Where a tile's diagonal does not pass through the vertex, both of
//! its halves share the single triangle holding that corner.
//!
//! ```text
//!          N
//!     NW 7 | 0 NE
//!       \  |  /
//!      6 \ | / 1
//!   W ----- v ----- E
//!      5 / | \ 2
//!       /  |  \
//!     SW 4 | 3 SE
//!          S
//! ```

use crate::{
    cliff::{CliffEdge, CliffGrid},
    error::LogicError,
    geometry::{Corner, Direction, Triangle, TriangleType},
    height::TileHeights,
    math::Point,
};

/// One height sample seen from a vertex.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Wedge {
    pub tile: Point,
    pub triangle: Triangle,
    /// Index into the tile's [`TileHeights`].
    pub sample: usize,
}

struct Quadrant {
    tile_offset: Point,
    corner: Corner,
    /// The split whose diagonal passes through the vertex.
    split: TriangleType,
    halves: [Triangle; 2],
}

const QUADRANTS: [Quadrant; 4] = [
    Quadrant {
        tile_offset: Point::new(0, -1),
        corner: Corner::BottomLeft,
        split: TriangleType::Uphill,
        halves: [Triangle::First, Triangle::Second],
    },
    Quadrant {
        tile_offset: Point::new(0, 0),
        corner: Corner::TopLeft,
        split: TriangleType::Downhill,
        halves: [Triangle::Second, Triangle::First],
    },
    Quadrant {
        tile_offset: Point::new(-1, 0),
        corner: Corner::TopRight,
        split: TriangleType::Uphill,
        halves: [Triangle::Second, Triangle::First],
    },
    Quadrant {
        tile_offset: Point::new(-1, -1),
        corner: Corner::BottomRight,
        split: TriangleType::Downhill,
        halves: [Triangle::First, Triangle::Second],
    },
];

/// The sample in half-sector `half` around `vertex`, or `None` if its tile
/// lies outside the map.
pub fn wedge(cliffs: &CliffGrid, vertex: Point, half: usize) -> Option<Wedge> {
    let half = half % 8;
    let quadrant = &QUADRANTS[half / 2];
    let tile = vertex + quadrant.tile_offset;
    if !cliffs.size().contains(tile) {
        return None;
    }
    let tt = cliffs.triangle_type(tile);
    let triangle = if tt == quadrant.split {
        quadrant.halves[half % 2]
    } else {
        tt.first_triangle_at(quadrant.corner)
    };
    let sample = TileHeights::index_of(tt, quadrant.corner, triangle)?;
    Some(Wedge { tile, triangle, sample })
}

/// Every sample touching `vertex`, without duplicates.
pub fn vertex_wedges(cliffs: &CliffGrid, vertex: Point) -> Vec<Wedge> {
    let mut out = Vec::with_capacity(8);
    for wedge in (0..8).filter_map(|half| wedge(cliffs, vertex, half)) {
        if !out.contains(&wedge) {
            out.push(wedge);
        }
    }
    out
}

fn is_wall(cliffs: &CliffGrid, vertex: Point, direction: Direction) -> bool {
    cliffs.has(CliffEdge::at(vertex, direction))
}

/// The samples on the high side of `edge` near `vertex`: the arc on the
/// walker's left, up to the next cliff or the map border.
pub fn high_side_wedges(
    cliffs: &CliffGrid,
    vertex: Point,
    edge: CliffEdge,
) -> Result<Vec<Wedge>, LogicError> {
    let direction = edge.direction_at(vertex)?;
    let leaves = edge.leaves(vertex)?;

    let mut out = Vec::new();
    let mut half = if leaves { direction.index() + 7 } else { direction.index() };
    for _ in 0..8 {
        let Some(next) = wedge(cliffs, vertex, half) else {
            break;
        };
        if !out.contains(&next) {
            out.push(next);
        }
        let (boundary, step) = if leaves {
            (Direction::from_index(half), 7)
        } else {
            (Direction::from_index(half + 1), 1)
        };
        if is_wall(cliffs, vertex, boundary) {
            break;
        }
        half += step;
    }
    Ok(out)
}
