//! Cliff edges and their orientation.
//!
//! Every edge is directed from a start vertex to an end vertex so that the
//! high side of the cliff is on the left of someone walking along it:
//!
//! ```text
//!   Right      (x+1, y)   -> (x+1, y+1)   high side east
//!   Bottom     (x, y+1)   -> (x+1, y+1)   high side north
//!   Uphill     top-right  -> bottom-left  high side south-east
//!   Downhill   top-left   -> bottom-right high side north-east
//! ```
//!
//! Seen from a vertex, the edges towards N, NE, W and NW arrive at it and the
//! edges towards E, SE, S and SW leave it. Two cliffs can only chain through a
//! vertex if one arrives and the other leaves.

use std::fmt::{Display, Formatter};

use enum_iterator::Sequence;
use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::{
    error::LogicError,
    geometry::{Direction, Triangle, TriangleType},
    math::{Dimensions, Point, Vec2},
};

/// The four edges a tile owns.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
#[derive(Sequence, Enum)]
pub enum EdgeKind {
    Right,
    Bottom,
    Uphill,
    Downhill,
}

impl EdgeKind {
    pub const fn is_diagonal(self) -> bool {
        matches!(self, EdgeKind::Uphill | EdgeKind::Downhill)
    }

    /// The triangulation a tile needs to carry this edge.
    pub const fn required_split(self) -> Option<TriangleType> {
        match self {
            EdgeKind::Uphill => Some(TriangleType::Uphill),
            EdgeKind::Downhill => Some(TriangleType::Downhill),
            EdgeKind::Right | EdgeKind::Bottom => None,
        }
    }
}

/// A cliff edge in canonical form, addressed by the tile that owns it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
pub struct CliffEdge {
    pub tile: Point,
    pub kind: EdgeKind,
}

impl Display for CliffEdge {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} of {}", self.kind, self.tile)
    }
}

impl CliffEdge {
    pub const fn new(tile: Point, kind: EdgeKind) -> Self {
        CliffEdge { tile, kind }
    }

    pub const fn right(tile: Point) -> Self {
        Self::new(tile, EdgeKind::Right)
    }

    pub const fn bottom(tile: Point) -> Self {
        Self::new(tile, EdgeKind::Bottom)
    }

    pub const fn uphill(tile: Point) -> Self {
        Self::new(tile, EdgeKind::Uphill)
    }

    pub const fn downhill(tile: Point) -> Self {
        Self::new(tile, EdgeKind::Downhill)
    }

    /// The edge leaving `vertex` towards `direction`.
    pub const fn at(vertex: Point, direction: Direction) -> Self {
        let Point { x, y } = vertex;
        match direction {
            Direction::N => Self::right(Point::new(x - 1, y - 1)),
            Direction::NE => Self::uphill(Point::new(x, y - 1)),
            Direction::E => Self::bottom(Point::new(x, y - 1)),
            Direction::SE => Self::downhill(Point::new(x, y)),
            Direction::S => Self::right(Point::new(x - 1, y)),
            Direction::SW => Self::uphill(Point::new(x - 1, y)),
            Direction::W => Self::bottom(Point::new(x - 1, y - 1)),
            Direction::NW => Self::downhill(Point::new(x - 1, y - 1)),
        }
    }

    pub const fn start(self) -> Point {
        let Point { x, y } = self.tile;
        match self.kind {
            EdgeKind::Right | EdgeKind::Uphill => Point::new(x + 1, y),
            EdgeKind::Bottom => Point::new(x, y + 1),
            EdgeKind::Downhill => Point::new(x, y),
        }
    }

    pub const fn end(self) -> Point {
        let Point { x, y } = self.tile;
        match self.kind {
            EdgeKind::Right | EdgeKind::Bottom | EdgeKind::Downhill => Point::new(x + 1, y + 1),
            EdgeKind::Uphill => Point::new(x, y + 1),
        }
    }

    pub const fn vertices(self) -> [Point; 2] {
        [self.start(), self.end()]
    }

    pub fn touches(self, vertex: Point) -> bool {
        self.start() == vertex || self.end() == vertex
    }

    /// Whether the edge is stored in a map of `size` tiles.
    pub const fn in_map(self, size: Dimensions) -> bool {
        size.contains(self.tile)
    }

    /// Whether both endpoints lie on the map border, so the edge runs along it.
    pub fn along_border(self, size: Dimensions) -> bool {
        let vertex_dims = size.vertex_dims();
        vertex_dims.on_border(self.start()) && vertex_dims.on_border(self.end())
    }

    pub fn touches_border(self, size: Dimensions) -> bool {
        let vertex_dims = size.vertex_dims();
        vertex_dims.on_border(self.start()) || vertex_dims.on_border(self.end())
    }

    pub fn other_vertex(self, vertex: Point) -> Result<Point, LogicError> {
        if vertex == self.start() {
            Ok(self.end())
        } else if vertex == self.end() {
            Ok(self.start())
        } else {
            Err(LogicError::EdgeNotAtVertex { edge: self, vertex })
        }
    }

    /// The direction this edge points in, seen from `vertex`.
    pub fn direction_at(self, vertex: Point) -> Result<Direction, LogicError> {
        let other = self.other_vertex(vertex)?;
        Direction::from_offset(other - vertex)
            .ok_or(LogicError::EdgeNotAtVertex { edge: self, vertex })
    }

    /// Whether the edge leaves `vertex` (true) or arrives at it (false).
    pub fn leaves(self, vertex: Point) -> Result<bool, LogicError> {
        self.other_vertex(vertex).map(|_| vertex == self.start())
    }

    /// Two edges can chain through `vertex` if one arrives and the other
    /// leaves.
    pub fn compatible_at(self, other: CliffEdge, vertex: Point) -> Result<bool, LogicError> {
        Ok(self.leaves(vertex)? != other.leaves(vertex)?)
    }

    /// The vertex both edges touch, if they are distinct and adjacent.
    pub fn shared_vertex(self, other: CliffEdge) -> Option<Point> {
        if self == other {
            return None;
        }
        self.vertices().into_iter().find(|&v| other.touches(v))
    }
}

/// Which side of a tile an edge reference names.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
#[derive(Sequence)]
pub enum EdgeSide {
    Top,
    Right,
    Bottom,
    Left,
    UphillDiagonal,
    DownhillDiagonal,
}

/// An edge as an editor sees it: a side of a specific tile, plus the triangle
/// the cursor was over for diagonals.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct TileEdge {
    pub tile: Point,
    pub side: EdgeSide,
    pub triangle: Option<Triangle>,
}

impl TileEdge {
    pub const fn new(tile: Point, side: EdgeSide) -> Self {
        TileEdge { tile, side, triangle: None }
    }

    pub const fn canonical(self) -> CliffEdge {
        let Point { x, y } = self.tile;
        match self.side {
            EdgeSide::Top => CliffEdge::bottom(Point::new(x, y - 1)),
            EdgeSide::Right => CliffEdge::right(self.tile),
            EdgeSide::Bottom => CliffEdge::bottom(self.tile),
            EdgeSide::Left => CliffEdge::right(Point::new(x - 1, y)),
            EdgeSide::UphillDiagonal => CliffEdge::uphill(self.tile),
            EdgeSide::DownhillDiagonal => CliffEdge::downhill(self.tile),
        }
    }
}

impl From<TileEdge> for CliffEdge {
    fn from(edge: TileEdge) -> Self {
        edge.canonical()
    }
}

/// The tile edge closest to a flat map position, including both diagonals.
pub fn nearest_edge(point: Vec2, tile_size: f32) -> TileEdge {
    let tile = point.tile(tile_size);
    let u = point.x / tile_size - tile.x as f32;
    let v = point.y / tile_size - tile.y as f32;
    let diagonal = std::f32::consts::FRAC_1_SQRT_2;

    let candidates = [
        (EdgeSide::Top, v),
        (EdgeSide::Right, 1.0 - u),
        (EdgeSide::Bottom, 1.0 - v),
        (EdgeSide::Left, u),
        (EdgeSide::UphillDiagonal, (u + v - 1.0).abs() * diagonal),
        (EdgeSide::DownhillDiagonal, (u - v).abs() * diagonal),
    ];
    let side = candidates
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(EdgeSide::Top, |(side, _)| side);

    let triangle = match side {
        EdgeSide::UphillDiagonal if u + v < 1.0 => Some(Triangle::First),
        EdgeSide::UphillDiagonal => Some(Triangle::Second),
        EdgeSide::DownhillDiagonal if v > u => Some(Triangle::First),
        EdgeSide::DownhillDiagonal => Some(Triangle::Second),
        _ => None,
    };
    TileEdge { tile, side, triangle }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const V: Point = Point::new(5, 5);

    #[test]
    fn ring_edges_touch_their_vertex() {
        for direction in enum_iterator::all::<Direction>() {
            let edge = CliffEdge::at(V, direction);
            assert!(edge.touches(V), "{direction:?} -> {edge}");
            assert_eq!(edge.direction_at(V), Ok(direction));
        }
    }

    #[test_case(Direction::N, false)]
    #[test_case(Direction::NE, false)]
    #[test_case(Direction::E, true)]
    #[test_case(Direction::SE, true)]
    #[test_case(Direction::S, true)]
    #[test_case(Direction::SW, true)]
    #[test_case(Direction::W, false)]
    #[test_case(Direction::NW, false)]
    fn ring_orientation(direction: Direction, leaves: bool) {
        assert_eq!(CliffEdge::at(V, direction).leaves(V), Ok(leaves));
    }

    #[test]
    fn bottom_and_right_of_same_tile_are_incompatible() {
        let tile = Point::new(1, 1);
        let (bottom, right) = (CliffEdge::bottom(tile), CliffEdge::right(tile));
        let shared = bottom.shared_vertex(right).unwrap();

        assert_eq!(shared, Point::new(2, 2));
        assert_eq!(bottom.compatible_at(right, shared), Ok(false));
        assert_eq!(right.compatible_at(CliffEdge::right(Point::new(1, 2)), shared), Ok(true));
    }

    #[test]
    fn classification_rejects_foreign_vertex() {
        let edge = CliffEdge::bottom(Point::new(1, 1));
        assert_eq!(
            edge.leaves(Point::new(0, 0)),
            Err(LogicError::EdgeNotAtVertex { edge, vertex: Point::new(0, 0) })
        );
    }

    #[test_case(EdgeSide::Top, CliffEdge::bottom(Point::new(2, 1)))]
    #[test_case(EdgeSide::Left, CliffEdge::right(Point::new(1, 2)))]
    #[test_case(EdgeSide::Right, CliffEdge::right(Point::new(2, 2)))]
    #[test_case(EdgeSide::DownhillDiagonal, CliffEdge::downhill(Point::new(2, 2)))]
    fn canonical_form(side: EdgeSide, expected: CliffEdge) {
        assert_eq!(CliffEdge::from(TileEdge::new(Point::new(2, 2), side)), expected);
    }

    #[test_case(Vec2::new(40.0, 33.0), EdgeSide::Top, None)]
    #[test_case(Vec2::new(62.0, 48.0), EdgeSide::Right, None)]
    #[test_case(Vec2::new(33.0, 47.0), EdgeSide::Left, None)]
    #[test_case(Vec2::new(42.0, 52.0), EdgeSide::UphillDiagonal, Some(Triangle::First))]
    #[test_case(Vec2::new(50.0, 47.0), EdgeSide::UphillDiagonal, Some(Triangle::Second))]
    #[test_case(Vec2::new(42.0, 41.0), EdgeSide::DownhillDiagonal, Some(Triangle::Second))]
    fn nearest(point: Vec2, side: EdgeSide, triangle: Option<Triangle>) {
        let edge = nearest_edge(point, 32.0);
        assert_eq!(edge.tile, Point::new(1, 1));
        assert_eq!(edge.side, side);
        assert_eq!(edge.triangle, triangle);
    }
}
