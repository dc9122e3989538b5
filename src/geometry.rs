//! Tile-local geometry: quad corners, the two triangulations, and the ring of
//! eight directions around a terrain vertex.
//!
//! ```text
//!  TL ---- TR        TL ---- TR
//!   | 1st / |         | \ 2nd |
//!   |   /   |         |   \   |
//!   | / 2nd |         | 1st \ |
//!  BL ---- BR        BL ---- BR
//!    Uphill            Downhill
//! ```
//!
//! Both triangulations share exactly two corners between their triangles, so
//! the quad always stays a closed polygon.

use derive_more::IsVariant;
use enum_iterator::Sequence;
use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::math::{Point, Vec2};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
#[derive(Sequence, Enum)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Offset of this corner's vertex from the tile position.
    pub const fn offset(self) -> Point {
        match self {
            Corner::TopLeft => Point::new(0, 0),
            Corner::TopRight => Point::new(1, 0),
            Corner::BottomRight => Point::new(1, 1),
            Corner::BottomLeft => Point::new(0, 1),
        }
    }

    /// The bit this corner contributes to a transition mask.
    pub const fn mask_bit(self) -> u8 {
        match self {
            Corner::TopLeft => 8,
            Corner::TopRight => 1,
            Corner::BottomRight => 2,
            Corner::BottomLeft => 4,
        }
    }

    pub fn from_offset(offset: Point) -> Option<Corner> {
        enum_iterator::all::<Corner>().find(|c| c.offset() == offset)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
#[derive(Sequence, Enum)]
pub enum Triangle {
    First,
    Second,
}

impl Triangle {
    pub const fn index(self) -> usize {
        match self {
            Triangle::First => 0,
            Triangle::Second => 1,
        }
    }

    /// The triangle of a `tt`-split tile containing the tile-local position
    /// `(u, v)`, both in `0.0..=1.0`. Points on the diagonal belong to the
    /// first triangle.
    pub fn at_local(tt: TriangleType, u: f32, v: f32) -> Triangle {
        let first = match tt {
            TriangleType::Uphill => u + v <= 1.0,
            TriangleType::Downhill => v >= u,
        };
        if first { Triangle::First } else { Triangle::Second }
    }
}

/// Which diagonal currently splits a tile into its two triangles.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
#[derive(Serialize, Deserialize)]
#[derive(Sequence, Enum, IsVariant)]
pub enum TriangleType {
    /// Split along the bottom-left to top-right (`/`) diagonal.
    #[default]
    Uphill,
    /// Split along the top-left to bottom-right (`\`) diagonal.
    Downhill,
}

impl TriangleType {
    pub const fn flipped(self) -> TriangleType {
        match self {
            TriangleType::Uphill => TriangleType::Downhill,
            TriangleType::Downhill => TriangleType::Uphill,
        }
    }

    /// The corners of `triangle`, in sample slot order.
    pub const fn corners(self, triangle: Triangle) -> [Corner; 3] {
        use Corner::*;
        match (self, triangle) {
            (TriangleType::Uphill, Triangle::First) => [TopLeft, TopRight, BottomLeft],
            (TriangleType::Uphill, Triangle::Second) => [TopRight, BottomRight, BottomLeft],
            (TriangleType::Downhill, Triangle::First) => [TopLeft, BottomRight, BottomLeft],
            (TriangleType::Downhill, Triangle::Second) => [TopLeft, TopRight, BottomRight],
        }
    }

    /// The two corners joined by the splitting diagonal.
    pub const fn diagonal(self) -> [Corner; 2] {
        match self {
            TriangleType::Uphill => [Corner::TopRight, Corner::BottomLeft],
            TriangleType::Downhill => [Corner::TopLeft, Corner::BottomRight],
        }
    }

    /// Sample slot of `corner` within `triangle`, if the triangle contains it.
    pub fn slot(self, corner: Corner, triangle: Triangle) -> Option<usize> {
        self.corners(triangle).iter().position(|&c| c == corner)
    }

    /// The first triangle (in [`Triangle`] order) containing `corner`.
    pub fn first_triangle_at(self, corner: Corner) -> Triangle {
        if self.slot(corner, Triangle::First).is_some() { Triangle::First } else { Triangle::Second }
    }

    /// Every triangle containing `corner`: both for the diagonal's corners,
    /// one otherwise.
    pub fn triangles_at(self, corner: Corner) -> impl Iterator<Item = Triangle> {
        enum_iterator::all::<Triangle>().filter(move |&t| self.slot(corner, t).is_some())
    }
}

/// Pixel positions of `corners` of `tile` on the flat map.
pub fn flat_corners(tile: Point, corners: [Corner; 3], tile_size: f32) -> [Vec2; 3] {
    corners.map(|c| Vec2::from(tile + c.offset()) * tile_size)
}

/// Whether `p` lies inside or on the edge of `triangle`, whatever its winding.
pub fn triangle_contains(p: Vec2, [a, b, c]: [Vec2; 3]) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Barycentric weights of `p` in `triangle`, or `None` if the triangle is
/// degenerate.
pub fn barycentric(p: Vec2, [a, b, c]: [Vec2; 3]) -> Option<[f32; 3]> {
    let area = (b - a).perp_dot(c - a);
    if area.abs() <= f32::EPSILON {
        return None;
    }
    let wb = (p - a).perp_dot(c - a) / area;
    let wc = (b - a).perp_dot(p - a) / area;
    Some([1.0 - wb - wc, wb, wc])
}

/// The eight directions around a vertex, clockwise on screen starting north.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
#[derive(Sequence, Enum)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Direction {
        Self::ALL[index % 8]
    }

    /// Rotates clockwise by `steps` eighth turns (negative is
    /// counter-clockwise).
    pub const fn rotated(self, steps: isize) -> Direction {
        Self::from_index((self.index() as isize + steps).rem_euclid(8) as usize)
    }

    pub const fn offset(self) -> Point {
        match self {
            Direction::N => Point::new(0, -1),
            Direction::NE => Point::new(1, -1),
            Direction::E => Point::new(1, 0),
            Direction::SE => Point::new(1, 1),
            Direction::S => Point::new(0, 1),
            Direction::SW => Point::new(-1, 1),
            Direction::W => Point::new(-1, 0),
            Direction::NW => Point::new(-1, -1),
        }
    }

    pub fn from_offset(offset: Point) -> Option<Direction> {
        Self::ALL.into_iter().find(|d| d.offset() == offset)
    }

    pub const fn is_diagonal(self) -> bool {
        self.index() % 2 == 1
    }
}
