use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::math::Point;

/// 2D dimensions with a width and a height. All empty dimensions compare
/// equal.
#[derive(Debug, Copy, Clone, Eq, Default)]
#[derive(Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub const fn new(width: usize, height: usize) -> Self {
        Dimensions { width, height }
    }

    pub const fn area(self) -> usize {
        self.width * self.height
    }

    /// The dimensions of the vertex lattice surrounding a grid of tiles with
    /// these dimensions.
    pub const fn vertex_dims(self) -> Dimensions {
        Dimensions { width: self.width + 1, height: self.height + 1 }
    }

    pub const fn scaled(self, factor: usize) -> Dimensions {
        Dimensions { width: self.width * factor, height: self.height * factor }
    }

    pub const fn contains(self, point: Point) -> bool {
        point.x >= 0
            && point.x < self.width as isize
            && point.y >= 0
            && point.y < self.height as isize
    }

    /// Whether `point` lies on the outermost ring of these dimensions.
    pub const fn on_border(self, point: Point) -> bool {
        self.contains(point)
            && (point.x == 0
                || point.y == 0
                || point.x == self.width as isize - 1
                || point.y == self.height as isize - 1)
    }

    /// Iterates points within this rectangle.
    /// For yielded points, `0 <= x < self.width` and `0 <= y < self.height`.
    pub const fn iter_within(self) -> DimensionsIter {
        DimensionsIter::new(self)
    }

    pub const fn empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl PartialEq for Dimensions {
    fn eq(&self, other: &Self) -> bool {
        self.empty() && other.empty() || self.width == other.width && self.height == other.height
    }
}

/// Iterates exclusively - yielded values are never equal to the x or y of
/// `dims`
pub struct DimensionsIter {
    dims: Dimensions,
    current: Point,
}

impl DimensionsIter {
    pub const fn new(dims: Dimensions) -> Self {
        DimensionsIter { dims, current: Point::new(0, 0) }
    }
}

impl Iterator for DimensionsIter {
    type Item = Point;
    fn next(&mut self) -> Option<Self::Item> {
        // Note: iterates exclusively!
        if self.dims.empty() || self.current.y >= self.dims.height as isize {
            return None;
        }
        let val = self.current;

        // Step x, step y and reset x if out of bounds
        self.current.x += 1;
        if self.current.x >= self.dims.width as isize {
            self.current.x = 0;
            self.current.y += 1;
        }

        Some(val)
    }
}
