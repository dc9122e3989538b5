use enum_map::EnumMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{Corner, Triangle, TriangleType};

pub const SAMPLES_PER_TILE: usize = 6;

/// Inclusive clamp range applied to every height mutation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct HeightRange {
    pub min: u8,
    pub max: u8,
}

impl HeightRange {
    pub const FULL: HeightRange = HeightRange { min: u8::MIN, max: u8::MAX };

    pub fn clamp(self, value: i32) -> u8 {
        value.clamp(self.min as i32, self.max as i32) as u8
    }

    pub fn offset(self, value: u8, delta: i32) -> u8 {
        self.clamp(value as i32 + delta)
    }
}

impl Default for HeightRange {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[derive(Serialize, Deserialize)]
pub struct TileHeights(pub [u8; SAMPLES_PER_TILE]);

/// The six samples of a tile together with the triangulation they belong to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TriangleHeights {
    pub triangle_type: TriangleType,
    pub samples: [u8; SAMPLES_PER_TILE],
}

impl TriangleHeights {
    pub fn corners(&self, triangle: Triangle) -> [(Corner, u8); 3] {
        let corners = self.triangle_type.corners(triangle);
        let base = triangle.index() * 3;
        [0, 1, 2].map(|slot| (corners[slot], self.samples[base + slot]))
    }
}

impl TileHeights {
    pub const fn flat(height: u8) -> Self {
        TileHeights([height; SAMPLES_PER_TILE])
    }

    pub const fn samples(&self) -> [u8; SAMPLES_PER_TILE] {
        self.0
    }

    pub const fn sample_index(triangle: Triangle, slot: usize) -> usize {
        triangle.index() * 3 + slot
    }

    /// Index of the sample for `corner` in `triangle`, if the triangle touches
    /// that corner.
    pub fn index_of(tt: TriangleType, corner: Corner, triangle: Triangle) -> Option<usize> {
        tt.slot(corner, triangle).map(|slot| Self::sample_index(triangle, slot))
    }

    pub fn get(&self, tt: TriangleType, corner: Corner, triangle: Triangle) -> Option<u8> {
        Self::index_of(tt, corner, triangle).map(|i| self.0[i])
    }

    pub fn get_mut(
        &mut self,
        tt: TriangleType,
        corner: Corner,
        triangle: Triangle,
    ) -> Option<&mut u8> {
        Self::index_of(tt, corner, triangle).map(|i| &mut self.0[i])
    }

    /// The sample a corner reports when only one value is wanted: the one in
    /// the first triangle containing it.
    pub fn corner(&self, tt: TriangleType, corner: Corner) -> u8 {
        let triangle = tt.first_triangle_at(corner);
        self.get(tt, corner, triangle).unwrap_or_default()
    }

    /// Reduces the one or two samples present at each quad corner to their
    /// maximum.
    pub fn max_in_corners(&self, tt: TriangleType) -> EnumMap<Corner, u8> {
        EnumMap::from_fn(|corner| {
            tt.triangles_at(corner)
                .filter_map(|triangle| self.get(tt, corner, triangle))
                .max()
                .unwrap_or_default()
        })
    }

    /// Re-lays the samples out for the opposite triangulation.
    ///
    /// Each corner keeps the value it had in the first old triangle containing
    /// it, so corner heights survive the swap. Swapping twice is lossless as
    /// long as the two samples at each diagonal corner agree.
    pub fn swapped(&self, tt: TriangleType) -> TileHeights {
        let new_type = tt.flipped();
        let mut out = [0; SAMPLES_PER_TILE];
        for triangle in enum_iterator::all::<Triangle>() {
            for (slot, corner) in new_type.corners(triangle).into_iter().enumerate() {
                out[Self::sample_index(triangle, slot)] = self.corner(tt, corner);
            }
        }
        TileHeights(out)
    }

    pub fn max(&self) -> u8 {
        self.0.into_iter().max().unwrap_or_default()
    }

    pub fn min(&self) -> u8 {
        self.0.into_iter().min().unwrap_or_default()
    }
}
