use enum_map::EnumMap;
use log::{debug, trace};

use crate::{
    cliff::ring::{self, Wedge},
    engine::TerrainResolver,
    error::{LogicError, TerrainError, TerrainResult},
    geometry::{Corner, Triangle, TriangleType, barycentric, flat_corners},
    height::{HeightRange, SAMPLES_PER_TILE, TileHeights, TriangleHeights},
    map::TerrainMap,
    math::{Point, Vec2},
};

impl TerrainMap {
    pub fn triangle_type(&self, tile: Point) -> TriangleType {
        self.cliffs.triangle_type(tile)
    }

    /// All six samples of `tile` together with its split.
    pub fn get_height_for_triangles(&self, tile: Point) -> Option<TriangleHeights> {
        let heights = self.heights.get(tile)?;
        Some(TriangleHeights {
            triangle_type: self.triangle_type(tile),
            samples: heights.samples(),
        })
    }

    pub fn get_max_height_in_corners(&self, tile: Point) -> Option<EnumMap<Corner, u8>> {
        let heights = self.heights.get(tile)?;
        Some(heights.max_in_corners(self.triangle_type(tile)))
    }

    /// Flips the split of `tile`, keeping the height of every corner.
    ///
    /// A corner on the diagonal keeps the sample of its first triangle. Two
    /// swaps restore the tile only when both samples at each diagonal corner
    /// agree, as they do on any tile without a diagonal cliff.
    pub fn swap_triangle_type(&mut self, tile: Point) -> TerrainResult<()> {
        if !self.get_size().contains(tile) {
            return Err(TerrainError::OutOfBounds(tile));
        }
        if self.cliffs.flags(tile).diagonal().is_some() {
            return Err(LogicError::SwapUnderDiagonalCliff(tile).into());
        }
        self.swap_split(tile);
        Ok(())
    }

    /// Swaps without checking for a diagonal cliff.
    pub(super) fn swap_split(&mut self, tile: Point) {
        let tt = self.triangle_type(tile);
        if let Some(heights) = self.heights.get_mut(tile) {
            *heights = heights.swapped(tt);
        }
        self.cliffs.set_triangle_type(tile, tt.flipped());
        trace!(target: "terrain", "Swapped split of {tile} to {:?}", tt.flipped());
    }

    pub fn height_sample(&self, tile: Point, index: usize) -> Option<u8> {
        self.heights.get(tile)?.0.get(index).copied()
    }

    pub fn set_height_sample(
        &mut self,
        tile: Point,
        index: usize,
        value: u8,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        let range = ctx.tile_settings().heights;
        let sample = self
            .heights
            .get_mut(tile)
            .and_then(|h| h.0.get_mut(index))
            .ok_or(TerrainError::OutOfBounds(tile))?;
        *sample = range.clamp(value as i32);
        Ok(())
    }

    /// The highest sample touching `vertex`.
    pub fn vertex_height(&self, vertex: Point) -> Option<u8> {
        ring::vertex_wedges(&self.cliffs, vertex)
            .iter()
            .filter_map(|w| self.height_sample(w.tile, w.sample))
            .max()
    }

    /// Sets every sample at `vertex` to `height`, clamped.
    pub fn set_vertex_height(
        &mut self,
        vertex: Point,
        height: u8,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        let range = ctx.tile_settings().heights;
        let wedges = self.wedges_at(vertex)?;
        for wedge in wedges {
            if let Some(sample) = self.sample_mut(wedge) {
                *sample = range.clamp(height as i32);
            }
        }
        debug!(target: "terrain", "Set height of {vertex} to {height}");
        Ok(())
    }

    /// Raises (or, with a negative `delta`, lowers) every sample at `vertex`.
    pub fn change_vertex_height(
        &mut self,
        vertex: Point,
        delta: i32,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        let wedges = self.wedges_at(vertex)?;
        self.raise_wedges(&wedges, delta, ctx.tile_settings().heights);
        debug!(target: "terrain", "Changed height of {vertex} by {delta}");
        Ok(())
    }

    /// Height of the flat surface at `point`, interpolated over the triangle
    /// containing it. `None` outside the map.
    pub fn height_at_point(&self, point: Vec2, tile_size: f32) -> Option<f32> {
        let tile = point.tile(tile_size);
        let heights = self.heights.get(tile)?;
        let tt = self.triangle_type(tile);
        let local = point * (1.0 / tile_size) - Vec2::from(tile);
        let triangle = Triangle::at_local(tt, local.x, local.y);
        let weights = barycentric(point, flat_corners(tile, tt.corners(triangle), tile_size))?;
        let base = TileHeights::sample_index(triangle, 0);
        Some((0..3).map(|slot| weights[slot] * heights.0[base + slot] as f32).sum())
    }

    pub(super) fn raise_wedges(&mut self, wedges: &[Wedge], delta: i32, range: HeightRange) {
        for &wedge in wedges {
            if let Some(sample) = self.sample_mut(wedge) {
                *sample = range.offset(*sample, delta);
            }
        }
    }

    fn wedges_at(&self, vertex: Point) -> TerrainResult<Vec<Wedge>> {
        if !self.get_size().vertex_dims().contains(vertex) {
            return Err(TerrainError::OutOfBounds(vertex));
        }
        Ok(ring::vertex_wedges(&self.cliffs, vertex))
    }

    fn sample_mut(&mut self, wedge: Wedge) -> Option<&mut u8> {
        debug_assert!(wedge.sample < SAMPLES_PER_TILE);
        self.heights.get_mut(wedge.tile)?.0.get_mut(wedge.sample)
    }
}

#[cfg(test)]
mod tests {
    use assertables::*;

    use super::*;
    use crate::{
        engine::tests::test_engine,
        map::tests::flat_map,
    };

    #[test]
    fn vertex_height_changes_every_touching_sample() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let v = Point::new(2, 2);
        map.change_vertex_height(v, 5, &engine).unwrap();

        assert_eq!(map.vertex_height(v), Some(5));
        assert_eq!(map.vertex_height(Point::new(2, 1)), Some(0));
        for tile in Point::new(1, 1).iter_rect_incl(Point::new(2, 2)) {
            let corners = map.get_max_height_in_corners(tile).unwrap();
            let corner = Corner::from_offset(v - tile).unwrap();
            assert_eq!(corners[corner], 5, "tile {tile}");
        }

        map.change_vertex_height(v, -20, &engine).unwrap();
        assert_eq!(map.vertex_height(v), Some(0));
        assert_eq!(
            map.change_vertex_height(Point::new(5, 0), 1, &engine),
            Err(TerrainError::OutOfBounds(Point::new(5, 0)))
        );
    }

    #[test]
    fn swap_twice_restores_samples() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let tile = Point::new(1, 1);
        map.set_vertex_height(Point::new(1, 1), 10, &engine).unwrap();
        map.set_vertex_height(Point::new(2, 2), 30, &engine).unwrap();
        let before = map.get_height_for_triangles(tile).unwrap();

        map.swap_triangle_type(tile).unwrap();
        let swapped = map.get_height_for_triangles(tile).unwrap();
        assert_eq!(swapped.triangle_type, TriangleType::Downhill);
        assert_eq!(map.get_max_height_in_corners(tile), Some(before_corners(&before)));

        map.swap_triangle_type(tile).unwrap();
        assert_eq!(map.get_height_for_triangles(tile), Some(before));
    }

    fn before_corners(heights: &TriangleHeights) -> EnumMap<Corner, u8> {
        TileHeights(heights.samples).max_in_corners(heights.triangle_type)
    }

    #[test]
    fn swap_under_diagonal_cliff_is_refused() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let tile = Point::new(1, 1);
        map.cliffs.insert(crate::cliff::CliffEdge::uphill(tile));

        assert_eq!(
            map.swap_triangle_type(tile),
            Err(TerrainError::Logic(LogicError::SwapUnderDiagonalCliff(tile)))
        );
        assert_matches!(map.swap_triangle_type(Point::new(4, 0)), Err(TerrainError::OutOfBounds(_)));
    }

    #[test]
    fn heights_clamp_to_configured_range() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        map.set_height_sample(Point::new(0, 0), 3, 250, &engine).unwrap();
        map.change_vertex_height(Point::new(3, 3), 300, &engine).unwrap();

        assert_eq!(map.height_sample(Point::new(0, 0), 3), Some(250));
        assert_eq!(map.vertex_height(Point::new(3, 3)), Some(255));
        assert_none!(map.height_sample(Point::new(0, 0), 6));
    }

    #[test]
    fn height_at_point_interpolates() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        map.set_vertex_height(Point::new(1, 0), 32, &engine).unwrap();

        // Halfway along the top edge of tile (0, 0).
        let h = map.height_at_point(Vec2::new(16.0, 0.0), 32.0).unwrap();
        assert!((h - 16.0).abs() < 1e-4, "{h}");
        let h = map.height_at_point(Vec2::new(32.0, 0.0), 32.0).unwrap();
        assert!((h - 32.0).abs() < 1e-4, "{h}");
        assert_none!(map.height_at_point(Vec2::new(-1.0, 5.0), 32.0));
    }
}
