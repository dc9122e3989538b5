//! Screen-to-terrain picking.
//!
//! Terrain is drawn with every corner pushed "up" the screen by its height,
//! where up depends on the camera rotation. A point on screen therefore shows
//! the terrain at some flat position further down the view axis. The projector
//! walks that axis tile by tile and maps the point back onto the flat map.

use log::trace;

use crate::{
    engine::TileSettings,
    geometry::{Triangle, barycentric, flat_corners, triangle_contains},
    map::TerrainMap,
    math::{Dimensions, Point, Vec2},
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projector {
    tile_size: f32,
    height_scale: f32,
    max_height: u8,
}

impl Projector {
    pub const fn new(tile_size: f32, height_scale: f32, max_height: u8) -> Self {
        Projector { tile_size, height_scale, max_height }
    }

    pub fn from_settings(settings: &TileSettings) -> Self {
        Self::new(settings.tile_size as f32, settings.height_scale, settings.heights.max)
    }

    /// Number of tiles the march visits: enough to cover the largest
    /// displacement in both axes, plus the tile the point starts in.
    fn step_limit(&self) -> usize {
        let reach = self.max_height as f32 * self.height_scale / self.tile_size;
        (reach.ceil().max(0.0) as usize).saturating_mul(2).saturating_add(2)
    }

    /// Tiles needed to reach the far corner of a map of `size` from `start`.
    /// The march never finds terrain beyond that.
    fn span(start: Point, size: Dimensions) -> usize {
        let far = Point::new(size.width as isize, size.height as isize);
        let dx = start.x.abs_diff(0).max(start.x.abs_diff(far.x));
        let dy = start.y.abs_diff(0).max(start.y.abs_diff(far.y));
        dx.saturating_add(dy).saturating_add(1)
    }

    /// The flat map position drawn at screen position `point` when the camera
    /// is rotated by `rotation_degrees` clockwise. Points not covering any
    /// terrain are returned unchanged.
    pub fn project(&self, map: &TerrainMap, point: Vec2, rotation_degrees: f32) -> Vec2 {
        let up = Vec2::from_screen_angle(rotation_degrees);
        let mut best: Option<Vec2> = None;
        for tile in self.march(point, -up, map.get_size()) {
            for triangle in enum_iterator::all::<Triangle>() {
                let Some(hit) = self.hit(map, tile, triangle, point, up) else {
                    continue;
                };
                if best.is_none_or(|b| hit.dot(up) < b.dot(up)) {
                    best = Some(hit);
                }
            }
        }
        trace!(target: "projector", "{point} at {rotation_degrees}° -> {best:?}");
        best.unwrap_or(point)
    }

    /// Where `point` falls on `triangle` of `tile` once displaced, expressed
    /// on the flat triangle.
    fn hit(
        &self,
        map: &TerrainMap,
        tile: Point,
        triangle: Triangle,
        point: Vec2,
        up: Vec2,
    ) -> Option<Vec2> {
        let heights = map.get_height_for_triangles(tile)?;
        let corners = heights.corners(triangle);
        let flat = flat_corners(tile, corners.map(|(c, _)| c), self.tile_size);
        let displaced = [0, 1, 2].map(|i| flat[i] + up * (corners[i].1 as f32 * self.height_scale));
        if !triangle_contains(point, displaced) {
            return None;
        }
        let weights = barycentric(point, displaced)?;
        Some((0..3).fold(Vec2::ZERO, |acc, i| acc + flat[i] * weights[i]))
    }

    /// Tiles crossed by the ray from `start` along `dir`, in order.
    fn march(&self, start: Vec2, dir: Vec2, dims: Dimensions) -> Vec<Point> {
        let size = self.tile_size;
        let mut tile = start.tile(size);
        let axis = |pos: f32, dir: f32, cell: isize| -> (isize, f32, f32) {
            if dir > 0.0 {
                (1, ((cell + 1) as f32 * size - pos) / dir, size / dir)
            } else if dir < 0.0 {
                (-1, (cell as f32 * size - pos) / dir, -size / dir)
            } else {
                (0, f32::INFINITY, f32::INFINITY)
            }
        };
        let (step_x, mut next_x, delta_x) = axis(start.x, dir.x, tile.x);
        let (step_y, mut next_y, delta_y) = axis(start.y, dir.y, tile.y);

        let limit = self.step_limit().min(Self::span(tile, dims));
        let mut out = Vec::with_capacity(limit);
        for _ in 0..limit {
            out.push(tile);
            if next_x < next_y {
                tile.x += step_x;
                next_x += delta_x;
            } else {
                tile.y += step_y;
                next_y += delta_y;
            }
        }
        out
    }
}

/// Projects with a height scale of 1 and the full height range.
pub fn project_onto_terrain(
    point: Vec2,
    rotation_degrees: f32,
    tile_size: f32,
    map: &TerrainMap,
) -> Vec2 {
    Projector::new(tile_size, 1.0, u8::MAX).project(map, point, rotation_degrees)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{
        engine::{TerrainResolver, tests::test_engine},
        map::tests::flat_map,
    };

    fn raised_map(height: i32) -> TerrainMap {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        for vertex in Point::new(0, 0).iter_rect_incl(Point::new(4, 4)) {
            map.change_vertex_height(vertex, height, &engine).unwrap();
        }
        map
    }

    #[test_case(Vec2::new(40.0, 40.0))]
    #[test_case(Vec2::new(1.0, 100.0))]
    #[test_case(Vec2::new(64.0, 64.0))]
    fn flat_map_is_identity(point: Vec2) {
        let map = raised_map(0);
        for rotation in [0.0, 45.0, 90.0] {
            let projected = project_onto_terrain(point, rotation, 32.0, &map);
            assert!(projected.approx_eq(point, 1e-3), "{projected} at {rotation}°");
        }
    }

    #[test_case(0.0, Vec2::new(40.0, 48.0))]
    #[test_case(90.0, Vec2::new(32.0, 40.0))]
    #[test_case(180.0, Vec2::new(40.0, 32.0))]
    fn raised_map_shifts_along_view(rotation: f32, expected: Vec2) {
        let map = raised_map(8);
        let projected = project_onto_terrain(Vec2::new(40.0, 40.0), rotation, 32.0, &map);
        assert!(projected.approx_eq(expected, 1e-3), "{projected}");
    }

    #[test]
    fn nearest_surface_wins() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        // A ridge along vertex row 3 shows up above the flat row 2.
        for x in 0..=4 {
            map.change_vertex_height(Point::new(x, 3), 32, &engine).unwrap();
        }

        let projected = project_onto_terrain(Vec2::new(40.0, 70.0), 0.0, 32.0, &map);
        assert!(projected.y > 70.0, "{projected}");
    }

    #[test]
    fn points_off_the_map_are_unchanged() {
        let map = raised_map(8);
        let point = Vec2::new(-100.0, -100.0);
        assert_eq!(project_onto_terrain(point, 0.0, 32.0, &map), point);
    }

    #[test]
    fn scale_and_limit_come_from_settings() {
        let projector = Projector::from_settings(&test_engine().tile_settings());
        assert_eq!(projector, Projector::new(32.0, 1.0, 255));
        assert_eq!(projector.step_limit(), 18);
    }

    #[test]
    fn huge_height_scale_is_bounded_by_the_map() {
        let map = raised_map(0);
        let projector = Projector::new(32.0, 1e20, 255);
        assert_eq!(projector.step_limit(), usize::MAX);

        let point = Vec2::new(10.0, 10.0);
        let projected = projector.project(&map, point, 0.0);
        assert!(projected.approx_eq(point, 1e-3), "{projected}");
        assert_eq!(Projector::span(Point::new(1, 1), map.get_size()), 7);
    }
}
