use log::{debug, info};

use crate::{
    cliff::{self, CliffAnchor, CliffEdge, VertexCliffs, faces, ring},
    engine::TerrainResolver,
    error::{LogicError, TerrainResult},
    map::TerrainMap,
    math::{Point, Vec2},
};

impl TerrainMap {
    pub fn has_cliff(&self, edge: CliffEdge) -> bool {
        self.cliffs.has(edge)
    }

    pub fn vertex_cliffs(&self, vertex: Point) -> VertexCliffs {
        self.cliffs.vertex_cliffs(vertex)
    }

    pub fn can_add_cliff(&self, edge: CliffEdge) -> bool {
        self.cliffs.can_add_cliff(edge)
    }

    pub fn can_start_cliff(&self, edge: CliffEdge) -> Option<CliffAnchor> {
        self.cliffs.can_start_cliff(edge)
    }

    pub fn can_add_or_start_cliff(&self, first: CliffEdge, second: CliffEdge) -> bool {
        self.cliffs.can_add_or_start_cliff(first, second)
    }

    pub fn validate_cliffs(&self) -> TerrainResult<()> {
        self.cliffs.validate()
    }

    pub fn isolated_cliffs(&self) -> Vec<CliffEdge> {
        self.cliffs.isolated_cliffs()
    }

    /// The in-map cliff edge nearest to a flat map position.
    pub fn nearest_edge(&self, point: Vec2, tile_size: f32) -> Option<CliffEdge> {
        let edge = CliffEdge::from(cliff::nearest_edge(point, tile_size));
        edge.in_map(self.get_size()).then_some(edge)
    }

    /// Adds a cliff along `edge` and raises its high side by `delta`.
    ///
    /// Returns `Ok(false)` without touching the map if the edge may not be
    /// placed. Adding an existing edge succeeds and applies `delta` again.
    pub fn add_cliff(
        &mut self,
        edge: CliffEdge,
        delta: i32,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<bool> {
        if !self.cliffs.can_add_cliff(edge) {
            debug!(target: "cliff", "Refused cliff {edge}");
            return Ok(false);
        }
        if let Some(split) = edge.kind.required_split()
            && self.triangle_type(edge.tile) != split
        {
            self.swap_split(edge.tile);
        }
        self.cliffs.insert(edge);

        let range = ctx.tile_settings().heights;
        for vertex in edge.vertices() {
            let wedges = match self.cliffs.vertex_cliffs(vertex) {
                VertexCliffs::TooMany(_) => return Err(LogicError::TooManyCliffs(vertex).into()),
                cliffs if cliffs.count() <= 1 && !self.cliffs.is_border_vertex(vertex) => {
                    ring::vertex_wedges(&self.cliffs, vertex)
                }
                _ => ring::high_side_wedges(&self.cliffs, vertex, edge)?,
            };
            self.raise_wedges(&wedges, delta, range);
        }

        let terrain = self.cliff_terrain(ctx);
        faces::regenerate_cliff_tiles(&mut self.cliff_layer, &self.cliffs, terrain, edge.tile);
        debug!(target: "cliff", "Added cliff {edge} ({delta:+})");
        Ok(true)
    }

    /// Removes the cliff flag along `edge`. Heights are left as they are.
    pub fn remove_cliff(&mut self, edge: CliffEdge, ctx: &dyn TerrainResolver) -> bool {
        if !self.cliffs.remove(edge) {
            return false;
        }
        let terrain = self.cliff_terrain(ctx);
        faces::regenerate_cliff_tiles(&mut self.cliff_layer, &self.cliffs, terrain, edge.tile);
        debug!(target: "cliff", "Removed cliff {edge}");
        true
    }

    /// Removes every cliff, keeping the heights.
    pub fn clear_cliffs(&mut self, ctx: &dyn TerrainResolver) {
        let edges = self.cliffs.edges().collect::<Vec<_>>();
        for &edge in &edges {
            self.cliffs.remove(edge);
        }
        self.regenerate_cliff_layer(ctx);
        info!(target: "cliff", "Cleared {} cliffs", edges.len());
    }
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use rand::{Rng, SeedableRng, seq::SliceRandom};
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::{
        cliff::EdgeKind,
        engine::tests::test_engine,
        geometry::{Corner, TriangleType},
        map::tests::flat_map,
        math::Dimensions,
    };

    #[test]
    fn isolated_cliff_raises_both_endpoints() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let edge = CliffEdge::bottom(Point::new(1, 1));

        assert_eq!(map.add_cliff(edge, 8, &engine), Ok(true));
        assert!(map.has_cliff(edge));
        assert_eq!(map.vertex_height(Point::new(1, 2)), Some(8));
        assert_eq!(map.vertex_height(Point::new(2, 2)), Some(8));
        for neighbour in [Point::new(0, 2), Point::new(3, 2), Point::new(1, 1), Point::new(2, 3)] {
            assert_eq!(map.vertex_height(neighbour), Some(0), "vertex {neighbour}");
        }

        let right = CliffEdge::right(Point::new(1, 1));
        assert!(!map.can_add_cliff(right));
        let before = map.clone();
        assert_eq!(map.add_cliff(right, 8, &engine), Ok(false));
        assert_eq!(map, before);
    }

    #[test]
    fn adding_twice_applies_height_twice() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let edge = CliffEdge::right(Point::new(1, 1));

        map.add_cliff(edge, 4, &engine).unwrap();
        let flags = map.cliffs().clone();
        map.add_cliff(edge, 4, &engine).unwrap();

        assert_eq!(map.cliffs(), &flags);
        assert_eq!(map.vertex_height(Point::new(2, 1)), Some(8));
    }

    #[test]
    fn second_edge_raises_only_the_high_side() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let upper = CliffEdge::right(Point::new(1, 1));
        let lower = CliffEdge::right(Point::new(1, 2));

        map.add_cliff(upper, 4, &engine).unwrap();
        map.add_cliff(lower, 4, &engine).unwrap();

        let corner = |tile: Point, corner: Corner| map.get_max_height_in_corners(tile).unwrap()[corner];
        // East of the run.
        assert_eq!(corner(Point::new(2, 1), Corner::BottomLeft), 8);
        assert_eq!(corner(Point::new(2, 2), Corner::TopLeft), 8);
        // West of the run only saw the first, uniform raise.
        assert_eq!(corner(Point::new(1, 1), Corner::BottomRight), 4);
        assert_eq!(corner(Point::new(1, 2), Corner::TopRight), 4);
        assert_eq!(map.vertex_cliffs(Point::new(2, 2)), VertexCliffs::Two(upper, lower));
    }

    #[test]
    fn diagonal_cliff_swaps_split() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let tile = Point::new(1, 1);

        assert!(map.add_cliff(CliffEdge::downhill(tile), 2, &engine).unwrap());
        assert_eq!(map.triangle_type(tile), TriangleType::Downhill);
        assert!(!map.add_cliff(CliffEdge::uphill(tile), 2, &engine).unwrap());
        assert_eq!(map.validate_cliffs(), Ok(()));
    }

    #[test]
    fn cliff_layer_follows_edits() {
        let engine = test_engine();
        let mut map = flat_map(&engine);
        let edge = CliffEdge::bottom(Point::new(1, 1));

        map.add_cliff(edge, 8, &engine).unwrap();
        assert_eq!(map.cliff_layer().tile_ref(Point::new(2, 3)).map(|r| r.tile), Some(21));
        assert!(map.remove_cliff(edge, &engine));
        assert!(!map.remove_cliff(edge, &engine));
        assert!(map.cliff_layer().is_empty());
        // Heights stay where the cliff left them.
        assert_eq!(map.vertex_height(Point::new(1, 2)), Some(8));
    }

    #[test]
    fn gated_edits_keep_vertex_degree() {
        let engine = test_engine();
        let mut map = TerrainMap::new(Dimensions::new(6, 6), "temperate", 0, &engine).unwrap();
        let candidates = Point::new(0, 0).iter_rect_incl(Point::new(5, 5)).flat_map(|t| {
            [CliffEdge::right(t), CliffEdge::bottom(t), CliffEdge::uphill(t), CliffEdge::downhill(t)]
        });
        for edge in candidates {
            map.add_cliff(edge, 1, &engine).unwrap();
        }

        assert_ok!(map.validate_cliffs());
        for vertex in Point::new(0, 0).iter_rect_incl(Point::new(6, 6)) {
            let limit = if map.cliffs().is_border_vertex(vertex) { 1 } else { 2 };
            assert_le!(map.vertex_cliffs(vertex).count(), limit);
        }
    }

    #[test]
    fn started_runs_are_never_isolated() {
        let engine = test_engine();
        let kinds = enum_iterator::all::<EdgeKind>().collect::<Vec<_>>();
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut map = TerrainMap::new(Dimensions::new(7, 7), "temperate", 0, &engine).unwrap();
            for _ in 0..60 {
                let tile = Point::new(rng.gen_range(0..7), rng.gen_range(0..7));
                let edge = CliffEdge::new(tile, *kinds.choose(&mut rng).unwrap());
                match map.can_start_cliff(edge) {
                    Some(CliffAnchor::Existing(_) | CliffAnchor::Border) => {
                        assert!(map.add_cliff(edge, 1, &engine).unwrap(), "seed {seed}: {edge}");
                    }
                    Some(CliffAnchor::Pair(partner)) => {
                        assert!(map.add_cliff(edge, 1, &engine).unwrap(), "seed {seed}: {edge}");
                        assert!(
                            map.add_cliff(partner, 1, &engine).unwrap(),
                            "seed {seed}: {partner}"
                        );
                    }
                    None => {}
                }
            }

            assert_ok!(map.validate_cliffs());
            let isolated = map.isolated_cliffs();
            assert!(isolated.is_empty(), "seed {seed}: {isolated:?}");
        }
    }

    #[test]
    fn nearest_edge_stays_in_map() {
        let engine = test_engine();
        let map = flat_map(&engine);

        assert_eq!(
            map.nearest_edge(Vec2::new(40.0, 62.0), 32.0),
            Some(CliffEdge::bottom(Point::new(1, 1)))
        );
        assert_none!(map.nearest_edge(Vec2::new(20.0, 1.0), 32.0));
    }
}
