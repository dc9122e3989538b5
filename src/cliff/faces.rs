//! The cliff-face layer.
//!
//! The layer has twice the map's resolution. Each map tile owns a 2x2 block:
//!
//! ```text
//!   +---------+---------+
//!   | surface | right   |
//!   +---------+---------+
//!   | bottom  | diagonal|
//!   +---------+---------+
//! ```
//!
//! The surface quadrant blends the cliff terrain in around every corner a
//! cliff touches; the other three draw the vertical faces.

use enum_map::EnumMap;
use log::debug;
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;

use crate::{
    cliff::{CliffGrid, EdgeKind},
    geometry::Corner,
    math::{Dimensions, Point},
    terrain::{TerrainType, TileRef},
    tile_layer::TileLayer,
    transition::{lookup_transition_tile, resolve_corner_mask, tile_seed},
};

/// Seeds of the cliff layer are kept apart from those of terrain layers.
const CLIFF_SEED_LAYER: usize = usize::MAX;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Quadrant {
    Surface,
    Right,
    Bottom,
    Diagonal,
}

impl Quadrant {
    const ALL: [Quadrant; 4] =
        [Quadrant::Surface, Quadrant::Right, Quadrant::Bottom, Quadrant::Diagonal];

    const fn offset(self) -> Point {
        match self {
            Quadrant::Surface => Point::new(0, 0),
            Quadrant::Right => Point::new(1, 0),
            Quadrant::Bottom => Point::new(0, 1),
            Quadrant::Diagonal => Point::new(1, 1),
        }
    }
}

pub fn cliff_layer_dims(size: Dimensions) -> Dimensions {
    size.scaled(2)
}

fn face_tile<'a>(terrain: &'a TerrainType, variants: &[u32], tile: Point) -> Option<TileRef<'a>> {
    let mut rng = ChaCha8Rng::seed_from_u64(tile_seed(tile, CLIFF_SEED_LAYER));
    variants.choose(&mut rng).map(|&index| TileRef { tileset: &terrain.tileset, tile: index })
}

fn resolve_quadrant<'a>(
    cliffs: &CliffGrid,
    terrain: &'a TerrainType,
    tile: Point,
    quadrant: Quadrant,
) -> Option<TileRef<'a>> {
    let flags = cliffs.flags(tile);
    let faces = &terrain.cliff_faces;
    match quadrant {
        Quadrant::Surface => {
            let mask = resolve_corner_mask(EnumMap::from_fn(|corner: Corner| {
                cliffs.edges_at(tile + corner.offset()).next().is_some()
            }));
            if mask.is_none() {
                return None;
            }
            lookup_transition_tile(terrain, mask, tile_seed(tile, CLIFF_SEED_LAYER))
        }
        Quadrant::Right if flags.has(EdgeKind::Right) => face_tile(terrain, &faces.right, tile),
        Quadrant::Bottom if flags.has(EdgeKind::Bottom) => face_tile(terrain, &faces.bottom, tile),
        Quadrant::Diagonal => match flags.diagonal()? {
            EdgeKind::Uphill => face_tile(terrain, &faces.uphill, tile),
            _ => face_tile(terrain, &faces.downhill, tile),
        },
        Quadrant::Right | Quadrant::Bottom => None,
    }
}

fn write_tile(
    layer: &mut TileLayer,
    cliffs: &CliffGrid,
    terrain: Option<&TerrainType>,
    tile: Point,
) {
    for quadrant in Quadrant::ALL {
        let resolved = terrain.and_then(|t| resolve_quadrant(cliffs, t, tile, quadrant));
        layer.set_ref(tile * 2 + quadrant.offset(), resolved);
    }
}

/// Builds the whole cliff-face layer. Without a cliff terrain the layer stays
/// empty.
pub fn generate_cliff_layer(cliffs: &CliffGrid, terrain: Option<&TerrainType>) -> TileLayer {
    let size = cliffs.size();
    let mut layer = match terrain {
        Some(t) => TileLayer::with_tileset(cliff_layer_dims(size), t.tileset.clone()),
        None => TileLayer::new(cliff_layer_dims(size)),
    };
    for tile in size.iter_within() {
        write_tile(&mut layer, cliffs, terrain, tile);
    }
    debug!(target: "terrain_layers", "Generated cliff layer for {size}");
    layer
}

/// Re-resolves the tiles whose cliff quadrants depend on edges owned by
/// `tile`: the tile itself and its eight neighbours.
pub fn regenerate_cliff_tiles(
    layer: &mut TileLayer,
    cliffs: &CliffGrid,
    terrain: Option<&TerrainType>,
    tile: Point,
) {
    let size = cliffs.size();
    for neighbour in (tile - Point::new(1, 1)).iter_rect_incl(tile + Point::new(1, 1)) {
        if size.contains(neighbour) {
            write_tile(layer, cliffs, terrain, neighbour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cliff::CliffEdge, engine::TerrainResolver, engine::tests::test_engine};

    #[test]
    fn faces_follow_flags() {
        let engine = test_engine();
        let rock = engine.terrain(engine.terrain_by_id("rock").unwrap()).unwrap();
        let mut cliffs = CliffGrid::new(Dimensions::new(4, 4));
        let edge = CliffEdge::bottom(Point::new(1, 1));
        cliffs.insert(edge);

        let layer = generate_cliff_layer(&cliffs, Some(rock));
        let tile_at = |p: Point| layer.tile_ref(p).map(|r| r.tile);

        assert_eq!(layer.dims(), Dimensions::new(8, 8));
        // Bottom face of tile (1, 1).
        assert_eq!(tile_at(Point::new(2, 3)), Some(21));
        assert_eq!(tile_at(Point::new(3, 2)), None);
        // Surface of tile (1, 1): its bottom corners touch the cliff.
        assert_eq!(tile_at(Point::new(2, 2)), Some(6));
        // Surface of tile (1, 2): its top corners touch the cliff.
        assert_eq!(tile_at(Point::new(2, 4)), Some(9));
        assert_eq!(tile_at(Point::new(6, 6)), None);
    }

    #[test]
    fn regenerating_one_tile_matches_full_rebuild() {
        let engine = test_engine();
        let rock = engine.terrain(engine.terrain_by_id("rock").unwrap()).unwrap();
        let mut cliffs = CliffGrid::new(Dimensions::new(4, 4));
        let mut layer = generate_cliff_layer(&cliffs, Some(rock));

        let edge = CliffEdge::right(Point::new(1, 1));
        cliffs.insert(edge);
        regenerate_cliff_tiles(&mut layer, &cliffs, Some(rock), edge.tile);

        assert_eq!(layer, generate_cliff_layer(&cliffs, Some(rock)));
    }

    #[test]
    fn no_cliff_terrain_gives_empty_layer() {
        let mut cliffs = CliffGrid::new(Dimensions::new(2, 2));
        cliffs.insert(CliffEdge::bottom(Point::new(0, 0)));
        assert!(generate_cliff_layer(&cliffs, None).is_empty());
    }
}
