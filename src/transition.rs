//! Turns per-vertex terrain assignments into transition tiles.
//!
//! Each terrain of a set gets its own layer. A tile of layer `i` shows the
//! transition tile of terrain `i` selected by a 4-bit mask of the tile's
//! corners covered by that terrain (or anything stacked above it). Drawing the
//! layers bottom to top then produces the blended result.

use std::fmt::{Display, Formatter};

use enum_map::EnumMap;
use log::{debug, trace};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use static_assertions::const_assert_eq;

use crate::{
    engine::TerrainResolver,
    geometry::Corner,
    math::{Dimensions, Grid, Point},
    terrain::{TerrainHandle, TerrainSet, TerrainType, TileRef},
    tile_layer::TileLayer,
};

pub const TRANSITION_SLOTS: usize = 16;

const_assert_eq!(TRANSITION_SLOTS, 1 << 4);

/// Which corners of a tile a terrain covers. Bits: TL=8, TR=1, BR=2, BL=4.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CornerMask(u8);

impl CornerMask {
    pub const NONE: CornerMask = CornerMask(0);
    pub const ALL: CornerMask = CornerMask(15);

    pub const fn new(bits: u8) -> Option<CornerMask> {
        if (bits as usize) < TRANSITION_SLOTS { Some(CornerMask(bits)) } else { None }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_all(self) -> bool {
        self.0 == Self::ALL.0
    }

    pub const fn contains(self, corner: Corner) -> bool {
        self.0 & corner.mask_bit() != 0
    }

    pub const fn with(self, corner: Corner) -> CornerMask {
        CornerMask(self.0 | corner.mask_bit())
    }
}

impl Display for CornerMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

/// How a corner's terrain is compared against the terrain being resolved.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CornerMatch {
    /// The corner holds exactly this terrain.
    Exact,
    /// The corner holds this terrain or one stacked above it.
    AtOrAbove,
}

pub fn resolve_corner_mask(corners: EnumMap<Corner, bool>) -> CornerMask {
    corners
        .into_iter()
        .filter(|&(_, set)| set)
        .fold(CornerMask::NONE, |mask, (corner, _)| mask.with(corner))
}

/// Mask of the corners of `tile` whose vertex matches `terrain`.
pub fn corner_mask_at(
    vertices: &Grid<TerrainHandle>,
    set: &TerrainSet,
    tile: Point,
    terrain: TerrainHandle,
    mode: CornerMatch,
) -> CornerMask {
    let target = set.stack_index(terrain);
    resolve_corner_mask(EnumMap::from_fn(|corner: Corner| {
        let vertex = vertices.get(tile + corner.offset()).copied().unwrap_or_default();
        match mode {
            CornerMatch::Exact => vertex == terrain && !vertex.is_empty(),
            CornerMatch::AtOrAbove => match (set.stack_index(vertex), target) {
                (Some(here), Some(target)) => here >= target,
                _ => false,
            },
        }
    }))
}

/// Seed for the variant choice at one tile of one layer, so the same map
/// always regenerates the same tiles.
pub fn tile_seed(tile: Point, layer: usize) -> u64 {
    let x = tile.x as u64 & 0xFFFF_FFFF;
    let y = tile.y as u64 & 0xFFFF_FFFF;
    (x << 32 | y) ^ (layer as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// The tile `terrain` authored for `mask`, choosing among variants with the
/// given seed. `None` for the empty mask or a mask nothing was authored for.
pub fn lookup_transition_tile(
    terrain: &TerrainType,
    mask: CornerMask,
    seed: u64,
) -> Option<TileRef<'_>> {
    let variants = terrain.transitions.variants(mask);
    let tile = match variants {
        [] => return None,
        [only] => *only,
        _ => *variants.choose(&mut ChaCha8Rng::seed_from_u64(seed))?,
    };
    Some(TileRef { tileset: &terrain.tileset, tile })
}

/// Resolves one tile of one terrain layer.
pub fn resolve_layer_tile<'a>(
    vertices: &Grid<TerrainHandle>,
    set: &TerrainSet,
    terrain: &'a TerrainType,
    layer: usize,
    tile: Point,
) -> Option<TileRef<'a>> {
    let handle = set.get(layer)?;
    let mask = corner_mask_at(vertices, set, tile, handle, CornerMatch::AtOrAbove);
    if mask.is_none() {
        return None;
    }
    let resolved = lookup_transition_tile(terrain, mask, tile_seed(tile, layer));
    if resolved.is_none() {
        trace!(target: "terrain_layers", "{} has no tile for mask {mask} at {tile}", terrain.id);
    }
    resolved
}

/// Builds every terrain layer of a map from scratch, bottom layer first.
pub fn generate_terrain_layers(
    vertices: &Grid<TerrainHandle>,
    set: &TerrainSet,
    ctx: &dyn TerrainResolver,
) -> Vec<TileLayer> {
    let dims = tile_dims(vertices);
    let layers = set
        .terrains()
        .iter()
        .enumerate()
        .map(|(layer, &handle)| {
            let Some(terrain) = ctx.terrain(handle) else {
                return TileLayer::new(dims);
            };
            let mut out = TileLayer::with_tileset(dims, terrain.tileset.clone());
            for tile in dims.iter_within() {
                out.set_ref(tile, resolve_layer_tile(vertices, set, terrain, layer, tile));
            }
            out
        })
        .collect::<Vec<_>>();
    debug!(target: "terrain_layers", "Generated {} terrain layers of {dims}", layers.len());
    layers
}

/// Re-resolves the up to four tiles touching `vertex` in every layer.
pub fn regenerate_around_vertex(
    layers: &mut [TileLayer],
    vertices: &Grid<TerrainHandle>,
    set: &TerrainSet,
    ctx: &dyn TerrainResolver,
    vertex: Point,
) {
    let dims = tile_dims(vertices);
    let tiles = (vertex - Point::new(1, 1))
        .iter_rect_incl(vertex)
        .filter(|&t| dims.contains(t))
        .collect::<Vec<_>>();
    for (layer, out) in layers.iter_mut().enumerate() {
        let Some(terrain) = set.get(layer).and_then(|h| ctx.terrain(h)) else {
            continue;
        };
        for &tile in &tiles {
            out.set_ref(tile, resolve_layer_tile(vertices, set, terrain, layer, tile));
        }
    }
    trace!(target: "terrain_layers", "Regenerated {} tiles around vertex {vertex}", tiles.len());
}

fn tile_dims(vertices: &Grid<TerrainHandle>) -> Dimensions {
    let dims = vertices.dims();
    Dimensions::new(dims.width.saturating_sub(1), dims.height.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use test_case::test_matrix;

    use super::*;
    use crate::engine::tests::test_engine;

    #[test_matrix([false, true], [false, true], [false, true], [false, true])]
    fn corner_mask_bits(tl: bool, tr: bool, br: bool, bl: bool) {
        let corners = EnumMap::from_array([tl, tr, br, bl]);
        let expected = 8 * tl as u8 + tr as u8 + 2 * br as u8 + 4 * bl as u8;

        assert_eq!(resolve_corner_mask(corners).bits(), expected);
    }

    #[test]
    fn mask_bounds() {
        assert_eq!(CornerMask::new(15), Some(CornerMask::ALL));
        assert_eq!(CornerMask::new(16), None);
        assert!(CornerMask::new(0).unwrap().is_none());
        assert!(CornerMask::ALL.contains(Corner::BottomLeft));
    }

    #[test]
    fn variant_choice_is_deterministic() {
        let engine = test_engine();
        let mut terrain = engine.terrain(engine.terrain_by_id("grass").unwrap()).unwrap().clone();
        for tile in 100..110 {
            terrain.transitions.push(CornerMask::ALL, tile);
        }

        let seed = tile_seed(Point::new(3, 7), 1);
        let first = lookup_transition_tile(&terrain, CornerMask::ALL, seed).unwrap().tile;
        for _ in 0..5 {
            assert_eq!(lookup_transition_tile(&terrain, CornerMask::ALL, seed).unwrap().tile, first);
        }

        let seen = (0..64)
            .filter_map(|x| lookup_transition_tile(&terrain, CornerMask::ALL, tile_seed(Point::new(x, 0), 0)))
            .map(|r| r.tile)
            .collect::<std::collections::BTreeSet<_>>();
        assert_gt!(seen.len(), 1);
    }

    #[test]
    fn none_mask_has_no_tile() {
        let engine = test_engine();
        let grass = engine.terrain(engine.terrain_by_id("grass").unwrap()).unwrap();
        assert_eq!(lookup_transition_tile(grass, CornerMask::NONE, 0), None);
    }

    #[test]
    fn layers_stack_at_or_above() {
        let engine = test_engine();
        let set = engine.terrain_set_by_id("temperate").unwrap();
        let [dirt, grass, snow] = [0, 1, 2].map(|i| set.get(i).unwrap());

        // 2x1 tiles: vertex row 0 is dirt, grass, snow; row 1 is all dirt.
        let mut vertices = Grid::new_fill(Dimensions::new(3, 2), dirt);
        vertices.set(Point::new(1, 0), grass);
        vertices.set(Point::new(2, 0), snow);

        let layers = generate_terrain_layers(&vertices, set, &engine);
        assert_eq!(layers.len(), 3);

        let tile = |layer: usize, x: isize| layers[layer].tile_ref(Point::new(x, 0)).map(|r| r.tile);
        // Dirt covers everything.
        assert_eq!(tile(0, 0), Some(15));
        assert_eq!(tile(0, 1), Some(15));
        // Grass: tile 0 has TR, tile 1 has TL and TR (snow is above grass).
        assert_eq!(tile(1, 0), Some(1));
        assert_eq!(tile(1, 1), Some(9));
        // Snow only authored the full tile, so its partial mask resolves to nothing.
        assert_eq!(tile(2, 0), None);
        assert_eq!(tile(2, 1), None);
    }

    #[test]
    fn exact_match_ignores_higher_terrains() {
        let engine = test_engine();
        let set = engine.terrain_set_by_id("temperate").unwrap();
        let [dirt, grass, snow] = [0, 1, 2].map(|i| set.get(i).unwrap());

        let mut vertices = Grid::new_fill(Dimensions::new(2, 2), grass);
        vertices.set(Point::new(1, 1), snow);
        let tile = Point::new(0, 0);

        assert_eq!(corner_mask_at(&vertices, set, tile, grass, CornerMatch::Exact).bits(), 13);
        assert_eq!(corner_mask_at(&vertices, set, tile, grass, CornerMatch::AtOrAbove).bits(), 15);
        assert_eq!(corner_mask_at(&vertices, set, tile, dirt, CornerMatch::Exact).bits(), 0);
    }

    #[test]
    fn empty_vertices_are_below_every_layer() {
        let engine = test_engine();
        let set = engine.terrain_set_by_id("temperate").unwrap();
        let dirt = set.get(0).unwrap();

        let mut vertices = Grid::new_fill(Dimensions::new(2, 2), dirt);
        vertices.set(Point::new(0, 0), TerrainHandle::EMPTY);

        let mask = corner_mask_at(&vertices, set, Point::new(0, 0), dirt, CornerMatch::AtOrAbove);
        assert_eq!(mask.bits(), 7);
    }

    #[test]
    fn vertex_edit_regenerates_neighbours() {
        let engine = test_engine();
        let set = engine.terrain_set_by_id("temperate").unwrap();
        let [dirt, grass] = [0, 1].map(|i| set.get(i).unwrap());

        let mut vertices = Grid::new_fill(Dimensions::new(4, 4), dirt);
        let mut layers = generate_terrain_layers(&vertices, set, &engine);
        assert!(layers[1].is_empty());

        vertices.set(Point::new(1, 1), grass);
        regenerate_around_vertex(&mut layers, &vertices, set, &engine, Point::new(1, 1));

        assert_eq!(layers, generate_terrain_layers(&vertices, set, &engine));
        assert_eq!(layers[1].tile_ref(Point::new(0, 0)).map(|r| r.tile), Some(2));
        assert_eq!(layers[1].tile_ref(Point::new(1, 1)).map(|r| r.tile), Some(8));
    }
}
