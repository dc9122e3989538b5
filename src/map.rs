//! The editable terrain map.
//!
//! A map of `w x h` tiles stores one terrain per vertex on a `(w+1) x (h+1)`
//! lattice, six height samples and one cliff record per tile, and the layers
//! resolved from them. Every mutation regenerates the layers it affects before
//! returning, so the layers can be submitted at any time.

mod cliffs;
mod heights;
mod resize;

use itertools::Itertools;
use log::{debug, info};

use crate::{
    cliff::{CliffGrid, faces},
    engine::TerrainResolver,
    error::{TerrainError, TerrainResult},
    height::TileHeights,
    math::{Dimensions, Grid, Point},
    terrain::{TerrainHandle, TerrainSet, TerrainType, TileRef},
    tile_layer::{LayerSlot, TileLayer, TileMapSink},
    transition,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMap {
    terrain_set: TerrainSet,
    vertices: Grid<TerrainHandle>,
    heights: Grid<TileHeights>,
    cliffs: CliffGrid,
    base_layer: TileLayer,
    terrain_layers: Vec<TileLayer>,
    cliff_layer: TileLayer,
}

/// Everything a map is made of, before its layers are checked or generated.
pub(crate) struct MapParts {
    pub terrain_set: TerrainSet,
    pub vertices: Grid<TerrainHandle>,
    pub heights: Grid<TileHeights>,
    pub cliffs: CliffGrid,
    pub base_layer: TileLayer,
    pub terrain_layers: Vec<TileLayer>,
    pub cliff_layer: Option<TileLayer>,
}

impl TerrainMap {
    /// A map of `size` tiles with every vertex set to the engine's background
    /// terrain (or empty, if the background is not part of the set) and every
    /// sample at `height`.
    pub fn new(
        size: Dimensions,
        terrain_set: &str,
        height: u8,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<Self> {
        let set = ctx
            .terrain_set_by_id(terrain_set)
            .ok_or_else(|| TerrainError::UnknownTerrainSet(terrain_set.to_string()))?;
        Self::new_filled(size, set.clone(), background_fill(set, ctx), height, ctx)
    }

    pub fn new_filled(
        size: Dimensions,
        terrain_set: TerrainSet,
        fill: TerrainHandle,
        height: u8,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<Self> {
        if size.empty() {
            return Err(TerrainError::EmptyMap(size));
        }
        if !terrain_set.accepts(fill) {
            return Err(TerrainError::TerrainNotInSet(terrain_id(ctx, fill)));
        }
        let height = ctx.tile_settings().heights.clamp(height as i32);
        let map = Self::from_parts(
            MapParts {
                vertices: Grid::new_fill(size.vertex_dims(), fill),
                heights: Grid::new_fill(size, TileHeights::flat(height)),
                cliffs: CliffGrid::new(size),
                base_layer: TileLayer::new(size),
                terrain_layers: Vec::new(),
                cliff_layer: None,
                terrain_set,
            },
            ctx,
        )?;
        info!(target: "terrain", "Created {size} map with terrain set `{}`", map.terrain_set.id);
        Ok(map)
    }

    /// Assembles a map, checking that every part matches the base layer's
    /// size and that the cliffs are legal. Missing terrain layers and a
    /// missing or empty cliff layer are generated.
    pub(crate) fn from_parts(parts: MapParts, ctx: &dyn TerrainResolver) -> TerrainResult<Self> {
        let size = parts.base_layer.dims();
        if size.empty() {
            return Err(TerrainError::EmptyMap(size));
        }
        let expect = |layer: &str, expected: Dimensions, found: Dimensions| {
            if expected == found {
                Ok(())
            } else {
                Err(TerrainError::LayerSizeMismatch { layer: layer.to_string(), expected, found })
            }
        };
        expect("terrain-vertex", size.vertex_dims(), parts.vertices.dims())?;
        expect("vertex-height", size, parts.heights.dims())?;
        expect("cliffs", size, parts.cliffs.size())?;
        for (i, layer) in parts.terrain_layers.iter().enumerate() {
            expect(&format!("terrain-layers[{i}]"), size, layer.dims())?;
        }
        if let Some(layer) = &parts.cliff_layer {
            expect("cliff-layer", faces::cliff_layer_dims(size), layer.dims())?;
        }
        if let Some(&stray) = parts.vertices.iter().find(|&&t| !parts.terrain_set.accepts(t)) {
            return Err(TerrainError::TerrainNotInSet(terrain_id(ctx, stray)));
        }
        parts.cliffs.validate()?;

        let mut map = TerrainMap {
            terrain_layers: parts.terrain_layers,
            cliff_layer: parts
                .cliff_layer
                .unwrap_or_else(|| TileLayer::new(faces::cliff_layer_dims(size))),
            terrain_set: parts.terrain_set,
            vertices: parts.vertices,
            heights: parts.heights,
            cliffs: parts.cliffs,
            base_layer: parts.base_layer,
        };
        if map.terrain_layers.len() != map.terrain_set.len() {
            map.regenerate_terrain_layers(ctx);
        }
        if map.cliff_layer.is_empty() {
            map.regenerate_cliff_layer(ctx);
        }
        Ok(map)
    }

    pub fn get_size(&self) -> Dimensions {
        self.heights.dims()
    }

    pub fn terrain_set(&self) -> &TerrainSet {
        &self.terrain_set
    }

    pub fn vertices(&self) -> &Grid<TerrainHandle> {
        &self.vertices
    }

    pub fn vertex(&self, vertex: Point) -> Option<TerrainHandle> {
        self.vertices.get(vertex).copied()
    }

    pub fn heights(&self) -> &Grid<TileHeights> {
        &self.heights
    }

    pub fn cliffs(&self) -> &CliffGrid {
        &self.cliffs
    }

    pub fn base_layer(&self) -> &TileLayer {
        &self.base_layer
    }

    pub fn terrain_layers(&self) -> &[TileLayer] {
        &self.terrain_layers
    }

    pub fn cliff_layer(&self) -> &TileLayer {
        &self.cliff_layer
    }

    pub fn set_base_tile(&mut self, tile: Point, value: Option<TileRef<'_>>) -> TerrainResult<()> {
        if !self.get_size().contains(tile) {
            return Err(TerrainError::OutOfBounds(tile));
        }
        self.base_layer.set_ref(tile, value);
        Ok(())
    }

    /// Paints `terrain` onto one vertex and re-resolves the tiles around it.
    pub fn place_terrain(
        &mut self,
        vertex: Point,
        terrain: TerrainHandle,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        if !self.terrain_set.accepts(terrain) {
            return Err(TerrainError::TerrainNotInSet(terrain_id(ctx, terrain)));
        }
        match self.vertices.get_mut(vertex) {
            Some(slot) if *slot == terrain => return Ok(()),
            Some(slot) => *slot = terrain,
            None => return Err(TerrainError::OutOfBounds(vertex)),
        }
        transition::regenerate_around_vertex(
            &mut self.terrain_layers,
            &self.vertices,
            &self.terrain_set,
            ctx,
            vertex,
        );
        debug!(target: "terrain", "Placed {} at {vertex}", terrain_id(ctx, terrain));
        Ok(())
    }

    /// Switches to another terrain set, or the same set in another order.
    /// Every vertex terrain must be part of the new set.
    pub fn set_terrain_set(
        &mut self,
        set: TerrainSet,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        if let Some(&stray) = self.vertices.iter().find(|&&t| !set.accepts(t)) {
            return Err(TerrainError::TerrainNotInSet(terrain_id(ctx, stray)));
        }
        info!(target: "terrain", "Terrain set `{}` -> `{}`", self.terrain_set.id, set.id);
        self.terrain_set = set;
        self.regenerate_layers(ctx);
        Ok(())
    }

    pub fn set_terrain_set_by_id(
        &mut self,
        id: &str,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        let set = ctx
            .terrain_set_by_id(id)
            .ok_or_else(|| TerrainError::UnknownTerrainSet(id.to_string()))?;
        self.set_terrain_set(set.clone(), ctx)
    }

    pub(crate) fn cliff_terrain<'a>(
        &self,
        ctx: &'a dyn TerrainResolver,
    ) -> Option<&'a TerrainType> {
        self.terrain_set.cliff_terrain().and_then(|h| ctx.terrain(h))
    }

    pub fn regenerate_terrain_layers(&mut self, ctx: &dyn TerrainResolver) {
        self.terrain_layers =
            transition::generate_terrain_layers(&self.vertices, &self.terrain_set, ctx);
    }

    pub fn regenerate_cliff_layer(&mut self, ctx: &dyn TerrainResolver) {
        self.cliff_layer = faces::generate_cliff_layer(&self.cliffs, self.cliff_terrain(ctx));
    }

    pub fn regenerate_layers(&mut self, ctx: &dyn TerrainResolver) {
        self.regenerate_terrain_layers(ctx);
        self.regenerate_cliff_layer(ctx);
    }

    /// Hands every layer to `sink`: base first, terrains bottom to top, then
    /// the cliff faces.
    pub fn submit(&self, sink: &mut dyn TileMapSink) -> TerrainResult<()> {
        self.base_layer.submit(LayerSlot::Base, sink)?;
        for (i, layer) in self.terrain_layers.iter().enumerate() {
            layer.submit(LayerSlot::Terrain(i), sink)?;
        }
        self.cliff_layer.submit(LayerSlot::Cliff, sink)
    }

    /// Tags of the terrains at the corners of `tile`, top-most terrain first,
    /// without duplicates.
    pub fn tags_at(&self, tile: Point, ctx: &dyn TerrainResolver) -> Vec<String> {
        if !self.get_size().contains(tile) {
            return Vec::new();
        }
        tile.iter_rect_incl(tile + Point::new(1, 1))
            .filter_map(|v| self.vertex(v))
            .unique()
            .filter_map(|t| self.terrain_set.stack_index(t).map(|i| (i, t)))
            .sorted_by(|a, b| b.0.cmp(&a.0))
            .filter_map(|(_, t)| ctx.terrain(t))
            .flat_map(|terrain| terrain.tags.iter().cloned())
            .unique()
            .collect()
    }
}

pub fn get_size(map: &TerrainMap) -> Dimensions {
    map.get_size()
}

pub fn get_tags_at(map: &TerrainMap, ctx: &dyn TerrainResolver, tile: Point) -> Vec<String> {
    map.tags_at(tile, ctx)
}

/// The configured background terrain if `set` accepts it, otherwise empty.
pub fn background_fill(set: &TerrainSet, ctx: &dyn TerrainResolver) -> TerrainHandle {
    Some(ctx.tile_settings().background_terrain)
        .filter(|&t| set.accepts(t))
        .unwrap_or(TerrainHandle::EMPTY)
}

fn terrain_id(ctx: &dyn TerrainResolver, terrain: TerrainHandle) -> String {
    ctx.terrain(terrain).map_or_else(|| format!("#{}", terrain.index()), |t| t.id.clone())
}
