use log::info;

use crate::{
    engine::TerrainResolver,
    error::{TerrainError, TerrainResult},
    height::TileHeights,
    map::{TerrainMap, terrain_id},
    math::{Dimensions, Point},
    terrain::TerrainHandle,
};

impl TerrainMap {
    /// Resizes the map to `new_size` tiles, moving the old contents so that
    /// the old tile `(0, 0)` lands at `offset`.
    ///
    /// New vertices get `fill`, new tiles every sample at `height` (clamped to
    /// the configured range) and no cliffs. Contents pushed outside the new
    /// bounds are dropped. If the cut leaves cliffs breaking the placement
    /// rules the map is left untouched and the violation returned.
    ///
    /// [`background_fill`](super::background_fill) gives the fill new maps
    /// are created with.
    pub fn resize(
        &mut self,
        new_size: Dimensions,
        offset: Point,
        fill: TerrainHandle,
        height: u8,
        ctx: &dyn TerrainResolver,
    ) -> TerrainResult<()> {
        if new_size.empty() {
            return Err(TerrainError::EmptyMap(new_size));
        }
        if !self.terrain_set.accepts(fill) {
            return Err(TerrainError::TerrainNotInSet(terrain_id(ctx, fill)));
        }
        let height = ctx.tile_settings().heights.clamp(height as i32);

        let cliffs = self.cliffs.merged(new_size, offset);
        cliffs.validate()?;

        let old_size = self.get_size();
        self.vertices = self.vertices.merged(new_size.vertex_dims(), offset, fill);
        self.heights = self.heights.merged(new_size, offset, TileHeights::flat(height));
        self.cliffs = cliffs;
        self.base_layer = self.base_layer.merged(new_size, offset);
        self.regenerate_layers(ctx);
        info!(target: "terrain", "Resized map from {old_size} to {new_size} at offset {offset}");
        Ok(())
    }
}
