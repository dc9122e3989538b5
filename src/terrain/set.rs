use crate::terrain::TerrainHandle;

/// The ordered terrains composited into one map, bottom first, plus the
/// terrain whose tiles texture cliff faces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainSet {
    pub id: String,
    terrains: Vec<TerrainHandle>,
    cliff_terrain: Option<TerrainHandle>,
}

impl TerrainSet {
    pub fn new(
        id: impl Into<String>,
        terrains: Vec<TerrainHandle>,
        cliff_terrain: Option<TerrainHandle>,
    ) -> Self {
        TerrainSet { id: id.into(), terrains, cliff_terrain }
    }

    pub fn terrains(&self) -> &[TerrainHandle] {
        &self.terrains
    }

    pub fn len(&self) -> usize {
        self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terrains.is_empty()
    }

    pub fn cliff_terrain(&self) -> Option<TerrainHandle> {
        self.cliff_terrain
    }

    /// Position of `terrain` in the painter's order. The empty terrain and
    /// terrains outside the set have none, so they sit below every layer.
    pub fn stack_index(&self, terrain: TerrainHandle) -> Option<usize> {
        if terrain.is_empty() {
            return None;
        }
        self.terrains.iter().position(|&t| t == terrain)
    }

    pub fn contains(&self, terrain: TerrainHandle) -> bool {
        self.stack_index(terrain).is_some()
    }

    /// Whether `terrain` may be stored in a vertex of a map using this set.
    pub fn accepts(&self, terrain: TerrainHandle) -> bool {
        terrain.is_empty() || self.contains(terrain)
    }

    pub fn get(&self, index: usize) -> Option<TerrainHandle> {
        self.terrains.get(index).copied()
    }

    /// Same set with the stacking order replaced. Used by editors reordering
    /// layers; the handles must stay the same.
    pub fn reordered(&self, order: &[usize]) -> Option<TerrainSet> {
        if order.len() != self.terrains.len() {
            return None;
        }
        let terrains = order.iter().map(|&i| self.get(i)).collect::<Option<Vec<_>>>()?;
        let mut sorted = terrains.clone();
        sorted.sort();
        sorted.dedup();
        (sorted.len() == terrains.len()).then(|| TerrainSet {
            id: self.id.clone(),
            terrains,
            cliff_terrain: self.cliff_terrain,
        })
    }
}
