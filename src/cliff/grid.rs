use crate::{
    cliff::{CliffEdge, CliffFlags, EdgeKind},
    geometry::{Direction, TriangleType},
    math::{Dimensions, Grid, Point},
};

/// The cliffs present at a vertex, derived on demand.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VertexCliffs {
    None,
    One(CliffEdge),
    Two(CliffEdge, CliffEdge),
    TooMany(usize),
}

impl VertexCliffs {
    pub const fn count(self) -> usize {
        match self {
            VertexCliffs::None => 0,
            VertexCliffs::One(_) => 1,
            VertexCliffs::Two(..) => 2,
            VertexCliffs::TooMany(n) => n,
        }
    }

    fn from_edges(edges: &[CliffEdge]) -> Self {
        match *edges {
            [] => VertexCliffs::None,
            [a] => VertexCliffs::One(a),
            [a, b] => VertexCliffs::Two(a, b),
            _ => VertexCliffs::TooMany(edges.len()),
        }
    }
}

/// Cliff records of every tile of a map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliffGrid {
    flags: Grid<CliffFlags>,
}

impl CliffGrid {
    pub fn new(size: Dimensions) -> Self {
        CliffGrid { flags: Grid::new(size) }
    }

    pub fn from_grid(flags: Grid<CliffFlags>) -> Self {
        CliffGrid { flags }
    }

    pub fn as_grid(&self) -> &Grid<CliffFlags> {
        &self.flags
    }

    pub fn size(&self) -> Dimensions {
        self.flags.dims()
    }

    pub fn flags(&self, tile: Point) -> CliffFlags {
        self.flags.get(tile).copied().unwrap_or_default()
    }

    pub fn triangle_type(&self, tile: Point) -> TriangleType {
        self.flags(tile).triangle_type()
    }

    pub fn set_triangle_type(&mut self, tile: Point, tt: TriangleType) {
        if let Some(flags) = self.flags.get_mut(tile) {
            flags.set_triangle_type(tt);
        }
    }

    pub fn has(&self, edge: CliffEdge) -> bool {
        self.flags.get(edge.tile).is_some_and(|f| f.has(edge.kind))
    }

    /// Stores the cliff flag alone. Returns false if the edge lies outside the
    /// map.
    pub(crate) fn insert(&mut self, edge: CliffEdge) -> bool {
        let Some(flags) = self.flags.get_mut(edge.tile) else {
            return false;
        };
        flags.insert_kind(edge.kind);
        true
    }

    pub(crate) fn remove(&mut self, edge: CliffEdge) -> bool {
        let Some(flags) = self.flags.get_mut(edge.tile) else {
            return false;
        };
        let had = flags.has(edge.kind);
        flags.remove_kind(edge.kind);
        had
    }

    pub fn is_border_vertex(&self, vertex: Point) -> bool {
        self.size().vertex_dims().on_border(vertex)
    }

    /// Cliff edges touching `vertex`, in clockwise order from north.
    pub fn edges_at(&self, vertex: Point) -> impl Iterator<Item = CliffEdge> + '_ {
        enum_iterator::all::<Direction>()
            .map(move |d| CliffEdge::at(vertex, d))
            .filter(move |&edge| self.has(edge))
    }

    pub fn vertex_cliffs(&self, vertex: Point) -> VertexCliffs {
        VertexCliffs::from_edges(&self.edges_at(vertex).collect::<Vec<_>>())
    }

    /// Every cliff edge in the map, row by row.
    pub fn edges(&self) -> impl Iterator<Item = CliffEdge> + '_ {
        self.flags.enumerate().flat_map(|(tile, flags)| {
            enum_iterator::all::<EdgeKind>()
                .filter(move |&kind| flags.has(kind))
                .map(move |kind| CliffEdge::new(tile, kind))
        })
    }

    pub fn merged(&self, size: Dimensions, offset: Point) -> CliffGrid {
        CliffGrid { flags: self.flags.merged(size, offset, CliffFlags::default()) }
    }
}
