//! Placement rules for cliff edges.
//!
//! - at most two cliffs meet at a vertex, and at most one at a border vertex
//! - a cliff never runs along the map border
//! - two cliffs meeting at a vertex chain through it: one arrives, one leaves
//! - a tile never carries both diagonals
//! - adding a cliff that already exists is accepted
//!
//! Runs should also be at least two edges long unless they reach the border.
//! That one is only enforced when an editor starts a new run, through
//! [`CliffGrid::can_start_cliff`].

use log::trace;

use crate::{
    cliff::{CliffEdge, CliffGrid, VertexCliffs},
    error::{CliffRule, TerrainError, TerrainResult},
    math::Point,
};

/// Partner search order around a vertex, relative to the direction of the
/// candidate edge: straight through first, then widening turns.
const PARTNER_SEARCH: [isize; 7] = [4, 5, 3, 6, 2, 7, 1];

/// What makes a new cliff run legal to start.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CliffAnchor {
    /// The edge itself, or a neighbour it would extend, already exists.
    Existing(CliffEdge),
    /// The edge reaches the map border.
    Border,
    /// A new edge that could be added together with the candidate.
    Pair(CliffEdge),
}

impl CliffGrid {
    fn degree_limit(&self, vertex: Point) -> usize {
        if self.is_border_vertex(vertex) { 1 } else { 2 }
    }

    /// Whether `edge` may be added on its own.
    pub fn can_add_cliff(&self, edge: CliffEdge) -> bool {
        if !edge.in_map(self.size()) {
            return false;
        }
        if self.has(edge) {
            return true;
        }
        if edge.along_border(self.size()) {
            trace!(target: "cliff", "{edge} runs along the border");
            return false;
        }
        if edge.kind.is_diagonal() && self.flags(edge.tile).diagonal().is_some() {
            trace!(target: "cliff", "{edge} would cross the tile's other diagonal");
            return false;
        }
        edge.vertices().into_iter().all(|vertex| self.fits_at(edge, vertex, &[]))
    }

    /// Whether `edge` fits the cliffs already at `vertex` plus `pending` ones
    /// about to be added there.
    fn fits_at(&self, edge: CliffEdge, vertex: Point, pending: &[CliffEdge]) -> bool {
        let existing = self.edges_at(vertex).filter(|e| *e != edge && !pending.contains(e));
        let others = existing.chain(pending.iter().copied()).collect::<Vec<_>>();
        if others.len() + 1 > self.degree_limit(vertex) {
            trace!(target: "cliff", "{edge}: too many cliffs at {vertex}");
            return false;
        }
        others.iter().all(|&other| edge.compatible_at(other, vertex).unwrap_or(false))
    }

    /// Whether `first` and `second` can be added together, chaining through
    /// their shared vertex.
    pub fn can_add_or_start_cliff(&self, first: CliffEdge, second: CliffEdge) -> bool {
        let Some(vertex) = first.shared_vertex(second) else {
            return false;
        };
        if !self.can_add_cliff(first) || !self.can_add_cliff(second) {
            return false;
        }
        first.compatible_at(second, vertex).unwrap_or(false)
            && self.fits_at(first, vertex, &[second])
    }

    /// Checks that a new run may start with `edge`, and names what anchors it.
    pub fn can_start_cliff(&self, edge: CliffEdge) -> Option<CliffAnchor> {
        if self.has(edge) {
            return Some(CliffAnchor::Existing(edge));
        }
        if !self.can_add_cliff(edge) {
            return None;
        }
        if edge.touches_border(self.size()) {
            return Some(CliffAnchor::Border);
        }
        let [start, end] = edge.vertices();
        for vertex in [start, end] {
            if let Some(existing) = self.edges_at(vertex).next() {
                return Some(CliffAnchor::Existing(existing));
            }
        }
        for vertex in [start, end] {
            let direction = edge.direction_at(vertex).ok()?;
            let partner = PARTNER_SEARCH
                .iter()
                .map(|&steps| CliffEdge::at(vertex, direction.rotated(steps)))
                .find(|&candidate| self.can_add_or_start_cliff(edge, candidate));
            if let Some(partner) = partner {
                return Some(CliffAnchor::Pair(partner));
            }
        }
        trace!(target: "cliff", "{edge} would be an isolated cliff");
        None
    }

    /// Checks every stored cliff against the placement rules. Isolated single
    /// edges are allowed here; see [`isolated_cliffs`][Self::isolated_cliffs].
    pub fn validate(&self) -> TerrainResult<()> {
        let violation = |rule, at| Err(TerrainError::CliffInvariant { rule, at });
        for (tile, flags) in self.as_grid().enumerate() {
            if let Some(rule) = flags.violation() {
                return violation(rule, tile);
            }
        }
        if let Some(edge) = self.edges().find(|e| e.along_border(self.size())) {
            return violation(CliffRule::BorderEdge, edge.tile);
        }
        for vertex in self.size().vertex_dims().iter_within() {
            let cliffs = self.vertex_cliffs(vertex);
            if cliffs.count() > 2 {
                return violation(CliffRule::VertexDegree, vertex);
            }
            if cliffs.count() > 1 && self.is_border_vertex(vertex) {
                return violation(CliffRule::BorderVertexDegree, vertex);
            }
            if let VertexCliffs::Two(a, b) = cliffs
                && !a.compatible_at(b, vertex)?
            {
                return violation(CliffRule::Incompatible, vertex);
            }
        }
        Ok(())
    }

    /// Cliff edges forming a run of one that does not reach the border.
    pub fn isolated_cliffs(&self) -> Vec<CliffEdge> {
        self.edges()
            .filter(|&edge| {
                !edge.touches_border(self.size())
                    && edge.vertices().into_iter().all(|v| self.edges_at(v).all(|e| e == edge))
            })
            .collect()
    }
}
