use bitflags::bitflags;

use crate::{cliff::EdgeKind, error::CliffRule, geometry::TriangleType};

bitflags! {
    /// Per-tile cliff record. The tile owns its right edge, its bottom edge
    /// and its diagonals; top and left edges belong to its neighbours.
    ///
    /// `DOWNHILL_TRIANGLES` is not a cliff but the tile's triangulation, kept
    /// in the same byte so raw maps store it alongside the cliffs.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct CliffFlags: u8 {
        const RIGHT              = 1 << 0;
        const BOTTOM             = 1 << 1;
        const DIAGONAL           = 1 << 2;
        const UPHILL             = 1 << 3;
        const DOWNHILL           = 1 << 4;
        const DOWNHILL_TRIANGLES = 1 << 5;
    }
}

impl CliffFlags {
    pub const fn of_kind(kind: EdgeKind) -> CliffFlags {
        match kind {
            EdgeKind::Right => CliffFlags::RIGHT,
            EdgeKind::Bottom => CliffFlags::BOTTOM,
            EdgeKind::Uphill => CliffFlags::UPHILL,
            EdgeKind::Downhill => CliffFlags::DOWNHILL,
        }
    }

    pub fn has(self, kind: EdgeKind) -> bool {
        self.contains(Self::of_kind(kind))
    }

    pub fn triangle_type(self) -> TriangleType {
        if self.contains(CliffFlags::DOWNHILL_TRIANGLES) {
            TriangleType::Downhill
        } else {
            TriangleType::Uphill
        }
    }

    pub fn set_triangle_type(&mut self, tt: TriangleType) {
        self.set(CliffFlags::DOWNHILL_TRIANGLES, tt.is_downhill());
    }

    /// The diagonal cliff on this tile, if any.
    pub fn diagonal(self) -> Option<EdgeKind> {
        if self.contains(CliffFlags::UPHILL) {
            Some(EdgeKind::Uphill)
        } else if self.contains(CliffFlags::DOWNHILL) {
            Some(EdgeKind::Downhill)
        } else {
            None
        }
    }

    /// Adds the cliff of `kind`, keeping `DIAGONAL` in sync.
    pub fn insert_kind(&mut self, kind: EdgeKind) {
        self.insert(Self::of_kind(kind));
        if kind.is_diagonal() {
            self.insert(CliffFlags::DIAGONAL);
        }
    }

    pub fn remove_kind(&mut self, kind: EdgeKind) {
        self.remove(Self::of_kind(kind));
        self.set(CliffFlags::DIAGONAL, self.intersects(CliffFlags::UPHILL | CliffFlags::DOWNHILL));
    }

    /// The first rule this record breaks on its own, if any.
    pub fn violation(self) -> Option<CliffRule> {
        let uphill = self.contains(CliffFlags::UPHILL);
        let downhill = self.contains(CliffFlags::DOWNHILL);
        if uphill && downhill {
            return Some(CliffRule::DoubleDiagonal);
        }
        let consistent = self.contains(CliffFlags::DIAGONAL) == (uphill || downhill)
            && !(uphill && self.triangle_type().is_downhill())
            && !(downhill && self.triangle_type().is_uphill());
        (!consistent).then_some(CliffRule::InconsistentFlags)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn add_and_clear_keep_diagonal_in_sync() {
        let mut flags = CliffFlags::default();
        flags.set_triangle_type(TriangleType::Downhill);
        flags.insert_kind(EdgeKind::Downhill);
        flags.insert_kind(EdgeKind::Right);

        assert!(flags.contains(CliffFlags::DIAGONAL));
        assert_eq!(flags.diagonal(), Some(EdgeKind::Downhill));
        assert_eq!(flags.violation(), None);

        flags.remove_kind(EdgeKind::Downhill);
        assert!(!flags.contains(CliffFlags::DIAGONAL));
        assert!(flags.has(EdgeKind::Right));
        assert_eq!(flags.triangle_type(), TriangleType::Downhill);
    }

    #[test_case(CliffFlags::UPHILL | CliffFlags::DOWNHILL | CliffFlags::DIAGONAL, Some(CliffRule::DoubleDiagonal))]
    #[test_case(CliffFlags::DIAGONAL, Some(CliffRule::InconsistentFlags))]
    #[test_case(CliffFlags::UPHILL, Some(CliffRule::InconsistentFlags))]
    #[test_case(CliffFlags::DOWNHILL | CliffFlags::DIAGONAL, Some(CliffRule::InconsistentFlags))]
    #[test_case(CliffFlags::UPHILL | CliffFlags::DIAGONAL | CliffFlags::DOWNHILL_TRIANGLES, Some(CliffRule::InconsistentFlags))]
    #[test_case(CliffFlags::UPHILL | CliffFlags::DIAGONAL, None)]
    #[test_case(CliffFlags::RIGHT | CliffFlags::BOTTOM, None)]
    fn violations(flags: CliffFlags, expected: Option<CliffRule>) {
        assert_eq!(flags.violation(), expected);
    }
}
