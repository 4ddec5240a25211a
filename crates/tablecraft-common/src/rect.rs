//! Inclusive rectangles over the grid, used for merges, range selections and
//! clipboard paste targets.

use crate::coord::Coord;

/// An axis-aligned rectangle of grid coordinates, inclusive on all four
/// bounds (`r2`/`c2` are the last row/column *inside* the rectangle, not one
/// past it).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Rect {
    pub r1: u32,
    pub c1: u32,
    pub r2: u32,
    pub c2: u32,
}

impl Rect {
    /// Build a rectangle from two arbitrary corners, normalizing so that
    /// `r1 <= r2` and `c1 <= c2`.
    pub fn normalized(r1: u32, c1: u32, r2: u32, c2: u32) -> Self {
        Self {
            r1: r1.min(r2),
            c1: c1.min(c2),
            r2: r1.max(r2),
            c2: c1.max(c2),
        }
    }

    /// A single-cell rectangle at `coord`.
    pub fn single(coord: Coord) -> Self {
        Self {
            r1: coord.r,
            c1: coord.c,
            r2: coord.r,
            c2: coord.c,
        }
    }

    pub fn top_left(&self) -> Coord {
        Coord::new(self.r1, self.c1)
    }

    pub fn row_span(&self) -> u32 {
        self.r2 - self.r1 + 1
    }

    pub fn col_span(&self) -> u32 {
        self.c2 - self.c1 + 1
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.r >= self.r1 && coord.r <= self.r2 && coord.c >= self.c1 && coord.c <= self.c2
    }

    /// True if `self` and `other` share at least one cell.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.r1 <= other.r2 && other.r1 <= self.r2 && self.c1 <= other.c2 && other.c1 <= self.c2
    }

    /// True if `self` fully contains `other`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.r1 <= other.r1 && self.c1 <= other.c1 && self.r2 >= other.r2 && self.c2 >= other.c2
    }

    /// Iterate every coordinate inside the rectangle, row-major.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (self.r1..=self.r2).flat_map(move |r| (self.c1..=self.c2).map(move |c| Coord::new(r, c)))
    }

    pub fn is_single_cell(&self) -> bool {
        self.row_span() == 1 && self.col_span() == 1
    }
}
