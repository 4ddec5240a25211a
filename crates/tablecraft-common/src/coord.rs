//! Grid coordinates shared across the document core.
//!
//! `Coord` is the `(row, column)` pair every cell, merge rectangle, and
//! selection in the core is addressed by. Rows and columns are zero-based,
//! matching the `r`/`c` fields of the Document JSON schema.

use core::fmt;

/// A zero-based `(row, column)` position in the grid.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub r: u32,
    pub c: u32,
}

impl Coord {
    pub const ORIGIN: Self = Self { r: 0, c: 0 };

    pub fn new(r: u32, c: u32) -> Self {
        Self { r, c }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(r{}, c{})", self.r, self.c)
    }
}

impl From<(u32, u32)> for Coord {
    fn from((r, c): (u32, u32)) -> Self {
        Self { r, c }
    }
}
