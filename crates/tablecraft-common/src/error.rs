//! The document core's error vocabulary.
//!
//! Failures split into five kinds: **Shape**, **Bounds**, **Geometry**,
//! **Registry**, and **Argument** errors. Pure operations return structured
//! `Result`s rather than throwing; `TableError` is the single type every one
//! of those results carries on the failure side.

use std::fmt;

use crate::coord::Coord;

/// One of the five error kinds the core distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Input fails basic structural checks (non-object document, wrong
    /// version, missing grid, ...).
    #[error("shape error: {message}")]
    Shape { message: String },

    /// A coordinate or range lies outside the grid.
    #[error("bounds error at {coord}: {message}")]
    Bounds { coord: Coord, message: String },

    /// A merge conflict (partial overlap) or an interior-cut delete.
    #[error("geometry error: {message}")]
    Geometry { message: String, reason: &'static str },

    /// An unknown class/attribute, an out-of-range/mistyped attribute value,
    /// or an exclusive-group conflict.
    #[error("registry error at {coord}: {message}")]
    Registry { coord: Coord, message: String },

    /// A malformed argument (negative count, non-string where a string was
    /// expected, ...).
    #[error("argument error: {message}")]
    Argument { message: String },
}

impl TableError {
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape { message: message.into() }
    }

    pub fn bounds(coord: Coord, message: impl Into<String>) -> Self {
        Self::Bounds { coord, message: message.into() }
    }

    pub fn geometry(reason: &'static str, message: impl Into<String>) -> Self {
        Self::Geometry { message: message.into(), reason }
    }

    pub fn registry(coord: Coord, message: impl Into<String>) -> Self {
        Self::Registry { coord, message: message.into() }
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument { message: message.into() }
    }

    /// The short machine-readable reason code (e.g. `'interior-merge-cut'`).
    /// Only `Geometry` errors carry one; everything else is fine with the
    /// `Display` message alone.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            TableError::Geometry { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A list of `TableError`s joined into the single human-readable message a
/// strict import reports: every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportErrors(pub Vec<TableError>);

impl ImportErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ImportErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ImportErrors {}

pub type TableResult<T> = Result<T, TableError>;
