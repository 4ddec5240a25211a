//! Tunable limits for a document core instance, mirroring the engine-wide
//! configuration struct pattern used elsewhere in this codebase: one place
//! to look for every knob, with conservative defaults that work for an
//! interactively-edited table.

/// Runtime limits for a [`crate::model::TableModel`] and the services built
/// on top of it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// Maximum number of undo steps retained by [`crate::history::HistoryService`].
    pub history_limit: usize,
    /// Milliseconds an idle period must last before a pending edit is
    /// committed to history.
    pub debounce_delay_ms: u64,
    /// Upper bound on hops `SelectionEngine::move_selection` will take while
    /// walking across covered cells before giving up and staying put.
    pub navigation_max_hops: u32,
    /// Hard ceiling on `rows * cols`, checked by `ensure_size` and document
    /// import, to keep a pasted or imported document from allocating an
    /// unbounded grid.
    pub max_grid_cells: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            debounce_delay_ms: 500,
            navigation_max_hops: 5,
            max_grid_cells: 1_000_000,
        }
    }
}
