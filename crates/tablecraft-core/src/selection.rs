//! Cell selection, rectangular range selection, and merge-aware keyboard
//! navigation.

use tablecraft_common::{Coord, Rect};

use crate::bus::EventBus;
use crate::events::{CellSnapshot, EventPayload};
use crate::model::TableModel;

/// A keyboard navigation direction (`up | down | left | right`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A normalized rectangular range, as returned by [`SelectionEngine::get_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub r1: u32,
    pub c1: u32,
    pub r2: u32,
    pub c2: u32,
}

impl From<Rect> for SelectionRange {
    fn from(rect: Rect) -> Self {
        Self { r1: rect.r1, c1: rect.c1, r2: rect.r2, c2: rect.c2 }
    }
}

/// Tracks the current single-cell selection and an in-progress or committed
/// rectangular range over a [`TableModel`]. Holds no reference to the model
/// itself — every method that needs to inspect grid geometry takes `&TableModel`
/// explicitly, so the engine can outlive any one borrow of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionEngine {
    selected: Option<Coord>,
    range_anchor: Option<Coord>,
    range_active: Option<Coord>,
    range_mode: bool,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Coord> {
        self.selected
    }

    /// Select a single cell. Rejected (the selection is left unchanged) if
    /// `coord` is out of bounds or is a covered (non-leading) coordinate —
    /// only a merge's top-left corner, or an unmerged cell, can be selected.
    pub fn select(&mut self, model: &TableModel, bus: &mut EventBus, coord: Coord) -> bool {
        if !model.is_in_bounds(coord) || model.is_covered(coord) {
            return false;
        }
        self.selected = Some(coord);
        self.clear_range_state();
        let cell = model.get_cell(coord).map(cell_snapshot);
        bus.emit(EventPayload::SelectionChange { coord, cell });
        true
    }

    fn clear_range_state(&mut self) {
        self.range_anchor = None;
        self.range_active = None;
        self.range_mode = false;
    }

    /// Begin a drag-to-select range, anchored at `coord`.
    pub fn start_range(&mut self, model: &TableModel, coord: Coord) -> bool {
        if !model.is_in_bounds(coord) {
            return false;
        }
        self.range_anchor = Some(coord);
        self.range_active = Some(coord);
        self.range_mode = true;
        true
    }

    /// Move the active end of an in-progress range, emitting
    /// `selection:range` with every leading cell the normalized range
    /// currently covers.
    pub fn update_range(&mut self, model: &TableModel, bus: &mut EventBus, coord: Coord) -> bool {
        if !self.range_mode || !model.is_in_bounds(coord) {
            return false;
        }
        self.range_active = Some(coord);
        self.emit_range(model, bus);
        true
    }

    /// Finalize the in-progress range (e.g. on mouse-up). A no-op beyond
    /// returning whether a range exists: `update_range` already emitted the
    /// current extent, and there is no dedicated "commit" event payload.
    pub fn commit_range(&self) -> bool {
        self.has_range()
    }

    /// Abandon an in-progress range without committing it.
    pub fn cancel_range(&mut self) {
        self.clear_range_state();
    }

    /// Clear a committed (or in-progress) range.
    pub fn clear_range(&mut self) {
        self.clear_range_state();
    }

    /// The normalized range spanning anchor and active point, or `None` if
    /// no range is active.
    pub fn get_range(&self) -> Option<SelectionRange> {
        let (anchor, active) = (self.range_anchor?, self.range_active?);
        Some(Rect::normalized(anchor.r, anchor.c, active.r, active.c).into())
    }

    /// True iff a range is active and its anchor and active point differ
    /// (a single clicked cell with no drag is not "a range").
    pub fn has_range(&self) -> bool {
        self.range_mode && self.range_anchor.is_some() && self.range_anchor != self.range_active
    }

    /// Select every leading cell in row `r`, start to end.
    pub fn select_full_row(&mut self, model: &TableModel, bus: &mut EventBus, r: u32) -> bool {
        if r >= model.rows() || model.cols() == 0 {
            return false;
        }
        self.selected = Some(Coord::new(r, 0));
        self.range_anchor = Some(Coord::new(r, 0));
        self.range_active = Some(Coord::new(r, model.cols() - 1));
        self.range_mode = true;
        self.emit_range(model, bus);
        true
    }

    /// Select every leading cell in column `c`, start to end.
    pub fn select_full_column(&mut self, model: &TableModel, bus: &mut EventBus, c: u32) -> bool {
        if c >= model.cols() || model.rows() == 0 {
            return false;
        }
        self.selected = Some(Coord::new(0, c));
        self.range_anchor = Some(Coord::new(0, c));
        self.range_active = Some(Coord::new(model.rows() - 1, c));
        self.range_mode = true;
        self.emit_range(model, bus);
        true
    }

    /// Move the single-cell selection one step in `dir`, using merge-aware
    /// navigation (see [`navigate`]), and clear any active range.
    pub fn move_selection(&mut self, model: &TableModel, bus: &mut EventBus, dir: Direction, max_hops: u32) -> bool {
        let Some(from) = self.selected.or_else(|| default_origin(model)) else {
            return false;
        };
        let Some(target) = navigate(model, from, dir, max_hops) else {
            return false;
        };
        self.selected = Some(target);
        self.clear_range_state();
        let cell = model.get_cell(target).map(cell_snapshot);
        bus.emit(EventPayload::SelectionChange { coord: target, cell });
        true
    }

    /// Extend the active range one step in `dir` from its current active
    /// point (initializing the range from the current selection if none is
    /// active yet), keeping the anchor fixed. Uses the same merge-aware
    /// navigation as [`SelectionEngine::move_selection`].
    pub fn extend_range(&mut self, model: &TableModel, bus: &mut EventBus, dir: Direction, max_hops: u32) -> bool {
        if !self.range_mode {
            let Some(origin) = self.selected.or_else(|| default_origin(model)) else {
                return false;
            };
            self.range_anchor = Some(origin);
            self.range_active = Some(origin);
            self.range_mode = true;
        }
        let Some(active) = self.range_active else {
            return false;
        };
        let Some(target) = navigate(model, active, dir, max_hops) else {
            return false;
        };
        self.range_active = Some(target);
        self.emit_range(model, bus);
        true
    }

    fn emit_range(&self, model: &TableModel, bus: &mut EventBus) {
        let Some(range) = self.get_range() else { return };
        let rect = Rect::normalized(range.r1, range.c1, range.r2, range.c2);
        let mut seen = std::collections::HashSet::new();
        let mut cells = Vec::new();
        for coord in rect.iter_coords() {
            let Some(leading) = model.leading_coord_of(coord) else { continue };
            if !seen.insert(leading) {
                continue;
            }
            if let Some(cell) = model.get_cell(leading) {
                cells.push(cell_snapshot(cell));
            }
        }
        bus.emit(EventPayload::SelectionRange { r1: rect.r1, c1: rect.c1, r2: rect.r2, c2: rect.c2, cells });
    }
}

fn default_origin(model: &TableModel) -> Option<Coord> {
    if model.rows() == 0 || model.cols() == 0 {
        None
    } else {
        Some(Coord::ORIGIN)
    }
}

fn cell_snapshot(cell: &crate::model::Cell) -> CellSnapshot {
    CellSnapshot { r: cell.r, c: cell.c, value: cell.value.clone(), row_span: cell.row_span, col_span: cell.col_span }
}

fn step(coord: Coord, dir: Direction) -> Option<Coord> {
    match dir {
        Direction::Up => coord.r.checked_sub(1).map(|r| Coord::new(r, coord.c)),
        Direction::Down => Some(Coord::new(coord.r + 1, coord.c)),
        Direction::Left => coord.c.checked_sub(1).map(|c| Coord::new(coord.r, c)),
        Direction::Right => Some(Coord::new(coord.r, coord.c + 1)),
    }
}

/// Jump from `rect`'s edge to the coordinate immediately past it in `dir`,
/// staying on `from`'s other axis (its row for a horizontal move, its
/// column for a vertical one).
fn jump_past(rect: Rect, from: Coord, dir: Direction) -> Option<Coord> {
    match dir {
        Direction::Up => rect.r1.checked_sub(1).map(|r| Coord::new(r, from.c)),
        Direction::Down => Some(Coord::new(rect.r2 + 1, from.c)),
        Direction::Left => rect.c1.checked_sub(1).map(|c| Coord::new(from.r, c)),
        Direction::Right => Some(Coord::new(from.r, rect.c2 + 1)),
    }
}

/// Merge-aware navigation: compute the neighbor of `from` in `dir`. If it's
/// outside the grid, navigation fails (`None`). If it's a
/// leading or unmerged cell, land there. If it's covered by the merge `from`
/// itself belongs to (we're leaving our own merge), jump past that merge's
/// rectangle and retry. If it's covered by a *different* merge, land on
/// that merge's leading cell. Bounded by `max_hops` iterations as a
/// defensive backstop against pathological grids.
pub fn navigate(model: &TableModel, from: Coord, dir: Direction, max_hops: u32) -> Option<Coord> {
    let mut target = step(from, dir)?;
    if !model.is_in_bounds(target) {
        return None;
    }
    for _ in 0..max_hops.max(1) {
        if !model.is_covered(target) {
            return Some(target);
        }
        let leading = model.leading_coord_of(target)?;
        if leading == from {
            let rect = model.cell_rect_containing(from)?;
            let jumped = jump_past(rect, from, dir)?;
            if !model.is_in_bounds(jumped) {
                return None;
            }
            target = jumped;
            continue;
        }
        return Some(leading);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Document, TableModel};
    use pretty_assertions::assert_eq;

    fn model_with_merge() -> TableModel {
        let mut doc = Document::empty(5, 5);
        doc.cells.push(Cell {
            r: 1,
            c: 1,
            value: String::new(),
            row_span: 2,
            col_span: 2,
            classes: vec![],
            data: Default::default(),
        });
        TableModel::new(doc).unwrap()
    }

    #[test]
    fn select_rejects_covered_coordinate() {
        let model = model_with_merge();
        let mut bus = EventBus::new();
        let mut engine = SelectionEngine::new();
        assert!(!engine.select(&model, &mut bus, Coord::new(2, 2)));
        assert!(engine.select(&model, &mut bus, Coord::new(1, 1)));
        assert_eq!(engine.selected(), Some(Coord::new(1, 1)));
    }

    #[test]
    fn move_right_off_merge_lands_past_it() {
        let model = model_with_merge();
        let mut bus = EventBus::new();
        let mut engine = SelectionEngine::new();
        engine.select(&model, &mut bus, Coord::new(1, 1));
        assert!(engine.move_selection(&model, &mut bus, Direction::Right, 5));
        assert_eq!(engine.selected(), Some(Coord::new(1, 3)));
    }

    #[test]
    fn move_into_someone_elses_merge_lands_on_its_leading_cell() {
        let model = model_with_merge();
        let mut bus = EventBus::new();
        let mut engine = SelectionEngine::new();
        engine.select(&model, &mut bus, Coord::new(1, 0));
        assert!(engine.move_selection(&model, &mut bus, Direction::Right, 5));
        assert_eq!(engine.selected(), Some(Coord::new(1, 1)));
    }

    #[test]
    fn move_selection_clears_active_range() {
        let model = model_with_merge();
        let mut bus = EventBus::new();
        let mut engine = SelectionEngine::new();
        engine.select(&model, &mut bus, Coord::new(0, 0));
        engine.start_range(&model, Coord::new(0, 0));
        engine.update_range(&model, &mut bus, Coord::new(0, 2));
        assert!(engine.has_range());
        engine.move_selection(&model, &mut bus, Direction::Down, 5);
        assert!(!engine.has_range());
    }

    #[test]
    fn extend_range_keeps_anchor_fixed() {
        let model = model_with_merge();
        let mut bus = EventBus::new();
        let mut engine = SelectionEngine::new();
        engine.select(&model, &mut bus, Coord::new(0, 0));
        engine.extend_range(&model, &mut bus, Direction::Right, 5);
        engine.extend_range(&model, &mut bus, Direction::Right, 5);
        let range = engine.get_range().unwrap();
        assert_eq!((range.r1, range.c1), (0, 0));
        assert_eq!((range.r2, range.c2), (0, 2));
    }

    #[test]
    fn select_full_row_spans_every_column() {
        let model = model_with_merge();
        let mut bus = EventBus::new();
        let mut engine = SelectionEngine::new();
        engine.select_full_row(&model, &mut bus, 2);
        let range = engine.get_range().unwrap();
        assert_eq!((range.c1, range.c2), (0, 4));
    }

    #[test]
    fn navigate_fails_at_grid_edge() {
        let model = model_with_merge();
        assert!(navigate(&model, Coord::new(0, 0), Direction::Up, 5).is_none());
    }
}
