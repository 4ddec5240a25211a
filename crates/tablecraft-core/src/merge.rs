//! Merging and splitting leading cells. These are free functions over a
//! [`ModelEditor`] rather than methods on it: they compose out of the same
//! primitives a UI layer could call directly, and keeping them outside the
//! editor's `impl` block keeps the geometric reasoning in one place.

use tablecraft_common::{Coord, Rect, TableError, TableResult};

use crate::events::EventPayload;
use crate::model::ModelEditor;

/// How a candidate merge rectangle relates to an existing leading cell's
/// rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    None,
    /// The candidate fully contains the existing cell.
    Absorbs,
    /// The existing cell fully contains the candidate (a no-op merge).
    ContainedBy,
    /// Any other intersection: illegal.
    Partial,
}

fn classify(candidate: &Rect, existing: &Rect) -> Overlap {
    if !candidate.intersects(existing) {
        Overlap::None
    } else if candidate.contains_rect(existing) {
        Overlap::Absorbs
    } else if existing.contains_rect(candidate) {
        Overlap::ContainedBy
    } else {
        Overlap::Partial
    }
}

/// Normalize and validate a candidate merge rectangle against every leading
/// cell in `editor`'s model. Defensive: callers are expected to have already
/// checked this, but every path that can mutate the model re-validates.
pub fn validate_merge_operation(editor: &ModelEditor<'_>, r1: u32, c1: u32, r2: u32, c2: u32) -> TableResult<Rect> {
    let candidate = Rect::normalized(r1, c1, r2, c2);
    let model = editor.model();
    if candidate.r2 >= model.rows() || candidate.c2 >= model.cols() {
        return Err(TableError::bounds(Coord::new(candidate.r2, candidate.c2), "merge rectangle outside grid"));
    }
    for cell in &model.document().cells {
        let existing = cell.rect();
        if existing == candidate {
            continue;
        }
        match classify(&candidate, &existing) {
            Overlap::None | Overlap::Absorbs | Overlap::ContainedBy => {}
            Overlap::Partial => {
                return Err(TableError::geometry(
                    "partial-merge-overlap",
                    format!("merge rectangle ({},{})-({},{}) partially overlaps existing merge at ({},{})-({},{})",
                        candidate.r1, candidate.c1, candidate.r2, candidate.c2,
                        existing.r1, existing.c1, existing.r2, existing.c2),
                ));
            }
        }
    }
    Ok(candidate)
}

/// Merge the rectangle `(r1,c1)`-`(r2,c2)` into a single leading cell.
/// Collected non-empty values are space-joined into the leading cell's value
/// and reported as a single `cell:change/value` event, not one per absorbed
/// cell.
pub fn merge_range(editor: &mut ModelEditor<'_>, r1: u32, c1: u32, r2: u32, c2: u32) -> TableResult<()> {
    let rect = validate_merge_operation(editor, r1, c1, r2, c2)?;
    if rect.is_single_cell() {
        return Ok(());
    }

    let model = editor.model();
    let mut values: Vec<String> = Vec::new();
    for coord in rect.iter_coords() {
        if let Some(cell) = model.get_cell(coord) {
            let trimmed = cell.value.trim();
            if !trimmed.is_empty() {
                values.push(trimmed.to_string());
            }
        }
    }
    let joined = if values.is_empty() { None } else { Some(values.join(" ")) };

    editor.batch(|editor| {
        let leading = rect.top_left();
        if let Some(joined) = joined {
            editor.set_cell_value(leading, joined)?;
        }
        editor.set_cell_span(leading, rect.row_span(), rect.col_span())?;
        editor.retain_cells(|cell| {
            let coord = Coord::new(cell.r, cell.c);
            coord == leading || !rect.contains(coord)
        });
        editor.rebuild_index();
        editor.emit(EventPayload::Merge {
            r1: rect.r1,
            c1: rect.c1,
            r2: rect.r2,
            c2: rect.c2,
            row_span: rect.row_span(),
            col_span: rect.col_span(),
        });
        Ok(())
    })
}

/// Reset the leading cell at `coord` back to a 1x1 span, materializing empty
/// leading cells for every coordinate the merge used to cover.
pub fn split_cell(editor: &mut ModelEditor<'_>, coord: Coord) -> TableResult<()> {
    let Some(rect) = editor.model().cell_rect_containing(coord) else {
        return Err(TableError::bounds(coord, "no cell at this coordinate"));
    };
    if rect.top_left() != coord {
        return Err(TableError::geometry("split-not-leading", format!("{coord} is not a leading cell")));
    }
    if rect.is_single_cell() {
        return Ok(());
    }

    editor.batch(|editor| {
        editor.set_cell_span(coord, 1, 1)?;
        for covered in rect.iter_coords() {
            if covered == coord {
                continue;
            }
            editor.ensure_empty_leading_cell(covered);
        }
        editor.rebuild_index();
        editor.emit(EventPayload::Split { r: coord.r, c: coord.c, row_span: 1, col_span: 1 });
        Ok(())
    })
}

/// How `split_all_in_range` selects which leading cells to split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSplitMode {
    /// Any leading cell whose rectangle intersects the range, including a
    /// merge that only touches the range at its border.
    Overlap,
    /// Only leading cells whose rectangle lies fully inside the range.
    Fully,
}

/// Split every merged leading cell selected by `mode` within the range.
/// Returns the number of cells split. The candidate set is snapshotted
/// before any splitting happens so that newly materialized leading cells
/// never feed back into the same pass.
pub fn split_all_in_range(editor: &mut ModelEditor<'_>, r1: u32, c1: u32, r2: u32, c2: u32, mode: RangeSplitMode) -> usize {
    let range = Rect::normalized(r1, c1, r2, c2);
    let targets: Vec<Coord> = editor
        .model()
        .document()
        .cells
        .iter()
        .filter(|cell| cell.row_span > 1 || cell.col_span > 1)
        .filter_map(|cell| {
            let rect = cell.rect();
            let selected = match mode {
                RangeSplitMode::Overlap => range.intersects(&rect),
                RangeSplitMode::Fully => range.contains_rect(&rect),
            };
            selected.then(|| Coord::new(cell.r, cell.c))
        })
        .collect();

    let count = targets.len();
    if count == 0 {
        return 0;
    }
    editor.batch(|editor| {
        for coord in targets {
            let _ = split_cell(editor, coord);
        }
    });
    count
}

impl<'a> ModelEditor<'a> {
    /// Run `f` with the bus paused, and the editor itself still available
    /// inside the closure, so multi-step geometric edits (merge, split) can
    /// emit several internal cell changes and still only surface one
    /// `merge`/`split` event plus one eventual `batch:flush`.
    fn batch<T>(&mut self, f: impl FnOnce(&mut ModelEditor<'a>) -> T) -> T {
        self.bus_mut().pause();
        let result = f(self);
        self.bus_mut().resume();
        result
    }

    fn set_cell_span(&mut self, coord: Coord, row_span: u32, col_span: u32) -> TableResult<()> {
        self.ensure_empty_leading_cell(coord);
        let cell = self.cell_mut(coord).expect("just ensured");
        cell.row_span = row_span;
        cell.col_span = col_span;
        Ok(())
    }
}
