//! Applying parsed clipboard data into a live [`TableModel`].
//!
//! `apply_html_table_paste` routes its merge-rectangle application
//! through [`crate::merge::merge_range`]'s
//! absorption path rather than hand-filtering the model's cell list, so the
//! HTML-paste and manual-merge code paths can never drift apart: the target
//! rectangle is first cleared to empty singleton cells, the parsed leading
//! cell's value is written, and then `merge_range` is asked to merge exactly
//! that rectangle — the same call a user dragging a merge handle would make.

use tablecraft_common::{Coord, Rect, TableError, TableResult};

use crate::clipboard::parse::ParsedTable;
use crate::events::EventPayload;
use crate::merge::{merge_range, split_all_in_range, RangeSplitMode};
use crate::model::ModelEditor;

/// Paste a plain string matrix (from [`crate::clipboard::parse::parse_tsv`])
/// at `start`. Grows the grid to fit, trims each value, and writes it with
/// [`ModelEditor::set_cell_value`]. Emits a single `paste` event for the
/// whole matrix, with `html: false`.
pub fn apply_paste(editor: &mut ModelEditor<'_>, start: Coord, matrix: &[Vec<String>]) -> TableResult<()> {
    let rows = matrix.len() as u32;
    let cols = matrix.iter().map(|row| row.len()).max().unwrap_or(0) as u32;
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    editor.bus_mut().pause();
    let result = (|| -> TableResult<()> {
        editor.ensure_size(start.r + rows, start.c + cols)?;
        for (i, row) in matrix.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let coord = Coord::new(start.r + i as u32, start.c + j as u32);
                editor.set_cell_value(coord, value.trim())?;
            }
        }
        Ok(())
    })();
    editor.bus_mut().resume();
    result?;

    editor.emit(EventPayload::Paste { start, rows, cols, html: false });
    Ok(())
}

/// Paste an HTML table parsed by [`crate::clipboard::parse::parse_html_table`]
/// at `start`. Grows the grid to fit, splits any merges already overlapping
/// the target rectangle and blanks it, then writes each parsed leading
/// cell's value and — for any leading cell with a span greater than 1x1 —
/// merges its rectangle via [`merge_range`]. Emits a single `paste` event
/// with `html: true`.
pub fn apply_html_table_paste(editor: &mut ModelEditor<'_>, start: Coord, parsed: &ParsedTable) -> TableResult<()> {
    if !parsed.success || parsed.rows == 0 || parsed.cols == 0 {
        return Err(TableError::shape("parsed HTML table has no rows/cols to paste"));
    }
    let target = Rect::normalized(start.r, start.c, start.r + parsed.rows - 1, start.c + parsed.cols - 1);

    editor.bus_mut().pause();
    let result = (|| -> TableResult<()> {
        editor.ensure_size(target.r2 + 1, target.c2 + 1)?;
        split_all_in_range(editor, target.r1, target.c1, target.r2, target.c2, RangeSplitMode::Overlap);
        for coord in target.iter_coords() {
            editor.set_cell_value(coord, "")?;
        }

        let mut cells = parsed.cells.clone();
        cells.sort_by_key(|c| (c.r, c.c));
        for cell in &cells {
            let leading = Coord::new(start.r + cell.r, start.c + cell.c);
            editor.set_cell_value(leading, cell.value.as_str())?;
            if cell.row_span > 1 || cell.col_span > 1 {
                let r2 = leading.r + cell.row_span - 1;
                let c2 = leading.c + cell.col_span - 1;
                merge_range(editor, leading.r, leading.c, r2, c2)?;
            }
        }
        Ok(())
    })();
    editor.bus_mut().resume();
    result?;

    editor.emit(EventPayload::Paste { start, rows: parsed.rows, cols: parsed.cols, html: true });
    Ok(())
}
