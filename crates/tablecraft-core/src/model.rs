//! The table document: its on-wire shape ([`Document`] and friends), the
//! read-only [`TableModel`] that indexes it, and [`ModelEditor`], the
//! borrow-scoped mutator that is the only thing allowed to change a model
//! and emit events while doing so.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use tablecraft_common::{CellDataValue, Coord, Rect, TableError, TableResult};

use crate::bus::EventBus;
use crate::config::CoreConfig;
use crate::events::{CellField, EventPayload, StructureChangeKind};

/// Horizontal unit for a [`ColumnSize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnUnit {
    Px,
    Ratio,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSize {
    pub v: f64,
    pub u: ColumnUnit,
}

impl Default for ColumnSize {
    fn default() -> Self {
        Self { v: 1.0, u: ColumnUnit::Ratio }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "createdUtc", default, skip_serializing_if = "Option::is_none")]
    pub created_utc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: u32,
    pub cols: u32,
    #[serde(rename = "headerRows", default)]
    pub header_rows: u32,
    #[serde(rename = "columnSizes", default, skip_serializing_if = "Option::is_none")]
    pub column_sizes: Option<Vec<ColumnSize>>,
}

/// A leading cell: the top-left corner of a (possibly 1x1) merge rectangle.
/// Covered coordinates inside a larger merge are never materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub r: u32,
    pub c: u32,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "rowSpan", default = "one", skip_serializing_if = "is_one")]
    pub row_span: u32,
    #[serde(rename = "colSpan", default = "one", skip_serializing_if = "is_one")]
    pub col_span: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, CellDataValue>,
}

fn one() -> u32 {
    1
}

fn is_one(n: &u32) -> bool {
    *n == 1
}

impl Cell {
    fn empty(r: u32, c: u32) -> Self {
        Self {
            r,
            c,
            value: String::new(),
            row_span: 1,
            col_span: 1,
            classes: Vec::new(),
            data: BTreeMap::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::normalized(self.r, self.c, self.r + self.row_span - 1, self.c + self.col_span - 1)
    }

    /// A cell with no value, no non-default span, no classes and no data —
    /// dropped on serialization so an untouched cell never appears in
    /// the document's `cells` list.
    fn is_trivially_empty(&self) -> bool {
        self.value.is_empty()
            && self.row_span == 1
            && self.col_span == 1
            && self.classes.is_empty()
            && self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    pub meta: Meta,
    pub grid: Grid,
    pub cells: Vec<Cell>,
}

impl Document {
    pub fn empty(rows: u32, cols: u32) -> Self {
        Self {
            version: 1,
            meta: Meta::default(),
            grid: Grid { rows, cols, header_rows: 0, column_sizes: None },
            cells: Vec::new(),
        }
    }

    pub(crate) fn validate_shape(&self) -> TableResult<()> {
        if self.version != 1 {
            return Err(TableError::shape(format!("unsupported document version {}", self.version)));
        }
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(TableError::shape("grid.rows and grid.cols must be positive"));
        }
        if self.grid.header_rows > self.grid.rows {
            return Err(TableError::shape("headerRows exceeds grid.rows"));
        }
        if let Some(sizes) = &self.grid.column_sizes {
            if sizes.len() as u32 != self.grid.cols {
                return Err(TableError::shape("columnSizes length must equal grid.cols"));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for cell in &self.cells {
            let row_span = cell.row_span.max(1);
            let col_span = cell.col_span.max(1);
            if row_span < 1 || col_span < 1 {
                return Err(TableError::shape("cell spans must be >= 1"));
            }
            if cell.r >= self.grid.rows || cell.c >= self.grid.cols {
                return Err(TableError::bounds(Coord::new(cell.r, cell.c), "cell origin outside grid"));
            }
            if cell.r + row_span > self.grid.rows || cell.c + col_span > self.grid.cols {
                return Err(TableError::bounds(Coord::new(cell.r, cell.c), "cell span exceeds grid"));
            }
            if !seen.insert((cell.r, cell.c)) {
                return Err(TableError::shape(format!("duplicate cell at ({}, {})", cell.r, cell.c)));
            }
        }
        let rects: Vec<Rect> = self.cells.iter().map(Cell::rect).collect();
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if rects[i].intersects(&rects[j]) {
                    return Err(TableError::geometry(
                        "merge-overlap",
                        format!("cells at ({},{}) and ({},{}) overlap", rects[i].r1, rects[i].c1, rects[j].r1, rects[j].c1),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Owns a [`Document`] and the indexes derived from it. Read-only: all
/// mutation goes through [`ModelEditor`], which borrows both a `TableModel`
/// and the [`EventBus`] it reports to.
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    doc: Document,
    /// Leading-cell coordinate -> index into `doc.cells`.
    index: HashMap<Coord, usize>,
    /// Covered (non-leading) coordinate -> index of the owning leading cell.
    covered: HashMap<Coord, usize>,
}

impl TableModel {
    pub fn new(doc: Document) -> TableResult<Self> {
        doc.validate_shape()?;
        let mut model = Self { doc, index: HashMap::new(), covered: HashMap::new() };
        model.rebuild_index();
        Ok(model)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn rows(&self) -> u32 {
        self.doc.grid.rows
    }

    pub fn cols(&self) -> u32 {
        self.doc.grid.cols
    }

    pub fn header_rows(&self) -> u32 {
        self.doc.grid.header_rows
    }

    pub fn get_cell(&self, coord: Coord) -> Option<&Cell> {
        self.index.get(&coord).map(|&i| &self.doc.cells[i])
    }

    pub fn is_covered(&self, coord: Coord) -> bool {
        self.covered.contains_key(&coord)
    }

    pub fn is_in_bounds(&self, coord: Coord) -> bool {
        coord.r < self.doc.grid.rows && coord.c < self.doc.grid.cols
    }

    /// The rectangle of the merge (or 1x1 cell) that covers `coord`, if any
    /// leading cell claims it.
    pub fn cell_rect_containing(&self, coord: Coord) -> Option<Rect> {
        if let Some(&i) = self.index.get(&coord) {
            return Some(self.doc.cells[i].rect());
        }
        if let Some(&i) = self.covered.get(&coord) {
            return Some(self.doc.cells[i].rect());
        }
        None
    }

    /// The leading-cell coordinate that owns `coord`, if any.
    pub fn leading_coord_of(&self, coord: Coord) -> Option<Coord> {
        if self.index.contains_key(&coord) {
            return Some(coord);
        }
        self.covered.get(&coord).map(|&i| Coord::new(self.doc.cells[i].r, self.doc.cells[i].c))
    }

    pub fn rebuild_index(&mut self) {
        self.index.clear();
        self.covered.clear();
        for (i, cell) in self.doc.cells.iter().enumerate() {
            self.index.insert(Coord::new(cell.r, cell.c), i);
            if cell.row_span > 1 || cell.col_span > 1 {
                for coord in cell.rect().iter_coords() {
                    if coord.r == cell.r && coord.c == cell.c {
                        continue;
                    }
                    self.covered.insert(coord, i);
                }
            }
        }
    }

    /// Produce the Document form, dropping trivially empty cells and sorting
    /// by `(r, c)` so repeated calls over an unchanged model are byte-stable.
    pub fn to_json(&self) -> Document {
        let mut cells: Vec<Cell> = self.doc.cells.iter().filter(|c| !c.is_trivially_empty()).cloned().collect();
        cells.sort_by_key(|c| (c.r, c.c));
        Document { version: self.doc.version, meta: self.doc.meta.clone(), grid: self.doc.grid.clone(), cells }
    }
}

/// Borrow-scoped mutator over a [`TableModel`]. Every public method performs
/// exactly one logical change and emits exactly one event for it (unless the
/// caller has wrapped the call in [`EventBus::batch`]).
pub struct ModelEditor<'a> {
    model: &'a mut TableModel,
    bus: &'a mut EventBus,
    config: &'a CoreConfig,
}

impl<'a> ModelEditor<'a> {
    pub fn new(model: &'a mut TableModel, bus: &'a mut EventBus, config: &'a CoreConfig) -> Self {
        Self { model, bus, config }
    }

    pub fn model(&self) -> &TableModel {
        self.model
    }

    pub(crate) fn bus_mut(&mut self) -> &mut EventBus {
        self.bus
    }

    pub(crate) fn emit(&mut self, payload: EventPayload) {
        self.bus.emit(payload);
    }

    pub(crate) fn rebuild_index(&mut self) {
        self.model.rebuild_index();
    }

    pub(crate) fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        let i = *self.model.index.get(&coord)?;
        Some(&mut self.model.doc.cells[i])
    }

    /// Create an empty leading cell at `coord` if none is indexed yet, and
    /// return its index. Used by merge/split and paste to materialize cells
    /// lazily without going through the value-setting event path.
    pub(crate) fn ensure_empty_leading_cell(&mut self, coord: Coord) -> usize {
        self.ensure_leading_cell(coord)
    }

    /// Drop every cell for which `keep` returns `false`, without touching
    /// the event bus or rebuilding the index (the caller does that once,
    /// after all structural changes in a batch are applied).
    pub(crate) fn retain_cells(&mut self, keep: impl Fn(&Cell) -> bool) {
        self.model.doc.cells.retain(|cell| keep(cell));
    }

    fn require_in_bounds(&self, coord: Coord) -> TableResult<()> {
        if self.model.is_in_bounds(coord) {
            Ok(())
        } else {
            Err(TableError::bounds(coord, "coordinate outside grid"))
        }
    }

    /// Find the leading cell's index at `coord`, creating an empty one
    /// (span 1x1) if none exists.
    fn ensure_leading_cell(&mut self, coord: Coord) -> usize {
        if let Some(&i) = self.model.index.get(&coord) {
            return i;
        }
        self.model.doc.cells.push(Cell::empty(coord.r, coord.c));
        let i = self.model.doc.cells.len() - 1;
        self.model.index.insert(coord, i);
        i
    }

    pub fn set_cell_value(&mut self, coord: Coord, value: impl Into<String>) -> TableResult<()> {
        self.require_in_bounds(coord)?;
        if self.model.is_covered(coord) {
            return Err(TableError::geometry("covered-cell", format!("{coord} is covered by a merge")));
        }
        let new_value = value.into();
        let i = self.ensure_leading_cell(coord);
        let old_value = self.model.doc.cells[i].value.clone();
        if old_value == new_value {
            return Ok(());
        }
        self.model.doc.cells[i].value = new_value.clone();
        self.bus.emit(EventPayload::CellChange {
            coord,
            field: CellField::Value { old: old_value, new: new_value },
        });
        Ok(())
    }

    pub fn set_cell_classes(&mut self, coord: Coord, classes: Vec<String>) -> TableResult<()> {
        self.require_in_bounds(coord)?;
        if self.model.is_covered(coord) {
            return Err(TableError::geometry("covered-cell", format!("{coord} is covered by a merge")));
        }
        let i = self.ensure_leading_cell(coord);
        let old = self.model.doc.cells[i].classes.clone();
        if old == classes {
            return Ok(());
        }
        self.model.doc.cells[i].classes = classes.clone();
        self.bus.emit(EventPayload::CellChange {
            coord,
            field: CellField::Classes { old, new: classes },
        });
        Ok(())
    }

    pub fn set_cell_data(&mut self, coord: Coord, data: BTreeMap<String, CellDataValue>) -> TableResult<()> {
        self.require_in_bounds(coord)?;
        if self.model.is_covered(coord) {
            return Err(TableError::geometry("covered-cell", format!("{coord} is covered by a merge")));
        }
        let i = self.ensure_leading_cell(coord);
        let old = self.model.doc.cells[i].data.clone();
        if old == data {
            return Ok(());
        }
        self.model.doc.cells[i].data = data.clone();
        self.bus.emit(EventPayload::CellChange {
            coord,
            field: CellField::Data { old, new: data },
        });
        Ok(())
    }

    /// Grow the grid to at least `rows` x `cols`. Never shrinks.
    pub fn ensure_size(&mut self, rows: u32, cols: u32) -> TableResult<()> {
        let new_rows = self.model.doc.grid.rows.max(rows);
        let new_cols = self.model.doc.grid.cols.max(cols);
        if new_rows == self.model.doc.grid.rows && new_cols == self.model.doc.grid.cols {
            return Ok(());
        }
        if (new_rows as u64) * (new_cols as u64) > self.config.max_grid_cells {
            return Err(TableError::argument("requested grid size exceeds the configured cell limit"));
        }
        if let Some(sizes) = &mut self.model.doc.grid.column_sizes {
            while (sizes.len() as u32) < new_cols {
                sizes.push(ColumnSize::default());
            }
        }
        self.model.doc.grid.rows = new_rows;
        self.model.doc.grid.cols = new_cols;
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::Resize {
            rows: new_rows,
            cols: new_cols,
        }));
        Ok(())
    }

    pub fn set_header_rows(&mut self, n: u32) {
        let clamped = n.min(self.model.doc.grid.rows);
        if clamped == self.model.doc.grid.header_rows {
            return;
        }
        self.model.doc.grid.header_rows = clamped;
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::HeaderRows { header_rows: clamped }));
    }

    pub fn set_table_name(&mut self, name: &str) {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed == self.model.doc.meta.name {
            return;
        }
        self.model.doc.meta.name = trimmed.to_string();
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::Meta { field: "name" }));
    }

    /// Parse `"<digits>px"` or `"<digits>"` (a bare number means a ratio
    /// weight); anything else resets the column to the default ratio size.
    pub fn set_column_size(&mut self, index: u32, raw: &str) -> TableResult<()> {
        if index >= self.model.doc.grid.cols {
            return Err(TableError::bounds(Coord::new(0, index), "column index outside grid"));
        }
        let size = parse_column_size(raw);
        let cols = self.model.doc.grid.cols;
        let sizes = self.model.doc.grid.column_sizes.get_or_insert_with(|| vec![ColumnSize::default(); cols as usize]);
        sizes[index as usize] = size;
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::ColumnSizes));
        Ok(())
    }

    pub fn set_column_sizes(&mut self, sizes: Option<Vec<ColumnSize>>) -> TableResult<()> {
        if let Some(sizes) = &sizes {
            if sizes.len() as u32 != self.model.doc.grid.cols {
                return Err(TableError::shape("columnSizes length must equal grid.cols"));
            }
        }
        self.model.doc.grid.column_sizes = sizes;
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::ColumnSizes));
        Ok(())
    }

    /// Replace `version`/`meta`/`grid`/`cells` in place, preserving the
    /// model's external identity. Rejects malformed input without mutating.
    pub fn apply_document(&mut self, doc: Document, emit_event: bool) -> TableResult<()> {
        doc.validate_shape()?;
        self.model.doc = doc;
        self.model.rebuild_index();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            rows = self.model.doc.grid.rows,
            cols = self.model.doc.grid.cols,
            cells = self.model.doc.cells.len(),
            "applied document"
        );
        if emit_event {
            self.bus.emit(EventPayload::StructureChange(StructureChangeKind::ApplyDocument));
        }
        Ok(())
    }

    pub fn insert_rows(&mut self, index: u32, count: u32) -> TableResult<()> {
        if count == 0 {
            return Ok(());
        }
        let index = index.min(self.model.doc.grid.rows);
        for cell in self.model.doc.cells.iter_mut() {
            let top = cell.r;
            let bottom = top + cell.row_span - 1;
            if top >= index {
                cell.r += count;
            } else if index <= bottom {
                cell.row_span += count;
            }
        }
        self.model.doc.grid.rows += count;
        self.model.rebuild_index();
        #[cfg(feature = "tracing")]
        tracing::debug!(index, count, rows = self.model.doc.grid.rows, "inserted rows");
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::InsertRows { index, count }));
        Ok(())
    }

    pub fn insert_columns(&mut self, index: u32, count: u32) -> TableResult<()> {
        if count == 0 {
            return Ok(());
        }
        let index = index.min(self.model.doc.grid.cols);
        for cell in self.model.doc.cells.iter_mut() {
            let left = cell.c;
            let right = left + cell.col_span - 1;
            if left >= index {
                cell.c += count;
            } else if index <= right {
                cell.col_span += count;
            }
        }
        self.model.doc.grid.cols += count;
        if let Some(sizes) = &mut self.model.doc.grid.column_sizes {
            let insert_at = (index as usize).min(sizes.len());
            for _ in 0..count {
                sizes.insert(insert_at, ColumnSize::default());
            }
        }
        self.model.rebuild_index();
        #[cfg(feature = "tracing")]
        tracing::debug!(index, count, cols = self.model.doc.grid.cols, "inserted columns");
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::InsertColumns { index, count }));
        Ok(())
    }

    pub fn delete_rows(&mut self, start: u32, count: u32) -> TableResult<()> {
        if count == 0 {
            return Ok(());
        }
        if self.model.doc.grid.rows < count || self.model.doc.grid.rows - count < 1 {
            return Err(TableError::argument("cannot delete the last remaining row"));
        }
        let r_from = start;
        let r_to = start + count - 1;

        for cell in &self.model.doc.cells {
            let top = cell.r;
            let bottom = top + cell.row_span - 1;
            if top < r_from && bottom > r_to {
                return Err(TableError::geometry(
                    "interior-merge-cut",
                    format!("deleting rows {r_from}..={r_to} cuts through the interior of the merge at ({top},{})", cell.c),
                ));
            }
        }

        let mut next: Vec<Cell> = Vec::with_capacity(self.model.doc.cells.len());
        for mut cell in std::mem::take(&mut self.model.doc.cells) {
            let top = cell.r;
            let bottom = top + cell.row_span - 1;
            if bottom < r_from {
                next.push(cell);
            } else if top > r_to {
                cell.r -= count;
                next.push(cell);
            } else if top >= r_from && bottom <= r_to {
                // fully inside the deleted band: drop
            } else if top < r_from && bottom <= r_to {
                cell.row_span = r_from - top;
                next.push(cell);
            } else if top >= r_from && bottom > r_to {
                cell.row_span = bottom - r_to;
                cell.r = r_from;
                next.push(cell);
            }
        }
        self.model.doc.cells = next;
        self.model.doc.grid.rows -= count;
        self.model.doc.grid.header_rows = self.model.doc.grid.header_rows.min(self.model.doc.grid.rows);
        self.model.rebuild_index();
        #[cfg(feature = "tracing")]
        tracing::debug!(start, count, rows = self.model.doc.grid.rows, "deleted rows");
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::DeleteRows { start, count }));
        Ok(())
    }

    pub fn delete_columns(&mut self, start: u32, count: u32) -> TableResult<()> {
        if count == 0 {
            return Ok(());
        }
        if self.model.doc.grid.cols < count || self.model.doc.grid.cols - count < 1 {
            return Err(TableError::argument("cannot delete the last remaining column"));
        }
        let c_from = start;
        let c_to = start + count - 1;

        for cell in &self.model.doc.cells {
            let left = cell.c;
            let right = left + cell.col_span - 1;
            if left < c_from && right > c_to {
                return Err(TableError::geometry(
                    "interior-merge-cut",
                    format!("deleting columns {c_from}..={c_to} cuts through the interior of the merge at ({},{left})", cell.r),
                ));
            }
        }

        let mut next: Vec<Cell> = Vec::with_capacity(self.model.doc.cells.len());
        for mut cell in std::mem::take(&mut self.model.doc.cells) {
            let left = cell.c;
            let right = left + cell.col_span - 1;
            if right < c_from {
                next.push(cell);
            } else if left > c_to {
                cell.c -= count;
                next.push(cell);
            } else if left >= c_from && right <= c_to {
                // dropped
            } else if left < c_from && right <= c_to {
                cell.col_span = c_from - left;
                next.push(cell);
            } else if left >= c_from && right > c_to {
                cell.col_span = right - c_to;
                cell.c = c_from;
                next.push(cell);
            }
        }
        self.model.doc.cells = next;
        self.model.doc.grid.cols -= count;
        if let Some(sizes) = &mut self.model.doc.grid.column_sizes {
            let from = (c_from as usize).min(sizes.len());
            let to = ((c_to + 1) as usize).min(sizes.len());
            sizes.drain(from..to);
            if sizes.is_empty() {
                self.model.doc.grid.column_sizes = None;
            }
        }
        self.model.rebuild_index();
        #[cfg(feature = "tracing")]
        tracing::debug!(start, count, cols = self.model.doc.grid.cols, "deleted columns");
        self.bus.emit(EventPayload::StructureChange(StructureChangeKind::DeleteColumns { start, count }));
        Ok(())
    }
}

fn parse_column_size(raw: &str) -> ColumnSize {
    let trimmed = raw.trim();
    if let Some(digits) = trimmed.strip_suffix("px") {
        if let Ok(v) = digits.trim().parse::<f64>() {
            return ColumnSize { v, u: ColumnUnit::Px };
        }
    } else if let Ok(v) = trimmed.parse::<f64>() {
        return ColumnSize { v, u: ColumnUnit::Ratio };
    }
    ColumnSize::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor_harness(doc: Document) -> (TableModel, EventBus, CoreConfig) {
        (TableModel::new(doc).unwrap(), EventBus::new(), CoreConfig::default())
    }

    #[test]
    fn set_cell_value_creates_leading_cell_lazily() {
        let (mut model, mut bus, config) = editor_harness(Document::empty(3, 3));
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        editor.set_cell_value(Coord::new(1, 1), "hi").unwrap();
        assert_eq!(model.get_cell(Coord::new(1, 1)).unwrap().value, "hi");
    }

    #[test]
    fn set_cell_value_on_covered_coordinate_is_rejected() {
        let mut doc = Document::empty(3, 3);
        doc.cells.push(Cell { r: 0, c: 0, value: String::new(), row_span: 2, col_span: 2, classes: vec![], data: BTreeMap::new() });
        let (mut model, mut bus, config) = editor_harness(doc);
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        let result = editor.set_cell_value(Coord::new(1, 1), "x");
        assert!(result.is_err());
    }

    #[test]
    fn insert_rows_inside_merge_grows_span() {
        let mut doc = Document::empty(5, 5);
        doc.cells.push(Cell { r: 1, c: 1, value: String::new(), row_span: 2, col_span: 3, classes: vec![], data: BTreeMap::new() });
        let (mut model, mut bus, config) = editor_harness(doc);
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        editor.insert_rows(2, 2).unwrap();
        assert_eq!(model.rows(), 7);
        let cell = model.get_cell(Coord::new(1, 1)).unwrap();
        assert_eq!(cell.row_span, 4);
    }

    #[test]
    fn delete_rows_through_merge_interior_is_rejected() {
        let mut doc = Document::empty(8, 4);
        doc.cells.push(Cell { r: 2, c: 0, value: String::new(), row_span: 5, col_span: 1, classes: vec![], data: BTreeMap::new() });
        let (mut model, mut bus, config) = editor_harness(doc);
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        let result = editor.delete_rows(4, 1);
        match result {
            Err(TableError::Geometry { reason, .. }) => assert_eq!(reason, "interior-merge-cut"),
            other => panic!("expected interior-merge-cut, got {other:?}"),
        }
        assert_eq!(model.rows(), 8);
    }

    #[test]
    fn delete_rows_shrinks_overlapping_merge_from_bottom() {
        let mut doc = Document::empty(6, 2);
        doc.cells.push(Cell { r: 0, c: 0, value: String::new(), row_span: 3, col_span: 1, classes: vec![], data: BTreeMap::new() });
        let (mut model, mut bus, config) = editor_harness(doc);
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        editor.delete_rows(1, 4).unwrap();
        let cell = model.get_cell(Coord::new(0, 0)).unwrap();
        assert_eq!(cell.row_span, 1);
    }

    #[test]
    fn to_json_drops_trivially_empty_cells_and_sorts() {
        let mut doc = Document::empty(2, 2);
        doc.cells.push(Cell::empty(1, 1));
        doc.cells.push(Cell { r: 0, c: 0, value: "x".into(), row_span: 1, col_span: 1, classes: vec![], data: BTreeMap::new() });
        let model = TableModel::new(doc).unwrap();
        let json = model.to_json();
        assert_eq!(json.cells.len(), 1);
        assert_eq!(json.cells[0].r, 0);
    }

    #[test]
    fn ensure_size_only_grows() {
        let (mut model, mut bus, config) = editor_harness(Document::empty(3, 3));
        let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
        editor.ensure_size(2, 2).unwrap();
        assert_eq!((model.rows(), model.cols()), (3, 3));
        editor.ensure_size(5, 1).unwrap();
        assert_eq!((model.rows(), model.cols()), (5, 3));
    }
}
