//! [`TableDocument`]: the facade that wires `tablecraft-core`'s ten
//! components into the API a host application actually calls.
//!
//! `tablecraft-core` deliberately keeps its pieces as free functions and
//! borrow-scoped editors with no opinion on how they're composed.
//! `TableDocument` is that opinion: one struct owning a [`TableModel`], an
//! [`EventBus`], a [`HistoryService`] + [`HistoryDebouncer`], a
//! [`SelectionEngine`] and a [`Validator`].

use std::collections::BTreeMap;

use tablecraft_common::{CellDataValue, Coord, ImportErrors, TableError, TableResult};
use tablecraft_core::clipboard::{apply_html_table_paste, apply_paste, parse_html_table, parse_tsv};
use tablecraft_core::merge::{self, RangeSplitMode};
use tablecraft_core::model::{ColumnSize, ModelEditor};
use tablecraft_core::registry::normalize_classes;
use tablecraft_core::selection::{Direction, SelectionRange};
use tablecraft_core::validator::parse_table_json;
use tablecraft_core::{
    CoreConfig, Document, EventBus, EventPayload, HistoryDebouncer, HistoryService, SelectionEngine,
    SubscriptionId, TableModel, Validator,
};

/// A table document and every service a host needs alongside it: the event
/// bus components mutate through, the undo/redo history (and its
/// debouncer), the registry-backed validator, and cell selection state.
///
/// Mutators that correspond to a single cell or structural edit (cell
/// edits, resize, header rows, column sizing, structural inserts/deletes)
/// debounce a history snapshot via [`HistoryDebouncer::schedule`] — the
/// caller supplies `now_ms` because the core has no ambient clock.
/// Mutators that are themselves a multi-step geometric edit (merge, split,
/// clipboard paste) already pause/resume the bus internally, which is this
/// workspace's definition of "a batch"; those force an immediate snapshot
/// via [`HistoryDebouncer::force`] instead of scheduling one, so a batch
/// always produces exactly one additional snapshot.
/// [`TableDocument::batch`] lets a caller group several facade calls the
/// same way.
pub struct TableDocument {
    model: TableModel,
    bus: EventBus,
    config: CoreConfig,
    validator: Validator,
    history: HistoryService,
    debouncer: HistoryDebouncer,
    selection: SelectionEngine,
}

impl TableDocument {
    /// A brand-new `rows x cols` document, validated against the built-in
    /// registry and using [`CoreConfig::default`].
    pub fn new(rows: u32, cols: u32) -> Self {
        Self::with_options(rows, cols, CoreConfig::default(), Validator::core())
    }

    /// Like [`TableDocument::new`], with an explicit config and registry.
    pub fn with_options(rows: u32, cols: u32, config: CoreConfig, validator: Validator) -> Self {
        let mut doc = Document::empty(rows, cols);
        #[cfg(feature = "system-clock")]
        {
            doc.meta.created_utc = Some(chrono::Utc::now().to_rfc3339());
        }
        let model = TableModel::new(doc).expect("Document::empty always satisfies shape invariants");
        Self::from_model(model, config, validator)
    }

    /// Stamp `meta.createdUtc` explicitly. For a host with no ambient wall
    /// clock (a portable wasm guest built without the `system-clock`
    /// feature), this is how `createdUtc` gets set instead of
    /// `chrono::Utc::now()`. Does not emit an event or touch history: this
    /// is bookkeeping metadata, not a document edit.
    pub fn set_created_utc(&mut self, created_utc: impl Into<String>) {
        let mut doc = self.model.document().clone();
        doc.meta.created_utc = Some(created_utc.into());
        self.with_editor(move |editor| editor.apply_document(doc, false))
            .expect("mutating meta alone cannot violate shape invariants");
    }

    /// Wrap an existing, already-valid [`Document`].
    pub fn from_document(doc: Document, config: CoreConfig, validator: Validator) -> TableResult<Self> {
        let model = TableModel::new(doc)?;
        Ok(Self::from_model(model, config, validator))
    }

    /// Parse and strictly validate `raw` before constructing the document.
    /// On failure returns every Shape/Bounds/Registry error found,
    /// concatenated.
    pub fn from_json(raw: &str, config: CoreConfig, validator: Validator) -> Result<Self, ImportErrors> {
        let model = parse_table_json(raw, &validator)?;
        Ok(Self::from_model(model, config, validator))
    }

    fn from_model(model: TableModel, config: CoreConfig, validator: Validator) -> Self {
        let mut history = HistoryService::new(config.history_limit);
        history.record(&model);
        let debouncer = HistoryDebouncer::new(config.debounce_delay_ms);
        Self { model, bus: EventBus::new(), config, validator, history, debouncer, selection: SelectionEngine::new() }
    }

    // ---- accessors -----------------------------------------------------

    pub fn model(&self) -> &TableModel {
        &self.model
    }

    pub fn to_json(&self) -> Document {
        self.model.to_json()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    /// Every registry error in the document's *current* state (not just at
    /// import time) — useful after a host has changed classes/data directly.
    pub fn validate(&self) -> Result<(), ImportErrors> {
        self.validator.validate_document(&self.model.to_json())
    }

    /// Normalize a candidate class list against this document's registry:
    /// drop unknowns, keep only the last survivor per exclusive group.
    pub fn normalize_classes(&self, classes: &[String]) -> Vec<String> {
        normalize_classes(self.validator.registry(), classes)
    }

    fn with_editor<R>(&mut self, f: impl FnOnce(&mut ModelEditor<'_>) -> R) -> R {
        let mut editor = ModelEditor::new(&mut self.model, &mut self.bus, &self.config);
        f(&mut editor)
    }

    // ---- event bus -------------------------------------------------------

    pub fn on<F>(&mut self, name: tablecraft_core::EventName, handler: F) -> SubscriptionId
    where
        F: FnMut(&EventPayload) + 'static,
    {
        self.bus.on(name, handler)
    }

    pub fn off(&mut self, id: SubscriptionId) {
        self.bus.off(id);
    }

    /// Run `f` with the bus paused and, once it completes, flush exactly one
    /// history snapshot — the bus's own batch/pause/resume reaction, lifted
    /// to facade level so a caller can group several mutating calls (e.g.
    /// `batch { insert_rows(2, 2, now_ms) }`).
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut TableDocument) -> R) -> R {
        self.bus.pause();
        let result = f(self);
        self.bus.resume();
        self.debouncer.force(&mut self.history, &self.model);
        result
    }

    // ---- cell mutators (debounced) ---------------------------------------

    pub fn set_cell_value(&mut self, r: u32, c: u32, value: impl Into<String>, now_ms: u64) -> TableResult<()> {
        let value = value.into();
        self.with_editor(move |editor| editor.set_cell_value(Coord::new(r, c), value))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn set_cell_classes(&mut self, r: u32, c: u32, classes: Vec<String>, now_ms: u64) -> TableResult<()> {
        self.with_editor(move |editor| editor.set_cell_classes(Coord::new(r, c), classes))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn set_cell_data(
        &mut self,
        r: u32,
        c: u32,
        data: BTreeMap<String, CellDataValue>,
        now_ms: u64,
    ) -> TableResult<()> {
        self.with_editor(move |editor| editor.set_cell_data(Coord::new(r, c), data))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    // ---- cell editing session ---------------------------------------------
    //
    // `edit:start|commit|cancel` sit alongside `cell:change` in the bus
    // contract, but no core mutator fires them — they describe an inline
    // editor UI's session, not a model write, and that UI lives outside the
    // core. The facade is where that session lives: `commit_cell_edit` still
    // goes through `ModelEditor::set_cell_value` (and so still emits its own
    // `cell:change`) — `edit:commit` is an additional, UI-facing event
    // layered on top, not a replacement for it.

    /// Begin editing the cell at `(r, c)`, returning its current value.
    /// Rejected for out-of-bounds or covered coordinates, same as
    /// `set_cell_value`.
    pub fn start_cell_edit(&mut self, r: u32, c: u32) -> TableResult<String> {
        let coord = Coord::new(r, c);
        if !self.model.is_in_bounds(coord) {
            return Err(TableError::bounds(coord, "coordinate outside grid"));
        }
        if self.model.is_covered(coord) {
            return Err(TableError::geometry("covered-cell", format!("{coord} is covered by a merge")));
        }
        let old_value = self.model.get_cell(coord).map(|cell| cell.value.clone()).unwrap_or_default();
        self.bus.emit(EventPayload::EditStart { coord, old_value: old_value.clone() });
        Ok(old_value)
    }

    /// Commit an edit in progress: writes `new_value` (via `set_cell_value`)
    /// and emits `edit:commit` with both the value it replaced and the new
    /// one.
    pub fn commit_cell_edit(&mut self, r: u32, c: u32, new_value: impl Into<String>, now_ms: u64) -> TableResult<()> {
        let coord = Coord::new(r, c);
        let new_value = new_value.into();
        let old_value = self.model.get_cell(coord).map(|cell| cell.value.clone()).unwrap_or_default();
        self.with_editor(|editor| editor.set_cell_value(coord, new_value.clone()))?;
        self.bus.emit(EventPayload::EditCommit { coord, old_value, new_value });
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    /// Abandon an edit in progress without writing anything.
    pub fn cancel_cell_edit(&mut self, r: u32, c: u32) {
        let coord = Coord::new(r, c);
        let old_value = self.model.get_cell(coord).map(|cell| cell.value.clone()).unwrap_or_default();
        self.bus.emit(EventPayload::EditCancel { coord, old_value });
    }

    // ---- structural mutators (debounced) ----------------------------------

    pub fn ensure_size(&mut self, rows: u32, cols: u32, now_ms: u64) -> TableResult<()> {
        self.with_editor(|editor| editor.ensure_size(rows, cols))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn set_header_rows(&mut self, n: u32, now_ms: u64) {
        self.with_editor(|editor| editor.set_header_rows(n));
        self.debouncer.schedule(now_ms);
    }

    pub fn set_table_name(&mut self, name: &str, now_ms: u64) {
        self.with_editor(|editor| editor.set_table_name(name));
        self.debouncer.schedule(now_ms);
    }

    pub fn set_column_size(&mut self, index: u32, raw: &str, now_ms: u64) -> TableResult<()> {
        self.with_editor(|editor| editor.set_column_size(index, raw))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn set_column_sizes(&mut self, sizes: Option<Vec<ColumnSize>>, now_ms: u64) -> TableResult<()> {
        self.with_editor(move |editor| editor.set_column_sizes(sizes))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn apply_document(&mut self, doc: Document, now_ms: u64) -> TableResult<()> {
        self.with_editor(move |editor| editor.apply_document(doc, true))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn insert_rows(&mut self, index: u32, count: u32, now_ms: u64) -> TableResult<()> {
        self.with_editor(|editor| editor.insert_rows(index, count))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn insert_columns(&mut self, index: u32, count: u32, now_ms: u64) -> TableResult<()> {
        self.with_editor(|editor| editor.insert_columns(index, count))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn delete_rows(&mut self, start: u32, count: u32, now_ms: u64) -> TableResult<()> {
        self.with_editor(|editor| editor.delete_rows(start, count))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    pub fn delete_columns(&mut self, start: u32, count: u32, now_ms: u64) -> TableResult<()> {
        self.with_editor(|editor| editor.delete_columns(start, count))?;
        self.debouncer.schedule(now_ms);
        Ok(())
    }

    // ---- merge / split (already one batch each — flush immediately) ------

    pub fn merge_range(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> TableResult<()> {
        self.with_editor(|editor| merge::merge_range(editor, r1, c1, r2, c2))?;
        self.debouncer.force(&mut self.history, &self.model);
        Ok(())
    }

    pub fn split_cell(&mut self, r: u32, c: u32) -> TableResult<()> {
        self.with_editor(|editor| merge::split_cell(editor, Coord::new(r, c)))?;
        self.debouncer.force(&mut self.history, &self.model);
        Ok(())
    }

    pub fn split_all_in_range(&mut self, r1: u32, c1: u32, r2: u32, c2: u32, mode: RangeSplitMode) -> usize {
        let count = self.with_editor(|editor| merge::split_all_in_range(editor, r1, c1, r2, c2, mode));
        self.debouncer.force(&mut self.history, &self.model);
        count
    }

    // ---- clipboard (already one batch each) -------------------------------

    pub fn paste_tsv(&mut self, start_r: u32, start_c: u32, text: &str) -> TableResult<()> {
        let matrix = parse_tsv(text);
        self.with_editor(|editor| apply_paste(editor, Coord::new(start_r, start_c), &matrix))?;
        self.debouncer.force(&mut self.history, &self.model);
        Ok(())
    }

    pub fn paste_html(&mut self, start_r: u32, start_c: u32, html: &str) -> TableResult<()> {
        let parsed = parse_html_table(html);
        self.with_editor(|editor| apply_html_table_paste(editor, Coord::new(start_r, start_c), &parsed))?;
        self.debouncer.force(&mut self.history, &self.model);
        Ok(())
    }

    // ---- history -----------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_history_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Drive the debounce clock. A host (an animation-frame loop, a wasm
    /// `setTimeout` callback) calls this with its own "now", in
    /// milliseconds; a pending snapshot whose deadline has passed is
    /// recorded.
    pub fn tick_history(&mut self, now_ms: u64) {
        self.debouncer.tick(now_ms, &mut self.history, &self.model);
    }

    /// Force an immediate snapshot if one is pending, without waiting for
    /// the debounce delay to elapse.
    pub fn flush_history(&mut self) {
        self.debouncer.flush(&mut self.history, &self.model);
    }

    pub fn cancel_pending_history(&mut self) {
        self.debouncer.cancel();
    }

    /// Move the history cursor back one step and apply the snapshot found
    /// there. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> TableResult<bool> {
        let Some(doc) = self.history.undo().cloned() else { return Ok(false) };
        #[cfg(feature = "tracing")]
        tracing::debug!(history_len = self.history.len(), "undo");
        self.restore(doc)?;
        Ok(true)
    }

    /// Move the history cursor forward one step and apply the snapshot
    /// found there. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> TableResult<bool> {
        let Some(doc) = self.history.redo().cloned() else { return Ok(false) };
        #[cfg(feature = "tracing")]
        tracing::debug!(history_len = self.history.len(), "redo");
        self.restore(doc)?;
        Ok(true)
    }

    fn restore(&mut self, doc: Document) -> TableResult<()> {
        let model = &mut self.model;
        let bus = &mut self.bus;
        let config = &self.config;
        let history = &mut self.history;
        let mut result = Ok(());
        history.restore(
            |d| {
                let mut editor = ModelEditor::new(model, bus, config);
                result = editor.apply_document(d.clone(), true);
            },
            &doc,
        );
        result
    }

    // ---- selection ---------------------------------------------------------

    pub fn select(&mut self, r: u32, c: u32) -> bool {
        self.selection.select(&self.model, &mut self.bus, Coord::new(r, c))
    }

    pub fn start_range(&mut self, r: u32, c: u32) -> bool {
        self.selection.start_range(&self.model, Coord::new(r, c))
    }

    pub fn update_range(&mut self, r: u32, c: u32) -> bool {
        self.selection.update_range(&self.model, &mut self.bus, Coord::new(r, c))
    }

    pub fn commit_range(&self) -> bool {
        self.selection.commit_range()
    }

    pub fn cancel_range(&mut self) {
        self.selection.cancel_range();
    }

    pub fn clear_range(&mut self) {
        self.selection.clear_range();
    }

    pub fn get_range(&self) -> Option<SelectionRange> {
        self.selection.get_range()
    }

    pub fn has_range(&self) -> bool {
        self.selection.has_range()
    }

    pub fn select_full_row(&mut self, r: u32) -> bool {
        self.selection.select_full_row(&self.model, &mut self.bus, r)
    }

    pub fn select_full_column(&mut self, c: u32) -> bool {
        self.selection.select_full_column(&self.model, &mut self.bus, c)
    }

    pub fn move_selection(&mut self, dir: Direction) -> bool {
        let max_hops = self.config.navigation_max_hops;
        self.selection.move_selection(&self.model, &mut self.bus, dir, max_hops)
    }

    pub fn extend_range(&mut self, dir: Direction) -> bool {
        let max_hops = self.config.navigation_max_hops;
        self.selection.extend_range(&self.model, &mut self.bus, dir, max_hops)
    }
}
