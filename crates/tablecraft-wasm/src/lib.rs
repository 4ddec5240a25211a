//! WebAssembly bindings for the `tablecraft` document core.
//!
//! Exposes a single `#[wasm_bindgen]` class, [`TableDocument`], wrapping
//! [`tablecraft::TableDocument`]. Every mutator that can fail returns
//! `Result<T, JsValue>` (a `js_sys::Error`, per [`errors`]); every event
//! subscription takes a plain JS function and receives payloads shaped
//! exactly like spec.md §4.1's table, translated by [`events`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::prelude::*;

use tablecraft::{CoreConfig, EventName, RangeSplitMode, Validator};
use tablecraft_common::CellDataValue;
use tablecraft_core::SubscriptionId;

mod errors;
mod events;
mod utils;

use errors::import_errors;
use events::event_payload_to_js;

#[wasm_bindgen(start)]
pub fn init() {
    utils::set_panic_hook();
}

/// JS callbacks registered against one event name, keyed by an id handed
/// back to the caller of `on()` so it can later `off()`.
#[derive(Default)]
struct CallbackRegistry {
    next_id: u32,
    callbacks: BTreeMap<u32, Function>,
}

impl CallbackRegistry {
    fn insert(&mut self, f: Function) -> u32 {
        self.next_id = self.next_id.wrapping_add(1).max(1);
        let id = self.next_id;
        self.callbacks.insert(id, f);
        id
    }

    fn remove(&mut self, id: u32) {
        self.callbacks.remove(&id);
    }
}

type SharedCallbacks = Rc<RefCell<BTreeMap<EventName, CallbackRegistry>>>;

/// Adapted from the teacher's `bindings/wasm/src/workbook.rs`
/// `JsCallbackRegistry`: the bus only knows `FnMut(&EventPayload) + 'static`
/// closures, so the closure registered with it at construction time holds a
/// clone of this `Rc` and looks up whichever JS functions are currently
/// registered each time it fires, rather than the bus holding `JsValue`s
/// directly.
fn dispatch(callbacks: &SharedCallbacks, name: EventName, payload: &tablecraft_core::EventPayload) {
    let js_payload = match event_payload_to_js(payload) {
        Ok(v) => v,
        Err(_) => return,
    };
    let callbacks = callbacks.borrow();
    if let Some(registry) = callbacks.get(&name) {
        for f in registry.callbacks.values() {
            let _ = f.call1(&JsValue::UNDEFINED, &js_payload);
        }
    }
}

const ALL_EVENT_NAMES: &[EventName] = &[
    EventName::CellChange,
    EventName::StructureChange,
    EventName::Paste,
    EventName::Merge,
    EventName::Split,
    EventName::SelectionChange,
    EventName::SelectionRange,
    EventName::EditStart,
    EventName::EditCommit,
    EventName::EditCancel,
    EventName::BatchFlush,
];

#[wasm_bindgen]
pub struct TableDocument {
    inner: tablecraft::TableDocument,
    callbacks: SharedCallbacks,
    /// The bus subscriptions backing the dispatch closures above, kept only
    /// so they could in principle be torn down; `tablecraft::TableDocument`
    /// has no "unsubscribe everything" so these live for the document's
    /// whole lifetime.
    #[allow(dead_code)]
    subscriptions: Vec<SubscriptionId>,
}

impl TableDocument {
    fn wrap(inner: tablecraft::TableDocument) -> TableDocument {
        let callbacks: SharedCallbacks = Rc::new(RefCell::new(BTreeMap::new()));
        let mut doc = TableDocument { inner, callbacks, subscriptions: Vec::new() };
        for &name in ALL_EVENT_NAMES {
            let callbacks = doc.callbacks.clone();
            let id = doc.inner.on(name, move |payload| dispatch(&callbacks, name, payload));
            doc.subscriptions.push(id);
        }
        doc
    }
}

#[wasm_bindgen]
impl TableDocument {
    #[wasm_bindgen(constructor)]
    pub fn new(rows: u32, cols: u32) -> TableDocument {
        TableDocument::wrap(tablecraft::TableDocument::new(rows, cols))
    }

    /// Parse and strictly validate a JSON document (spec.md §6) before
    /// constructing it.
    #[wasm_bindgen(js_name = "fromJson")]
    pub fn from_json(raw: &str) -> Result<TableDocument, JsValue> {
        let inner = tablecraft::TableDocument::from_json(raw, CoreConfig::default(), Validator::core())
            .map_err(import_errors)?;
        Ok(TableDocument::wrap(inner))
    }

    #[wasm_bindgen(js_name = "toJson")]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.to_json()).map_err(|e| utils::js_error(e.to_string()))
    }

    // ---- event bus ---------------------------------------------------------

    /// Subscribe `handler` to `name` (one of spec.md §4.1's event names,
    /// e.g. `"cell:change"`). Returns an opaque id to pass to `off`.
    pub fn on(&self, name: &str, handler: Function) -> Result<u32, JsValue> {
        let event = event_name_from_str(name)?;
        let mut callbacks = self.callbacks.borrow_mut();
        Ok(callbacks.entry(event).or_default().insert(handler))
    }

    /// Unsubscribe the callback previously returned by `on` for `name`.
    pub fn off(&self, name: &str, callback_id: u32) -> Result<(), JsValue> {
        let event = event_name_from_str(name)?;
        if let Some(registry) = self.callbacks.borrow_mut().get_mut(&event) {
            registry.remove(callback_id);
        }
        Ok(())
    }

    // ---- cell mutators ------------------------------------------------------

    #[wasm_bindgen(js_name = "setCellValue")]
    pub fn set_cell_value(&mut self, r: u32, c: u32, value: String, now_ms: f64) -> Result<(), JsValue> {
        self.inner.set_cell_value(r, c, value, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "setCellClasses")]
    pub fn set_cell_classes(&mut self, r: u32, c: u32, classes: Vec<String>, now_ms: f64) -> Result<(), JsValue> {
        self.inner.set_cell_classes(r, c, classes, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "normalizeClasses")]
    pub fn normalize_classes(&self, classes: Vec<String>) -> Vec<String> {
        self.inner.normalize_classes(&classes)
    }

    #[wasm_bindgen(js_name = "setCellData")]
    pub fn set_cell_data(&mut self, r: u32, c: u32, data_json: &str, now_ms: f64) -> Result<(), JsValue> {
        let data: BTreeMap<String, CellDataValue> =
            serde_json::from_str(data_json).map_err(|e| utils::js_error(e.to_string()))?;
        self.inner.set_cell_data(r, c, data, now_ms as u64).map_err(errors::table_error)
    }

    // ---- cell editing session -----------------------------------------------

    #[wasm_bindgen(js_name = "startCellEdit")]
    pub fn start_cell_edit(&mut self, r: u32, c: u32) -> Result<String, JsValue> {
        self.inner.start_cell_edit(r, c).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "commitCellEdit")]
    pub fn commit_cell_edit(&mut self, r: u32, c: u32, new_value: String, now_ms: f64) -> Result<(), JsValue> {
        self.inner.commit_cell_edit(r, c, new_value, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "cancelCellEdit")]
    pub fn cancel_cell_edit(&mut self, r: u32, c: u32) {
        self.inner.cancel_cell_edit(r, c);
    }

    // ---- structural mutators -------------------------------------------------

    #[wasm_bindgen(js_name = "ensureSize")]
    pub fn ensure_size(&mut self, rows: u32, cols: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.ensure_size(rows, cols, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "setHeaderRows")]
    pub fn set_header_rows(&mut self, n: u32, now_ms: f64) {
        self.inner.set_header_rows(n, now_ms as u64);
    }

    #[wasm_bindgen(js_name = "setTableName")]
    pub fn set_table_name(&mut self, name: &str, now_ms: f64) {
        self.inner.set_table_name(name, now_ms as u64);
    }

    #[wasm_bindgen(js_name = "setColumnSize")]
    pub fn set_column_size(&mut self, index: u32, raw: &str, now_ms: f64) -> Result<(), JsValue> {
        self.inner.set_column_size(index, raw, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "applyDocument")]
    pub fn apply_document(&mut self, raw_json: &str, now_ms: f64) -> Result<(), JsValue> {
        let doc: tablecraft::Document =
            serde_json::from_str(raw_json).map_err(|e| utils::js_error(e.to_string()))?;
        self.inner.apply_document(doc, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "insertRows")]
    pub fn insert_rows(&mut self, index: u32, count: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.insert_rows(index, count, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "insertColumns")]
    pub fn insert_columns(&mut self, index: u32, count: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.insert_columns(index, count, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "deleteRows")]
    pub fn delete_rows(&mut self, start: u32, count: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.delete_rows(start, count, now_ms as u64).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "deleteColumns")]
    pub fn delete_columns(&mut self, start: u32, count: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.delete_columns(start, count, now_ms as u64).map_err(errors::table_error)
    }

    // ---- merge / split --------------------------------------------------------

    #[wasm_bindgen(js_name = "mergeRange")]
    pub fn merge_range(&mut self, r1: u32, c1: u32, r2: u32, c2: u32) -> Result<(), JsValue> {
        self.inner.merge_range(r1, c1, r2, c2).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "splitCell")]
    pub fn split_cell(&mut self, r: u32, c: u32) -> Result<(), JsValue> {
        self.inner.split_cell(r, c).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "splitAllInRange")]
    pub fn split_all_in_range(&mut self, r1: u32, c1: u32, r2: u32, c2: u32, fully: bool) -> usize {
        let mode = if fully { RangeSplitMode::Fully } else { RangeSplitMode::Overlap };
        self.inner.split_all_in_range(r1, c1, r2, c2, mode)
    }

    // ---- clipboard --------------------------------------------------------------

    #[wasm_bindgen(js_name = "pasteTsv")]
    pub fn paste_tsv(&mut self, start_r: u32, start_c: u32, text: &str) -> Result<(), JsValue> {
        self.inner.paste_tsv(start_r, start_c, text).map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "pasteHtml")]
    pub fn paste_html(&mut self, start_r: u32, start_c: u32, html: &str) -> Result<(), JsValue> {
        self.inner.paste_html(start_r, start_c, html).map_err(errors::table_error)
    }

    // ---- history ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.inner.undo().map_err(errors::table_error)
    }

    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.inner.redo().map_err(errors::table_error)
    }

    #[wasm_bindgen(js_name = "canUndo")]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = "canRedo")]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    /// Drive the debounce clock forward with the host's own notion of "now"
    /// (typically `Date.now()` from a `setTimeout` callback — the core has
    /// no ambient clock of its own, see spec.md §5).
    #[wasm_bindgen(js_name = "tickHistory")]
    pub fn tick_history(&mut self, now_ms: f64) {
        self.inner.tick_history(now_ms as u64);
    }

    #[wasm_bindgen(js_name = "flushHistory")]
    pub fn flush_history(&mut self) {
        self.inner.flush_history();
    }

    #[wasm_bindgen(js_name = "isHistoryPending")]
    pub fn is_history_pending(&self) -> bool {
        self.inner.is_history_pending()
    }

    // ---- selection ------------------------------------------------------------------

    pub fn select(&mut self, r: u32, c: u32) -> bool {
        self.inner.select(r, c)
    }

    #[wasm_bindgen(js_name = "startRange")]
    pub fn start_range(&mut self, r: u32, c: u32) -> bool {
        self.inner.start_range(r, c)
    }

    #[wasm_bindgen(js_name = "updateRange")]
    pub fn update_range(&mut self, r: u32, c: u32) -> bool {
        self.inner.update_range(r, c)
    }

    #[wasm_bindgen(js_name = "commitRange")]
    pub fn commit_range(&mut self) {
        self.inner.commit_range();
    }

    #[wasm_bindgen(js_name = "cancelRange")]
    pub fn cancel_range(&mut self) {
        self.inner.cancel_range();
    }

    #[wasm_bindgen(js_name = "clearRange")]
    pub fn clear_range(&mut self) {
        self.inner.clear_range();
    }

    #[wasm_bindgen(js_name = "hasRange")]
    pub fn has_range(&self) -> bool {
        self.inner.has_range()
    }

    #[wasm_bindgen(js_name = "selectFullRow")]
    pub fn select_full_row(&mut self, r: u32) -> bool {
        self.inner.select_full_row(r)
    }

    #[wasm_bindgen(js_name = "selectFullColumn")]
    pub fn select_full_column(&mut self, c: u32) -> bool {
        self.inner.select_full_column(c)
    }

    #[wasm_bindgen(js_name = "moveSelection")]
    pub fn move_selection(&mut self, direction: &str) -> Result<bool, JsValue> {
        let dir = direction_from_str(direction)?;
        Ok(self.inner.move_selection(dir))
    }

    #[wasm_bindgen(js_name = "extendRange")]
    pub fn extend_range(&mut self, direction: &str) -> Result<bool, JsValue> {
        let dir = direction_from_str(direction)?;
        Ok(self.inner.extend_range(dir))
    }
}

fn event_name_from_str(name: &str) -> Result<EventName, JsValue> {
    ALL_EVENT_NAMES
        .iter()
        .find(|n| n.as_str() == name)
        .copied()
        .ok_or_else(|| utils::js_error(format!("unknown event name '{name}'")))
}

fn direction_from_str(s: &str) -> Result<tablecraft::Direction, JsValue> {
    match s {
        "up" => Ok(tablecraft::Direction::Up),
        "down" => Ok(tablecraft::Direction::Down),
        "left" => Ok(tablecraft::Direction::Left),
        "right" => Ok(tablecraft::Direction::Right),
        other => Err(utils::js_error(format!("unknown direction '{other}'"))),
    }
}
