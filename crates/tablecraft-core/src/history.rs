//! Undo/redo history: a bounded snapshot stack with duplicate suppression
//! ([`HistoryService`]) and a debounce layer that groups rapid edits into a
//! single snapshot ([`HistoryDebouncer`]).

use crate::model::{Document, TableModel};

/// A bounded stack of [`Document`] snapshots with a cursor. `record` is the
/// only way new snapshots enter the stack; `undo`/`redo` only move the
/// cursor and hand back the `Document` found there — applying it back onto
/// a live model is the caller's job (via [`HistoryService::restore`]).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryService {
    snapshots: Vec<Document>,
    /// Index of the snapshot the model currently reflects. Meaningless
    /// (and never read) while `snapshots` is empty.
    index: usize,
    limit: usize,
    /// Set for the duration of [`HistoryService::restore`] so that a
    /// mutator replaying a snapshot back onto the model doesn't itself
    /// produce a new history entry.
    suspended: bool,
}

impl HistoryService {
    pub fn new(limit: usize) -> Self {
        Self { snapshots: Vec::new(), index: 0, limit: limit.max(1), suspended: false }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot `model`'s current state. Skipped entirely while suspended
    /// (a restore in progress never produces its own history entry), or when
    /// the snapshot is byte-identical, under stable JSON comparison, to the
    /// current top of the stack (duplicate suppression). If the cursor isn't at the top
    /// (the caller has undone at least once since the last record), the
    /// redo tail is discarded before the new snapshot is pushed. Dropping
    /// the oldest entry once `limit` is exceeded keeps the cursor pointed
    /// at the same (now-shifted) top snapshot.
    pub fn record(&mut self, model: &TableModel) {
        if self.suspended {
            return;
        }
        let doc = model.to_json();
        if let Some(top) = self.snapshots.get(self.index) {
            if stable_json_eq(top, &doc) {
                #[cfg(feature = "tracing")]
                tracing::debug!("history: skipping duplicate snapshot");
                return;
            }
        }
        if !self.snapshots.is_empty() && self.index + 1 < self.snapshots.len() {
            self.snapshots.truncate(self.index + 1);
        }
        self.snapshots.push(doc);
        self.index = self.snapshots.len() - 1;
        if self.snapshots.len() > self.limit {
            self.snapshots.remove(0);
            self.index -= 1;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(index = self.index, len = self.snapshots.len(), "history: recorded snapshot");
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0 && !self.snapshots.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Move the cursor back one step and return the `Document` found there,
    /// without applying it to any model.
    pub fn undo(&mut self) -> Option<&Document> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Move the cursor forward one step and return the `Document` found
    /// there, without applying it to any model.
    pub fn redo(&mut self) -> Option<&Document> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    /// Run `apply_fn(doc)` with recording suspended, so that the mutator
    /// replaying `doc` back onto a model doesn't itself produce a new
    /// snapshot. The suspend flag is always cleared afterward, even if
    /// `apply_fn` fails — the caller's error, if any, propagates through
    /// `apply_fn`'s own return type.
    pub fn restore<F>(&mut self, apply_fn: F, doc: &Document)
    where
        F: FnOnce(&Document),
    {
        self.suspended = true;
        apply_fn(doc);
        self.suspended = false;
    }
}

/// Compare two documents as stable, canonically-keyed JSON rather than by
/// struct layout, so that duplicate suppression can never be fooled by
/// map-key reordering. `Document`'s
/// `data`/map fields are all `BTreeMap`, so `serde_json::to_string` already
/// emits keys in a single canonical order.
fn stable_json_eq(a: &Document, b: &Document) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Groups rapid mutations into a single [`HistoryService::record`] call.
///
/// The core has no runtime of its own to spawn a timer on — scheduling stays
/// single-threaded and cooperative — so the debounce clock is host-driven
/// instead: a caller — a UI's animation-frame loop, a WASM binding's
/// `setTimeout` callback, a test — calls [`HistoryDebouncer::tick`] with its
/// own notion of "now" in milliseconds. Only the mechanism is host-owned;
/// the contract is fixed here: group rapid changes, and flush on
/// `batch:flush`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryDebouncer {
    delay_ms: u64,
    deadline_ms: Option<u64>,
}

impl HistoryDebouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms, deadline_ms: None }
    }

    /// True while a snapshot is pending (a timer is outstanding).
    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// (Re)start the delay from `now_ms`. Each call resets the deadline,
    /// exactly like the source's repeated `setTimeout` calls.
    pub fn schedule(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Drive the debounce clock forward. If a pending timer has expired by
    /// `now_ms`, records a snapshot and clears the pending state.
    pub fn tick(&mut self, now_ms: u64, history: &mut HistoryService, model: &TableModel) {
        if let Some(deadline) = self.deadline_ms {
            if now_ms >= deadline {
                self.flush(history, model);
            }
        }
    }

    /// Force immediate recording if a timer is pending, regardless of
    /// whether it has expired yet. The host calls this on `batch:flush` so
    /// a whole batch of mutations produces at most one snapshot.
    pub fn flush(&mut self, history: &mut HistoryService, model: &TableModel) {
        if self.deadline_ms.take().is_some() {
            history.record(model);
        }
    }

    /// Discard a pending timer without recording.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    /// Unconditionally discard any pending timer and record right now.
    /// Distinct from [`HistoryDebouncer::flush`] (which only records if a
    /// timer happened to be pending): this is for mutators that are already
    /// a complete batch in their own right — merge, split, clipboard paste,
    /// a facade `batch` call — which must always produce a snapshot for the
    /// change they just made, per spec.md §8 S7, regardless of whether any
    /// unrelated debounced edit was scheduled beforehand. Duplicate
    /// suppression in `HistoryService::record` still yields zero new
    /// snapshots if nothing actually changed.
    pub fn force(&mut self, history: &mut HistoryService, model: &TableModel) {
        self.deadline_ms = None;
        history.record(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EventBus;
    use crate::config::CoreConfig;
    use crate::model::ModelEditor;
    use pretty_assertions::assert_eq;
    use tablecraft_common::Coord;

    fn model_with(rows: u32, cols: u32) -> TableModel {
        TableModel::new(Document::empty(rows, cols)).unwrap()
    }

    #[test]
    fn duplicate_record_is_suppressed() {
        let model = model_with(2, 2);
        let mut history = HistoryService::new(10);
        history.record(&model);
        history.record(&model);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }

    #[test]
    fn undo_then_record_truncates_redo_tail() {
        let mut model = model_with(2, 2);
        let mut bus = EventBus::new();
        let config = CoreConfig::default();
        let mut history = HistoryService::new(10);
        history.record(&model);

        {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            editor.set_cell_value(Coord::new(0, 0), "a").unwrap();
        }
        history.record(&model);
        {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            editor.set_cell_value(Coord::new(0, 0), "b").unwrap();
        }
        history.record(&model);
        assert_eq!(history.len(), 3);

        history.undo();
        {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            editor.set_cell_value(Coord::new(1, 1), "new-branch").unwrap();
        }
        history.record(&model);
        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn history_respects_its_limit() {
        let mut model = model_with(2, 2);
        let mut bus = EventBus::new();
        let config = CoreConfig::default();
        let mut history = HistoryService::new(2);
        history.record(&model);
        for i in 0..5 {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            editor.set_cell_value(Coord::new(0, 0), format!("v{i}")).unwrap();
            history.record(&model);
        }
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn restore_clears_suspend_flag_and_skips_recording_inside_apply_fn() {
        let mut model = model_with(2, 2);
        let mut bus = EventBus::new();
        let config = CoreConfig::default();
        let mut history = HistoryService::new(10);
        history.record(&model);
        let doc = model.to_json();

        history.restore(
            |d| {
                let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
                editor.apply_document(d.clone(), false).unwrap();
            },
            &doc,
        );
        assert!(!history.is_suspended());
        // re-applying the identical document should not add a new snapshot.
        history.record(&model);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn debouncer_schedule_then_tick_past_deadline_records_once() {
        let mut model = model_with(2, 2);
        let mut bus = EventBus::new();
        let config = CoreConfig::default();
        let mut history = HistoryService::new(10);
        history.record(&model);
        let mut debouncer = HistoryDebouncer::new(500);

        {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            editor.set_cell_value(Coord::new(0, 0), "x").unwrap();
        }
        debouncer.schedule(1_000);
        debouncer.tick(1_200, &mut history, &model);
        assert_eq!(history.len(), 1);
        debouncer.tick(1_600, &mut history, &model);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn debouncer_flush_forces_immediate_recording() {
        let mut model = model_with(2, 2);
        let mut bus = EventBus::new();
        let config = CoreConfig::default();
        let mut history = HistoryService::new(10);
        history.record(&model);
        let mut debouncer = HistoryDebouncer::new(500);

        {
            let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
            editor.set_cell_value(Coord::new(0, 0), "x").unwrap();
        }
        debouncer.schedule(1_000);
        debouncer.flush(&mut history, &model);
        assert_eq!(history.len(), 2);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_cancel_discards_pending_timer() {
        let model = model_with(2, 2);
        let mut history = HistoryService::new(10);
        let mut debouncer = HistoryDebouncer::new(500);
        debouncer.schedule(0);
        debouncer.cancel();
        debouncer.tick(10_000, &mut history, &model);
        assert!(history.is_empty());
    }
}
