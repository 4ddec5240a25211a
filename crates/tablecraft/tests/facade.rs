use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use tablecraft::{CoreConfig, EventName, RangeSplitMode, TableDocument, Validator};
use tablecraft_core::merge;
use tablecraft_core::model::ModelEditor;

/// spec.md §8 S1: inserting rows through the interior of a merge grows its
/// span, and a batched insert produces exactly one history snapshot.
#[test]
fn scenario_s1_insert_rows_inside_merge_as_one_batch() {
    let mut doc = TableDocument::new(6, 4);
    doc.merge_range(1, 0, 3, 0).unwrap();
    let history_before = doc.history_len();

    doc.batch(|doc| {
        doc.insert_rows(2, 2, 0).unwrap();
    });

    let cell = doc.model().get_cell(tablecraft_common::Coord::new(1, 0)).unwrap();
    assert_eq!(cell.row_span, 4);
    assert_eq!(doc.history_len(), history_before + 1);
}

/// spec.md §8 S6: strict import concatenates every registry violation found
/// rather than stopping at the first.
#[test]
fn scenario_s6_strict_import_reports_every_error() {
    let raw = r#"{
        "version": 1,
        "meta": {"name": "t"},
        "grid": {"rows": 2, "cols": 2, "headerRows": 0},
        "cells": [
            {"r": 0, "c": 0, "value": "a", "classes": ["nope"]},
            {"r": 0, "c": 1, "value": "b", "classes": ["also-nope"]}
        ]
    }"#;
    let result = TableDocument::from_json(raw, CoreConfig::default(), Validator::core());
    let err = result.unwrap_err();
    let message = format!("{err}");
    assert!(message.contains("nope"));
    assert!(message.contains("also-nope"));
}

/// A full undo/redo round trip across a merge, a structural insert, and a
/// cell edit, each its own history entry.
#[test]
fn undo_redo_walks_back_through_several_distinct_operations() {
    let mut doc = TableDocument::new(4, 4);
    doc.merge_range(0, 0, 1, 1).unwrap();
    doc.batch(|doc| doc.insert_columns(2, 1, 0).unwrap());
    doc.set_cell_value(0, 0, "merged+inserted", 0).unwrap();
    doc.flush_history();

    assert_eq!(doc.model().cols(), 5);
    assert_eq!(doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).unwrap().value, "merged+inserted");

    assert!(doc.undo().unwrap());
    assert_eq!(doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).unwrap().value, "");
    assert!(doc.undo().unwrap());
    assert_eq!(doc.model().cols(), 4);
    assert_eq!(doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).unwrap().row_span, 2);
    assert!(doc.undo().unwrap());
    assert!(doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).is_none());
    assert!(!doc.can_undo());

    assert!(doc.redo().unwrap());
    assert!(doc.redo().unwrap());
    assert!(doc.redo().unwrap());
    assert!(!doc.can_redo());
    assert_eq!(doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).unwrap().value, "merged+inserted");
}

/// Pasting an HTML table over a live selection range, then splitting every
/// merge the paste introduced back into 1x1 cells.
#[test]
fn html_paste_then_split_all_in_overlap_mode() {
    let mut doc = TableDocument::new(3, 3);
    let html = "<table><tr><td rowspan=\"2\">A</td><td>B</td></tr><tr></tr></table>";
    doc.paste_html(0, 0, html).unwrap();

    let leading = doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).unwrap();
    assert_eq!((leading.row_span, leading.col_span), (2, 1));

    let split_count = doc.split_all_in_range(0, 0, 1, 1, RangeSplitMode::Overlap);
    assert_eq!(split_count, 1);
    assert_eq!(doc.model().get_cell(tablecraft_common::Coord::new(0, 0)).unwrap().row_span, 1);
}

/// Selection tracks merge-aware navigation even after structural edits shift
/// coordinates around it.
#[test]
fn selection_navigation_after_insert_columns() {
    let mut doc = TableDocument::new(3, 3);
    doc.select(0, 0);
    doc.insert_columns(0, 1, 0).unwrap();
    assert!(doc.move_selection(tablecraft::Direction::Right));
    assert_eq!(doc.selection().selected(), Some(tablecraft_common::Coord::new(0, 1)));
}

/// Event subscriptions observe the exact FIFO ordering the bus promises
/// during a batch, ending with a single `batch:flush`.
#[test]
fn batch_flush_fires_once_after_paused_events_drain() {
    let mut doc = TableDocument::new(3, 3);
    let log = Rc::new(RefCell::new(Vec::new()));
    let log2 = log.clone();
    doc.on(EventName::BatchFlush, move |_| log2.borrow_mut().push("flush"));

    doc.merge_range(0, 0, 1, 1).unwrap();
    assert_eq!(*log.borrow(), vec!["flush"]);
}

/// `tablecraft-core`'s free merge functions remain directly callable against
/// a raw `ModelEditor` for a caller that doesn't want the facade at all.
#[test]
fn core_merge_function_still_usable_without_the_facade() {
    let mut model = tablecraft_core::TableModel::new(tablecraft_core::Document::empty(2, 2)).unwrap();
    let mut bus = tablecraft_core::EventBus::new();
    let config = tablecraft_core::CoreConfig::default();
    let mut editor = ModelEditor::new(&mut model, &mut bus, &config);
    merge::merge_range(&mut editor, 0, 0, 1, 1).unwrap();
    assert_eq!(model.get_cell(tablecraft_common::Coord::new(0, 0)).unwrap().row_span, 2);
}
