//! Translating [`tablecraft_core::EventPayload`] into the exact JS object
//! shapes spec.md §4.1's event table documents. `tablecraft-core` keeps
//! `EventPayload` a closed Rust enum rather than a free-form JSON blob (a
//! typo'd field name in a handler becomes a compile error instead of a
//! silently-`undefined` property); this module is the one place that wire
//! shape gets materialized, via `serde_json::Value` first and then
//! `serde-wasm-bindgen` into a `JsValue`.

use tablecraft_core::{CellField, CellSnapshot, EventPayload, StructureChangeKind};
use wasm_bindgen::JsValue;

use crate::utils::to_js_value;

pub fn event_payload_to_js(payload: &EventPayload) -> Result<JsValue, JsValue> {
    let value = match payload {
        EventPayload::CellChange { coord, field } => {
            let (field_name, old_value, new_value) = cell_field_parts(field);
            serde_json::json!({
                "r": coord.r,
                "c": coord.c,
                "field": field_name,
                "oldValue": old_value,
                "newValue": new_value,
            })
        }
        EventPayload::StructureChange(kind) => structure_change_json(kind),
        EventPayload::Paste { start, rows, cols, html } => serde_json::json!({
            "startR": start.r,
            "startC": start.c,
            "rows": rows,
            "cols": cols,
            "html": html,
        }),
        EventPayload::Merge { r1, c1, r2, c2, row_span, col_span } => serde_json::json!({
            "r1": r1, "c1": c1, "r2": r2, "c2": c2,
            "rowSpan": row_span, "colSpan": col_span,
        }),
        EventPayload::Split { r, c, row_span, col_span } => serde_json::json!({
            "r": r, "c": c, "rowSpan": row_span, "colSpan": col_span,
        }),
        EventPayload::SelectionChange { coord, cell } => serde_json::json!({
            "r": coord.r,
            "c": coord.c,
            "cell": cell.as_ref().map(cell_snapshot_json),
        }),
        EventPayload::SelectionRange { r1, c1, r2, c2, cells } => serde_json::json!({
            "r1": r1, "c1": c1, "r2": r2, "c2": c2,
            "cells": cells.iter().map(cell_snapshot_json).collect::<Vec<_>>(),
        }),
        EventPayload::EditStart { coord, old_value } => serde_json::json!({
            "r": coord.r, "c": coord.c, "oldValue": old_value,
        }),
        EventPayload::EditCommit { coord, old_value, new_value } => serde_json::json!({
            "r": coord.r, "c": coord.c, "oldValue": old_value, "newValue": new_value,
        }),
        EventPayload::EditCancel { coord, old_value } => serde_json::json!({
            "r": coord.r, "c": coord.c, "oldValue": old_value,
        }),
        EventPayload::BatchFlush { buffered_event_count } => serde_json::json!({
            "bufferedEventCount": buffered_event_count,
        }),
    };
    to_js_value(&value)
}

fn cell_field_parts(field: &CellField) -> (&'static str, serde_json::Value, serde_json::Value) {
    match field {
        CellField::Value { old, new } => ("value", serde_json::Value::String(old.clone()), serde_json::Value::String(new.clone())),
        CellField::Classes { old, new } => (
            "classes",
            serde_json::to_value(old).unwrap_or(serde_json::Value::Null),
            serde_json::to_value(new).unwrap_or(serde_json::Value::Null),
        ),
        CellField::Data { old, new } => (
            "data",
            serde_json::to_value(old).unwrap_or(serde_json::Value::Null),
            serde_json::to_value(new).unwrap_or(serde_json::Value::Null),
        ),
    }
}

fn structure_change_json(kind: &StructureChangeKind) -> serde_json::Value {
    match kind {
        StructureChangeKind::Resize { rows, cols } => serde_json::json!({
            "type": "resize", "rows": rows, "cols": cols,
        }),
        StructureChangeKind::HeaderRows { header_rows } => serde_json::json!({
            "type": "headerRows", "headerRows": header_rows,
        }),
        StructureChangeKind::Meta { field } => serde_json::json!({
            "type": "meta", "field": field,
        }),
        StructureChangeKind::ApplyDocument => serde_json::json!({ "type": "applyDocument" }),
        StructureChangeKind::InsertRows { index, count } => serde_json::json!({
            "type": "insertRows", "index": index, "count": count,
        }),
        StructureChangeKind::InsertColumns { index, count } => serde_json::json!({
            "type": "insertColumns", "index": index, "count": count,
        }),
        StructureChangeKind::DeleteRows { start, count } => serde_json::json!({
            "type": "deleteRows", "start": start, "count": count,
        }),
        StructureChangeKind::DeleteColumns { start, count } => serde_json::json!({
            "type": "deleteColumns", "start": start, "count": count,
        }),
        StructureChangeKind::ColumnSizes => serde_json::json!({ "type": "columnSizes" }),
        StructureChangeKind::Import => serde_json::json!({ "type": "import" }),
    }
}

fn cell_snapshot_json(cell: &CellSnapshot) -> serde_json::Value {
    serde_json::json!({
        "r": cell.r,
        "c": cell.c,
        "value": cell.value,
        "rowSpan": cell.row_span,
        "colSpan": cell.col_span,
    })
}
