//! Event names and payload shapes the core emits.
//!
//! These are the wire contract between the document core and any UI or
//! persistence layer built on top of it: the names and field shapes below
//! are authoritative, and `tablecraft-wasm` serializes [`EventPayload`] into
//! exactly these shapes when forwarding events to JS.

use std::collections::BTreeMap;

use tablecraft_common::{CellDataValue, Coord};

/// The cell fields a `cell:change` event can report.
#[derive(Debug, Clone, PartialEq)]
pub enum CellField {
    Value { old: String, new: String },
    Classes { old: Vec<String>, new: Vec<String> },
    Data {
        old: BTreeMap<String, CellDataValue>,
        new: BTreeMap<String, CellDataValue>,
    },
}

impl CellField {
    pub fn name(&self) -> &'static str {
        match self {
            CellField::Value { .. } => "value",
            CellField::Classes { .. } => "classes",
            CellField::Data { .. } => "data",
        }
    }
}

/// A snapshot of a leading cell's visible state, used in selection payloads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellSnapshot {
    pub r: u32,
    pub c: u32,
    pub value: String,
    pub row_span: u32,
    pub col_span: u32,
}

/// `structure:change` sub-types (the `type` discriminant on that event).
#[derive(Debug, Clone, PartialEq)]
pub enum StructureChangeKind {
    Resize { rows: u32, cols: u32 },
    HeaderRows { header_rows: u32 },
    Meta { field: &'static str },
    ApplyDocument,
    InsertRows { index: u32, count: u32 },
    InsertColumns { index: u32, count: u32 },
    DeleteRows { start: u32, count: u32 },
    DeleteColumns { start: u32, count: u32 },
    ColumnSizes,
    Import,
}

/// One payload per event name the bus can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    CellChange {
        coord: Coord,
        field: CellField,
    },
    StructureChange(StructureChangeKind),
    Paste {
        start: Coord,
        rows: u32,
        cols: u32,
        html: bool,
    },
    Merge {
        r1: u32,
        c1: u32,
        r2: u32,
        c2: u32,
        row_span: u32,
        col_span: u32,
    },
    Split {
        r: u32,
        c: u32,
        row_span: u32,
        col_span: u32,
    },
    SelectionChange {
        coord: Coord,
        cell: Option<CellSnapshot>,
    },
    SelectionRange {
        r1: u32,
        c1: u32,
        r2: u32,
        c2: u32,
        cells: Vec<CellSnapshot>,
    },
    EditStart {
        coord: Coord,
        old_value: String,
    },
    EditCommit {
        coord: Coord,
        old_value: String,
        new_value: String,
    },
    EditCancel {
        coord: Coord,
        old_value: String,
    },
    BatchFlush {
        buffered_event_count: usize,
    },
}

/// The bus's event names, as a closed set rather than free-form strings, so
/// a typo in a subscription name is a compile error instead of a
/// silently-dead handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventName {
    CellChange,
    StructureChange,
    Paste,
    Merge,
    Split,
    SelectionChange,
    SelectionRange,
    EditStart,
    EditCommit,
    EditCancel,
    BatchFlush,
}

impl EventName {
    /// The name exactly as a host subscribes to it, used by
    /// `tablecraft-wasm` when exposing `on("cell:change", ...)`-style
    /// subscriptions to JS.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::CellChange => "cell:change",
            EventName::StructureChange => "structure:change",
            EventName::Paste => "paste",
            EventName::Merge => "merge",
            EventName::Split => "split",
            EventName::SelectionChange => "selection:change",
            EventName::SelectionRange => "selection:range",
            EventName::EditStart => "edit:start",
            EventName::EditCommit => "edit:commit",
            EventName::EditCancel => "edit:cancel",
            EventName::BatchFlush => "batch:flush",
        }
    }

    pub fn of(payload: &EventPayload) -> Self {
        match payload {
            EventPayload::CellChange { .. } => EventName::CellChange,
            EventPayload::StructureChange(_) => EventName::StructureChange,
            EventPayload::Paste { .. } => EventName::Paste,
            EventPayload::Merge { .. } => EventName::Merge,
            EventPayload::Split { .. } => EventName::Split,
            EventPayload::SelectionChange { .. } => EventName::SelectionChange,
            EventPayload::SelectionRange { .. } => EventName::SelectionRange,
            EventPayload::EditStart { .. } => EventName::EditStart,
            EventPayload::EditCommit { .. } => EventName::EditCommit,
            EventPayload::EditCancel { .. } => EventName::EditCancel,
            EventPayload::BatchFlush { .. } => EventName::BatchFlush,
        }
    }
}
