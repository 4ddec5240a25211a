//! Ergonomic facade over [`tablecraft_core`]: a single [`TableDocument`]
//! that wires the event bus, the document model, the merge/split engine,
//! clipboard ingestion, undo/redo history and cell selection into the API a
//! host application actually calls. `tablecraft-core`'s components are
//! deliberately free functions and borrow-scoped editors with no opinion on
//! how they're composed; this crate is that opinion.

mod document;

pub use document::TableDocument;

pub use tablecraft_core::merge::RangeSplitMode;
pub use tablecraft_core::model::{Cell, ColumnSize, ColumnUnit, Document, Grid, Meta};
pub use tablecraft_core::selection::{Direction, SelectionRange};
pub use tablecraft_core::{CoreConfig, EventName, EventPayload, Registry, SubscriptionId, Validator};
