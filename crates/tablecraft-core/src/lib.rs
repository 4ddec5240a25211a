//! The document core for a spreadsheet-style table editor.
//!
//! This crate owns the ten components spec'd out as the hard part of the
//! system: an [`bus::EventBus`], a [`registry::Registry`] plus
//! [`validator::Validator`], the [`model::TableModel`] mutators, the
//! [`merge`] engine, the [`clipboard`] parsers and paste application, the
//! [`history::HistoryService`]/[`history::HistoryDebouncer`] undo stack, and
//! the [`selection::SelectionEngine`]. Nothing in here renders a DOM, owns a
//! thread, or talks to JS; those concerns live in the `tablecraft` facade
//! and `tablecraft-wasm` binding crates built on top of this one.

pub mod bus;
pub mod clipboard;
pub mod config;
pub mod events;
pub mod history;
pub mod merge;
pub mod model;
pub mod registry;
pub mod selection;
pub mod validator;

pub use bus::{EventBus, SubscriptionId};
pub use config::CoreConfig;
pub use events::{CellField, CellSnapshot, EventName, EventPayload, StructureChangeKind};
pub use history::{HistoryDebouncer, HistoryService};
pub use model::{Cell, ColumnSize, ColumnUnit, Document, Grid, Meta, ModelEditor, TableModel};
pub use registry::{AttrDesc, AttrType, ClassDesc, Registry, RegistryRules};
pub use selection::{Direction, SelectionEngine, SelectionRange};
pub use validator::Validator;
