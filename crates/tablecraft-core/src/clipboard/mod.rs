//! Clipboard ingestion: pure parsers for the two formats the core consumes
//! ([`parse::parse_html_table`], [`parse::parse_tsv`]), and
//! [`paste::apply_paste`]/[`paste::apply_html_table_paste`], which apply
//! parsed clipboard data into a [`crate::model::TableModel`] at a target
//! origin.
//!
//! Split into two modules because the parsers have no dependency on the
//! document model at all (they are pure string-in, struct-out functions a
//! caller could fuzz or unit-test in isolation) while paste application is
//! the one place clipboard data touches a live `TableModel`.

pub mod parse;
pub mod paste;

pub use parse::{parse_html_table, parse_tsv, ParsedCell, ParsedTable};
pub use paste::{apply_html_table_paste, apply_paste};
