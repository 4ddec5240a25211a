//! Registry-backed document validation.
//!
//! [`Validator`] composes two layers: shape checks and the merge
//! non-overlap invariant come from [`crate::model::Document`] itself
//! (every `TableModel` already enforces those on construction); this module
//! adds the registry pass — unknown classes, unknown or mistyped `data-*`
//! attributes, and exclusive-group conflicts — and the strict-import entry
//! point, `parse_table_json`, that concatenates every error found rather
//! than stopping at the first one.

use tablecraft_common::{Coord, ImportErrors, TableError};

use crate::model::{Document, TableModel};
use crate::registry::{AttrType, Registry};

/// Holds a composed [`Registry`] and validates documents and cells against
/// it under the strict import policy: unknown names and bad values are
/// errors, not warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct Validator {
    registry: Registry,
}

impl Validator {
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// A validator backed only by the built-in registry, with no
    /// project-specific classes or attributes layered on.
    pub fn core() -> Self {
        Self { registry: Registry::core() }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Every class and `data-*` registry violation in `doc`, without regard
    /// to shape (the caller is expected to have already run shape/geometry
    /// validation via `TableModel::new` or `Document::validate_shape`).
    fn registry_errors(&self, doc: &Document) -> Vec<TableError> {
        let mut errors = Vec::new();
        for cell in &doc.cells {
            let coord = Coord::new(cell.r, cell.c);

            for class in &cell.classes {
                if self.registry.class(class).is_none() {
                    errors.push(TableError::registry(coord, format!("unknown class '{class}'")));
                }
            }
            if self.registry.rules.class_exclusivity {
                let mut group_counts: std::collections::HashMap<&str, u32> = std::collections::HashMap::new();
                for name in &cell.classes {
                    if let Some(group) = self.registry.class(name).and_then(|d| d.exclusive_group.as_deref()) {
                        *group_counts.entry(group).or_insert(0) += 1;
                    }
                }
                for (group, count) in group_counts {
                    if count > 1 {
                        errors.push(TableError::registry(
                            coord,
                            format!("exclusive group '{group}' conflict among classes {:?}", cell.classes),
                        ));
                    }
                }
            }

            for (key, value) in &cell.data {
                match self.registry.attribute(key) {
                    None => errors.push(TableError::registry(coord, format!("unknown data attribute '{key}'"))),
                    Some(desc) => {
                        if !crate::registry::attribute_value_is_valid(desc, value) {
                            errors.push(TableError::registry(
                                coord,
                                format!(
                                    "data attribute '{key}' expects a {} value, got {}",
                                    attr_type_name(desc.attr_type),
                                    value.type_name()
                                ),
                            ));
                        }
                    }
                }
            }
        }
        errors
    }

    /// Validate `doc` end to end: shape/bounds/geometry via
    /// [`Document::validate_shape`], then the registry pass above. Returns
    /// every error found, concatenated, rather than the first.
    pub fn validate_document(&self, doc: &Document) -> Result<(), ImportErrors> {
        let mut errors = Vec::new();
        if let Err(shape_err) = doc.validate_shape() {
            errors.push(shape_err);
        }
        errors.extend(self.registry_errors(doc));
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ImportErrors(errors))
        }
    }
}

fn attr_type_name(attr_type: AttrType) -> &'static str {
    match attr_type {
        AttrType::Enum => "enum",
        AttrType::Number => "number",
        AttrType::Boolean => "boolean",
    }
}

/// Deserialize `raw` as a [`Document`], then validate it against `validator`
/// under the strict import policy. On success returns a [`TableModel`]
/// built from the parsed document; on failure returns every
/// Shape/Bounds/Registry error found, concatenated into one human-readable
/// list.
pub fn parse_table_json(raw: &str, validator: &Validator) -> Result<TableModel, ImportErrors> {
    let doc: Document = serde_json::from_str(raw)
        .map_err(|e| ImportErrors(vec![TableError::shape(format!("invalid document JSON: {e}"))]))?;
    validator.validate_document(&doc)?;
    TableModel::new(doc).map_err(|e| ImportErrors(vec![e]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Cell;
    use std::collections::BTreeMap;

    fn doc_with_classes(classes: Vec<String>) -> Document {
        let mut doc = Document::empty(2, 2);
        doc.cells.push(Cell {
            r: 0,
            c: 0,
            value: "x".into(),
            row_span: 1,
            col_span: 1,
            classes,
            data: BTreeMap::new(),
        });
        doc
    }

    #[test]
    fn unknown_class_is_rejected_under_strict_import() {
        let validator = Validator::core();
        let doc = doc_with_classes(vec!["no_such_class".into()]);
        let result = validator.validate_document(&doc);
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(format!("{errors}").contains("unknown class"));
    }

    #[test]
    fn known_class_passes() {
        let validator = Validator::core();
        let doc = doc_with_classes(vec!["text-bold".into()]);
        assert!(validator.validate_document(&doc).is_ok());
    }

    #[test]
    fn unknown_data_attribute_is_rejected() {
        let validator = Validator::core();
        let mut doc = Document::empty(2, 2);
        let mut data = BTreeMap::new();
        data.insert("data-nope".to_string(), tablecraft_common::CellDataValue::Bool(true));
        doc.cells.push(Cell { r: 0, c: 0, value: String::new(), row_span: 1, col_span: 1, classes: vec![], data });
        let result = validator.validate_document(&doc);
        assert!(result.is_err());
    }

    #[test]
    fn out_of_range_number_attribute_is_rejected() {
        let validator = Validator::core();
        let mut doc = Document::empty(2, 2);
        let mut data = BTreeMap::new();
        data.insert("data-priority".to_string(), tablecraft_common::CellDataValue::Number(99.0));
        doc.cells.push(Cell { r: 0, c: 0, value: String::new(), row_span: 1, col_span: 1, classes: vec![], data });
        assert!(validator.validate_document(&doc).is_err());
    }

    #[test]
    fn parse_table_json_reports_concatenated_errors() {
        let validator = Validator::core();
        let raw = r#"{
            "version": 1,
            "meta": {"name": "t"},
            "grid": {"rows": 2, "cols": 2, "headerRows": 0},
            "cells": [{"r": 0, "c": 0, "value": "x", "classes": ["no_such_class"]}]
        }"#;
        let result = parse_table_json(raw, &validator);
        assert!(result.is_err());
    }

    #[test]
    fn parse_table_json_accepts_valid_document() {
        let validator = Validator::core();
        let raw = r#"{
            "version": 1,
            "meta": {"name": "t"},
            "grid": {"rows": 2, "cols": 2, "headerRows": 0},
            "cells": [{"r": 0, "c": 0, "value": "x"}]
        }"#;
        let model = parse_table_json(raw, &validator).unwrap();
        assert_eq!(model.get_cell(Coord::new(0, 0)).unwrap().value, "x");
    }
}
