//! The `data-*` attribute value type.
//!
//! `data-*` values are typed per the registry descriptor that names them
//! (`enum | number | boolean`) rather than treated as plain DOM strings, so
//! an attribute's declared type and its stored value always agree.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellDataValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellDataValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            CellDataValue::Bool(_) => "boolean",
            CellDataValue::Number(_) => "number",
            CellDataValue::Text(_) => "enum",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellDataValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellDataValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellDataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for CellDataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellDataValue::Bool(b) => write!(f, "{b}"),
            CellDataValue::Number(n) => write!(f, "{n}"),
            CellDataValue::Text(s) => write!(f, "{s}"),
        }
    }
}
