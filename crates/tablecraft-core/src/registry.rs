//! The registry of permitted CSS classes and `data-*` attributes, and the
//! composition rule that layers a project-specific registry over the core
//! one.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use tablecraft_common::CellDataValue;

/// One allowed CSS class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDesc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Classes sharing an `exclusive_group` are mutually exclusive on a
    /// single cell; [`normalize_classes`] keeps only the last one seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The type discriminant for a `data-*` attribute descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrType {
    Enum,
    Number,
    Boolean,
}

/// One allowed `data-*` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttrType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<CellDataValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub quick_toggle: bool,
}

/// Document-wide registry rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRules {
    pub import_policy: ImportPolicy,
    pub class_exclusivity: bool,
}

impl Default for RegistryRules {
    fn default() -> Self {
        Self {
            import_policy: ImportPolicy::Strict,
            class_exclusivity: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    Strict,
}

/// Describes every class and attribute a document is allowed to use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub version: u32,
    pub classes: Vec<ClassDesc>,
    #[serde(rename = "dataAttributes")]
    pub data_attributes: Vec<AttrDesc>,
    pub rules: RegistryRules,
}

/// The built-in whitelist every document is validated against before any
/// project-specific registry is layered on top. A handful of alignment/weight
/// classes and `data-*` attributes a host application is likely to need out
/// of the box; a real deployment supplies its own
/// [`Registry`] and composes it with this one via
/// [`Registry::merge_core_and_project`].
static CORE_REGISTRY: Lazy<Registry> = Lazy::new(|| Registry {
    version: 1,
    classes: vec![
        ClassDesc {
            name: "text-bold".into(),
            group: Some("weight".into()),
            exclusive_group: None,
            label: Some("Bold".into()),
            description: None,
        },
        ClassDesc {
            name: "text-italic".into(),
            group: Some("weight".into()),
            exclusive_group: None,
            label: Some("Italic".into()),
            description: None,
        },
        ClassDesc {
            name: "align-left".into(),
            group: Some("align".into()),
            exclusive_group: Some("align".into()),
            label: Some("Align left".into()),
            description: None,
        },
        ClassDesc {
            name: "align-center".into(),
            group: Some("align".into()),
            exclusive_group: Some("align".into()),
            label: Some("Align center".into()),
            description: None,
        },
        ClassDesc {
            name: "align-right".into(),
            group: Some("align".into()),
            exclusive_group: Some("align".into()),
            label: Some("Align right".into()),
            description: None,
        },
    ],
    data_attributes: vec![
        AttrDesc {
            name: "data-priority".into(),
            attr_type: AttrType::Number,
            values: None,
            min: Some(0.0),
            max: Some(10.0),
            default: Some(CellDataValue::Number(0.0)),
            label: Some("Priority".into()),
            description: None,
            quick_toggle: false,
        },
        AttrDesc {
            name: "data-status".into(),
            attr_type: AttrType::Enum,
            values: Some(vec!["todo".into(), "doing".into(), "done".into()]),
            min: None,
            max: None,
            default: Some(CellDataValue::Text("todo".into())),
            label: Some("Status".into()),
            description: None,
            quick_toggle: false,
        },
        AttrDesc {
            name: "data-locked".into(),
            attr_type: AttrType::Boolean,
            values: None,
            min: None,
            max: None,
            default: Some(CellDataValue::Bool(false)),
            label: Some("Locked".into()),
            description: None,
            quick_toggle: true,
        },
    ],
    rules: RegistryRules { import_policy: ImportPolicy::Strict, class_exclusivity: true },
});

impl Registry {
    /// The built-in descriptor, cloned on every call so a caller can layer a
    /// project registry on top without sharing mutable state with other
    /// callers.
    pub fn core() -> Registry {
        CORE_REGISTRY.clone()
    }

    pub fn empty() -> Self {
        Self {
            version: 1,
            classes: Vec::new(),
            data_attributes: Vec::new(),
            rules: RegistryRules::default(),
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassDesc> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrDesc> {
        self.data_attributes.iter().find(|a| a.name == name)
    }

    /// Union `core` and `project` by `name`, with `project` entries
    /// overriding `core` ones of the same name; `rules` is a shallow merge
    /// where `project`'s fields win.
    pub fn merge_core_and_project(core: &Registry, project: &Registry) -> Registry {
        let mut classes: BTreeMap<String, ClassDesc> = BTreeMap::new();
        for c in &core.classes {
            classes.insert(c.name.clone(), c.clone());
        }
        for c in &project.classes {
            classes.insert(c.name.clone(), c.clone());
        }

        let mut attrs: BTreeMap<String, AttrDesc> = BTreeMap::new();
        for a in &core.data_attributes {
            attrs.insert(a.name.clone(), a.clone());
        }
        for a in &project.data_attributes {
            attrs.insert(a.name.clone(), a.clone());
        }

        Registry {
            version: project.version.max(core.version),
            classes: classes.into_values().collect(),
            data_attributes: attrs.into_values().collect(),
            rules: project.rules.clone(),
        }
    }
}

/// Drop unknown class names and, within each exclusive group, keep only the
/// last occurrence; relative order of non-exclusive survivors is preserved
/// and exclusive survivors are appended after them.
pub fn normalize_classes(registry: &Registry, classes: &[String]) -> Vec<String> {
    let mut plain: Vec<String> = Vec::new();
    let mut exclusive_last: BTreeMap<String, String> = BTreeMap::new();

    for name in classes {
        let Some(desc) = registry.class(name) else {
            continue;
        };
        match &desc.exclusive_group {
            Some(group) => {
                exclusive_last.insert(group.clone(), name.clone());
            }
            None => {
                if !plain.contains(name) {
                    plain.push(name.clone());
                }
            }
        }
    }

    plain.extend(exclusive_last.into_values());
    plain
}

/// Check a single attribute value against its descriptor.
pub fn attribute_value_is_valid(desc: &AttrDesc, value: &CellDataValue) -> bool {
    match (desc.attr_type, value) {
        (AttrType::Enum, CellDataValue::Text(s)) => desc
            .values
            .as_ref()
            .map(|vs| vs.iter().any(|v| v == s))
            .unwrap_or(false),
        (AttrType::Number, CellDataValue::Number(n)) => {
            let above_min = desc.min.map(|min| *n >= min).unwrap_or(true);
            let below_max = desc.max.map(|max| *n <= max).unwrap_or(true);
            above_min && below_max
        }
        (AttrType::Boolean, CellDataValue::Bool(_)) => true,
        _ => false,
    }
}
