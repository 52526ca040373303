//! Schema definitions as data.
//!
//! One YAML document describes one entity:
//!
//! ```yaml
//! name: patient
//! extends: person
//! fields:
//!   - field: mrn
//!     label: Patient MRN
//!     filters: trim|required|upper|mrn
//!     stages: [create]
//!   - field: drugs
//!     filters: [required, long_array, "length(1,23)"]
//!     array: true
//! ```

use serde::{Deserialize, Serialize};

use crate::filter::split_chain;
use crate::schema::FieldDecl;
use crate::stage::Stage;

/// An entity schema definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent entity whose fields come first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldRuleDef>,
}

impl EntityDef {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml_ng::Error> {
        serde_yaml_ng::from_str(yaml)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml_ng::Error> {
        serde_yaml_ng::to_string(self)
    }
}

/// One field of an [`EntityDef`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FieldRuleDef {
    /// Record property.
    #[serde(rename = "field")]
    pub property: String,
    /// Input key, defaults to the property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub filters: FilterChain,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub array: bool,
}

impl FieldRuleDef {
    pub fn to_decl(&self) -> FieldDecl {
        FieldDecl {
            property: self.property.clone(),
            name: self.name.clone(),
            label: self.label.clone(),
            filters: self.filters.segments(),
            stages: self.stages.clone(),
            array: self.array,
        }
    }
}

/// A filter chain written either compactly or as a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterChain {
    /// `trim|required|length(2,50)`
    Compact(String),
    /// `[trim, required, "length(2,50)"]`
    List(Vec<String>),
}

impl FilterChain {
    /// The chain's descriptors, trimmed, empty ones dropped.
    pub fn segments(&self) -> Vec<String> {
        match self {
            FilterChain::Compact(chain) => split_chain(chain),
            FilterChain::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        FilterChain::List(Vec::new())
    }
}
