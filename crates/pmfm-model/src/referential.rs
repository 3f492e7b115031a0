//! Referential entities shared across the model.
//!
//! A referential entry is a server-managed reference-data row: qualitative
//! values, matrices, fractions, methods and units all arrive in this shape.

use serde::{Deserialize, Serialize};

/// Lightweight reference to a referential entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferentialRef {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Display properties selectable when rendering a referential entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayProperty {
    Label,
    Name,
}

impl ReferentialRef {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            label: None,
            name: None,
        }
    }

    pub fn labeled(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
            name: None,
        }
    }

    pub fn named(id: i32, label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
            name: Some(name.into()),
        }
    }

    fn property(&self, property: DisplayProperty) -> Option<&str> {
        match property {
            DisplayProperty::Label => self.label.as_deref(),
            DisplayProperty::Name => self.name.as_deref(),
        }
    }

    /// Join the selected properties with `" - "`, skipping absent ones.
    /// Returns `None` when none of the selected properties is set.
    pub fn join_properties(&self, properties: &[DisplayProperty]) -> Option<String> {
        let parts: Vec<&str> = properties
            .iter()
            .filter_map(|property| self.property(*property))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" - "))
        }
    }

    /// Default display text: name, falling back to label.
    pub fn display_text(&self) -> Option<&str> {
        self.name.as_deref().or(self.label.as_deref())
    }
}

/// The "what is measured" facet of a PMFM, with its own qualitative values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Value type declared on the parameter itself, when denormalization
    /// has not pushed it onto the descriptor.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub parameter_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub qualitative_values: Vec<ReferentialRef>,
}

impl Parameter {
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
            name: None,
            parameter_type: None,
            qualitative_values: Vec::new(),
        }
    }
}
