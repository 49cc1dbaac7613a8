//! Shared FHIR complex datatypes used by the written resources.

use serde::{Deserialize, Serialize};

/// A literal reference to another resource, e.g. `Patient/123`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Reference {
    pub reference: String,
}

impl Reference {
    /// Build a `<resource_type>/<id>` reference.
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self {
            reference: format!("{resource_type}/{id}"),
        }
    }
}

/// A code from a terminology system.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

/// A concept expressed as one or more codings plus optional text.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// A concept with a single coding and no text.
    pub fn single(system: &str, code: &str, display: &str) -> Self {
        Self {
            coding: vec![Coding {
                system: system.to_string(),
                code: code.to_string(),
                display: display.to_string(),
            }],
            text: None,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }
}
