//! Minimal view of a resource returned by a create (`POST`) call.

use crate::{from_json_with_path, FhirError, FhirResult};
use serde::Deserialize;

/// The identity of a resource the server has just created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedResource {
    pub resource_type: String,
    pub id: String,
}

#[derive(Deserialize)]
struct CreatedWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    #[serde(default)]
    id: Option<String>,
}

impl CreatedResource {
    /// Parse the response body of a create call.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the body is not a resource, is of a different type than
    /// `expected_type`, or carries no id (the follow-up write could not reference it).
    pub fn parse(expected_type: &str, json_text: &str) -> FhirResult<Self> {
        let wire: CreatedWire = from_json_with_path(expected_type, json_text)?;

        if wire.resource_type != expected_type {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType '{expected_type}', got '{}'",
                wire.resource_type
            )));
        }

        let id = wire
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                FhirError::InvalidInput(format!("created {expected_type} has no id"))
            })?;

        Ok(Self {
            resource_type: wire.resource_type,
            id,
        })
    }

    /// `<resourceType>/<id>`.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.resource_type, self.id)
    }
}
