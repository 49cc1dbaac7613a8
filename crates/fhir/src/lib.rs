//! FHIR R4 wire/boundary support for the PHQ-9 app.
//!
//! This crate provides **wire models** and **translation helpers** for the three resources the
//! app touches on the clinical-data server:
//! - `Patient` (read only, for the patient banner and the subject reference)
//! - `QuestionnaireResponse` (written, one item per PHQ-9 question)
//! - `Observation` (written, the PHQ-9 total score derived from the response)
//!
//! This crate focuses on:
//! - FHIR JSON serialisation/deserialisation
//! - translation between domain primitives (`phq9` types) and wire structs
//!
//! Transport (SMART authorization, HTTP) lives in `phq9-core`.

pub mod created;
pub mod datatypes;
pub mod observation;
pub mod patient;
pub mod questionnaire_response;

// Re-export facades
pub use created::CreatedResource;
pub use observation::Observation;
pub use patient::Patient;
pub use questionnaire_response::QuestionnaireResponse;

// Re-export public domain-level types
pub use datatypes::{CodeableConcept, Coding, Reference};
pub use observation::ScoreObservationData;
pub use patient::{AdministrativeGender, PatientData};
pub use questionnaire_response::QuestionnaireResponseData;

/// MIME type used for every FHIR request and response body.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Canonical reference to the PHQ-9 Questionnaire definition.
pub const PHQ9_QUESTIONNAIRE: &str = "Questionnaire/phq9";

/// LOINC code system URI.
pub const LOINC_SYSTEM: &str = "http://loinc.org";

/// LOINC code for the PHQ-9 total score.
pub const PHQ9_TOTAL_SCORE_CODE: &str = "44249-1";

/// Display text for [`PHQ9_TOTAL_SCORE_CODE`].
pub const PHQ9_TOTAL_SCORE_DISPLAY: &str = "PHQ-9 total score";

/// Observation category code system URI.
pub const OBSERVATION_CATEGORY_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/observation-category";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;

/// Deserialise JSON into `T`, reporting the path of the first mismatching field.
pub(crate) fn from_json_with_path<T>(resource: &str, json_text: &str) -> FhirResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => Ok(parsed),
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(FhirError::Translation(format!(
                "{resource} schema mismatch at {path}: {source}"
            )))
        }
    }
}

/// Format a timestamp the way FHIR `instant`/`dateTime` values are written by this app.
pub(crate) fn fhir_instant(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
