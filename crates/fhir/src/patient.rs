//! FHIR Patient wire model and translation helpers.
//!
//! The app only ever *reads* a patient: the launch context names one, and the page shows its
//! name, gender and age and tags outbound resources with a `Patient/<id>` reference.
//!
//! Responsibilities:
//! - Define a flat domain-level type for display and referencing
//! - Define a wire model tolerant of the extra elements real servers return
//! - Translate wire to domain
//!
//! Notes:
//! - Only the first `name` entry is used, matching what EHR patient banners show
//! - `birthDate` is kept as text because FHIR allows partial dates (`1970`, `1970-04`)

use crate::{from_json_with_path, FhirError, FhirResult};
use serde::Deserialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Administrative gender of a patient.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdministrativeGender {
    Male,
    Female,
    Other,
    Unknown,
}

impl AdministrativeGender {
    /// Convert to FHIR wire format string.
    pub fn to_wire(self) -> &'static str {
        match self {
            AdministrativeGender::Male => "male",
            AdministrativeGender::Female => "female",
            AdministrativeGender::Other => "other",
            AdministrativeGender::Unknown => "unknown",
        }
    }

    /// Parse from FHIR wire format string.
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "male" => Some(AdministrativeGender::Male),
            "female" => Some(AdministrativeGender::Female),
            "other" => Some(AdministrativeGender::Other),
            "unknown" => Some(AdministrativeGender::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdministrativeGender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_wire())
    }
}

/// Domain-level snapshot of the launched patient (flat structure).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientData {
    /// Server-assigned logical id.
    pub id: String,

    /// Family name (surname) from the first name entry.
    pub family: Option<String>,

    /// Given names from the first name entry.
    pub given: Vec<String>,

    pub gender: Option<AdministrativeGender>,

    /// Date of birth as written by the server (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`).
    pub birth_date: Option<String>,
}

impl PatientData {
    /// Given names joined by spaces, followed by the family name.
    pub fn display_name(&self) -> String {
        let given = self.given.join(" ");
        match &self.family {
            Some(family) if given.is_empty() => family.clone(),
            Some(family) => format!("{given} {family}"),
            None => given,
        }
    }

    /// Age in whole calendar years as of `current_year`.
    ///
    /// This is the year difference only; it does not account for whether the birthday has
    /// passed yet this year. Returns `None` when no usable birth year is recorded.
    pub fn age_in_year(&self, current_year: i32) -> Option<i32> {
        let birth_date = self.birth_date.as_deref()?;
        let year = birth_date.get(..4)?.parse::<i32>().ok()?;
        Some(current_year - year)
    }
}

// ============================================================================
// Public Patient operations
// ============================================================================

/// Patient resource operations.
///
/// This is a zero-sized type used for namespacing patient-related operations.
pub struct Patient;

impl Patient {
    /// Parse a Patient resource from FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the JSON does not match the wire schema (the failing path is included),
    /// - `resourceType` is not `"Patient"`,
    /// - the resource has no `id`.
    pub fn parse(json_text: &str) -> FhirResult<PatientData> {
        let wire: PatientWire = from_json_with_path("Patient", json_text)?;

        if wire.resource_type != "Patient" {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType 'Patient', got '{}'",
                wire.resource_type
            )));
        }

        wire_to_domain(wire)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
struct PatientWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    name: Vec<HumanNameWire>,

    #[serde(default)]
    gender: Option<String>,

    #[serde(rename = "birthDate", default)]
    birth_date: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
struct HumanNameWire {
    #[serde(default)]
    family: Option<String>,

    #[serde(default)]
    given: Vec<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn wire_to_domain(wire: PatientWire) -> FhirResult<PatientData> {
    let id = wire
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| FhirError::InvalidInput("Patient resource has no id".into()))?;

    let first_name = wire.name.into_iter().next();

    Ok(PatientData {
        id,
        family: first_name.as_ref().and_then(|n| n.family.clone()),
        given: first_name.map(|n| n.given).unwrap_or_default(),
        gender: wire
            .gender
            .as_deref()
            .and_then(AdministrativeGender::from_wire),
        birth_date: wire.birth_date,
    })
}
