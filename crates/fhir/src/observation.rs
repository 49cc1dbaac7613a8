//! FHIR Observation carrying the PHQ-9 total score.
//!
//! The observation is always derived from a QuestionnaireResponse that has already been
//! created on the server, so building one requires that response's server-assigned id.

use crate::datatypes::{CodeableConcept, Reference};
use crate::{
    fhir_instant, FhirError, FhirResult, LOINC_SYSTEM, OBSERVATION_CATEGORY_SYSTEM,
    PHQ9_TOTAL_SCORE_CODE, PHQ9_TOTAL_SCORE_DISPLAY,
};
use chrono::{DateTime, Utc};
use phq9::Score;
use serde::Serialize;

/// Domain-level input for the score Observation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreObservationData {
    pub patient_id: String,
    pub score: Score,
    /// Server-assigned id of the QuestionnaireResponse this score was derived from.
    pub questionnaire_response_id: String,
    pub effective: DateTime<Utc>,
}

/// Observation resource operations.
pub struct Observation;

impl Observation {
    /// Resource type name, also the relative create endpoint.
    pub const RESOURCE_TYPE: &'static str = "Observation";

    /// Build the JSON body for a create request.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if either the patient id or the QuestionnaireResponse
    /// id is empty.
    pub fn render(data: &ScoreObservationData) -> FhirResult<serde_json::Value> {
        if data.patient_id.trim().is_empty() {
            return Err(FhirError::InvalidInput(
                "Observation requires a patient id".into(),
            ));
        }
        if data.questionnaire_response_id.trim().is_empty() {
            return Err(FhirError::InvalidInput(
                "Observation requires the QuestionnaireResponse id it derives from".into(),
            ));
        }

        let wire = ObservationWire {
            resource_type: Self::RESOURCE_TYPE,
            status: "final",
            category: vec![CodeableConcept::single(
                OBSERVATION_CATEGORY_SYSTEM,
                "survey",
                "Survey",
            )],
            code: CodeableConcept::single(
                LOINC_SYSTEM,
                PHQ9_TOTAL_SCORE_CODE,
                PHQ9_TOTAL_SCORE_DISPLAY,
            )
            .with_text(PHQ9_TOTAL_SCORE_DISPLAY),
            subject: Reference::to("Patient", &data.patient_id),
            effective_date_time: fhir_instant(&data.effective),
            value_integer: data.score.value(),
            derived_from: vec![Reference::to(
                crate::QuestionnaireResponse::RESOURCE_TYPE,
                &data.questionnaire_response_id,
            )],
        };

        Ok(serde_json::to_value(&wire)?)
    }
}

#[derive(Serialize)]
struct ObservationWire {
    #[serde(rename = "resourceType")]
    resource_type: &'static str,

    status: &'static str,

    category: Vec<CodeableConcept>,

    code: CodeableConcept,

    subject: Reference,

    #[serde(rename = "effectiveDateTime")]
    effective_date_time: String,

    #[serde(rename = "valueInteger")]
    value_integer: u8,

    #[serde(rename = "derivedFrom")]
    derived_from: Vec<Reference>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ScoreObservationData {
        ScoreObservationData {
            patient_id: "pat-1".into(),
            score: Score::new(13).expect("valid score"),
            questionnaire_response_id: "qr-42".into(),
            effective: Utc
                .with_ymd_and_hms(2026, 3, 4, 9, 30, 1)
                .single()
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn renders_exact_resource_shape() {
        let json = Observation::render(&sample()).expect("render");

        assert_eq!(json["resourceType"], "Observation");
        assert_eq!(json["status"], "final");
        assert_eq!(
            json["category"][0]["coding"][0]["system"],
            "http://terminology.hl7.org/CodeSystem/observation-category"
        );
        assert_eq!(json["category"][0]["coding"][0]["code"], "survey");
        assert_eq!(json["category"][0]["coding"][0]["display"], "Survey");
        assert_eq!(json["code"]["coding"][0]["system"], "http://loinc.org");
        assert_eq!(json["code"]["coding"][0]["code"], "44249-1");
        assert_eq!(json["code"]["coding"][0]["display"], "PHQ-9 total score");
        assert_eq!(json["code"]["text"], "PHQ-9 total score");
        assert_eq!(json["subject"]["reference"], "Patient/pat-1");
        assert_eq!(json["effectiveDateTime"], "2026-03-04T09:30:01.000Z");
        assert_eq!(json["valueInteger"], 13);
        assert_eq!(
            json["derivedFrom"][0]["reference"],
            "QuestionnaireResponse/qr-42"
        );
    }

    #[test]
    fn requires_the_derived_from_id() {
        let data = ScoreObservationData {
            questionnaire_response_id: String::new(),
            ..sample()
        };
        let err = Observation::render(&data).expect_err("should need derivedFrom id");
        assert!(matches!(err, FhirError::InvalidInput(msg) if msg.contains("QuestionnaireResponse")));
    }
}
