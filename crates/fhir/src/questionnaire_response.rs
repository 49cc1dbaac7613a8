//! FHIR QuestionnaireResponse for a completed PHQ-9.
//!
//! One `item` is written per question, in instrument order, with the 1-based question number
//! as `linkId`, the question text, and the selected value as `answer[0].valueInteger`.

use crate::datatypes::Reference;
use crate::{fhir_instant, from_json_with_path, FhirError, FhirResult, PHQ9_QUESTIONNAIRE};
use chrono::{DateTime, Utc};
use phq9::{CompletedAnswers, QuestionIndex};
use serde::{Deserialize, Serialize};

/// Domain-level input for a QuestionnaireResponse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionnaireResponseData {
    /// Logical id of the subject patient.
    pub patient_id: String,
    pub answers: CompletedAnswers,
    pub authored: DateTime<Utc>,
}

/// QuestionnaireResponse resource operations.
pub struct QuestionnaireResponse;

impl QuestionnaireResponse {
    /// Resource type name, also the relative create endpoint.
    pub const RESOURCE_TYPE: &'static str = "QuestionnaireResponse";

    /// Build the JSON body for a create request.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if the patient id is empty.
    pub fn render(data: &QuestionnaireResponseData) -> FhirResult<serde_json::Value> {
        if data.patient_id.trim().is_empty() {
            return Err(FhirError::InvalidInput(
                "QuestionnaireResponse requires a patient id".into(),
            ));
        }

        let wire = domain_to_wire(data);
        Ok(serde_json::to_value(&wire)?)
    }

    /// Read back the answer values (in `linkId` order) from a QuestionnaireResponse.
    ///
    /// Used to check what a server stored; items whose `linkId` is not 1–9 are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if the JSON is not a PHQ-9 QuestionnaireResponse.
    pub fn parse_answers(json_text: &str) -> FhirResult<CompletedAnswers> {
        let wire: QuestionnaireResponseWire =
            from_json_with_path(Self::RESOURCE_TYPE, json_text)?;

        if wire.resource_type != Self::RESOURCE_TYPE {
            return Err(FhirError::InvalidInput(format!(
                "Expected resourceType '{}', got '{}'",
                Self::RESOURCE_TYPE,
                wire.resource_type
            )));
        }

        let mut raw = vec![None; phq9::QUESTION_COUNT];
        for item in wire.item {
            let number = item
                .link_id
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=phq9::QUESTION_COUNT).contains(n))
                .ok_or_else(|| {
                    FhirError::Translation(format!("unexpected linkId '{}'", item.link_id))
                })?;
            let value = item.answer.first().map(|a| a.value_integer).ok_or_else(|| {
                FhirError::Translation(format!("item {} has no answer", item.link_id))
            })?;
            raw[number - 1] = Some(value);
        }

        let values = raw
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| FhirError::Translation(format!("missing item {}", i + 1)))
            })
            .collect::<FhirResult<Vec<i64>>>()?;

        CompletedAnswers::from_values(&values).map_err(|e| FhirError::Translation(e.to_string()))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
struct QuestionnaireResponseWire {
    #[serde(rename = "resourceType")]
    resource_type: String,

    status: String,

    questionnaire: String,

    subject: Reference,

    authored: String,

    item: Vec<ItemWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
struct ItemWire {
    #[serde(rename = "linkId")]
    link_id: String,

    #[serde(default)]
    text: String,

    answer: Vec<AnswerWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
struct AnswerWire {
    #[serde(rename = "valueInteger")]
    value_integer: i64,
}

fn domain_to_wire(data: &QuestionnaireResponseData) -> QuestionnaireResponseWire {
    let item = QuestionIndex::all()
        .map(|idx| {
            let question = idx.question();
            ItemWire {
                link_id: question.link_id(),
                text: question.text.to_string(),
                answer: vec![AnswerWire {
                    value_integer: data.answers.get(idx).get() as i64,
                }],
            }
        })
        .collect();

    QuestionnaireResponseWire {
        resource_type: QuestionnaireResponse::RESOURCE_TYPE.to_string(),
        status: "completed".to_string(),
        questionnaire: PHQ9_QUESTIONNAIRE.to_string(),
        subject: Reference::to("Patient", &data.patient_id),
        authored: fhir_instant(&data.authored),
        item,
    }
}
