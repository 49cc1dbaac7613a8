//! Submission saga.
//!
//! A submission writes two resources in sequence:
//!
//! 1. a `QuestionnaireResponse` holding the nine answers, which yields [`ResponseSaved`];
//! 2. an `Observation` holding the total score, `derivedFrom` the response saved in step 1.
//!
//! Any failure stops the remaining steps. Nothing is rolled back: if step 2 fails, the response
//! from step 1 stays on the server and its id is reported in
//! [`SubmitError::ObservationFailed`].

use crate::client::ClinicalData;
use crate::error::{ClientError, SubmitError, SubmitResult};
use crate::history::SubmissionRecord;
use crate::questionnaire::{Notice, Questionnaire};
use chrono::{DateTime, Utc};
use fhir::{
    Observation, QuestionnaireResponse, QuestionnaireResponseData, ScoreObservationData,
};
use phq9::CompletedAnswers;

/// Intermediate saga state: the QuestionnaireResponse exists on the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseSaved {
    pub questionnaire_response_id: String,
    pub answers: CompletedAnswers,
}

/// Identities of both written resources plus the history record they produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub record: SubmissionRecord,
    pub questionnaire_response_id: String,
    pub observation_id: String,
}

/// Step 1: write the QuestionnaireResponse.
///
/// # Errors
///
/// Returns [`SubmitError::Build`] if the resource cannot be built, or
/// [`SubmitError::ResponseFailed`] if the server write fails.
pub async fn save_response<C: ClinicalData>(
    client: &C,
    patient_id: &str,
    answers: CompletedAnswers,
    authored: DateTime<Utc>,
) -> SubmitResult<ResponseSaved> {
    let body = QuestionnaireResponse::render(&QuestionnaireResponseData {
        patient_id: patient_id.to_string(),
        answers,
        authored,
    })?;

    let created = client
        .create(QuestionnaireResponse::RESOURCE_TYPE, &body)
        .await
        .map_err(SubmitError::ResponseFailed)?;

    tracing::info!("saved {}", created.reference());

    Ok(ResponseSaved {
        questionnaire_response_id: created.id,
        answers,
    })
}

/// Step 2: write the score Observation derived from `saved`.
///
/// # Errors
///
/// Returns [`SubmitError::ObservationFailed`] carrying the already-saved response id if the
/// Observation cannot be built or written.
pub async fn save_observation<C: ClinicalData>(
    client: &C,
    patient_id: &str,
    saved: ResponseSaved,
    effective: DateTime<Utc>,
) -> SubmitResult<SubmissionOutcome> {
    let score = saved.answers.score();
    let orphaned = |source: ClientError| SubmitError::ObservationFailed {
        questionnaire_response_id: saved.questionnaire_response_id.clone(),
        source,
    };

    let body = Observation::render(&ScoreObservationData {
        patient_id: patient_id.to_string(),
        score,
        questionnaire_response_id: saved.questionnaire_response_id.clone(),
        effective,
    })
    .map_err(|e| orphaned(e.into()))?;

    let created = client
        .create(Observation::RESOURCE_TYPE, &body)
        .await
        .map_err(orphaned)?;

    tracing::info!(
        "saved {} derived from QuestionnaireResponse/{}",
        created.reference(),
        saved.questionnaire_response_id
    );

    Ok(SubmissionOutcome {
        record: SubmissionRecord::new(effective, score),
        questionnaire_response_id: saved.questionnaire_response_id,
        observation_id: created.id,
    })
}

/// Run one submission attempt for a page session.
///
/// Validates the answers, then runs both saga steps. The questionnaire is updated with the
/// outcome: history, cleared answers and a success notice on success; an error notice with
/// answers and history untouched on failure.
///
/// # Errors
///
/// Returns [`SubmitError`] describing the step that stopped the attempt.
pub async fn submit<C: ClinicalData>(
    questionnaire: &mut Questionnaire,
    client: &C,
    now: DateTime<Utc>,
) -> SubmitResult<SubmissionOutcome> {
    let answers = match questionnaire.validate() {
        Ok(answers) => answers,
        Err(missing) => {
            questionnaire.set_notice(Notice::error(missing.to_string()));
            return Err(SubmitError::Incomplete(missing));
        }
    };

    let Some(patient_id) = questionnaire.patient().map(|p| p.id.clone()) else {
        let err = SubmitError::PatientNotLoaded;
        questionnaire.set_notice(Notice::error(err.to_string()));
        return Err(err);
    };

    let result = match save_response(client, &patient_id, answers, now).await {
        Ok(saved) => save_observation(client, &patient_id, saved, now).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            questionnaire.record_success(outcome.record.clone());
            Ok(outcome)
        }
        Err(err) => {
            match &err {
                SubmitError::ObservationFailed {
                    questionnaire_response_id,
                    source,
                } => tracing::warn!(
                    "QuestionnaireResponse/{} saved without its Observation: {}",
                    questionnaire_response_id,
                    source
                ),
                other => tracing::error!("submission failed: {}", other),
            }
            questionnaire.record_failure(&err);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientResult;
    use fhir::{CreatedResource, PatientData};
    use phq9::{QuestionIndex, ResponseValue, Severity};
    use std::sync::Mutex;

    /// In-memory server that records every create and can refuse one resource type.
    #[derive(Default)]
    struct FakeServer {
        created: Mutex<Vec<(String, serde_json::Value)>>,
        reject: Option<&'static str>,
    }

    impl FakeServer {
        fn rejecting(resource_type: &'static str) -> Self {
            Self {
                reject: Some(resource_type),
                ..Self::default()
            }
        }

        fn created(&self) -> Vec<(String, serde_json::Value)> {
            self.created.lock().expect("lock").clone()
        }
    }

    impl ClinicalData for FakeServer {
        async fn read_patient(&self) -> ClientResult<PatientData> {
            Ok(patient())
        }

        async fn create(
            &self,
            resource_type: &str,
            body: &serde_json::Value,
        ) -> ClientResult<CreatedResource> {
            if self.reject == Some(resource_type) {
                return Err(ClientError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            let mut created = self.created.lock().expect("lock");
            created.push((resource_type.to_string(), body.clone()));
            Ok(CreatedResource {
                resource_type: resource_type.to_string(),
                id: format!("{}-{}", resource_type.to_lowercase(), created.len()),
            })
        }
    }

    fn patient() -> PatientData {
        PatientData {
            id: "pat-1".into(),
            family: Some("Doe".into()),
            given: vec!["Jo".into()],
            gender: None,
            birth_date: Some("1990-01-01".into()),
        }
    }

    fn filled(values: [i64; 9]) -> Questionnaire {
        let mut form = Questionnaire::new(Some(patient()));
        for (i, value) in values.into_iter().enumerate() {
            form.set_answer(
                QuestionIndex::new(i).expect("index"),
                ResponseValue::new(value).expect("value"),
            );
        }
        form
    }

    #[tokio::test]
    async fn successful_submission_writes_both_resources_in_order() {
        let server = FakeServer::default();
        let mut form = filled([0, 1, 2, 3, 0, 1, 2, 3, 1]);
        let now = Utc::now();

        let outcome = submit(&mut form, &server, now).await.expect("submit");

        assert_eq!(outcome.record.score.value(), 13);
        assert_eq!(outcome.record.severity, Severity::Moderate);
        assert_eq!(outcome.record.submitted_at, now);
        assert_eq!(outcome.questionnaire_response_id, "questionnaireresponse-1");
        assert_eq!(outcome.observation_id, "observation-2");

        let created = server.created();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].0, "QuestionnaireResponse");
        assert_eq!(created[0].1["subject"]["reference"], "Patient/pat-1");
        assert_eq!(created[1].0, "Observation");
        assert_eq!(created[1].1["valueInteger"], 13);
        assert_eq!(
            created[1].1["derivedFrom"][0]["reference"],
            "QuestionnaireResponse/questionnaireresponse-1"
        );

        assert!(form.answers().is_empty());
        assert_eq!(form.history().len(), 1);
        assert_eq!(
            form.notice().map(|n| n.message.as_str()),
            Some("Saved to server!\nScore: 13\nSeverity: Moderate")
        );
    }

    #[tokio::test]
    async fn incomplete_answers_make_no_server_calls() {
        let server = FakeServer::default();
        let mut form = Questionnaire::new(Some(patient()));
        form.set_answer(
            QuestionIndex::new(2).expect("index"),
            ResponseValue::new(1).expect("value"),
        );

        let err = submit(&mut form, &server, Utc::now())
            .await
            .expect_err("incomplete");
        assert!(matches!(err, SubmitError::Incomplete(_)));
        assert!(server.created().is_empty());
        assert_eq!(form.answers().answered_count(), 1);
        assert!(form
            .notice()
            .is_some_and(|n| n.message.starts_with("Please answer all questions")));
    }

    #[tokio::test]
    async fn submission_without_patient_is_rejected() {
        let server = FakeServer::default();
        let mut form = Questionnaire::new(None);
        for index in QuestionIndex::all() {
            form.set_answer(index, ResponseValue::new(0).expect("value"));
        }

        let err = submit(&mut form, &server, Utc::now())
            .await
            .expect_err("no patient");
        assert!(matches!(err, SubmitError::PatientNotLoaded));
        assert!(server.created().is_empty());
        assert_eq!(
            form.notice().map(|n| n.message.as_str()),
            Some("Patient context is not loaded yet")
        );
    }

    #[tokio::test]
    async fn observation_failure_reports_orphaned_response() {
        let server = FakeServer::rejecting("Observation");
        let mut form = filled([3; 9]);

        let err = submit(&mut form, &server, Utc::now())
            .await
            .expect_err("observation rejected");
        match &err {
            SubmitError::ObservationFailed {
                questionnaire_response_id,
                ..
            } => assert_eq!(questionnaire_response_id, "questionnaireresponse-1"),
            other => panic!("expected ObservationFailed, got {other:?}"),
        }

        assert_eq!(server.created().len(), 1);
        assert!(form.history().is_empty());
        assert_eq!(form.answers().answered_count(), 9);
        assert!(form
            .notice()
            .is_some_and(|n| n.message.starts_with("Failed to save response to server: ")));
    }

    #[tokio::test]
    async fn response_failure_skips_observation() {
        let server = FakeServer::rejecting("QuestionnaireResponse");
        let mut form = filled([1; 9]);

        let err = submit(&mut form, &server, Utc::now())
            .await
            .expect_err("response rejected");
        assert!(matches!(err, SubmitError::ResponseFailed(_)));
        assert!(server.created().is_empty());
        assert!(form.history().is_empty());
        assert_eq!(
            form.notice().map(|n| n.message.as_str()),
            Some("Failed to save response to server: saving QuestionnaireResponse failed: server returned 500: boom")
        );
    }
}
