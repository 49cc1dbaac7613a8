//! Patient context loading.

use crate::client::ClinicalData;
use fhir::PatientData;

/// Fetch the launched patient once for a page session.
///
/// A failed fetch is logged and yields `None`; the page then keeps showing its placeholders.
/// There is no retry and no timeout beyond the HTTP client's own.
pub async fn load_patient_context<C: ClinicalData>(client: &C) -> Option<PatientData> {
    match client.read_patient().await {
        Ok(patient) => {
            tracing::info!("loaded patient context {}", patient.id);
            Some(patient)
        }
        Err(e) => {
            tracing::error!("failed to load patient context: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, ClientResult};
    use fhir::CreatedResource;

    struct FixedPatient(Option<PatientData>);

    impl ClinicalData for FixedPatient {
        async fn read_patient(&self) -> ClientResult<PatientData> {
            self.0.clone().ok_or(ClientError::Status {
                status: 404,
                body: "not found".into(),
            })
        }

        async fn create(
            &self,
            _resource_type: &str,
            _body: &serde_json::Value,
        ) -> ClientResult<CreatedResource> {
            Err(ClientError::InvalidUrl("read only".into()))
        }
    }

    #[tokio::test]
    async fn returns_patient_on_success() {
        let patient = PatientData {
            id: "p1".into(),
            family: Some("Lee".into()),
            given: vec!["Sam".into()],
            gender: None,
            birth_date: None,
        };
        let loaded = load_patient_context(&FixedPatient(Some(patient.clone()))).await;
        assert_eq!(loaded, Some(patient));
    }

    #[tokio::test]
    async fn failure_leaves_context_unset() {
        assert!(load_patient_context(&FixedPatient(None)).await.is_none());
    }
}
