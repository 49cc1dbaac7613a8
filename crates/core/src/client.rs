//! Clinical-data client.
//!
//! [`ClinicalData`] is the seam between the questionnaire flow and the FHIR server. The real
//! implementation is [`SessionHandle`], produced by a completed SMART launch; tests provide
//! in-memory implementations.

use crate::error::{ClientError, ClientResult};
use fhir::{CreatedResource, Patient, PatientData, FHIR_JSON};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use std::future::Future;

/// Operations the questionnaire needs from the clinical-data server.
pub trait ClinicalData: Send + Sync {
    /// Read the patient bound to this session.
    fn read_patient(&self) -> impl Future<Output = ClientResult<PatientData>> + Send;

    /// Create a resource at the relative endpoint `resource_type` and return its identity.
    fn create(
        &self,
        resource_type: &str,
        body: &serde_json::Value,
    ) -> impl Future<Output = ClientResult<CreatedResource>> + Send;
}

/// An authorized session against one FHIR server, bound to one patient.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    http: reqwest::Client,
    fhir_base_url: Url,
    access_token: String,
    patient_id: String,
}

impl SessionHandle {
    /// `fhir_base_url` is normalised to end with `/` so relative endpoints join beneath it.
    pub fn new(
        http: reqwest::Client,
        fhir_base_url: Url,
        access_token: String,
        patient_id: String,
    ) -> Self {
        Self {
            http,
            fhir_base_url: with_trailing_slash(fhir_base_url),
            access_token,
            patient_id,
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn fhir_base_url(&self) -> &Url {
        &self.fhir_base_url
    }

    fn endpoint(&self, relative: &str) -> ClientResult<Url> {
        self.fhir_base_url
            .join(relative)
            .map_err(|e| ClientError::InvalidUrl(format!("{relative}: {e}")))
    }

    async fn checked_text(response: reqwest::Response) -> ClientResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl ClinicalData for SessionHandle {
    async fn read_patient(&self) -> ClientResult<PatientData> {
        let url = self.endpoint(&format!("Patient/{}", self.patient_id))?;
        tracing::debug!("reading patient from {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await?;

        let body = Self::checked_text(response).await?;
        Ok(Patient::parse(&body)?)
    }

    async fn create(
        &self,
        resource_type: &str,
        body: &serde_json::Value,
    ) -> ClientResult<CreatedResource> {
        let url = self.endpoint(resource_type)?;
        tracing::debug!("creating {} at {}", resource_type, url);

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, FHIR_JSON)
            .header(ACCEPT, FHIR_JSON)
            .body(body.to_string())
            .send()
            .await?;

        let text = Self::checked_text(response).await?;
        Ok(CreatedResource::parse(resource_type, &text)?)
    }
}

pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
