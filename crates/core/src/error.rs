use phq9::MissingAnswers;

/// Startup configuration errors. Any of these stops the process before it serves a launch.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },
    #[error("{name} is not a valid absolute http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("SMART scopes must include a launch context (`launch` or `launch/patient`)")]
    MissingLaunchScope,
    #[error("SMART scopes must include at least one `patient/` resource scope")]
    MissingPatientScope,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Failures of the SMART authorization handshake. All are terminal for the launch.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no issuer supplied by the launch and no default issuer configured")]
    MissingIssuer,
    #[error("invalid issuer URL: {0}")]
    InvalidIssuer(String),
    #[error("SMART discovery failed: {0}")]
    Discovery(String),
    #[error("authorization denied: {error}{}", describe(.description))]
    Denied {
        error: String,
        description: Option<String>,
    },
    #[error("authorization callback is missing the `code` parameter")]
    MissingCode,
    #[error("authorization callback is missing the `state` parameter")]
    MissingState,
    #[error("unknown or expired launch state")]
    UnknownLaunch,
    #[error("token exchange failed: {0}")]
    TokenExchange(String),
    #[error("token response did not include a patient launch context")]
    MissingPatientContext,
    #[error("HTTP error during authorization: {0}")]
    Http(#[from] reqwest::Error),
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Failures talking to the clinical-data (FHIR) server.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid FHIR payload: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Why a submission attempt did not complete.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Incomplete(MissingAnswers),
    #[error("Patient context is not loaded yet")]
    PatientNotLoaded,
    #[error("could not build resource: {0}")]
    Build(#[from] fhir::FhirError),
    #[error("saving QuestionnaireResponse failed: {0}")]
    ResponseFailed(#[source] ClientError),
    /// The QuestionnaireResponse exists on the server but its Observation does not.
    #[error("saving Observation failed (QuestionnaireResponse/{questionnaire_response_id} was saved without it): {source}")]
    ObservationFailed {
        questionnaire_response_id: String,
        #[source]
        source: ClientError,
    },
}

pub type SubmitResult<T> = std::result::Result<T, SubmitError>;
