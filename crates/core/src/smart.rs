//! SMART App Launch.
//!
//! The browser redirect handoff is split into two explicit phases:
//!
//! 1. [`SmartLauncher::initiate`] discovers the issuer's authorization endpoints, creates a
//!    [`PendingLaunch`] (random `state` plus a PKCE verifier) and returns the authorize URL the
//!    browser must be sent to.
//! 2. [`SmartLauncher::complete`] checks the authorization callback against the pending launch,
//!    exchanges the code at the token endpoint and yields a [`SessionHandle`] bound to the
//!    launched patient.
//!
//! Both EHR launch (`iss` + `launch` supplied by the EHR) and standalone launch (issuer from
//! configuration) are supported.

use crate::client::{with_trailing_slash, SessionHandle};
use crate::config::AppConfig;
use crate::constants::{PKCE_METHOD, SMART_CONFIGURATION_PATH};
use crate::error::{AuthError, AuthResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Query parameters of the `/launch` entry point.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LaunchRequest {
    /// FHIR base URL of the launching EHR. Absent for a standalone launch.
    pub iss: Option<String>,
    /// Opaque launch context token issued by the EHR.
    pub launch: Option<String>,
}

/// Query parameters of the authorization callback.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// The denial carried by the callback, if the authorization server reported one.
    pub fn denial(&self) -> Option<AuthError> {
        self.error.as_ref().map(|error| AuthError::Denied {
            error: error.clone(),
            description: self.error_description.clone(),
        })
    }

    /// Non-empty `state` parameter.
    pub fn state(&self) -> Option<&str> {
        non_empty(self.state.as_deref())
    }

    fn code(&self) -> Option<&str> {
        non_empty(self.code.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The subset of `.well-known/smart-configuration` this app needs.
#[derive(Clone, Debug, Deserialize)]
pub struct SmartConfiguration {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub code_challenge_methods_supported: Vec<String>,
}

/// Launch state held between the redirect to the authorize endpoint and the callback.
#[derive(Clone, Debug)]
pub struct PendingLaunch {
    state: String,
    code_verifier: String,
    issuer: Url,
    token_endpoint: Url,
}

impl PendingLaunch {
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn issuer(&self) -> &Url {
        &self.issuer
    }

    #[cfg(test)]
    pub(crate) fn for_state(state: &str) -> Self {
        Self {
            state: state.to_string(),
            code_verifier: new_code_verifier(),
            issuer: Url::parse("http://fhir.invalid/r4").expect("issuer"),
            token_endpoint: Url::parse("http://fhir.invalid/token").expect("token endpoint"),
        }
    }
}

/// Result of [`SmartLauncher::initiate`].
#[derive(Clone, Debug)]
pub struct LaunchRedirect {
    pub authorize_url: Url,
    pub pending: PendingLaunch,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    patient: Option<String>,
}

/// Runs the SMART authorization handshake for one configured client.
#[derive(Clone, Debug)]
pub struct SmartLauncher {
    http: reqwest::Client,
    config: Arc<AppConfig>,
}

impl SmartLauncher {
    pub fn new(http: reqwest::Client, config: Arc<AppConfig>) -> Self {
        Self { http, config }
    }

    /// Start a launch.
    ///
    /// # Arguments
    ///
    /// * `request` - the `iss`/`launch` parameters the app was opened with
    ///
    /// # Returns
    ///
    /// The authorize URL to redirect the browser to, plus the [`PendingLaunch`] the caller must
    /// keep until the callback arrives.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if no issuer is available, the issuer is not a valid URL, or
    /// discovery fails.
    pub async fn initiate(&self, request: &LaunchRequest) -> AuthResult<LaunchRedirect> {
        let issuer = match non_empty(request.iss.as_deref()) {
            Some(iss) => Url::parse(iss).map_err(|e| AuthError::InvalidIssuer(format!("{iss}: {e}")))?,
            None => self
                .config
                .default_issuer()
                .cloned()
                .ok_or(AuthError::MissingIssuer)?,
        };
        if !matches!(issuer.scheme(), "http" | "https") {
            return Err(AuthError::InvalidIssuer(issuer.to_string()));
        }

        let discovery = self.discover(&issuer).await?;

        let mut authorize_url = Url::parse(&discovery.authorization_endpoint).map_err(|e| {
            AuthError::Discovery(format!(
                "invalid authorization_endpoint {}: {e}",
                discovery.authorization_endpoint
            ))
        })?;
        let token_endpoint = Url::parse(&discovery.token_endpoint).map_err(|e| {
            AuthError::Discovery(format!(
                "invalid token_endpoint {}: {e}",
                discovery.token_endpoint
            ))
        })?;

        let state = uuid::Uuid::new_v4().simple().to_string();
        let code_verifier = new_code_verifier();
        let code_challenge = pkce_challenge(&code_verifier);
        let aud = issuer.as_str().trim_end_matches('/').to_string();

        {
            let mut query = authorize_url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", self.config.client_id())
                .append_pair("redirect_uri", self.config.redirect_uri().as_str())
                .append_pair("scope", self.config.scopes())
                .append_pair("state", &state)
                .append_pair("aud", &aud);
            if let Some(launch) = non_empty(request.launch.as_deref()) {
                query.append_pair("launch", launch);
            }
            query
                .append_pair("code_challenge", &code_challenge)
                .append_pair("code_challenge_method", PKCE_METHOD);
        }

        tracing::info!("initiating SMART launch against {}", aud);

        Ok(LaunchRedirect {
            authorize_url,
            pending: PendingLaunch {
                state,
                code_verifier,
                issuer,
                token_endpoint,
            },
        })
    }

    /// Finish a launch from its authorization callback.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if:
    /// - the callback carries an `error` parameter,
    /// - `code` or `state` is missing, or `state` does not belong to `pending`,
    /// - the token endpoint rejects the exchange,
    /// - the token response has no `access_token` or no `patient` context.
    pub async fn complete(
        &self,
        pending: &PendingLaunch,
        callback: &CallbackParams,
    ) -> AuthResult<SessionHandle> {
        if let Some(denied) = callback.denial() {
            return Err(denied);
        }
        let state = callback.state().ok_or(AuthError::MissingState)?;
        if state != pending.state {
            return Err(AuthError::UnknownLaunch);
        }
        let code = callback.code().ok_or(AuthError::MissingCode)?;

        let mut request = self
            .http
            .post(pending.token_endpoint.clone())
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri().as_str()),
                ("client_id", self.config.client_id()),
                ("code_verifier", pending.code_verifier.as_str()),
            ]);
        if let Some(secret) = self.config.client_secret() {
            request = request.basic_auth(self.config.client_id(), Some(secret));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AuthError::TokenExchange(format!("{status}: {body}")));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::TokenExchange(format!("invalid token response: {e}")))?;
        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::TokenExchange("token response has no access_token".into()))?;
        let patient_id = token
            .patient
            .filter(|p| !p.trim().is_empty())
            .ok_or(AuthError::MissingPatientContext)?;

        tracing::info!("SMART launch complete for patient {}", patient_id);

        Ok(SessionHandle::new(
            self.http.clone(),
            pending.issuer.clone(),
            access_token,
            patient_id,
        ))
    }

    async fn discover(&self, issuer: &Url) -> AuthResult<SmartConfiguration> {
        let url = with_trailing_slash(issuer.clone())
            .join(SMART_CONFIGURATION_PATH)
            .map_err(|e| AuthError::InvalidIssuer(format!("{issuer}: {e}")))?;

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AuthError::Discovery(format!("{url}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Discovery(format!("{url} returned {status}")));
        }

        let configuration: SmartConfiguration = response
            .json()
            .await
            .map_err(|e| AuthError::Discovery(format!("{url}: {e}")))?;

        if !configuration.code_challenge_methods_supported.is_empty()
            && !configuration
                .code_challenge_methods_supported
                .iter()
                .any(|m| m == PKCE_METHOD)
        {
            tracing::warn!("{} does not advertise {} PKCE support", url, PKCE_METHOD);
        }

        Ok(configuration)
    }
}

/// A fresh PKCE code verifier: 64 characters from the unreserved set.
fn new_code_verifier() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// S256 code challenge for `verifier`: base64url (no padding) of its SHA-256 digest.
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
