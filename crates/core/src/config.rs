//! Application configuration.
//!
//! Configuration is resolved once at process startup and then passed into services. The SMART
//! client registration (client id, scopes, redirect URI) is always supplied from outside the
//! binary and validated here, so a misconfigured deployment fails before serving any launch.
//!
//! Nothing in this module reads environment variables; binaries read them and pass the raw
//! values in.

use crate::constants::DEFAULT_SCOPES;
use crate::error::{ConfigError, ConfigResult};
use phq9_types::NonEmptyText;
use reqwest::Url;

/// Validated SMART client configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    default_issuer: Option<Url>,
    client_id: NonEmptyText,
    client_secret: Option<NonEmptyText>,
    scopes: NonEmptyText,
    redirect_uri: Url,
}

impl AppConfig {
    /// Create a new `AppConfig` from raw values.
    ///
    /// # Arguments
    ///
    /// * `default_issuer` - FHIR base URL used for standalone launches (no `iss` parameter)
    /// * `client_id` - client id registered with the authorization server
    /// * `client_secret` - optional secret for confidential clients
    /// * `scopes` - space separated scopes; `None` or blank uses [`DEFAULT_SCOPES`]
    /// * `redirect_uri` - absolute URL of this app's `/callback`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - the client id or redirect URI is missing,
    /// - the redirect URI or issuer is not an absolute http(s) URL,
    /// - the scopes lack a launch context or any `patient/` scope.
    pub fn new(
        default_issuer: Option<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        scopes: Option<String>,
        redirect_uri: Option<String>,
    ) -> ConfigResult<Self> {
        let client_id = client_id
            .and_then(|v| NonEmptyText::new(v).ok())
            .ok_or(ConfigError::Missing {
                name: "SMART_CLIENT_ID",
            })?;

        let client_secret = client_secret.and_then(|v| NonEmptyText::new(v).ok());

        let redirect_uri = redirect_uri
            .and_then(|v| NonEmptyText::new(v).ok())
            .ok_or(ConfigError::Missing {
                name: "SMART_REDIRECT_URI",
            })?;
        let redirect_uri = parse_http_url("SMART_REDIRECT_URI", redirect_uri.as_str())?;

        let default_issuer = default_issuer
            .and_then(|v| NonEmptyText::new(v).ok())
            .map(|v| parse_http_url("SMART_ISS", v.as_str()))
            .transpose()?;

        let scopes = scopes_from_env_value(scopes)?;

        Ok(Self {
            default_issuer,
            client_id,
            client_secret,
            scopes,
            redirect_uri,
        })
    }

    pub fn default_issuer(&self) -> Option<&Url> {
        self.default_issuer.as_ref()
    }

    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_ref().map(NonEmptyText::as_str)
    }

    pub fn scopes(&self) -> &str {
        self.scopes.as_str()
    }

    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }
}

/// Parse and validate the scope string from an optional environment value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_SCOPES`]. Runs of whitespace are
/// collapsed to single spaces.
///
/// # Errors
///
/// Returns [`ConfigError::MissingLaunchScope`] or [`ConfigError::MissingPatientScope`] if the
/// scopes could not produce a patient-bound session able to read and write resources.
pub fn scopes_from_env_value(value: Option<String>) -> ConfigResult<NonEmptyText> {
    let raw = value
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_SCOPES.to_string());

    let tokens: Vec<&str> = raw.split(' ').collect();
    if !tokens.iter().any(|t| *t == "launch" || *t == "launch/patient") {
        return Err(ConfigError::MissingLaunchScope);
    }
    if !tokens.iter().any(|t| t.starts_with("patient/")) {
        return Err(ConfigError::MissingPatientScope);
    }

    NonEmptyText::new(&raw).map_err(|_| ConfigError::Missing {
        name: "SMART_SCOPES",
    })
}

/// Parse a URL that must be absolute and use http or https.
pub(crate) fn parse_http_url(name: &'static str, value: &str) -> ConfigResult<Url> {
    let invalid = || ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
    };
    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ConfigResult<AppConfig> {
        AppConfig::new(
            Some("https://fhir.example.org/r4".into()),
            Some(" phq9-app ".into()),
            None,
            None,
            Some("http://localhost:3000/callback".into()),
        )
    }

    #[test]
    fn accepts_minimal_config_with_default_scopes() {
        let cfg = valid().expect("valid config");
        assert_eq!(cfg.client_id(), "phq9-app");
        assert_eq!(cfg.scopes(), DEFAULT_SCOPES);
        assert_eq!(cfg.redirect_uri().path(), "/callback");
        assert!(cfg.client_secret().is_none());
    }

    #[test]
    fn rejects_missing_client_id() {
        let err = AppConfig::new(
            None,
            Some("   ".into()),
            None,
            None,
            Some("http://localhost:3000/callback".into()),
        )
        .expect_err("client id is required");
        assert!(matches!(err, ConfigError::Missing { name } if name == "SMART_CLIENT_ID"));
    }

    #[test]
    fn rejects_relative_redirect_uri() {
        let err = AppConfig::new(None, Some("app".into()), None, None, Some("/callback".into()))
            .expect_err("redirect must be absolute");
        assert!(matches!(err, ConfigError::InvalidUrl { name, .. } if name == "SMART_REDIRECT_URI"));
    }

    #[test]
    fn rejects_non_http_issuer() {
        let err = AppConfig::new(
            Some("ftp://fhir.example.org".into()),
            Some("app".into()),
            None,
            None,
            Some("http://localhost/callback".into()),
        )
        .expect_err("issuer must be http(s)");
        assert!(matches!(err, ConfigError::InvalidUrl { name, .. } if name == "SMART_ISS"));
    }

    #[test]
    fn scopes_need_launch_and_patient_context() {
        assert!(matches!(
            scopes_from_env_value(Some("openid patient/*.read".into())),
            Err(ConfigError::MissingLaunchScope)
        ));
        assert!(matches!(
            scopes_from_env_value(Some("launch openid user/*.read".into())),
            Err(ConfigError::MissingPatientScope)
        ));
        let scopes = scopes_from_env_value(Some("  launch/patient\tpatient/*.* ".into()))
            .expect("valid scopes");
        assert_eq!(scopes.as_str(), "launch/patient patient/*.*");
    }
}
