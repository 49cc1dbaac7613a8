//! Constants used throughout the PHQ-9 core crate.

use std::time::Duration;

/// Default address the web host listens on when `PHQ9_ADDR` is not set.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";

/// Default SMART scopes requested when `SMART_SCOPES` is not set.
///
/// `launch` binds to the EHR context, `patient/*.read` loads the banner and `patient/*.write`
/// creates the QuestionnaireResponse and Observation.
pub const DEFAULT_SCOPES: &str = "launch openid fhirUser patient/*.read patient/*.write";

/// Path of the SMART discovery document, relative to the issuer base URL.
pub const SMART_CONFIGURATION_PATH: &str = ".well-known/smart-configuration";

/// PKCE challenge method. Only S256 is ever sent.
pub const PKCE_METHOD: &str = "S256";

/// Shown in place of patient fields until the patient context has loaded.
pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Shown in place of short patient fields (gender, age) until loaded.
pub const SHORT_PLACEHOLDER: &str = "...";

/// How long a launch may wait for its authorization callback before it is discarded.
pub const PENDING_LAUNCH_TTL: Duration = Duration::from_secs(10 * 60);

/// A page session untouched for this long has ended and is removed with its access token.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);

/// Environment variable names read by the binaries at startup.
pub mod env {
    pub const ISSUER: &str = "SMART_ISS";
    pub const CLIENT_ID: &str = "SMART_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "SMART_CLIENT_SECRET";
    pub const SCOPES: &str = "SMART_SCOPES";
    pub const REDIRECT_URI: &str = "SMART_REDIRECT_URI";
    pub const LISTEN_ADDR: &str = "PHQ9_ADDR";
}
