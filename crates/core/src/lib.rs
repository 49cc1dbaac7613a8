//! # PHQ-9 Core
//!
//! Core logic for the SMART-on-FHIR PHQ-9 questionnaire.
//!
//! This crate covers everything between the browser and the FHIR server:
//! - startup configuration and its validation
//! - the two-phase SMART launch (`initiate` / `complete`) with PKCE
//! - the FHIR client used by an authorized session
//! - the questionnaire component, its local history and the submission saga
//! - the page-session registry
//!
//! **No HTTP hosting concerns**: routes, HTML rendering and the JSON API belong in `api-rest`
//! and `api-shared`.

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod history;
pub mod patient;
pub mod questionnaire;
pub mod session;
pub mod smart;
pub mod submission;

pub use bootstrap::{bootstrap, BootstrapOutcome};
pub use client::{ClinicalData, SessionHandle};
pub use config::AppConfig;
pub use error::{
    AuthError, AuthResult, ClientError, ClientResult, ConfigError, ConfigResult, SubmitError,
    SubmitResult,
};
pub use history::{History, SubmissionRecord};
pub use patient::load_patient_context;
pub use questionnaire::{Notice, NoticeKind, Questionnaire};
pub use session::{PageSession, SessionId, SessionStore, SharedSession};
pub use smart::{CallbackParams, LaunchRedirect, LaunchRequest, PendingLaunch, SmartLauncher};
pub use submission::{submit, ResponseSaved, SubmissionOutcome};
