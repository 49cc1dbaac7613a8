//! Session bootstrap: turn an authorization callback into a ready page session.

use crate::error::{AuthError, AuthResult};
use crate::patient::load_patient_context;
use crate::questionnaire::Questionnaire;
use crate::session::{PageSession, SessionId, SessionStore};
use crate::smart::{CallbackParams, SmartLauncher};

/// What the callback produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The questionnaire is mounted under this session id.
    Ready(SessionId),
    /// The launch failed; the reason is shown as-is on the terminal error view.
    Failed(String),
}

/// Complete a launch from its callback, load the patient, and register a page session.
///
/// Authorization failures are terminal and returned as [`BootstrapOutcome::Failed`]. A patient
/// fetch failure is not: the session is still created, without a patient context.
pub async fn bootstrap(
    launcher: &SmartLauncher,
    store: &SessionStore,
    callback: &CallbackParams,
) -> BootstrapOutcome {
    match authorize(launcher, store, callback).await {
        Ok(client) => {
            let patient = load_patient_context(&client).await;
            let id = store
                .insert(PageSession::new(client, Questionnaire::new(patient)))
                .await;
            tracing::info!("page session {} ready", id);
            BootstrapOutcome::Ready(id)
        }
        Err(e) => {
            tracing::error!("SMART launch failed: {}", e);
            BootstrapOutcome::Failed(e.to_string())
        }
    }
}

async fn authorize(
    launcher: &SmartLauncher,
    store: &SessionStore,
    callback: &CallbackParams,
) -> AuthResult<crate::client::SessionHandle> {
    let pending = match callback.state() {
        Some(state) => store.take_pending(state).await,
        None => None,
    };
    if let Some(denied) = callback.denial() {
        return Err(denied);
    }
    callback.state().ok_or(AuthError::MissingState)?;
    let pending = pending.ok_or(AuthError::UnknownLaunch)?;

    launcher.complete(&pending, callback).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::sync::Arc;

    fn launcher() -> SmartLauncher {
        let config = AppConfig::new(
            Some("http://fhir.invalid/r4".into()),
            Some("phq9-app".into()),
            None,
            None,
            Some("http://localhost:3000/callback".into()),
        )
        .expect("config");
        SmartLauncher::new(reqwest::Client::new(), Arc::new(config))
    }

    #[tokio::test]
    async fn unknown_state_fails_without_creating_a_session() {
        let store = SessionStore::new();
        let callback = CallbackParams {
            code: Some("abc".into()),
            state: Some("never-issued".into()),
            ..CallbackParams::default()
        };

        let outcome = bootstrap(&launcher(), &store, &callback).await;
        assert_eq!(
            outcome,
            BootstrapOutcome::Failed("unknown or expired launch state".into())
        );
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn denial_is_reported_verbatim() {
        let store = SessionStore::new();
        let callback = CallbackParams {
            error: Some("access_denied".into()),
            ..CallbackParams::default()
        };

        let outcome = bootstrap(&launcher(), &store, &callback).await;
        assert_eq!(
            outcome,
            BootstrapOutcome::Failed("authorization denied: access_denied".into())
        );
    }
}
