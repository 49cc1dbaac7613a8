use phq9_core::{AppConfig, SessionStore, SmartLauncher};
use std::sync::Arc;

/// Application state shared by every request handler.
///
/// Holds the SMART launcher (with its validated configuration) and the page-session
/// registry. Both are process-wide; each page session inside the registry is independent.
#[derive(Clone)]
pub struct AppState {
    launcher: Arc<SmartLauncher>,
    sessions: Arc<SessionStore>,
}

impl AppState {
    /// Build state around a fresh HTTP client shared by every launch and page session.
    pub fn new(config: AppConfig) -> Self {
        Self {
            launcher: Arc::new(SmartLauncher::new(reqwest::Client::new(), Arc::new(config))),
            sessions: Arc::new(SessionStore::new()),
        }
    }

    pub fn launcher(&self) -> &SmartLauncher {
        &self.launcher
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
