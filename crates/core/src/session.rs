//! Page sessions and pending launches.
//!
//! Every completed launch gets its own [`PageSession`], owned by the [`SessionStore`] and
//! reached through a per-session `tokio::sync::Mutex`. Holding that lock across a submission
//! keeps two submissions for the same page from interleaving. Sessions never share state.
//!
//! Both registries expire their entries. A launch whose callback has not arrived within
//! [`PENDING_LAUNCH_TTL`] is dropped, and a page session not reached for [`SESSION_IDLE_TTL`]
//! has ended: it is removed together with its access token. Expired entries are pruned
//! whenever the registry is written or read.

use crate::client::{ClinicalData, SessionHandle};
use crate::constants::{PENDING_LAUNCH_TTL, SESSION_IDLE_TTL};
use crate::questionnaire::Questionnaire;
use crate::smart::PendingLaunch;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Identifier of a page session, used in page URLs.
pub type SessionId = Uuid;

/// One launched questionnaire page: its authorized client and its questionnaire state.
#[derive(Debug)]
pub struct PageSession<C = SessionHandle> {
    pub client: C,
    pub questionnaire: Questionnaire,
}

impl<C: ClinicalData> PageSession<C> {
    pub fn new(client: C, questionnaire: Questionnaire) -> Self {
        Self {
            client,
            questionnaire,
        }
    }
}

/// Shared handle to one page session.
pub type SharedSession<C = SessionHandle> = Arc<Mutex<PageSession<C>>>;

#[derive(Debug)]
struct SessionEntry<C> {
    session: SharedSession<C>,
    last_access: Instant,
}

#[derive(Debug)]
struct PendingEntry {
    launch: PendingLaunch,
    added: Instant,
}

/// Process-level registries: live page sessions and launches awaiting their callback.
#[derive(Debug)]
pub struct SessionStore<C = SessionHandle> {
    sessions: RwLock<HashMap<SessionId, SessionEntry<C>>>,
    pending: Mutex<HashMap<String, PendingEntry>>,
}

impl<C> Default for SessionStore<C> {
    fn default() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }
}

fn expired(since: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(since) > ttl
}

impl<C: ClinicalData> SessionStore<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page session and return its new id.
    pub async fn insert(&self, session: PageSession<C>) -> SessionId {
        self.insert_at(session, Instant::now()).await
    }

    /// Look up a live page session and mark it as used.
    ///
    /// Returns `None` for unknown ids and for sessions that have been idle too long.
    pub async fn get(&self, id: &SessionId) -> Option<SharedSession<C>> {
        self.get_at(id, Instant::now()).await
    }

    /// Number of live page sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Keep a launch until its callback arrives, keyed by its `state`.
    pub async fn add_pending(&self, launch: PendingLaunch) {
        self.add_pending_at(launch, Instant::now()).await
    }

    /// Remove and return the launch for `state`. A state can be redeemed once, and only
    /// before it expires.
    pub async fn take_pending(&self, state: &str) -> Option<PendingLaunch> {
        self.take_pending_at(state, Instant::now()).await
    }

    // ========================================================================
    // Clock-explicit internals
    // ========================================================================

    async fn insert_at(&self, session: PageSession<C>, now: Instant) -> SessionId {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;
        Self::prune_sessions(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                last_access: now,
            },
        );
        id
    }

    async fn get_at(&self, id: &SessionId, now: Instant) -> Option<SharedSession<C>> {
        let mut sessions = self.sessions.write().await;
        Self::prune_sessions(&mut sessions, now);
        let entry = sessions.get_mut(id)?;
        entry.last_access = now;
        Some(Arc::clone(&entry.session))
    }

    async fn add_pending_at(&self, launch: PendingLaunch, now: Instant) {
        let mut pending = self.pending.lock().await;
        Self::prune_pending(&mut pending, now);
        pending.insert(
            launch.state().to_string(),
            PendingEntry { launch, added: now },
        );
    }

    async fn take_pending_at(&self, state: &str, now: Instant) -> Option<PendingLaunch> {
        let mut pending = self.pending.lock().await;
        Self::prune_pending(&mut pending, now);
        pending.remove(state).map(|entry| entry.launch)
    }

    fn prune_sessions(sessions: &mut HashMap<SessionId, SessionEntry<C>>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, entry| !expired(entry.last_access, now, SESSION_IDLE_TTL));
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!("ended {} idle page session(s)", removed);
        }
    }

    fn prune_pending(pending: &mut HashMap<String, PendingEntry>, now: Instant) {
        let before = pending.len();
        pending.retain(|_, entry| !expired(entry.added, now, PENDING_LAUNCH_TTL));
        let removed = before - pending.len();
        if removed > 0 {
            tracing::info!("discarded {} abandoned launch(es)", removed);
        }
    }
}
