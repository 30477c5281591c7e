//! In-memory ideation sessions.
//!
//! A session holds one [`IdeationWorkflow`] for one anonymous user. Sessions
//! are not persisted; a restart discards them. Each session sits behind its
//! own async mutex so a provider call only holds that session, never the
//! whole store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use commonground_core::error::CoreError;
use commonground_core::ideation::IdeationWorkflow;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

/// Mutable session state, reachable only through a [`SessionGuard`].
#[derive(Debug)]
pub struct Session {
    pub workflow: IdeationWorkflow,
    last_used: Instant,
}

/// Live sessions one anonymous user may hold at a time.
pub const MAX_SESSIONS_PER_OWNER: usize = 5;

/// Exclusive access to one session for the duration of a request.
pub type SessionGuard = OwnedMutexGuard<Session>;

struct SessionEntry {
    owner: String,
    session: Arc<Mutex<Session>>,
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::NotFound {
        entity: "Ideation session",
        id: id.to_string(),
    }
}

/// Registry of live sessions keyed by session id.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new session owned by `owner` and return its id.
    ///
    /// An owner at [`MAX_SESSIONS_PER_OWNER`] loses their least recently
    /// used idle session. When every one of them is mid-step the new
    /// session is refused.
    pub async fn create(
        &self,
        owner: &str,
        workflow: IdeationWorkflow,
    ) -> Result<Uuid, CoreError> {
        let mut sessions = self.sessions.write().await;

        let owned = sessions.values().filter(|entry| entry.owner == owner).count();
        if owned >= MAX_SESSIONS_PER_OWNER {
            let oldest_idle = sessions
                .iter()
                .filter(|(_, entry)| entry.owner == owner)
                .filter_map(|(id, entry)| {
                    let session = entry.session.try_lock().ok()?;
                    Some((*id, session.last_used))
                })
                .min_by_key(|(_, last_used)| *last_used)
                .map(|(id, _)| id);
            match oldest_idle {
                Some(evicted) => {
                    sessions.remove(&evicted);
                    tracing::debug!(session_id = %evicted, "Evicted oldest ideation session");
                }
                None => {
                    return Err(CoreError::Conflict(
                        "Too many ideation sessions are running for this user".to_string(),
                    ));
                }
            }
        }

        let id = Uuid::new_v4();
        let entry = SessionEntry {
            owner: owner.to_string(),
            session: Arc::new(Mutex::new(Session {
                workflow,
                last_used: Instant::now(),
            })),
        };
        sessions.insert(id, entry);
        Ok(id)
    }

    /// Take exclusive access to a session.
    ///
    /// A session owned by someone else is reported as missing. A session
    /// already held by another request is a conflict; steps never queue.
    pub async fn checkout(&self, id: Uuid, owner: &str) -> Result<SessionGuard, CoreError> {
        let session = {
            let sessions = self.sessions.read().await;
            let entry = sessions
                .get(&id)
                .filter(|entry| entry.owner == owner)
                .ok_or_else(|| not_found(id))?;
            Arc::clone(&entry.session)
        };

        let mut guard = session.try_lock_owned().map_err(|_| {
            CoreError::Conflict("Another step is already running for this session".to_string())
        })?;
        guard.last_used = Instant::now();
        Ok(guard)
    }

    /// Discard a session. A step still running on it completes against its
    /// own handle and is then dropped.
    pub async fn remove(&self, id: Uuid, owner: &str) -> Result<(), CoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            Some(entry) if entry.owner == owner => {
                sessions.remove(&id);
                Ok(())
            }
            _ => Err(not_found(id)),
        }
    }

    /// Drop sessions unused for at least `ttl`. Sessions in the middle of a
    /// step are kept. Returns how many were dropped.
    pub async fn purge_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.session.try_lock() {
            Ok(session) => session.last_used.elapsed() < ttl,
            Err(_) => true,
        });
        before - sessions.len()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
