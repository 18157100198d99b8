//! In-memory session registry
//!
//! Each session sits behind its own mutex, so turns within a session run
//! strictly one after another while separate sessions proceed independently.
//! Abandoned sessions are dropped by [`SessionStore::evict_idle`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use super::chat::Session;

pub type SharedSession = Arc<Mutex<Session>>;

struct Entry {
    session: SharedSession,
    touched: Instant,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session with empty memory
    pub async fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id;
        self.sessions
            .write()
            .await
            .insert(
                id,
                Entry {
                    session: Arc::new(Mutex::new(session)),
                    touched: Instant::now(),
                },
            );
        tracing::debug!(session = %id, "session created");
        id
    }

    /// Look up a session and mark it active
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.touched = Instant::now();
        Some(entry.session.clone())
    }

    /// End a session, discarding its memory. Returns false if it did not exist.
    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "session discarded");
        }
        removed
    }

    /// Drop sessions idle for at least `max_idle`. Sessions with a turn in
    /// flight are kept. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            Arc::strong_count(&entry.session) > 1 || entry.touched.elapsed() < max_idle
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = sessions.len(), "idle sessions evicted");
        }
        evicted
    }

    /// Evict idle sessions on a fixed interval until the process exits
    pub fn spawn_sweeper(self: Arc<Self>, max_idle: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(max_idle.max(Duration::from_secs(1)) / 2);
            loop {
                ticker.tick().await;
                self.evict_idle(max_idle).await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
