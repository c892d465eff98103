use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::ChatHistory;

/// Session store tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStoreConfig {
    /// Maximum number of live sessions; least-recently-used sessions are
    /// evicted beyond this. 0 keeps every session for the process
    /// lifetime (the default).
    pub max_sessions: usize,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self { max_sessions: 0 }
    }
}

enum SessionMap {
    Unbounded(HashMap<String, Arc<Mutex<ChatHistory>>>),
    Bounded(LruCache<String, Arc<Mutex<ChatHistory>>>),
}

impl SessionMap {
    fn get_or_create(&mut self, session_id: &str) -> Arc<Mutex<ChatHistory>> {
        match self {
            SessionMap::Unbounded(map) => map
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(ChatHistory::new())))
                .clone(),
            SessionMap::Bounded(cache) => {
                if let Some(history) = cache.get(session_id) {
                    return history.clone();
                }
                let history = Arc::new(Mutex::new(ChatHistory::new()));
                cache.put(session_id.to_string(), history.clone());
                history
            }
        }
    }

    fn len(&self) -> usize {
        match self {
            SessionMap::Unbounded(map) => map.len(),
            SessionMap::Bounded(cache) => cache.len(),
        }
    }

    fn contains(&self, session_id: &str) -> bool {
        match self {
            SessionMap::Unbounded(map) => map.contains_key(session_id),
            SessionMap::Bounded(cache) => cache.contains(session_id),
        }
    }
}

/// Process-wide mapping from session id to that session's history.
///
/// Entries are created lazily on first use. The same `Arc` handle is
/// returned to every caller of a given id, so callers serialize turns on
/// one session by locking the entry's mutex; distinct sessions never
/// contend beyond the brief map access.
pub struct SessionStore {
    sessions: RwLock<SessionMap>,
}

impl SessionStore {
    pub fn new(config: SessionStoreConfig) -> Self {
        let map = match NonZeroUsize::new(config.max_sessions) {
            Some(cap) => SessionMap::Bounded(LruCache::new(cap)),
            None => SessionMap::Unbounded(HashMap::new()),
        };

        Self {
            sessions: RwLock::new(map),
        }
    }

    /// Resolve the history handle for `session_id`, creating an empty one
    /// on first use. At most one history object exists per id.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<ChatHistory>> {
        let mut sessions = self.sessions.write().await;
        if !sessions.contains(session_id) {
            debug!(session_id, "creating new session history");
        }
        sessions.get_or_create(session_id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains(session_id)
    }
}
