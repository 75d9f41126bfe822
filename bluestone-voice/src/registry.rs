//! Active-session registry
//!
//! The registry is the parent collection of live sessions. The scheduler only
//! needs `remove`, which it calls once when its queue runs dry.

use crate::playback::SessionHandle;
use bluestone_common::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Parent collection of active sessions, keyed by session identity
pub trait SessionRegistry: Send + Sync {
    /// Forget the session; called by its scheduler during teardown
    fn remove(&self, session_id: SessionId);
}

/// Thread-safe map of live sessions
///
/// Cheap to clone; clones share the same map.
#[derive(Clone, Default)]
pub struct SessionMap {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, returning the handle it replaced (if any)
    pub fn insert(&self, handle: SessionHandle) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(handle.session_id(), handle)
    }

    /// Return the live session for `session_id`, creating it with `spawn`
    /// if there is none. The map stays write-locked while `spawn` runs.
    pub fn get_or_insert_with<F>(&self, session_id: SessionId, spawn: F) -> SessionHandle
    where
        F: FnOnce() -> SessionHandle,
    {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.entry(session_id).or_insert_with(spawn).clone()
    }

    /// Look up a live session
    pub fn get(&self, session_id: SessionId) -> Option<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.get(&session_id).cloned()
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.contains_key(&session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all live sessions, in no particular order
    pub fn session_ids(&self) -> Vec<SessionId> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.keys().copied().collect()
    }
}

impl SessionRegistry for SessionMap {
    fn remove(&self, session_id: SessionId) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if sessions.remove(&session_id).is_some() {
            debug!("Session {} removed from registry ({} left)", session_id, sessions.len());
        }
    }
}
