//! Event types for the Bluestone session event stream

use serde::{Deserialize, Serialize};

use crate::ids::{SessionId, TrackId};

/// Why a track stopped playing, as reported by the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackEndReason {
    /// Track played to completion
    Finished,
    /// Track failed to load or decode
    LoadFailed,
    /// Track was stopped from outside the scheduler
    Stopped,
    /// Another track was started in its place
    Replaced,
    /// Engine released the track during resource cleanup
    Cleanup,
}

impl TrackEndReason {
    /// Whether the scheduler may automatically continue (repeat or advance)
    /// after a track ended for this reason.
    ///
    /// `Stopped` and `Cleanup` imply that whoever stopped the track already
    /// owns the follow-up.
    pub fn may_start_next(self) -> bool {
        matches!(
            self,
            TrackEndReason::Finished | TrackEndReason::LoadFailed | TrackEndReason::Replaced
        )
    }
}

impl std::fmt::Display for TrackEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackEndReason::Finished => write!(f, "finished"),
            TrackEndReason::LoadFailed => write!(f, "load_failed"),
            TrackEndReason::Stopped => write!(f, "stopped"),
            TrackEndReason::Replaced => write!(f, "replaced"),
            TrackEndReason::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Session state as seen by observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No track is playing
    Idle,
    /// A track is current
    Playing,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Playing => write!(f, "playing"),
        }
    }
}

/// Session event types
///
/// Broadcast by a session's scheduler after every transition. Observers that
/// lag behind lose events; nothing in the scheduler depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Engine reported that a track began playing
    TrackStarted {
        session_id: SessionId,
        track_id: TrackId,
        title: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A track stopped playing
    TrackEnded {
        session_id: SessionId,
        track_id: TrackId,
        reason: TrackEndReason,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Engine reported a playback fault for a track
    TrackFaulted {
        session_id: SessionId,
        track_id: TrackId,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Engine reported a stalled track; it is being skipped
    TrackStuck {
        session_id: SessionId,
        track_id: TrackId,
        threshold_ms: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Track appended to the pending queue (position is 1-based)
    TrackQueued {
        session_id: SessionId,
        track_id: TrackId,
        position: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Pending queue reordered
    QueueShuffled {
        session_id: SessionId,
        queue_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Repeat mode toggled
    RepeatChanged {
        session_id: SessionId,
        repeating: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Queue exhausted and session resources released
    SessionClosed {
        session_id: SessionId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Session that produced this event
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::TrackStarted { session_id, .. }
            | SessionEvent::TrackEnded { session_id, .. }
            | SessionEvent::TrackFaulted { session_id, .. }
            | SessionEvent::TrackStuck { session_id, .. }
            | SessionEvent::TrackQueued { session_id, .. }
            | SessionEvent::QueueShuffled { session_id, .. }
            | SessionEvent::RepeatChanged { session_id, .. }
            | SessionEvent::SessionClosed { session_id, .. } => *session_id,
        }
    }

    /// Event type name (matches the serde tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::TrackStarted { .. } => "TrackStarted",
            SessionEvent::TrackEnded { .. } => "TrackEnded",
            SessionEvent::TrackFaulted { .. } => "TrackFaulted",
            SessionEvent::TrackStuck { .. } => "TrackStuck",
            SessionEvent::TrackQueued { .. } => "TrackQueued",
            SessionEvent::QueueShuffled { .. } => "QueueShuffled",
            SessionEvent::RepeatChanged { .. } => "RepeatChanged",
            SessionEvent::SessionClosed { .. } => "SessionClosed",
        }
    }
}
