//! Engine → scheduler lifecycle events
//!
//! Engines report track lifecycle changes through a [`TrackEventSink`]. The
//! sink never blocks: events are queued on the session mailbox and handled by
//! the session worker in arrival order.

use super::session::SessionMessage;
use super::track::Track;
use bluestone_common::{SessionId, TrackEndReason};
use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

/// How bad a reported playback fault is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultSeverity {
    /// Expected failure with a known cause (unavailable video, bad link)
    Common,
    /// Failure with an unclear cause, possibly a bug in the source
    Suspicious,
    /// Engine-level failure
    Fault,
}

impl FaultSeverity {
    /// Parse a lowercase severity tag (`common`, `suspicious`, `fault`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "common" => Some(FaultSeverity::Common),
            "suspicious" => Some(FaultSeverity::Suspicious),
            "fault" => Some(FaultSeverity::Fault),
            _ => None,
        }
    }
}

/// Playback fault reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFault {
    pub message: String,
    pub severity: FaultSeverity,
}

impl TrackFault {
    pub fn new(message: impl Into<String>, severity: FaultSeverity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    pub fn common(message: impl Into<String>) -> Self {
        Self::new(message, FaultSeverity::Common)
    }
}

impl fmt::Display for TrackFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Track lifecycle events delivered by the engine
///
/// For a given track instance: `Start` precedes `End`, and at most one `End`
/// arrives. `Exception` is informational; an `End` follows it.
#[derive(Debug, Clone)]
pub enum TrackEvent {
    /// Track began playing
    Start { track: Track },

    /// Track stopped playing
    End {
        track: Track,
        reason: TrackEndReason,
    },

    /// Fault while playing the track
    Exception { track: Track, fault: TrackFault },

    /// Track has produced no audio for `threshold_ms`
    Stuck { track: Track, threshold_ms: u64 },
}

impl TrackEvent {
    pub fn track(&self) -> &Track {
        match self {
            TrackEvent::Start { track }
            | TrackEvent::End { track, .. }
            | TrackEvent::Exception { track, .. }
            | TrackEvent::Stuck { track, .. } => track,
        }
    }
}

/// Engine-side handle for delivering lifecycle events to one session
#[derive(Debug, Clone)]
pub struct TrackEventSink {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl TrackEventSink {
    pub(crate) fn new(session_id: SessionId, tx: mpsc::UnboundedSender<SessionMessage>) -> Self {
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Queue an event for the session. Events for a closed session are dropped.
    pub fn send(&self, event: TrackEvent) {
        if let Err(e) = self.tx.send(SessionMessage::Event(event)) {
            if let SessionMessage::Event(event) = e.0 {
                debug!(
                    "Session {} closed, ignoring {:?} for track {}",
                    self.session_id,
                    event_name(&event),
                    event.track().id()
                );
            }
        }
    }

    pub fn track_started(&self, track: Track) {
        self.send(TrackEvent::Start { track });
    }

    pub fn track_ended(&self, track: Track, reason: TrackEndReason) {
        self.send(TrackEvent::End { track, reason });
    }

    pub fn track_exception(&self, track: Track, fault: TrackFault) {
        self.send(TrackEvent::Exception { track, fault });
    }

    pub fn track_stuck(&self, track: Track, threshold_ms: u64) {
        self.send(TrackEvent::Stuck { track, threshold_ms });
    }

    /// Whether the session worker has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

fn event_name(event: &TrackEvent) -> &'static str {
    match event {
        TrackEvent::Start { .. } => "start",
        TrackEvent::End { .. } => "end",
        TrackEvent::Exception { .. } => "exception",
        TrackEvent::Stuck { .. } => "stuck",
    }
}
