//! Session playback state

use super::track::Track;
use bluestone_common::{SessionId, TrackId};
use serde::Serialize;

pub use bluestone_common::events::PlaybackState;

/// Current track, repeat flag and last finished track of one session
#[derive(Debug, Default)]
pub struct SessionState {
    /// Track the engine reported as playing (None when idle)
    current: Option<Track>,
    repeating: bool,
    /// Most recently ended track (diagnostic only)
    last_track: Option<Track>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Playing` exactly when a track is current
    pub fn state(&self) -> PlaybackState {
        if self.current.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn set_current(&mut self, track: Track) {
        self.current = Some(track);
    }

    pub fn take_current(&mut self) -> Option<Track> {
        self.current.take()
    }

    pub fn repeating(&self) -> bool {
        self.repeating
    }

    pub fn set_repeating(&mut self, repeating: bool) {
        self.repeating = repeating;
    }

    pub fn last_track(&self) -> Option<&Track> {
        self.last_track.as_ref()
    }

    pub fn set_last_track(&mut self, track: Track) {
        self.last_track = Some(track);
    }
}

/// Point-in-time view of a session for status display
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    pub state: PlaybackState,
    pub current: Option<Track>,
    pub queue: Vec<Track>,
    pub repeating: bool,
    pub last_track: Option<Track>,
    /// Tracks with a notification destination, in no particular order
    pub bound_tracks: Vec<TrackId>,
}
