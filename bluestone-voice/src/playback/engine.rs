//! Playback engine seam
//!
//! The engine does the actual audio work. The scheduler only asks it to start,
//! stop or release tracks; the engine reports back through a
//! [`TrackEventSink`](super::events::TrackEventSink) handed to it when the
//! session is spawned.

use super::track::Track;

pub use bluestone_common::TrackEndReason;

/// Engine adapter driven by a session's scheduler
///
/// Calls are made from the session worker and must return promptly. An engine
/// may emit events from inside these calls; they are queued on the session
/// mailbox and handled after the call returns.
pub trait PlaybackEngine: Send + Sync {
    /// Start playing `track`.
    ///
    /// With `no_interrupt` set, the engine must refuse (return `false`) while
    /// another track is active. Without it, any active track is replaced.
    /// Returns whether the track began playing now.
    fn start_track(&self, track: Track, no_interrupt: bool) -> bool;

    /// Forcibly stop `track` if it is the active one
    fn stop_track(&self, track: &Track);

    /// Release all engine resources; no further tracks will be started
    fn destroy(&self);
}
