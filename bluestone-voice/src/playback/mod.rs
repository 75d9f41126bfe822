//! Playback session management
//!
//! One session per voice connection. The [`TrackScheduler`] decides what plays
//! next; the [`PlaybackEngine`] plays it; the session worker in [`session`]
//! serializes everything between the two.

pub mod bindings;
pub mod engine;
pub mod events;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod sim;
pub mod state;
pub mod track;

pub use bindings::Bindings;
pub use engine::{PlaybackEngine, TrackEndReason};
pub use events::{FaultSeverity, TrackEvent, TrackEventSink, TrackFault};
pub use queue::PlaybackQueue;
pub use scheduler::{Enqueued, TrackScheduler};
pub use session::{spawn, SessionHandle};
pub use sim::SimulatedEngine;
pub use state::{PlaybackState, SessionState, SessionStatus};
pub use track::Track;
