//! # Bluestone Voice Library (bluestone-voice)
//!
//! Playback-session scheduler for voice-enabled communities.
//!
//! **Purpose:** Keep exactly one track playing per session, queue the rest,
//! repeat or advance when a track ends, and release the engine, transport and
//! registry entry once the queue runs dry.
//!
//! **Architecture:** One worker task per session drains a single mailbox
//! carrying both caller commands and engine lifecycle events, so the
//! scheduler state is only ever touched from one place.

pub mod config;
pub mod error;
pub mod notice;
pub mod playback;
pub mod registry;
pub mod transport;

pub use error::{Error, Result};
pub use notice::{ChannelDestination, Destination, Notice};
pub use playback::{
    Enqueued, PlaybackEngine, SessionHandle, SimulatedEngine, Track, TrackEndReason, TrackEvent,
    TrackEventSink, TrackFault, TrackScheduler,
};
pub use registry::{SessionMap, SessionRegistry};
pub use transport::VoiceTransport;
