//! # Bluestone Common Library
//!
//! Shared code for the Bluestone voice services including:
//! - Session and track identifiers
//! - Event types (SessionEvent enum) and the track end-reason taxonomy
//! - Configuration file resolution and loading
//! - Human-readable duration formatting

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod ids;

pub use error::{Error, Result};
pub use events::{SessionEvent, TrackEndReason};
pub use ids::{SessionId, TrackId};
