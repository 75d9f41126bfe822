//! Error types for bluestone-voice
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use bluestone_common::SessionId;
use thiserror::Error;

/// Main error type for bluestone-voice
#[derive(Error, Debug)]
pub enum Error {
    /// The session's worker has stopped (queue exhausted or dropped)
    #[error("Session {0} is closed")]
    SessionClosed(SessionId),

    /// Track description could not be parsed or is unusable
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// Errors from the shared library
    #[error(transparent)]
    Common(#[from] bluestone_common::Error),
}

/// Convenience Result type using bluestone-voice Error
pub type Result<T> = std::result::Result<T, Error>;
