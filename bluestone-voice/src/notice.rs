//! Listener-facing notices and where they are sent
//!
//! Sending is fire-and-forget: a destination must queue the text and return
//! immediately, because notices are produced on the session worker.

use bluestone_common::human_time::format_duration_ms;
use std::fmt;
use tokio::sync::mpsc;
use tracing::debug;

/// Somewhere a text notice can be delivered (a chat channel, a log, a test recorder)
pub trait Destination: Send + Sync {
    /// Queue `message` for delivery without waiting for it.
    fn send_text(&self, message: String);
}

/// Destination backed by an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelDestination {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelDestination {
    /// Create a destination and the receiver its notices arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Destination for ChannelDestination {
    fn send_text(&self, message: String) {
        if self.tx.send(message).is_err() {
            debug!("Notice dropped: destination receiver is gone");
        }
    }
}

/// Notices the scheduler sends to a track's bound destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A track began playing
    NowPlaying { title: String, duration_ms: u64 },
    /// The engine reported a fault while playing
    PlaybackError { message: String },
    /// The engine reported the track as stalled; it is skipped
    TrackFrozen,
}

impl Notice {
    /// Now-playing notice, optionally defusing mass mentions in the title
    pub fn now_playing(title: &str, duration_ms: u64, scrub: bool) -> Self {
        let title = if scrub {
            scrub_mentions(title)
        } else {
            title.to_string()
        };
        Notice::NowPlaying { title, duration_ms }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NowPlaying { title, duration_ms } => write!(
                f,
                ":arrow_forward: **{}**, length **{}**",
                title,
                format_duration_ms(*duration_ms)
            ),
            Notice::PlaybackError { message } => {
                write!(f, ":bangbang: Error in audio player! {}", message)
            }
            Notice::TrackFrozen => write!(f, ":warning: Song appears to be frozen, skipping."),
        }
    }
}

/// Insert a zero-width space after `@` in `@everyone` / `@here` so a track
/// title cannot ping a whole community.
pub fn scrub_mentions(text: &str) -> String {
    text.replace("@everyone", "@\u{200b}everyone")
        .replace("@here", "@\u{200b}here")
}
