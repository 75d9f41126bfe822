//! Voice transport seam
//!
//! The transport owns the network voice connection. The scheduler only ever
//! asks it to shut down when a session ends.

use bluestone_common::SessionId;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Voice connection owned by the caller and referenced by the scheduler
pub trait VoiceTransport: Send + Sync {
    /// Close the voice connection for this session
    fn close_connection(&self);

    /// Detach whatever handler is feeding audio frames to the connection
    fn detach_send_handler(&self);
}

/// Transport stand-in that only logs and remembers what it was asked to do
///
/// Used by the demo binary where no real voice connection exists.
#[derive(Debug)]
pub struct LoggingTransport {
    session_id: SessionId,
    connected: AtomicBool,
    sending: AtomicBool,
}

impl LoggingTransport {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            connected: AtomicBool::new(true),
            sending: AtomicBool::new(true),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst)
    }
}

impl VoiceTransport for LoggingTransport {
    fn close_connection(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            info!("Session {}: voice connection closed", self.session_id);
        }
    }

    fn detach_send_handler(&self) {
        if self.sending.swap(false, Ordering::SeqCst) {
            info!("Session {}: send handler detached", self.session_id);
        }
    }
}
