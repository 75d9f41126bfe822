//! Session worker and handle
//!
//! Each session runs one tokio task that exclusively owns its
//! [`TrackScheduler`]. Callers talk to it through a cloneable
//! [`SessionHandle`]; the engine talks to it through a [`TrackEventSink`].
//! Both feed the same unbounded mailbox, so commands and engine events are
//! handled strictly one at a time and in arrival order. An engine that emits
//! events from inside `start_track` therefore never re-enters the scheduler.
//!
//! The worker exits right after teardown. Dropping the mailbox makes every
//! later command fail with [`Error::SessionClosed`] and every later engine
//! event a no-op.

use super::engine::PlaybackEngine;
use super::events::{TrackEvent, TrackEventSink};
use super::scheduler::{Enqueued, TrackScheduler};
use super::state::SessionStatus;
use super::track::Track;
use crate::config::SchedulerSettings;
use crate::error::{Error, Result};
use crate::notice::Destination;
use crate::registry::SessionRegistry;
use crate::transport::VoiceTransport;
use bluestone_common::{SessionEvent, SessionId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

/// Everything a session worker can receive
pub(crate) enum SessionMessage {
    Event(TrackEvent),
    Command(SessionCommand),
}

/// Caller requests, answered over oneshot channels where a reply is needed
pub(crate) enum SessionCommand {
    Enqueue {
        track: Track,
        destination: Option<Arc<dyn Destination>>,
        reply: oneshot::Sender<Result<Enqueued>>,
    },
    SetRepeating {
        repeating: bool,
    },
    IsRepeating {
        reply: oneshot::Sender<bool>,
    },
    Shuffle,
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
}

/// Start a session worker on the current tokio runtime.
///
/// `make_engine` receives the sink the engine must report lifecycle events
/// to. The caller is expected to register the returned handle with the same
/// registry passed in here; the scheduler removes it on teardown.
pub fn spawn<F>(
    session_id: SessionId,
    settings: SchedulerSettings,
    transport: Arc<dyn VoiceTransport>,
    registry: Arc<dyn SessionRegistry>,
    make_engine: F,
) -> SessionHandle
where
    F: FnOnce(TrackEventSink) -> Arc<dyn PlaybackEngine>,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = make_engine(TrackEventSink::new(session_id, tx.clone()));
    let scheduler = TrackScheduler::new(session_id, settings, engine, transport, registry);
    let events = scheduler.event_sender();

    tokio::spawn(run(scheduler, rx));

    SessionHandle {
        session_id,
        tx,
        events,
    }
}

async fn run(mut scheduler: TrackScheduler, mut rx: mpsc::UnboundedReceiver<SessionMessage>) {
    let session_id = scheduler.session_id();
    info!("Session {} worker started", session_id);

    while let Some(message) = rx.recv().await {
        match message {
            SessionMessage::Event(event) => scheduler.handle_event(event),
            SessionMessage::Command(command) => handle_command(&mut scheduler, command),
        }

        if scheduler.is_closed() {
            break;
        }
    }

    if scheduler.is_closed() {
        info!("Session {} worker stopped", session_id);
    } else {
        // Every handle and sink was dropped while the session was still live
        info!("Session {} abandoned, worker stopped", session_id);
    }
}

fn handle_command(scheduler: &mut TrackScheduler, command: SessionCommand) {
    match command {
        SessionCommand::Enqueue {
            track,
            destination,
            reply,
        } => {
            let result = scheduler.enqueue(track, destination);
            if reply.send(result).is_err() {
                debug!("Session {}: enqueue caller went away", scheduler.session_id());
            }
        }
        SessionCommand::SetRepeating { repeating } => scheduler.set_repeating(repeating),
        SessionCommand::IsRepeating { reply } => {
            let _ = reply.send(scheduler.is_repeating());
        }
        SessionCommand::Shuffle => scheduler.shuffle_queue(),
        SessionCommand::Status { reply } => {
            let _ = reply.send(scheduler.status());
        }
    }
}

/// Caller-side handle to a running session
///
/// Cheap to clone. All methods fail with [`Error::SessionClosed`] once the
/// session has torn down.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionMessage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Play `track` now if the session is idle, otherwise queue it.
    ///
    /// Notices about the track go to `destination`, if given.
    pub async fn enqueue(
        &self,
        track: Track,
        destination: Option<Arc<dyn Destination>>,
    ) -> Result<Enqueued> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Enqueue {
            track,
            destination,
            reply,
        })?;
        rx.await.map_err(|_| self.closed_error())?
    }

    pub fn set_repeating(&self, repeating: bool) -> Result<()> {
        self.send(SessionCommand::SetRepeating { repeating })
    }

    pub async fn is_repeating(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::IsRepeating { reply })?;
        rx.await.map_err(|_| self.closed_error())
    }

    /// Randomly reorder the pending tracks
    pub fn shuffle_queue(&self) -> Result<()> {
        self.send(SessionCommand::Shuffle)
    }

    pub async fn status(&self) -> Result<SessionStatus> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Status { reply })?;
        rx.await.map_err(|_| self.closed_error())
    }

    /// Track the engine reported as playing, if any
    pub async fn current(&self) -> Result<Option<Track>> {
        Ok(self.status().await?.current)
    }

    /// Pending tracks in play order
    pub async fn queued(&self) -> Result<Vec<Track>> {
        Ok(self.status().await?.queue)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether the worker has stopped
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Wait until the worker has stopped
    pub async fn closed(&self) {
        self.tx.closed().await
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(SessionMessage::Command(command))
            .map_err(|_| self.closed_error())
    }

    fn closed_error(&self) -> Error {
        Error::SessionClosed(self.session_id)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &self.session_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
