//! Track scheduler: the per-session playback state machine
//!
//! Owns the pending queue, the destination bindings and the session state.
//! Callers enqueue tracks and toggle repeat/shuffle; the engine reports
//! lifecycle events. Both arrive through the session mailbox (see
//! [`session`](super::session)), so every method here runs on one worker and
//! takes `&mut self`.
//!
//! `current` and the queue are only changed by the event handlers and
//! `advance`; `enqueue` merely asks the engine and queues on refusal.
//!
//! Engine events may interleave with commands: a track can finish inside the
//! engine, a queued `enqueue` can start the next one, and only then does the
//! first track's end event arrive. The scheduler therefore remembers which
//! track the engine last accepted and only lets that track's end or stall
//! move playback forward.

use super::bindings::Bindings;
use super::engine::{PlaybackEngine, TrackEndReason};
use super::events::{FaultSeverity, TrackEvent, TrackFault};
use super::queue::PlaybackQueue;
use super::state::{PlaybackState, SessionState, SessionStatus};
use super::track::Track;
use crate::config::SchedulerSettings;
use crate::error::{Error, Result};
use crate::notice::{Destination, Notice};
use crate::registry::SessionRegistry;
use crate::transport::VoiceTransport;
use bluestone_common::{SessionEvent, SessionId, TrackId};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Result of an accepted enqueue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Engine was idle and began playing the track right away
    Started,
    /// Something else is playing; the track waits at this 1-based position
    Queued { position: usize },
}

/// Per-session playback state machine
pub struct TrackScheduler {
    session_id: SessionId,
    settings: SchedulerSettings,

    engine: Arc<dyn PlaybackEngine>,
    transport: Arc<dyn VoiceTransport>,
    registry: Arc<dyn SessionRegistry>,

    queue: PlaybackQueue,
    bindings: Bindings,
    state: SessionState,

    /// Track the engine most recently accepted; events for any other track
    /// never advance or repeat
    engine_track: Option<TrackId>,

    /// Set once teardown ran; the scheduler is inert afterwards
    closed: bool,

    event_tx: broadcast::Sender<SessionEvent>,
}

impl TrackScheduler {
    pub fn new(
        session_id: SessionId,
        settings: SchedulerSettings,
        engine: Arc<dyn PlaybackEngine>,
        transport: Arc<dyn VoiceTransport>,
        registry: Arc<dyn SessionRegistry>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(settings.event_buffer.max(1));
        Self {
            session_id,
            settings,
            engine,
            transport,
            registry,
            queue: PlaybackQueue::new(),
            bindings: Bindings::new(),
            state: SessionState::new(),
            engine_track: None,
            closed: false,
            event_tx,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    // ===== Commands =====

    /// Bind `destination` (if any) and ask the engine to start `track`
    /// without interrupting current playback; queue it if the engine refuses.
    pub fn enqueue(
        &mut self,
        track: Track,
        destination: Option<Arc<dyn Destination>>,
    ) -> Result<Enqueued> {
        if self.closed {
            return Err(Error::SessionClosed(self.session_id));
        }

        let track_id = track.id();
        if let Some(destination) = destination {
            self.bindings.bind(track_id, destination);
        }

        if self.engine.start_track(track.clone(), true) {
            self.engine_track = Some(track_id);
            debug!("Session {}: track {} started immediately", self.session_id, track_id);
            return Ok(Enqueued::Started);
        }

        let position = self.queue.push_back(track);
        debug!(
            "Session {}: track {} queued at position {}",
            self.session_id, track_id, position
        );
        self.emit(SessionEvent::TrackQueued {
            session_id: self.session_id,
            track_id,
            position,
            timestamp: Utc::now(),
        });
        Ok(Enqueued::Queued { position })
    }

    pub fn set_repeating(&mut self, repeating: bool) {
        if self.state.repeating() == repeating {
            return;
        }
        self.state.set_repeating(repeating);
        info!("Session {}: repeat {}", self.session_id, if repeating { "on" } else { "off" });
        self.emit(SessionEvent::RepeatChanged {
            session_id: self.session_id,
            repeating,
            timestamp: Utc::now(),
        });
    }

    pub fn is_repeating(&self) -> bool {
        self.state.repeating()
    }

    /// Randomly reorder the pending tracks. The current track is unaffected.
    pub fn shuffle_queue(&mut self) {
        self.shuffle_queue_with(&mut rand::thread_rng());
    }

    pub fn shuffle_queue_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.queue.shuffle_with(rng);
        debug!("Session {}: shuffled {} pending tracks", self.session_id, self.queue.len());
        self.emit(SessionEvent::QueueShuffled {
            session_id: self.session_id,
            queue_len: self.queue.len(),
            timestamp: Utc::now(),
        });
    }

    /// Start the next pending track, or tear the session down if none is left.
    ///
    /// Tracks the engine refuses to start are dropped and the next one is
    /// tried.
    pub fn advance(&mut self) {
        if self.closed {
            debug!("Session {}: advance after teardown ignored", self.session_id);
            return;
        }

        while let Some(next) = self.queue.pop_front() {
            let track_id = next.id();
            debug!(
                "Session {}: advancing to track {} ({} left in queue)",
                self.session_id,
                track_id,
                self.queue.len()
            );
            if self.engine.start_track(next, false) {
                self.engine_track = Some(track_id);
                return;
            }
            warn!("Session {}: engine refused track {}, skipping", self.session_id, track_id);
            self.bindings.unbind(track_id);
        }

        self.teardown();
    }

    /// Release engine and transport and leave the registry. Runs once.
    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        info!(
            "Session {}: queue exhausted, closing session ({} bindings dropped)",
            self.session_id,
            self.bindings.len()
        );
        self.engine.destroy();
        self.transport.close_connection();
        self.transport.detach_send_handler();
        self.registry.remove(self.session_id);

        self.bindings = Bindings::new();
        self.engine_track = None;

        self.emit(SessionEvent::SessionClosed {
            session_id: self.session_id,
            timestamp: Utc::now(),
        });
    }

    // ===== Engine events =====

    /// Dispatch an engine event to its handler
    pub fn handle_event(&mut self, event: TrackEvent) {
        match event {
            TrackEvent::Start { track } => self.on_track_start(track),
            TrackEvent::End { track, reason } => self.on_track_end(track, reason),
            TrackEvent::Exception { track, fault } => self.on_track_exception(track, fault),
            TrackEvent::Stuck { track, threshold_ms } => self.on_track_stuck(track, threshold_ms),
        }
    }

    pub fn on_track_start(&mut self, track: Track) {
        if self.closed {
            debug!("Session {}: start of {} after teardown ignored", self.session_id, track.id());
            return;
        }

        let track_id = track.id();
        debug_assert!(!self.queue.contains(track_id), "started track is still queued");
        info!("Session {}: now playing {:?} ({})", self.session_id, track.title(), track_id);

        if self.settings.announce_now_playing {
            let notice =
                Notice::now_playing(track.title(), track.duration_ms(), self.settings.scrub_mentions);
            self.bindings.notify(track_id, &notice);
        }

        self.emit(SessionEvent::TrackStarted {
            session_id: self.session_id,
            track_id,
            title: track.title().to_string(),
            timestamp: Utc::now(),
        });
        self.state.set_current(track);
    }

    pub fn on_track_end(&mut self, track: Track, reason: TrackEndReason) {
        if self.closed {
            debug!("Session {}: end of {} after teardown ignored", self.session_id, track.id());
            return;
        }

        let track_id = track.id();
        debug!("Session {}: track {} ended ({})", self.session_id, track_id, reason);

        // A newer track that already started stays current
        if self.state.current().map(Track::id) == Some(track_id) {
            self.state.take_current();
        }
        // Skipped after a stall, or the engine already moved on to another track
        let superseded = self.engine_track != Some(track_id);

        self.emit(SessionEvent::TrackEnded {
            session_id: self.session_id,
            track_id,
            reason,
            timestamp: Utc::now(),
        });

        if reason.may_start_next() && !superseded {
            if self.state.repeating() {
                self.restart(&track);
            } else {
                self.advance();
            }
        }

        self.bindings.unbind(track_id);
        self.state.set_last_track(track);
    }

    /// Repeat: start a fresh clone of `track`, bypassing the queue
    fn restart(&mut self, track: &Track) {
        let clone = track.make_clone();
        let clone_id = clone.id();
        self.bindings.transfer(track.id(), clone_id);
        debug!("Session {}: repeating {} as {}", self.session_id, track.id(), clone_id);

        if self.engine.start_track(clone, false) {
            self.engine_track = Some(clone_id);
            return;
        }

        warn!(
            "Session {}: engine refused repeat of {}, advancing instead",
            self.session_id,
            track.id()
        );
        self.bindings.unbind(clone_id);
        self.advance();
    }

    pub fn on_track_exception(&mut self, track: Track, fault: TrackFault) {
        if self.closed {
            return;
        }

        let track_id = track.id();
        match fault.severity {
            FaultSeverity::Common => info!(
                "Session {}: track {} failed: {}",
                self.session_id, track_id, fault.message
            ),
            FaultSeverity::Suspicious | FaultSeverity::Fault => warn!(
                "Session {}: playback fault on {} ({:?}): {}",
                self.session_id, track_id, fault.severity, fault.message
            ),
        }
        self.bindings.notify(
            track_id,
            &Notice::PlaybackError {
                message: fault.message.clone(),
            },
        );
        self.emit(SessionEvent::TrackFaulted {
            session_id: self.session_id,
            track_id,
            message: fault.message,
            timestamp: Utc::now(),
        });
    }

    /// Skip a stalled track. Stuck tracks are never repeated.
    ///
    /// Only the track the engine holds is stopped and skipped; a repeated or
    /// late stall report for an older track just sends the notice again.
    pub fn on_track_stuck(&mut self, track: Track, threshold_ms: u64) {
        if self.closed {
            return;
        }

        let track_id = track.id();
        self.bindings.notify(track_id, &Notice::TrackFrozen);
        self.emit(SessionEvent::TrackStuck {
            session_id: self.session_id,
            track_id,
            threshold_ms,
            timestamp: Utc::now(),
        });

        if self.engine_track != Some(track_id) {
            debug!(
                "Session {}: stall report for {} which is no longer playing",
                self.session_id, track_id
            );
            return;
        }

        warn!(
            "Session {}: track {} stuck for {}ms, skipping",
            self.session_id, track_id, threshold_ms
        );
        self.engine_track = None;
        self.engine.stop_track(&track);

        if self.state.current().map(Track::id) == Some(track_id) {
            self.state.take_current();
        }
        self.state.set_last_track(track);
        self.advance();
    }

    // ===== Read access =====

    pub fn current(&self) -> Option<&Track> {
        self.state.current()
    }

    pub fn queued(&self) -> Vec<Track> {
        self.queue.snapshot()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn last_track(&self) -> Option<&Track> {
        self.state.last_track()
    }

    pub fn state(&self) -> PlaybackState {
        self.state.state()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.session_id,
            state: self.state.state(),
            current: self.state.current().cloned(),
            queue: self.queue.snapshot(),
            repeating: self.state.repeating(),
            last_track: self.state.last_track().cloned(),
            bound_tracks: self.bindings.ids().collect(),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.event_tx.clone()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl std::fmt::Debug for TrackScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackScheduler")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("queue_len", &self.queue.len())
            .field("bindings", &self.bindings)
            .field("engine_track", &self.engine_track)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::ChannelDestination;
    use std::sync::Mutex;

    /// Engine that plays whatever it is told unless busy
    #[derive(Default)]
    struct FakeEngine {
        active: Mutex<Option<TrackId>>,
        started: Mutex<Vec<(TrackId, bool)>>,
        stopped: Mutex<Vec<TrackId>>,
        destroyed: Mutex<usize>,
        /// Refuse this many upcoming starts outright
        refuse_next: Mutex<usize>,
    }

    impl PlaybackEngine for FakeEngine {
        fn start_track(&self, track: Track, no_interrupt: bool) -> bool {
            self.started.lock().unwrap().push((track.id(), no_interrupt));
            let mut refuse = self.refuse_next.lock().unwrap();
            if *refuse > 0 {
                *refuse -= 1;
                return false;
            }
            let mut active = self.active.lock().unwrap();
            if no_interrupt && active.is_some() {
                return false;
            }
            *active = Some(track.id());
            true
        }

        fn stop_track(&self, track: &Track) {
            self.stopped.lock().unwrap().push(track.id());
            let mut active = self.active.lock().unwrap();
            if *active == Some(track.id()) {
                *active = None;
            }
        }

        fn destroy(&self) {
            *self.destroyed.lock().unwrap() += 1;
            *self.active.lock().unwrap() = None;
        }
    }

    impl FakeEngine {
        fn finish(&self) {
            *self.active.lock().unwrap() = None;
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        closed: Mutex<usize>,
        detached: Mutex<usize>,
    }

    impl VoiceTransport for FakeTransport {
        fn close_connection(&self) {
            *self.closed.lock().unwrap() += 1;
        }

        fn detach_send_handler(&self) {
            *self.detached.lock().unwrap() += 1;
        }
    }

    #[derive(Default)]
    struct FakeRegistry {
        removed: Mutex<Vec<SessionId>>,
    }

    impl SessionRegistry for FakeRegistry {
        fn remove(&self, session_id: SessionId) {
            self.removed.lock().unwrap().push(session_id);
        }
    }

    struct Fixture {
        scheduler: TrackScheduler,
        engine: Arc<FakeEngine>,
        transport: Arc<FakeTransport>,
        registry: Arc<FakeRegistry>,
    }

    fn fixture() -> Fixture {
        let engine = Arc::new(FakeEngine::default());
        let transport = Arc::new(FakeTransport::default());
        let registry = Arc::new(FakeRegistry::default());
        let scheduler = TrackScheduler::new(
            SessionId(42),
            SchedulerSettings::default(),
            engine.clone(),
            transport.clone(),
            registry.clone(),
        );
        Fixture {
            scheduler,
            engine,
            transport,
            registry,
        }
    }

    fn track(name: &str) -> Track {
        Track::new(format!("{}.ogg", name), name, 60_000)
    }

    #[test]
    fn test_enqueue_on_idle_starts_immediately() {
        let mut f = fixture();
        let a = track("A");

        assert_eq!(f.scheduler.enqueue(a.clone(), None).unwrap(), Enqueued::Started);
        assert_eq!(*f.engine.started.lock().unwrap(), vec![(a.id(), true)]);
        assert_eq!(f.scheduler.queue_len(), 0);
        // Current only changes on the start event
        assert!(f.scheduler.current().is_none());

        f.scheduler.on_track_start(a.clone());
        assert_eq!(f.scheduler.current().map(Track::id), Some(a.id()));
        assert_eq!(f.scheduler.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_enqueue_while_playing_appends() {
        let mut f = fixture();
        let a = track("A");
        let b = track("B");
        let c = track("C");

        f.scheduler.enqueue(a.clone(), None).unwrap();
        f.scheduler.on_track_start(a.clone());

        assert_eq!(
            f.scheduler.enqueue(b.clone(), None).unwrap(),
            Enqueued::Queued { position: 1 }
        );
        assert_eq!(
            f.scheduler.enqueue(c.clone(), None).unwrap(),
            Enqueued::Queued { position: 2 }
        );
        let queued: Vec<_> = f.scheduler.queued().iter().map(Track::id).collect();
        assert_eq!(queued, vec![b.id(), c.id()]);
        assert_eq!(f.scheduler.current().map(Track::id), Some(a.id()));
    }

    #[test]
    fn test_end_advances_then_tears_down_once() {
        let mut f = fixture();
        let a = track("A");
        let b = track("B");

        f.scheduler.enqueue(a.clone(), None).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.scheduler.enqueue(b.clone(), None).unwrap();

        f.engine.finish();
        f.scheduler.on_track_end(a.clone(), TrackEndReason::Finished);
        assert_eq!(f.engine.started.lock().unwrap().last(), Some(&(b.id(), false)));
        assert_eq!(f.scheduler.queue_len(), 0);
        assert!(f.scheduler.current().is_none());
        assert_eq!(f.scheduler.last_track().map(Track::id), Some(a.id()));

        f.scheduler.on_track_start(b.clone());
        f.engine.finish();
        f.scheduler.on_track_end(b.clone(), TrackEndReason::Finished);

        assert!(f.scheduler.is_closed());
        assert_eq!(*f.engine.destroyed.lock().unwrap(), 1);
        assert_eq!(*f.transport.closed.lock().unwrap(), 1);
        assert_eq!(*f.transport.detached.lock().unwrap(), 1);
        assert_eq!(*f.registry.removed.lock().unwrap(), vec![SessionId(42)]);

        // Stale events after teardown never tear down again
        f.scheduler.on_track_end(b.clone(), TrackEndReason::Cleanup);
        f.scheduler.on_track_end(a, TrackEndReason::Finished);
        f.scheduler.advance();
        assert_eq!(*f.engine.destroyed.lock().unwrap(), 1);
        assert_eq!(f.registry.removed.lock().unwrap().len(), 1);
        assert!(matches!(
            f.scheduler.enqueue(b, None),
            Err(Error::SessionClosed(SessionId(42)))
        ));
    }

    #[test]
    fn test_non_continuation_reason_does_not_advance() {
        let mut f = fixture();
        let a = track("A");
        let b = track("B");

        f.scheduler.enqueue(a.clone(), None).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.scheduler.enqueue(b.clone(), None).unwrap();
        let starts_before = f.engine.started.lock().unwrap().len();

        f.scheduler.on_track_end(a, TrackEndReason::Stopped);
        assert_eq!(f.engine.started.lock().unwrap().len(), starts_before);
        assert_eq!(f.scheduler.queue_len(), 1);
        assert!(f.scheduler.current().is_none());
        assert!(!f.scheduler.is_closed());
    }

    #[test]
    fn test_repeat_restarts_clone_and_moves_binding() {
        let mut f = fixture();
        let (dest, _rx) = ChannelDestination::new();
        let a = track("A");
        let b = track("B");

        f.scheduler.enqueue(a.clone(), Some(Arc::new(dest))).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.scheduler.enqueue(b.clone(), None).unwrap();
        f.scheduler.set_repeating(true);

        f.engine.finish();
        f.scheduler.on_track_end(a.clone(), TrackEndReason::Finished);

        let (clone_id, no_interrupt) = *f.engine.started.lock().unwrap().last().unwrap();
        assert_ne!(clone_id, a.id());
        assert!(!no_interrupt);
        assert!(f.scheduler.bindings.contains(clone_id));
        assert!(!f.scheduler.bindings.contains(a.id()));
        // The queue was bypassed
        assert_eq!(f.scheduler.queue_len(), 1);
    }

    #[test]
    fn test_refused_repeat_falls_back_to_queue() {
        let mut f = fixture();
        let (dest, _rx) = ChannelDestination::new();
        let a = track("A");
        let b = track("B");

        f.scheduler.enqueue(a.clone(), Some(Arc::new(dest))).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.scheduler.enqueue(b.clone(), None).unwrap();
        f.scheduler.set_repeating(true);

        f.engine.finish();
        *f.engine.refuse_next.lock().unwrap() = 1;
        f.scheduler.on_track_end(a.clone(), TrackEndReason::Finished);

        let started = f.engine.started.lock().unwrap().clone();
        let (clone_id, _) = started[started.len() - 2];
        assert_ne!(clone_id, a.id());
        assert!(!f.scheduler.bindings.contains(clone_id));
        assert_eq!(started.last(), Some(&(b.id(), false)));
        assert_eq!(*f.engine.active.lock().unwrap(), Some(b.id()));
        assert_eq!(f.scheduler.queue_len(), 0);
        assert!(!f.scheduler.is_closed());
    }

    #[test]
    fn test_refused_repeat_with_empty_queue_tears_down() {
        let mut f = fixture();
        let a = track("A");

        f.scheduler.enqueue(a.clone(), None).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.scheduler.set_repeating(true);

        f.engine.finish();
        *f.engine.refuse_next.lock().unwrap() = 1;
        f.scheduler.on_track_end(a, TrackEndReason::Finished);

        assert!(f.scheduler.is_closed());
        assert_eq!(*f.engine.destroyed.lock().unwrap(), 1);
        assert_eq!(*f.registry.removed.lock().unwrap(), vec![SessionId(42)]);
    }

    #[test]
    fn test_stuck_track_is_skipped_even_when_repeating() {
        let mut f = fixture();
        let (dest, mut rx) = ChannelDestination::new();
        let a = track("A");
        let b = track("B");

        f.scheduler.enqueue(a.clone(), Some(Arc::new(dest))).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.scheduler.enqueue(b.clone(), None).unwrap();
        f.scheduler.set_repeating(true);
        let _ = rx.try_recv(); // now playing

        f.scheduler.on_track_stuck(a.clone(), 10_000);
        assert_eq!(*f.engine.stopped.lock().unwrap(), vec![a.id()]);
        assert_eq!(f.engine.started.lock().unwrap().last(), Some(&(b.id(), false)));
        assert_eq!(
            rx.try_recv().unwrap(),
            ":warning: Song appears to be frozen, skipping."
        );

        // The forced stop's end event, whatever its reason, does not continue
        f.scheduler.on_track_start(b.clone());
        let starts_before = f.engine.started.lock().unwrap().len();
        f.scheduler.on_track_end(a.clone(), TrackEndReason::Finished);
        assert_eq!(f.engine.started.lock().unwrap().len(), starts_before);
        assert_eq!(f.scheduler.current().map(Track::id), Some(b.id()));
        assert!(!f.scheduler.bindings.contains(a.id()));
    }

    #[test]
    fn test_exception_notifies_without_transition() {
        let mut f = fixture();
        let (dest, mut rx) = ChannelDestination::new();
        let a = track("A");

        f.scheduler.enqueue(a.clone(), Some(Arc::new(dest))).unwrap();
        f.scheduler.on_track_start(a.clone());
        let _ = rx.try_recv();

        f.scheduler.on_track_exception(a.clone(), TrackFault::common("Decoder blew up"));
        assert_eq!(
            rx.try_recv().unwrap(),
            ":bangbang: Error in audio player! Decoder blew up"
        );
        assert_eq!(f.scheduler.current().map(Track::id), Some(a.id()));
        assert!(f.scheduler.bindings.contains(a.id()));
        assert!(!f.scheduler.is_closed());
    }

    #[test]
    fn test_refused_tracks_are_dropped_during_advance() {
        struct RefusingEngine(Mutex<usize>);
        impl PlaybackEngine for RefusingEngine {
            fn start_track(&self, _track: Track, no_interrupt: bool) -> bool {
                // Busy for enqueue, refuses replacement too
                let _ = no_interrupt;
                false
            }
            fn stop_track(&self, _track: &Track) {}
            fn destroy(&self) {
                *self.0.lock().unwrap() += 1;
            }
        }

        let engine = Arc::new(RefusingEngine(Mutex::new(0)));
        let registry = Arc::new(FakeRegistry::default());
        let mut scheduler = TrackScheduler::new(
            SessionId(1),
            SchedulerSettings::default(),
            engine.clone(),
            Arc::new(FakeTransport::default()),
            registry.clone(),
        );
        let (dest, _rx) = ChannelDestination::new();
        let b = track("B");
        scheduler.enqueue(b.clone(), Some(Arc::new(dest))).unwrap();
        assert_eq!(scheduler.queue_len(), 1);

        scheduler.advance();
        assert!(!scheduler.bindings.contains(b.id()));
        assert!(scheduler.is_closed());
        assert_eq!(*engine.0.lock().unwrap(), 1);
    }

    #[test]
    fn test_events_are_broadcast() {
        let mut f = fixture();
        let mut events = f.scheduler.subscribe_events();
        let a = track("A");

        f.scheduler.enqueue(a.clone(), None).unwrap();
        f.scheduler.on_track_start(a.clone());
        f.engine.finish();
        f.scheduler.on_track_end(a, TrackEndReason::Finished);

        let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.event_type())
            .collect();
        assert_eq!(kinds, vec!["TrackStarted", "TrackEnded", "SessionClosed"]);
    }
}
