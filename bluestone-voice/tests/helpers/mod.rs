//! Test helpers for bluestone-voice integration tests
//!
//! Provides recording fakes for every scheduler seam:
//! - RecordingEngine: remembers start/stop/destroy calls, optionally reports
//!   lifecycle events through a sink the way a real engine would
//! - RecordingTransport / RecordingRegistry: count teardown calls
//! - RecordingDestination: collects notices

#![allow(dead_code)]

use bluestone_common::{SessionId, TrackId};
use bluestone_voice::config::SchedulerSettings;
use bluestone_voice::playback::{TrackEndReason, TrackEventSink};
use bluestone_voice::{
    Destination, PlaybackEngine, SessionRegistry, Track, TrackScheduler, VoiceTransport,
};
use std::sync::{Arc, Mutex};

/// One call made to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Start {
        track_id: TrackId,
        no_interrupt: bool,
        accepted: bool,
    },
    Stop(TrackId),
    Destroy,
}

/// Engine fake that tracks a single active slot
#[derive(Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    active: Mutex<Option<Track>>,
    destroyed: Mutex<bool>,
    sink: Mutex<Option<TrackEventSink>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that also reports Start/End events to `sink`
    pub fn with_sink(sink: TrackEventSink) -> Self {
        let engine = Self::default();
        *engine.sink.lock().unwrap() = Some(sink);
        engine
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Ids of every track the engine was asked to start, accepted or not
    pub fn start_requests(&self) -> Vec<(TrackId, bool)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Start {
                    track_id,
                    no_interrupt,
                    ..
                } => Some((track_id, no_interrupt)),
                _ => None,
            })
            .collect()
    }

    pub fn last_started(&self) -> Option<TrackId> {
        self.calls().into_iter().rev().find_map(|call| match call {
            EngineCall::Start {
                track_id,
                accepted: true,
                ..
            } => Some(track_id),
            _ => None,
        })
    }

    pub fn destroy_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == EngineCall::Destroy)
            .count()
    }

    pub fn active(&self) -> Option<Track> {
        self.active.lock().unwrap().clone()
    }

    /// Let the active track play out. Reports `End(Finished)` when a sink is
    /// attached; returns the finished track.
    pub fn finish(&self) -> Option<Track> {
        let track = self.active.lock().unwrap().take()?;
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.track_ended(track.clone(), TrackEndReason::Finished);
        }
        Some(track)
    }

    /// Report an end for any track, active or not, through the attached sink
    pub fn report_end(&self, track: Track, reason: TrackEndReason) {
        self.emit_end(track, reason);
    }

    fn emit_end(&self, track: Track, reason: TrackEndReason) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.track_ended(track, reason);
        }
    }
}

impl PlaybackEngine for RecordingEngine {
    fn start_track(&self, track: Track, no_interrupt: bool) -> bool {
        let accepted = !*self.destroyed.lock().unwrap()
            && !(no_interrupt && self.active.lock().unwrap().is_some());
        self.calls.lock().unwrap().push(EngineCall::Start {
            track_id: track.id(),
            no_interrupt,
            accepted,
        });
        if !accepted {
            return false;
        }

        if let Some(previous) = self.active.lock().unwrap().take() {
            self.emit_end(previous, TrackEndReason::Replaced);
        }
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.track_started(track.clone());
        }
        *self.active.lock().unwrap() = Some(track);
        true
    }

    fn stop_track(&self, track: &Track) {
        self.calls.lock().unwrap().push(EngineCall::Stop(track.id()));
        let stopped = {
            let mut active = self.active.lock().unwrap();
            match active.as_ref() {
                Some(current) if current.id() == track.id() => active.take(),
                _ => None,
            }
        };
        if let Some(stopped) = stopped {
            self.emit_end(stopped, TrackEndReason::Stopped);
        }
    }

    fn destroy(&self) {
        self.calls.lock().unwrap().push(EngineCall::Destroy);
        *self.destroyed.lock().unwrap() = true;
        let active = self.active.lock().unwrap().take();
        if let Some(active) = active {
            self.emit_end(active, TrackEndReason::Cleanup);
        }
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    closed: Mutex<usize>,
    detached: Mutex<usize>,
}

impl RecordingTransport {
    pub fn close_count(&self) -> usize {
        *self.closed.lock().unwrap()
    }

    pub fn detach_count(&self) -> usize {
        *self.detached.lock().unwrap()
    }
}

impl VoiceTransport for RecordingTransport {
    fn close_connection(&self) {
        *self.closed.lock().unwrap() += 1;
    }

    fn detach_send_handler(&self) {
        *self.detached.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct RecordingRegistry {
    removed: Mutex<Vec<SessionId>>,
}

impl RecordingRegistry {
    pub fn removed(&self) -> Vec<SessionId> {
        self.removed.lock().unwrap().clone()
    }
}

impl SessionRegistry for RecordingRegistry {
    fn remove(&self, session_id: SessionId) {
        self.removed.lock().unwrap().push(session_id);
    }
}

/// Destination that keeps every notice it is sent
#[derive(Default)]
pub struct RecordingDestination {
    messages: Mutex<Vec<String>>,
}

impl RecordingDestination {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Destination for RecordingDestination {
    fn send_text(&self, message: String) {
        self.messages.lock().unwrap().push(message);
    }
}

/// Scheduler wired to recording fakes, driven directly by the test
pub struct SchedulerHarness {
    pub scheduler: TrackScheduler,
    pub engine: Arc<RecordingEngine>,
    pub transport: Arc<RecordingTransport>,
    pub registry: Arc<RecordingRegistry>,
}

impl SchedulerHarness {
    pub fn new(session_id: u64) -> Self {
        let engine = Arc::new(RecordingEngine::new());
        let transport = Arc::new(RecordingTransport::default());
        let registry = Arc::new(RecordingRegistry::default());
        let scheduler = TrackScheduler::new(
            SessionId(session_id),
            SchedulerSettings::default(),
            engine.clone(),
            transport.clone(),
            registry.clone(),
        );
        Self {
            scheduler,
            engine,
            transport,
            registry,
        }
    }

    /// Enqueue and, if the engine accepted it, deliver the start event
    pub fn play(&mut self, track: &Track, destination: Option<Arc<dyn Destination>>) {
        self.scheduler
            .enqueue(track.clone(), destination)
            .expect("session closed");
        if self.engine.active().map(|t| t.id()) == Some(track.id())
            && self.scheduler.current().map(Track::id) != Some(track.id())
        {
            self.scheduler.on_track_start(track.clone());
        }
    }

    /// Finish the active track in the engine and deliver its end event.
    /// If the scheduler starts another track, its start event is delivered too.
    pub fn finish_active(&mut self) -> Option<Track> {
        let finished = self.engine.finish()?;
        self.scheduler
            .on_track_end(finished.clone(), TrackEndReason::Finished);
        if let Some(next) = self.engine.active() {
            self.scheduler.on_track_start(next);
        }
        Some(finished)
    }

    pub fn is_bound(&self, id: TrackId) -> bool {
        self.scheduler.status().bound_tracks.contains(&id)
    }

    pub fn bound_count(&self) -> usize {
        self.scheduler.status().bound_tracks.len()
    }

    /// Current is set exactly when playing and never queued
    pub fn assert_consistent(&self) {
        use bluestone_voice::playback::PlaybackState;

        let status = self.scheduler.status();
        assert_eq!(
            status.current.is_some(),
            status.state == PlaybackState::Playing
        );
        if let Some(current) = &status.current {
            assert!(status.queue.iter().all(|t| t.id() != current.id()));
        }
    }
}

pub fn track(title: &str, seconds: u64) -> Track {
    Track::new(format!("{}.ogg", title.to_lowercase()), title, seconds * 1000)
}
