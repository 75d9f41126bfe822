//! Timer-driven stand-in for a real audio engine
//!
//! Plays nothing. Each started track gets a tokio timer that reports the end
//! of playback once the track's length (scaled by `time_scale`) has elapsed.
//! Source prefixes select failure modes:
//!
//! - `stuck:` reports the track as stalled after `stuck_threshold_ms` and
//!   keeps it active until stopped
//! - `fail:` reports a load fault followed by `End(LoadFailed)`; an optional
//!   severity tag selects how bad it is (`fail:suspicious:x`, `fail:fault:x`,
//!   default common)

use super::engine::{PlaybackEngine, TrackEndReason};
use super::events::{FaultSeverity, TrackEventSink, TrackFault};
use super::track::Track;
use crate::config::SimulatorSettings;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

const STUCK_PREFIX: &str = "stuck:";
const FAIL_PREFIX: &str = "fail:";

/// Simulated playback engine for one session
pub struct SimulatedEngine {
    sink: TrackEventSink,
    settings: SimulatorSettings,
    inner: Arc<Mutex<EngineInner>>,
}

#[derive(Default)]
struct EngineInner {
    active: Option<ActiveTrack>,
    destroyed: bool,
    /// Bumped on every start so stale timers can tell they lost the track
    generation: u64,
}

struct ActiveTrack {
    track: Track,
    generation: u64,
    timer: JoinHandle<()>,
}

impl SimulatedEngine {
    pub fn new(sink: TrackEventSink, settings: SimulatorSettings) -> Self {
        Self {
            sink,
            settings,
            inner: Arc::new(Mutex::new(EngineInner::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn spawn_timer(&self, track: Track, generation: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let sink = self.sink.clone();
        let settings = self.settings.clone();

        tokio::spawn(async move {
            let source = track.source();

            if let Some(rest) = source.strip_prefix(FAIL_PREFIX) {
                sink.track_exception(track.clone(), load_fault(rest));
                if release(&inner, generation) {
                    sink.track_ended(track, TrackEndReason::LoadFailed);
                }
                return;
            }

            if source.starts_with(STUCK_PREFIX) {
                tokio::time::sleep(settings.stuck_threshold()).await;
                // Stays active; whoever handles the stall has to stop it
                if is_current(&inner, generation) {
                    sink.track_stuck(track, settings.stuck_threshold_ms);
                }
                return;
            }

            tokio::time::sleep(settings.scaled(track.duration())).await;
            if release(&inner, generation) {
                sink.track_ended(track, TrackEndReason::Finished);
            }
        })
    }
}

/// Fault for a `fail:[severity:]detail` source
fn load_fault(rest: &str) -> TrackFault {
    let tagged = rest
        .split_once(':')
        .and_then(|(tag, detail)| FaultSeverity::from_tag(tag).map(|severity| (severity, detail)));
    match tagged {
        Some((severity, detail)) => TrackFault::new(format!("Could not load {}", detail), severity),
        None => TrackFault::common(format!("Could not load {}", rest)),
    }
}

/// Clear the active slot if it still belongs to `generation`
fn release(inner: &Mutex<EngineInner>, generation: u64) -> bool {
    let mut inner = inner.lock().unwrap_or_else(|e| e.into_inner());
    match &inner.active {
        Some(active) if active.generation == generation => {
            inner.active = None;
            true
        }
        _ => false,
    }
}

fn is_current(inner: &Mutex<EngineInner>, generation: u64) -> bool {
    let inner = inner.lock().unwrap_or_else(|e| e.into_inner());
    matches!(&inner.active, Some(active) if active.generation == generation)
}

impl PlaybackEngine for SimulatedEngine {
    fn start_track(&self, track: Track, no_interrupt: bool) -> bool {
        let mut inner = self.lock();
        if inner.destroyed {
            debug!("Simulated engine destroyed, refusing {}", track.id());
            return false;
        }
        if no_interrupt && inner.active.is_some() {
            return false;
        }

        if let Some(previous) = inner.active.take() {
            previous.timer.abort();
            self.sink.track_ended(previous.track, TrackEndReason::Replaced);
        }

        inner.generation += 1;
        let generation = inner.generation;
        debug!("Simulated engine starting {:?} ({})", track.title(), track.id());

        // Reported before the timer can possibly fire
        self.sink.track_started(track.clone());
        let timer = self.spawn_timer(track.clone(), generation);
        inner.active = Some(ActiveTrack {
            track,
            generation,
            timer,
        });
        true
    }

    fn stop_track(&self, track: &Track) {
        let mut inner = self.lock();
        let is_active = matches!(&inner.active, Some(active) if active.track.id() == track.id());
        if !is_active {
            return;
        }
        if let Some(active) = inner.active.take() {
            active.timer.abort();
            debug!("Simulated engine stopped {}", track.id());
            self.sink.track_ended(active.track, TrackEndReason::Stopped);
        }
    }

    fn destroy(&self) {
        let mut inner = self.lock();
        inner.destroyed = true;
        if let Some(active) = inner.active.take() {
            active.timer.abort();
            self.sink.track_ended(active.track, TrackEndReason::Cleanup);
        }
        debug!("Simulated engine destroyed");
    }
}
