//! Bluestone Voice (bluestone-voice) - Main entry point
//!
//! Runs one playback session against the simulated engine: queues the tracks
//! given on the command line, prints every listener notice as it is sent and,
//! once the session closes (or on Ctrl+C), prints a JSON run summary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bluestone_common::{SessionEvent, SessionId};
use bluestone_voice::config::VoiceConfig;
use bluestone_voice::playback::{self, SessionStatus};
use bluestone_voice::transport::LoggingTransport;
use bluestone_voice::{
    ChannelDestination, Destination, Enqueued, SessionMap, SimulatedEngine, Track,
};
use clap::Parser;
use serde::Serialize;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for bluestone-voice
#[derive(Parser, Debug)]
#[command(name = "bluestone-voice")]
#[command(about = "Simulated playback session for the Bluestone voice scheduler")]
#[command(version)]
struct Args {
    /// Configuration file (overrides BLUESTONE_CONFIG and the default location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session id to run under
    #[arg(short, long, default_value_t = 1)]
    session: u64,

    /// Repeat the current track forever (stop with Ctrl+C)
    #[arg(long)]
    repeat: bool,

    /// Shuffle the queue after enqueueing
    #[arg(long)]
    shuffle: bool,

    /// Playback speed multiplier for the simulated engine
    #[arg(long)]
    time_scale: Option<f64>,

    /// Tracks as title=seconds[@source]; sources starting with stuck: or fail:
    /// simulate stalls and load failures
    #[arg(required = true)]
    tracks: Vec<String>,
}

/// What the run looked like, printed as JSON at exit
#[derive(Serialize)]
struct RunSummary {
    session_id: SessionId,
    closed: bool,
    live_sessions: usize,
    /// Only available when the run was interrupted while the session was live
    status: Option<SessionStatus>,
    events: Vec<SessionEvent>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        VoiceConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(time_scale) = args.time_scale {
        config.simulator.time_scale = time_scale;
    }

    // Initialize tracing (RUST_LOG overrides the configured level)
    let level = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("bluestone_voice={level},bluestone_common={level}"))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tracks = args
        .tracks
        .iter()
        .map(|spec| Track::parse_spec(spec).with_context(|| format!("Invalid track {:?}", spec)))
        .collect::<Result<Vec<_>>>()?;

    let session_id = SessionId::new(args.session);
    info!(
        "Starting session {} with {} tracks (time scale {})",
        session_id,
        tracks.len(),
        config.simulator.time_scale
    );

    let sessions = SessionMap::new();
    let transport = Arc::new(LoggingTransport::new(session_id));
    let handle = sessions.get_or_insert_with(session_id, || {
        let simulator = config.simulator.clone();
        playback::spawn(
            session_id,
            config.scheduler.clone(),
            transport.clone(),
            Arc::new(sessions.clone()),
            move |sink| Arc::new(SimulatedEngine::new(sink, simulator)),
        )
    });

    let recorder = tokio::spawn(record_events(handle.subscribe_events()));

    let (destination, mut notices) = ChannelDestination::new();
    let destination: Arc<dyn Destination> = Arc::new(destination);
    let printer = tokio::spawn(async move {
        while let Some(text) = notices.recv().await {
            println!("{}", text);
        }
    });

    if args.repeat {
        handle.set_repeating(true)?;
    }
    for track in tracks {
        let title = track.title().to_string();
        match handle.enqueue(track, Some(destination.clone())).await? {
            Enqueued::Started => info!("Playing {:?}", title),
            Enqueued::Queued { position } => info!("Queued {:?} at position {}", title, position),
        }
    }
    if args.shuffle {
        handle.shuffle_queue()?;
    }
    drop(destination);

    let summary = tokio::select! {
        _ = handle.closed() => {
            info!("Session {} finished", session_id);
            let events = recorder.await.context("Event recorder failed")?;
            // Every destination clone is gone with the worker
            printer.await.context("Notice printer failed")?;
            RunSummary {
                session_id,
                closed: true,
                live_sessions: sessions.len(),
                status: None,
                events,
            }
        }
        _ = shutdown_signal() => {
            let status = handle.status().await.ok();
            recorder.abort();
            RunSummary {
                session_id,
                closed: handle.is_closed(),
                live_sessions: sessions.len(),
                status,
                events: Vec::new(),
            }
        }
    };

    let live = sessions.session_ids();
    if !live.is_empty() {
        info!("Sessions still live at exit: {:?}", live);
    }
    info!(
        "Transport connected: {}, sending: {}",
        transport.is_connected(),
        transport.is_sending()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")?
    );
    Ok(())
}

/// Collect session events until the session closes
async fn record_events(mut events: broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut recorded = Vec::new();
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!("Session {}: {}", event.session_id(), event.event_type());
                let done = matches!(event, SessionEvent::SessionClosed { .. });
                recorded.push(event);
                if done {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Event recorder lagged, {} events lost", missed);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    recorded
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
