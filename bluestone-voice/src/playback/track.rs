//! Playable track description

use crate::error::{Error, Result};
use bluestone_common::TrackId;
use serde::Serialize;
use std::time::Duration;

/// Immutable description of a playable item
///
/// Two tracks are the same track only if their ids match; a repeat clone
/// shares everything but the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Track {
    id: TrackId,
    /// Source descriptor handed to the engine (URI, search term, path)
    source: String,
    title: String,
    duration_ms: u64,
}

impl Track {
    pub fn new(source: impl Into<String>, title: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: TrackId::generate(),
            source: source.into(),
            title: title.into(),
            duration_ms,
        }
    }

    /// Parse a `title=seconds[@source]` track spec.
    ///
    /// The source defaults to the title when omitted.
    pub fn parse_spec(spec: &str) -> Result<Self> {
        let (title, rest) = spec
            .split_once('=')
            .ok_or_else(|| Error::InvalidTrack(format!("expected title=seconds, got {:?}", spec)))?;
        let (seconds, source) = match rest.split_once('@') {
            Some((seconds, source)) => (seconds, source),
            None => (rest, title),
        };

        let title = title.trim();
        if title.is_empty() {
            return Err(Error::InvalidTrack(format!("empty title in {:?}", spec)));
        }
        let seconds: f64 = seconds
            .trim()
            .parse()
            .map_err(|e| Error::InvalidTrack(format!("bad length in {:?}: {}", spec, e)))?;
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(Error::InvalidTrack(format!("bad length in {:?}", spec)));
        }

        Ok(Self::new(source.trim(), title, (seconds * 1000.0) as u64))
    }

    /// New track instance with identical description and a fresh id.
    pub fn make_clone(&self) -> Self {
        Self {
            id: TrackId::generate(),
            ..self.clone()
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
