//! Track → notification destination side-table
//!
//! An entry lives only while its track is queued or current. The scheduler
//! removes it when that track's playback ends, whatever the reason.

use crate::notice::{Destination, Notice};
use bluestone_common::TrackId;
use std::collections::HashMap;
use std::sync::Arc;

/// Destinations bound to in-flight tracks
#[derive(Default)]
pub struct Bindings {
    entries: HashMap<TrackId, Arc<dyn Destination>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, id: TrackId, destination: Arc<dyn Destination>) {
        self.entries.insert(id, destination);
    }

    /// Copy the binding of `from` (if any) to `to`. Returns whether one existed.
    pub fn transfer(&mut self, from: TrackId, to: TrackId) -> bool {
        match self.entries.get(&from).cloned() {
            Some(destination) => {
                self.entries.insert(to, destination);
                true
            }
            None => false,
        }
    }

    pub fn unbind(&mut self, id: TrackId) -> Option<Arc<dyn Destination>> {
        self.entries.remove(&id)
    }

    /// Send `notice` to the track's destination, if bound.
    /// Returns whether a destination was found.
    pub fn notify(&self, id: TrackId, notice: &Notice) -> bool {
        match self.entries.get(&id) {
            Some(destination) => {
                destination.send_text(notice.to_string());
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids of all bound tracks, in no particular order
    pub fn ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for Bindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bindings")
            .field("tracks", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
