//! Pending-track queue
//!
//! Holds tracks waiting to play, in play order. The current track is never
//! part of the queue.

use super::track::Track;
use bluestone_common::TrackId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;

/// FIFO of pending tracks
#[derive(Debug, Default)]
pub struct PlaybackQueue {
    pending: VecDeque<Track>,
}

impl PlaybackQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Append a track at the tail, returning its 1-based position
    pub fn push_back(&mut self, track: Track) -> usize {
        self.pending.push_back(track);
        self.pending.len()
    }

    /// Remove and return the head of the queue
    pub fn pop_front(&mut self) -> Option<Track> {
        self.pending.pop_front()
    }

    /// Randomly permute the pending tracks using `rng`
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pending.make_contiguous().shuffle(rng);
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.pending.iter().any(|t| t.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.pending.iter()
    }

    /// Ordered copy of the pending tracks for status display
    pub fn snapshot(&self) -> Vec<Track> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
