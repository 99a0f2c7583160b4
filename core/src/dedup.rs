//! Deduplicator: one canonical record per event_id.
//!
//! A candidate replaces the current holder only when its
//! (event_version, event_ts) pair is strictly greater. On an exact tie the
//! first arrival stays.

use crate::{
    event::{CanonicalEvent, ValidEvent},
    types::EventId,
};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Deduplicator {
    canonical: HashMap<EventId, ValidEvent>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a validated row. Returns true if it became canonical.
    pub fn offer(&mut self, candidate: ValidEvent) -> bool {
        match self.canonical.get_mut(&candidate.event_id) {
            Some(current) => {
                if candidate.supersedes(current) {
                    *current = candidate;
                    true
                } else {
                    false
                }
            }
            None => {
                self.canonical.insert(candidate.event_id.clone(), candidate);
                true
            }
        }
    }

    pub fn get(&self, event_id: &str) -> Option<&CanonicalEvent> {
        self.canonical.get(event_id)
    }

    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Hand off the winners. Order is unspecified; every later stage is
    /// insensitive to it.
    pub fn into_canonical(self) -> Vec<CanonicalEvent> {
        self.canonical.into_values().collect()
    }
}
