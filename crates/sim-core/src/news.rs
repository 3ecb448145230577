//! Bounded news feeds.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// FIFO feed of headlines that evicts the oldest entry when full.
///
/// `total_pushed` counts every headline ever added, which lets a caller
/// collect what arrived since a [`NewsFeed::mark`] even after eviction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewsFeed {
    entries: VecDeque<String>,
    capacity: usize,
    total_pushed: u64,
}

impl NewsFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(256)),
            capacity,
            total_pushed: 0,
        }
    }

    pub fn push(&mut self, headline: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(headline.into());
        self.total_pushed += 1;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn mark(&self) -> u64 {
        self.total_pushed
    }

    /// Headlines pushed after `mark` that are still retained.
    pub fn since(&self, mark: u64) -> Vec<String> {
        let fresh = self.total_pushed.saturating_sub(mark) as usize;
        let skip = self.entries.len().saturating_sub(fresh);
        self.entries.iter().skip(skip).cloned().collect()
    }
}
