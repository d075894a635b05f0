//! Visited set: the single dedup authority of a crawl run
//!
//! A URL enters the set at most once, and the membership test and the insert
//! happen under one lock, so exactly one worker ever wins the claim for a URL.
//! Entries are never removed.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Concurrency-safe set of claimed URLs
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `url`
    ///
    /// Returns `true` if the URL was not previously recorded (the caller now
    /// owns it), `false` if it was already claimed.
    pub fn try_claim(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    /// Non-authoritative membership check, used to avoid queueing known URLs
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The set holds plain strings, so a panic elsewhere cannot leave it torn
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
