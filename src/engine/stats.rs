// Engine counters: page loads, size fan-out and dropped items.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub pages_requested: u64,
    pub pages_merged: u64,
    pub page_failures: u64,
    pub size_requests: u64,
    pub size_failures: u64,
    pub duplicates_dropped: u64,
}

#[derive(Debug, Default)]
pub struct PagerStats {
    pages_requested: AtomicU64,
    pages_merged: AtomicU64,
    page_failures: AtomicU64,
    size_requests: AtomicU64,
    size_failures: AtomicU64,
    duplicates_dropped: AtomicU64,
}

impl PagerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_page_requested(&self) {
        self.pages_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_merged(&self) {
        self.pages_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_failure(&self) {
        self.page_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_size_request(&self) {
        self.size_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_size_failure(&self) {
        self.size_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicates(&self, count: usize) {
        self.duplicates_dropped
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_requested: self.pages_requested.load(Ordering::Relaxed),
            pages_merged: self.pages_merged.load(Ordering::Relaxed),
            page_failures: self.page_failures.load(Ordering::Relaxed),
            size_requests: self.size_requests.load(Ordering::Relaxed),
            size_failures: self.size_failures.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
        }
    }
}
