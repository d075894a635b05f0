//! Crawl statistics aggregated from worker reports
//!
//! This module folds the per-worker reports of a finished run into one
//! [`CrawlStats`] value and renders it to stdout.

use crate::crawler::{PageFailure, WorkerReport};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Claimed URLs whose fetch succeeded
    pub visited_count: usize,

    /// Final size of the visited set (every URL a worker claimed)
    pub claimed_count: usize,

    /// Claimed URLs whose fetch failed
    pub failed_count: usize,

    /// Pages written to the save directory
    pub saved_count: usize,

    /// Fetched pages that could not be written
    pub persist_failures: usize,

    /// Work items pushed beyond the seed
    pub discovered_count: usize,

    /// Items dropped because another worker had already claimed the URL
    pub duplicate_count: usize,

    /// Successful fetches keyed by depth
    pub depth_breakdown: BTreeMap<u32, usize>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Per-worker reports, ordered by worker id
    pub workers: Vec<WorkerReport>,

    /// Every fetch and persist failure, ordered by URL
    pub failures: Vec<PageFailure>,
}

impl CrawlStats {
    /// Aggregates worker reports
    ///
    /// # Arguments
    ///
    /// * `workers` - Reports of every worker that ran
    /// * `claimed_count` - Final size of the visited set
    /// * `started_at` / `finished_at` - Wall-clock bounds of the run
    /// * `elapsed` - Monotonic run duration
    pub fn from_reports(
        workers: Vec<WorkerReport>,
        claimed_count: usize,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let failed_count: usize = workers.iter().map(WorkerReport::failed_fetches).sum();
        let persist_failures: usize = workers.iter().map(WorkerReport::failed_persists).sum();
        let saved_count: usize = workers.iter().map(|w| w.saved).sum();
        let discovered_count: usize = workers.iter().map(|w| w.discovered).sum();
        let duplicate_count: usize = workers.iter().map(|w| w.duplicates).sum();

        let mut depth_breakdown = BTreeMap::new();
        for (depth, count) in workers.iter().flat_map(|w| w.fetched_by_depth.iter()) {
            *depth_breakdown.entry(*depth).or_insert(0) += count;
        }

        let mut failures: Vec<PageFailure> = workers
            .iter()
            .flat_map(|w| w.failures.iter().cloned())
            .collect();
        failures.sort_by(|a, b| a.url.cmp(&b.url));

        Self {
            visited_count: claimed_count.saturating_sub(failed_count),
            claimed_count,
            failed_count,
            saved_count,
            persist_failures,
            discovered_count,
            duplicate_count,
            depth_breakdown,
            started_at,
            finished_at,
            elapsed,
            workers,
            failures,
        }
    }

    /// Share of claimed URLs that were fetched, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.claimed_count == 0 {
            0.0
        } else {
            (self.visited_count as f64 / self.claimed_count as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  URLs claimed: {}", stats.claimed_count);
    println!("  URLs visited: {}", stats.visited_count);
    println!("  Fetch failures: {}", stats.failed_count);
    println!("  Pages saved: {}", stats.saved_count);
    println!("  Save failures: {}", stats.persist_failures);
    println!("  Links queued: {}", stats.discovered_count);
    println!("  Duplicate claims skipped: {}", stats.duplicate_count);
    println!("  Elapsed: {:.2?}", stats.elapsed);
    println!();

    if !stats.workers.is_empty() {
        println!("Workers:");
        for w in &stats.workers {
            println!(
                "  #{}: {} fetched, {} saved, {} failed, {} duplicates",
                w.worker_id,
                w.fetched,
                w.saved,
                w.failures.len(),
                w.duplicates
            );
        }
        println!();
    }

    if !stats.failures.is_empty() {
        println!("Failures ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!("  - [{}] {}: {}", failure.stage, failure.url, failure.reason);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs fetched)",
        stats.success_rate(),
        stats.visited_count,
        stats.claimed_count
    );
}
