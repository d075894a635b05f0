//! Crawl worker loop
//!
//! Each worker repeatedly takes an item from the shared frontier, claims its
//! URL, fetches it, persists the page and queues the page's new in-scope links
//! one hop deeper. Per-item failures are logged and recorded in the worker's
//! report; they never stop the worker.
//!
//! ```text
//! Idle -> Fetching -> Extracting -> Persisting -> Idle
//!   \
//!    `-> Stopped   (frontier drained)
//! ```

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, WorkItem};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::visited::VisitedSet;
use crate::storage::PageStore;
use crate::url::{canonicalize_url, ScopeFilter};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Worker lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerState {
    /// Waiting on the frontier
    Idle,
    /// Courtesy delay and network fetch of a claimed URL
    Fetching,
    /// Link extraction and filtering
    Extracting,
    /// Writing the page, then publishing its links
    Persisting,
    /// The frontier is drained; the worker has exited its loop
    Stopped,
}

/// Where a per-item failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Fetch,
    Persist,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Persist => write!(f, "persist"),
        }
    }
}

/// A page that could not be fetched or saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub url: String,
    pub stage: FailureStage,
    pub reason: String,
}

/// What a worker did before stopping
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// Items taken from the frontier
    pub dequeued: usize,
    /// Items dropped because their URL was already claimed
    pub duplicates: usize,
    /// Items dropped for exceeding the depth limit
    pub too_deep: usize,
    /// Claimed URLs whose fetch succeeded
    pub fetched: usize,
    /// Successful fetches keyed by depth
    pub fetched_by_depth: BTreeMap<u32, usize>,
    /// Pages written to the store
    pub saved: usize,
    /// New items pushed onto the frontier
    pub discovered: usize,
    /// Timed-out frontier waits while other work was still in flight
    pub idle_polls: usize,
    pub failures: Vec<PageFailure>,
}

impl WorkerReport {
    fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }

    pub fn failed_fetches(&self) -> usize {
        self.count_failures(FailureStage::Fetch)
    }

    pub fn failed_persists(&self) -> usize {
        self.count_failures(FailureStage::Persist)
    }

    fn count_failures(&self, stage: FailureStage) -> usize {
        self.failures.iter().filter(|f| f.stage == stage).count()
    }
}

/// Per-run worker settings
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    pub max_depth: u32,
    pub request_delay: Duration,
    pub idle_poll: Duration,
}

/// Shared state and collaborators handed to every worker
#[derive(Clone)]
pub struct CrawlContext {
    pub frontier: Arc<Frontier>,
    pub visited: Arc<VisitedSet>,
    pub scope: Arc<ScopeFilter>,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn LinkExtractor>,
    pub store: Arc<dyn PageStore>,
    pub settings: WorkerSettings,
}

/// A single crawl worker
pub struct Worker {
    id: usize,
    ctx: CrawlContext,
    state: WorkerState,
    report: WorkerReport,
}

impl Worker {
    pub fn new(id: usize, ctx: CrawlContext) -> Self {
        Self {
            id,
            ctx,
            state: WorkerState::Idle,
            report: WorkerReport::new(id),
        }
    }

    /// Runs until the frontier is drained and returns the worker's report
    pub async fn run(mut self) -> WorkerReport {
        let frontier = Arc::clone(&self.ctx.frontier);
        tracing::debug!(worker = self.id, "Worker started");

        loop {
            let Some(in_flight) = frontier.pop_with_timeout(self.ctx.settings.idle_poll).await
            else {
                if frontier.is_drained() {
                    break;
                }
                self.report.idle_polls += 1;
                tracing::trace!(
                    worker = self.id,
                    pending = frontier.pending(),
                    "Frontier empty, waiting on in-flight pages"
                );
                continue;
            };

            self.report.dequeued += 1;
            self.process(in_flight.item()).await;
            self.transition(WorkerState::Idle);
            // Completion is recorded only after all of this item's links are queued
            drop(in_flight);
        }

        self.transition(WorkerState::Stopped);
        tracing::debug!(
            worker = self.id,
            fetched = self.report.fetched,
            "Worker stopped"
        );
        self.report
    }

    async fn process(&mut self, item: &WorkItem) {
        if item.depth > self.ctx.settings.max_depth {
            self.report.too_deep += 1;
            tracing::debug!(worker = self.id, url = %item.url, depth = item.depth, "Depth limit exceeded");
            return;
        }

        if !self.ctx.visited.try_claim(&item.url) {
            self.report.duplicates += 1;
            tracing::debug!(worker = self.id, url = %item.url, "Already claimed");
            return;
        }

        let page_url = match Url::parse(&item.url) {
            Ok(url) => url,
            Err(e) => {
                self.record_failure(item, FailureStage::Fetch, e.to_string());
                return;
            }
        };

        tracing::info!("Crawling: {} (Depth: {})", item.url, item.depth);

        self.transition(WorkerState::Fetching);
        if !self.ctx.settings.request_delay.is_zero() {
            tokio::time::sleep(self.ctx.settings.request_delay).await;
        }

        let page = match self.ctx.fetcher.fetch(&item.url).await {
            Ok(page) => page,
            Err(e) => {
                self.record_failure(item, FailureStage::Fetch, e.to_string());
                return;
            }
        };
        self.report.fetched += 1;
        if page.final_url != item.url {
            tracing::debug!(url = %item.url, final_url = %page.final_url, "Redirected");
        }
        *self.report.fetched_by_depth.entry(item.depth).or_default() += 1;

        self.transition(WorkerState::Extracting);
        let discovered = if item.depth < self.ctx.settings.max_depth {
            let links = self.ctx.extractor.extract_links(&page.body, &page_url);
            self.admit_links(links, item.depth + 1)
        } else {
            Vec::new()
        };

        self.transition(WorkerState::Persisting);
        match self.ctx.store.save_page(&page_url, &page.body).await {
            Ok(path) => {
                self.report.saved += 1;
                tracing::info!("Saved: {}", path.display());
            }
            Err(e) => self.record_failure(item, FailureStage::Persist, e.to_string()),
        }

        // Links become visible only after the page is on disk
        self.report.discovered += discovered.len();
        for next in discovered {
            self.ctx.frontier.push(next);
        }
    }

    /// Filters extracted links down to new in-scope work items
    fn admit_links(&self, links: Vec<String>, depth: u32) -> Vec<WorkItem> {
        let total = links.len();
        let mut seen = HashSet::new();
        let mut admitted = Vec::new();

        for link in links {
            let url = match canonicalize_url(&link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!(url = %link, error = %e, "Unusable link");
                    continue;
                }
            };

            if !self.ctx.scope.contains_url(&url) {
                tracing::trace!(url = %url, "Out of scope");
                continue;
            }

            let key = String::from(url);
            if self.ctx.visited.contains(&key) || !seen.insert(key.clone()) {
                continue;
            }

            admitted.push(WorkItem::new(key, depth));
        }

        tracing::debug!(
            worker = self.id,
            extracted = total,
            admitted = admitted.len(),
            "Links filtered"
        );
        admitted
    }

    fn record_failure(&mut self, item: &WorkItem, stage: FailureStage, reason: String) {
        match stage {
            FailureStage::Fetch => {
                tracing::warn!("Failed to fetch {}: {}", item.url, reason)
            }
            FailureStage::Persist => {
                tracing::warn!("Failed to save {}: {}", item.url, reason)
            }
        }
        self.report.failures.push(PageFailure {
            url: item.url.clone(),
            stage,
            reason,
        });
    }

    fn transition(&mut self, next: WorkerState) {
        if self.state != next {
            tracing::trace!(worker = self.id, from = ?self.state, to = ?next, "Worker state");
            self.state = next;
        }
    }
}
