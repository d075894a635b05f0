//! Crawler coordinator - crawl orchestration
//!
//! The coordinator owns one crawl run:
//! - Building the fetcher, link extractor and page store from configuration
//! - Seeding the frontier with the seed URL at depth 1
//! - Spawning the worker pool and waiting for every worker to stop
//! - Aggregating worker reports into the final statistics

use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier::{Frontier, WorkItem};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::visited::VisitedSet;
use crate::crawler::worker::{CrawlContext, Worker, WorkerReport, WorkerSettings};
use crate::output::CrawlStats;
use crate::storage::{FileStore, PageStore};
use crate::url::{canonicalize_url, ScopeFilter};
use crate::MirrorError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn LinkExtractor>,
    store: Arc<dyn PageStore>,
    output_dir: PathBuf,
}

impl Coordinator {
    /// Creates a coordinator backed by HTTP and the local filesystem
    ///
    /// # Arguments
    ///
    /// * `config` - A validated crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - The save directory could not be created or the
    ///   HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, MirrorError> {
        let store = FileStore::create(
            &config.output.save_directory,
            &config.crawler.required_path_prefix,
        )?;
        let output_dir = store.absolute_root();
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.crawler)?;

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(HtmlLinkExtractor),
            store: Arc::new(store),
            output_dir,
        })
    }

    /// Creates a coordinator with caller-supplied collaborators
    pub fn with_services(
        config: Config,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn LinkExtractor>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        let output_dir = config.output.save_directory.clone();
        Self {
            config,
            fetcher,
            extractor,
            store,
            output_dir,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Directory pages are saved under
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Runs the crawl to completion
    ///
    /// Returns once the frontier is drained and every worker has stopped.
    /// Per-page failures are part of the returned statistics; only setup
    /// problems and a crashed worker are errors.
    pub async fn run(&self) -> Result<CrawlStats, MirrorError> {
        let crawler = &self.config.crawler;
        let seed = canonicalize_url(&crawler.seed_url)?;
        let scope = ScopeFilter::from_url(&seed, &crawler.required_path_prefix)?;

        tracing::info!(
            seed = %seed,
            max_depth = crawler.max_depth,
            workers = crawler.worker_count,
            prefix = %crawler.required_path_prefix,
            "Starting crawl"
        );

        let started_at = Utc::now();
        let start = Instant::now();

        let ctx = CrawlContext {
            frontier: Arc::new(Frontier::new()),
            visited: Arc::new(VisitedSet::new()),
            scope: Arc::new(scope),
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            store: Arc::clone(&self.store),
            settings: WorkerSettings {
                max_depth: crawler.max_depth,
                request_delay: crawler.request_delay(),
                idle_poll: crawler.idle_poll(),
            },
        };

        ctx.frontier.push(WorkItem::new(String::from(seed), 1));

        let mut workers = JoinSet::new();
        for id in 0..crawler.worker_count {
            workers.spawn(Worker::new(id, ctx.clone()).run());
        }

        let mut reports: Vec<WorkerReport> = Vec::with_capacity(crawler.worker_count);
        let mut join_error = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!("Crawl worker failed: {}", e);
                    join_error.get_or_insert_with(|| e.to_string());
                }
            }
        }

        if let Some(message) = join_error {
            let worker = (0..crawler.worker_count)
                .find(|id| !reports.iter().any(|r| r.worker_id == *id))
                .unwrap_or_default();
            return Err(MirrorError::Join { worker, message });
        }

        reports.sort_by_key(|r| r.worker_id);
        let stats = CrawlStats::from_reports(
            reports,
            ctx.visited.len(),
            started_at,
            Utc::now(),
            start.elapsed(),
        );

        tracing::info!(
            visited = stats.visited_count,
            failed = stats.failed_count,
            saved = stats.saved_count,
            "Crawl finished in {:.2?}",
            stats.elapsed
        );

        Ok(stats)
    }
}

/// Builds a coordinator from configuration and runs one crawl
pub async fn run_crawl(config: Config) -> Result<CrawlStats, MirrorError> {
    Coordinator::new(config)?.run().await
}
