use crate::config::Config;
use crate::output::CrawlStats;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the run summary reports
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub seed_url: String,
    pub required_path_prefix: String,
    pub max_depth: u32,
    pub worker_count: usize,
    pub save_directory: String,

    /// SHA-256 of the config file, or of the effective configuration
    pub config_hash: String,

    pub stats: CrawlStats,
}

impl CrawlSummary {
    pub fn new(config: &Config, config_hash: impl Into<String>, stats: CrawlStats) -> Self {
        Self {
            seed_url: config.crawler.seed_url.clone(),
            required_path_prefix: config.crawler.required_path_prefix.clone(),
            max_depth: config.crawler.max_depth,
            worker_count: config.crawler.worker_count,
            save_directory: config.output.save_directory.display().to_string(),
            config_hash: config_hash.into(),
            stats,
        }
    }

    /// Run duration in whole seconds, from the wall-clock timestamps
    pub fn duration_seconds(&self) -> i64 {
        (self.stats.finished_at - self.stats.started_at).num_seconds()
    }
}
