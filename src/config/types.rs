use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Path-Mirror
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a default configuration for a seed URL and save directory
    pub fn for_seed(seed_url: impl Into<String>, save_directory: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.crawler.seed_url = seed_url.into();
        config.output.save_directory = save_directory.into();
        config
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (depth 1)
    #[serde(rename = "seed-url", default)]
    pub seed_url: String,

    /// Maximum number of link hops from the seed, counting the seed as 1
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrent crawl workers
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Courtesy delay before each fetch (milliseconds)
    #[serde(rename = "request-delay", default = "default_request_delay")]
    pub request_delay: u64,

    /// Per-request network timeout (milliseconds)
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,

    /// Bounded wait of a single frontier dequeue attempt (milliseconds)
    #[serde(rename = "idle-poll", default = "default_idle_poll")]
    pub idle_poll: u64,

    /// Path prefix every crawled URL must start with
    #[serde(rename = "required-path-prefix", default = "default_path_prefix")]
    pub required_path_prefix: String,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_depth: default_max_depth(),
            worker_count: default_worker_count(),
            request_delay: default_request_delay(),
            fetch_timeout: default_fetch_timeout(),
            idle_poll: default_idle_poll(),
            required_path_prefix: default_path_prefix(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Root directory of the mirrored page tree
    #[serde(rename = "save-directory", default = "default_save_directory")]
    pub save_directory: PathBuf,

    /// Optional path of the markdown run summary
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_directory: default_save_directory(),
            summary_path: None,
        }
    }
}

fn default_max_depth() -> u32 {
    4
}

fn default_worker_count() -> usize {
    8
}

fn default_request_delay() -> u64 {
    500
}

fn default_fetch_timeout() -> u64 {
    10_000
}

fn default_idle_poll() -> u64 {
    250
}

fn default_path_prefix() -> String {
    "/cn/".to_string()
}

fn default_crawler_name() -> String {
    "path-mirror".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_save_directory() -> PathBuf {
    PathBuf::from("downloaded_pages")
}
