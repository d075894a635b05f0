//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The visited set and the frontier shared by all workers
//! - HTTP fetching and HTML link extraction
//! - The worker state machine
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod visited;
mod worker;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{
    build_http_client, fetch_url, FetchError, FetchedPage, Fetcher, HttpFetcher, MAX_REDIRECTS,
};
pub use frontier::{Frontier, InFlight, WorkItem};
pub use parser::{parse_html, HtmlLinkExtractor, LinkExtractor};
pub use visited::VisitedSet;
pub use worker::{CrawlContext, FailureStage, PageFailure, Worker, WorkerReport, WorkerSettings};
