//! Output module for crawl statistics and run summaries
//!
//! This module handles:
//! - Aggregating worker reports into run statistics
//! - Printing statistics to stdout
//! - Writing a markdown summary of a run

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CrawlStats};
pub use summary::{CrawlSummary, OutputError, OutputResult};
