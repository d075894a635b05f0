//! Markdown summary generation
//!
//! This module writes a human-readable markdown report of a finished crawl
//! run: run metadata, counts, depth and worker breakdowns and failed pages.

use crate::output::summary::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Failures listed before the report truncates
const MAX_LISTED_FAILURES: usize = 100;

/// Generates a markdown summary of a crawl run
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let stats = &summary.stats;
    let mut md = String::new();

    md.push_str("# Path-Mirror Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", summary.seed_url));
    md.push_str(&format!(
        "- **Path Prefix**: `{}`\n",
        summary.required_path_prefix
    ));
    md.push_str(&format!("- **Max Depth**: {}\n", summary.max_depth));
    md.push_str(&format!("- **Workers**: {}\n", summary.worker_count));
    md.push_str(&format!(
        "- **Save Directory**: {}\n",
        summary.save_directory
    ));
    md.push_str(&format!("- **Started**: {}\n", stats.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", stats.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2?})\n",
        summary.duration_seconds(),
        stats.elapsed
    ));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Visited | {} |\n", stats.visited_count));
    md.push_str(&format!("| Claimed | {} |\n", stats.claimed_count));
    md.push_str(&format!("| Fetch Failures | {} |\n", stats.failed_count));
    md.push_str(&format!("| Saved | {} |\n", stats.saved_count));
    md.push_str(&format!("| Save Failures | {} |\n", stats.persist_failures));
    md.push_str(&format!("| Links Queued | {} |\n", stats.discovered_count));
    md.push_str(&format!(
        "| Duplicate Claims | {} |\n\n",
        stats.duplicate_count
    ));
    md.push_str(&format!(
        "**Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    if !stats.depth_breakdown.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.depth_breakdown {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    if !stats.workers.is_empty() {
        md.push_str("## Workers\n\n");
        md.push_str("| Worker | Dequeued | Fetched | Saved | Failed | Duplicates | Idle Polls |\n");
        md.push_str("|--------|----------|---------|-------|--------|------------|------------|\n");
        for w in &stats.workers {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                w.worker_id,
                w.dequeued,
                w.fetched,
                w.saved,
                w.failures.len(),
                w.duplicates,
                w.idle_polls
            ));
        }
        md.push('\n');
    }

    if !stats.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Stage | Cause |\n");
        md.push_str("|-----|-------|-------|\n");
        for failure in stats.failures.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.url,
                failure.stage,
                failure.reason.replace('|', "\\|")
            ));
        }
        if stats.failures.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                stats.failures.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::{FailureStage, PageFailure, WorkerReport};
    use crate::output::CrawlStats;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn create_test_summary(failures: Vec<PageFailure>) -> CrawlSummary {
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let finished = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 30).unwrap();
        let worker = WorkerReport {
            worker_id: 0,
            dequeued: 12,
            fetched: 10,
            fetched_by_depth: BTreeMap::from([(1, 1), (2, 9)]),
            saved: 10,
            failures,
            ..WorkerReport::default()
        };
        let stats = CrawlStats::from_reports(vec![worker], 11, started, finished, Duration::from_secs(90));
        let config = Config::for_seed("https://example.com/cn/", "pages");
        CrawlSummary::new(&config, "abc123", stats)
    }

    fn failure(n: usize) -> PageFailure {
        PageFailure {
            url: format!("https://example.com/cn/missing-{:03}", n),
            stage: FailureStage::Fetch,
            reason: "HTTP status 404".to_string(),
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_summary(vec![failure(0)]));

        assert!(markdown.contains("# Path-Mirror Crawl Summary"));
        assert!(markdown.contains("- **Seed**: https://example.com/cn/"));
        assert!(markdown.contains("- **Duration**: 90 seconds"));
        assert!(markdown.contains("- **Config Hash**: abc123"));
        assert!(markdown.contains("| Visited | 10 |"));
        assert!(markdown.contains("| Claimed | 11 |"));
    }

    #[test]
    fn test_markdown_with_depth_breakdown() {
        let markdown = format_markdown_summary(&create_test_summary(Vec::new()));

        assert!(markdown.contains("## Depth Breakdown"));
        assert!(markdown.contains("| 1 | 1 |"));
        assert!(markdown.contains("| 2 | 9 |"));
        assert!(!markdown.contains("## Failed Pages"));
    }

    #[test]
    fn test_failed_pages_are_truncated() {
        let failures = (0..MAX_LISTED_FAILURES + 5).map(failure).collect();
        let markdown = format_markdown_summary(&create_test_summary(failures));

        assert!(markdown.contains("## Failed Pages"));
        assert!(markdown.contains("missing-000 | fetch | HTTP status 404"));
        assert!(markdown.contains("... and 5 more"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("summary.md");

        generate_markdown_summary(&create_test_summary(Vec::new()), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Path-Mirror Crawl Summary"));
    }
}
