//! Mapping from URL paths to files in the mirror tree
//!
//! ## Layout
//!
//! With the required prefix `/cn/` and root `pages/`:
//!
//! ```text
//! /            -> pages/index.html
//! /cn  /cn/    -> pages/index.html
//! /cn/a        -> pages/a.html
//! /cn/a/       -> pages/a.html
//! /cn/x/y      -> pages/x/y.html
//! /cn/x/y.html -> pages/x/y.html
//! ```
//!
//! The prefix directory is stripped so the seed page lands at the root of the
//! mirror. Query strings and fragments do not take part in the mapping.

use crate::storage::{StorageError, StorageResult};
use std::path::{Path, PathBuf};
use url::Url;

/// File name used for the prefix root page
pub const INDEX_FILE: &str = "index.html";

const HTML_EXTENSION: &str = ".html";

/// Derives the file path for a page
///
/// # Arguments
///
/// * `url` - The page URL
/// * `root` - Root directory of the mirror
/// * `required_prefix` - The crawl's required path prefix (e.g. `/cn/`)
///
/// # Returns
///
/// * `Ok(PathBuf)` - Location of the page file under `root`
/// * `Err(StorageError::OutsideRoot)` - The path contains `.` or `..` segments
///
/// # Examples
///
/// ```
/// use path_mirror::storage::page_path;
/// use std::path::Path;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/cn/guide/start").unwrap();
/// let path = page_path(&url, Path::new("pages"), "/cn/").unwrap();
/// assert_eq!(path, Path::new("pages/guide/start.html"));
/// ```
pub fn page_path(url: &Url, root: &Path, required_prefix: &str) -> StorageResult<PathBuf> {
    map_url_path(url.path(), root, required_prefix)
}

fn map_url_path(url_path: &str, root: &Path, required_prefix: &str) -> StorageResult<PathBuf> {
    let relative = relative_path(url_path, required_prefix);

    let segments: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();

    let Some((last, parents)) = segments.split_last() else {
        return Ok(root.join(INDEX_FILE));
    };

    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(StorageError::OutsideRoot(url_path.to_string()));
    }

    let mut path = root.to_path_buf();
    for segment in parents {
        path.push(segment);
    }

    if last.ends_with(HTML_EXTENSION) {
        path.push(last);
    } else {
        path.push(format!("{}{}", last, HTML_EXTENSION));
    }

    Ok(path)
}

/// Strips surrounding slashes and the prefix directory from a URL path
fn relative_path<'a>(url_path: &'a str, required_prefix: &str) -> &'a str {
    let path = url_path.trim_matches('/');
    let prefix_dir = required_prefix.trim_matches('/');

    if prefix_dir.is_empty() {
        return path;
    }

    if path == prefix_dir {
        return "";
    }

    path.strip_prefix(prefix_dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(url: &str) -> PathBuf {
        page_path(&Url::parse(url).unwrap(), Path::new("root"), "/cn/").unwrap()
    }

    #[test]
    fn test_prefix_root_maps_to_index() {
        assert_eq!(map("https://example.com/cn/"), Path::new("root/index.html"));
        assert_eq!(map("https://example.com/cn"), Path::new("root/index.html"));
        assert_eq!(map("https://example.com/"), Path::new("root/index.html"));
    }

    #[test]
    fn test_single_segment() {
        assert_eq!(map("https://example.com/cn/a"), Path::new("root/a.html"));
        assert_eq!(map("https://example.com/cn/a/"), Path::new("root/a.html"));
    }

    #[test]
    fn test_nested_segments() {
        assert_eq!(
            map("https://example.com/cn/x/y/z"),
            Path::new("root/x/y/z.html")
        );
    }

    #[test]
    fn test_html_extension_not_duplicated() {
        assert_eq!(
            map("https://example.com/cn/x/page.html"),
            Path::new("root/x/page.html")
        );
    }

    #[test]
    fn test_html_page_and_child_of_same_name_collide() {
        // The first needs a file named x.html, the second a directory
        assert_eq!(map("https://example.com/cn/x.html"), Path::new("root/x.html"));
        assert_eq!(
            map("https://example.com/cn/x.html/y"),
            Path::new("root/x.html/y.html")
        );
        // Without the extension the names differ and both fit
        assert_eq!(map("https://example.com/cn/x"), Path::new("root/x.html"));
        assert_eq!(map("https://example.com/cn/x/y"), Path::new("root/x/y.html"));
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        assert_eq!(
            map("https://example.com/cn/a?lang=zh#top"),
            Path::new("root/a.html")
        );
    }

    #[test]
    fn test_path_outside_prefix_keeps_all_segments() {
        assert_eq!(map("https://example.com/en/b"), Path::new("root/en/b.html"));
        assert_eq!(map("https://example.com/cnx/b"), Path::new("root/cnx/b.html"));
    }

    #[test]
    fn test_empty_segments_collapsed() {
        assert_eq!(map("https://example.com/cn//a//b"), Path::new("root/a/b.html"));
    }

    #[test]
    fn test_root_prefix() {
        let url = Url::parse("https://example.com/docs/intro").unwrap();
        let path = page_path(&url, Path::new("root"), "/").unwrap();
        assert_eq!(path, Path::new("root/docs/intro.html"));
    }

    #[test]
    fn test_dot_segments_rejected() {
        let root = Path::new("root");
        assert!(matches!(
            map_url_path("/cn/../../etc/passwd", root, "/cn/"),
            Err(StorageError::OutsideRoot(_))
        ));
        assert!(matches!(
            map_url_path("/cn/./a", root, "/cn/"),
            Err(StorageError::OutsideRoot(_))
        ));
    }

    #[test]
    fn test_parsed_urls_never_escape_root() {
        let url = Url::parse("https://example.com/cn/%2E%2E/%2e%2e/secret").unwrap();
        let path = page_path(&url, Path::new("root"), "/cn/").unwrap();
        assert!(path.starts_with("root"));
    }
}
