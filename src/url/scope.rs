use crate::{UrlError, UrlResult};
use url::Url;

/// In-scope predicate for a single crawl
///
/// A candidate is in scope when its network location (host and explicit port)
/// equals the seed's and its path starts with the required prefix. The scheme
/// is not compared, matching how `netloc` equality treats `http` and `https`
/// links to the same host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
    host: String,
    port: Option<u16>,
    prefix: String,
}

impl ScopeFilter {
    /// Builds the filter from the seed URL and the required path prefix
    pub fn new(seed_url: &str, required_prefix: &str) -> UrlResult<Self> {
        let seed = Url::parse(seed_url)?;
        Self::from_url(&seed, required_prefix)
    }

    /// Builds the filter from an already parsed seed URL
    pub fn from_url(seed: &Url, required_prefix: &str) -> UrlResult<Self> {
        let host = seed
            .host_str()
            .ok_or_else(|| UrlError::MissingHost(seed.to_string()))?;

        Ok(Self {
            host: host.to_string(),
            port: seed.port(),
            prefix: required_prefix.to_string(),
        })
    }

    /// Checks a candidate URL string; malformed URLs are out of scope
    pub fn contains(&self, candidate: &str) -> bool {
        match Url::parse(candidate) {
            Ok(url) => self.contains_url(&url),
            Err(_) => false,
        }
    }

    /// Checks an already parsed candidate URL
    pub fn contains_url(&self, candidate: &Url) -> bool {
        candidate.host_str() == Some(self.host.as_str())
            && candidate.port() == self.port
            && candidate.path().starts_with(&self.prefix)
    }
}

/// Checks whether `candidate_url` is on the seed's host and under `required_prefix`
///
/// Pure predicate: a malformed candidate or seed simply yields `false`.
///
/// # Examples
///
/// ```
/// use path_mirror::url::is_in_scope;
///
/// let seed = "https://example.com/cn/";
/// assert!(is_in_scope("https://example.com/cn/a", seed, "/cn/"));
/// assert!(!is_in_scope("https://example.com/en/b", seed, "/cn/"));
/// assert!(!is_in_scope("https://other.com/cn/a", seed, "/cn/"));
/// assert!(!is_in_scope("::not a url::", seed, "/cn/"));
/// ```
pub fn is_in_scope(candidate_url: &str, seed_url: &str, required_prefix: &str) -> bool {
    ScopeFilter::new(seed_url, required_prefix)
        .map(|scope| scope.contains(candidate_url))
        .unwrap_or(false)
}
