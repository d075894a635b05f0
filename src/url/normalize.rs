use crate::{UrlError, UrlResult};
use url::Url;

/// Canonicalizes a URL into the key used by the visited set
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an HTTP or HTTPS scheme and a host
/// 3. Remove the fragment (everything after #)
///
/// Host lowercasing, default-port removal and dot-segment resolution are
/// already performed by the `url` parser. Query strings are kept, since they
/// can select distinct pages.
///
/// # Examples
///
/// ```
/// use path_mirror::url::canonicalize_url;
///
/// let url = canonicalize_url("HTTPS://Example.COM:443/cn/./a#top").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/cn/a");
/// ```
pub fn canonicalize_url(url_str: &str) -> UrlResult<Url> {
    let mut url = Url::parse(url_str)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    url.set_fragment(None);

    Ok(url)
}
