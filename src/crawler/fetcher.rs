//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - GET requests to fetch page content
//! - Error classification (timeout, connection, status, body)
//!
//! Every failure is per-item: the worker logs it and moves on. There are no
//! retries.

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use thiserror::Error;

/// Maximum redirect hops followed for a single fetch
pub const MAX_REDIRECTS: usize = 10;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// Page body content
    pub body: String,
}

/// Reasons a fetch produced no page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {code}")]
    Status { code: u16 },

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Request(error.to_string())
        }
    }
}

/// Trait for page fetch backends
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues a GET for `url`; any non-2xx status is an error
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler settings (the per-request timeout is taken from here)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = crawler.fetch_timeout();

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `reqwest`-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(
        user_agent: &UserAgentConfig,
        crawler: &CrawlerConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, crawler)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        fetch_url(&self.client, url).await
    }
}

/// Fetches a URL and classifies the outcome
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
///
/// # Returns
///
/// The page for a 2xx response, otherwise the failure reason
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            code: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await.map_err(FetchError::from_reqwest)?;

    Ok(FetchedPage { final_url, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_with_timeout(ms: u64) -> Client {
        let crawler = CrawlerConfig {
            fetch_timeout: ms,
            ..CrawlerConfig::default()
        };
        build_http_client(&UserAgentConfig::default(), &crawler).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        let crawler = CrawlerConfig::default();
        assert!(build_http_client(&UserAgentConfig::default(), &crawler).is_ok());
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cn/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let page = fetch_url(&client_with_timeout(2_000), &format!("{}/cn/", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.body, "<html>hi</html>");
        assert!(page.final_url.ends_with("/cn/"));
    }

    #[tokio::test]
    async fn test_non_html_content_type_is_still_a_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cn/data"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let page = fetch_url(&client_with_timeout(2_000), &format!("{}/cn/data", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.body, "{}");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetch_url(&client_with_timeout(2_000), &format!("{}/cn/x", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Status { code: 404 })));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let result = fetch_url(&client_with_timeout(200), &format!("{}/cn/slow", server.uri())).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop a listener to get a port nobody serves
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = fetch_url(
            &client_with_timeout(2_000),
            &format!("http://127.0.0.1:{}/cn/", port),
        )
        .await;
        assert!(matches!(
            result,
            Err(FetchError::Connect(_)) | Err(FetchError::Request(_))
        ));
    }

    #[tokio::test]
    async fn test_redirect_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cn/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/cn/new", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cn/new"))
            .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
            .mount(&server)
            .await;

        let page = fetch_url(&client_with_timeout(2_000), &format!("{}/cn/old", server.uri()))
            .await
            .unwrap();
        assert_eq!(page.body, "moved");
        assert!(page.final_url.ends_with("/cn/new"));
    }
}
