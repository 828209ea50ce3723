use crate::reddit::listing::{parse_listing, Listing};
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

const MAX_RETRIES: u32 = 3;
const MAX_LISTING_SIZE: usize = 5 * 1024 * 1024; // 5MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LIMIT: u32 = 25;

/// Errors from fetching a listing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Request timed out")]
    Timeout,
    /// Body was not a listing
    #[error("Parse error: {0}")]
    Parse(String),
    /// Server returned 429 Too Many Requests after max retries
    #[error("Rate limited after {0} retries")]
    RateLimited(u32),
    #[error("Response too large")]
    ResponseTooLarge,
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    #[default]
    Hot,
    New,
    Top,
    Rising,
}

impl Sort {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hot" => Some(Self::Hot),
            "new" => Some(Self::New),
            "top" => Some(Self::Top),
            "rising" => Some(Self::Rising),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hot => "hot",
            Self::New => "new",
            Self::Top => "top",
            Self::Rising => "rising",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Hot => Self::New,
            Self::New => Self::Top,
            Self::Top => Self::Rising,
            Self::Rising => Self::Hot,
        }
    }
}

/// Path of a subreddit's listing relative to the site root.
///
/// "frontpage" (or an empty name) is the home listing; names containing '/'
/// are multireddit or user paths and used as given.
pub fn listing_path(subreddit: &str, sort: Sort) -> String {
    let name = subreddit.trim().trim_matches('/');
    if name.is_empty() || name.eq_ignore_ascii_case("frontpage") {
        format!("/{}.json", sort.as_str())
    } else if name.contains('/') {
        format!("/{}/{}.json", name, sort.as_str())
    } else {
        format!("/r/{}/{}.json", name, sort.as_str())
    }
}

/// Client for Reddit's public JSON listings.
#[derive(Debug, Clone)]
pub struct RedditClient {
    http: reqwest::Client,
    base: Url,
    backoff: Duration,
}

impl RedditClient {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: reqwest::Client, base: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            http,
            base,
            backoff: Duration::from_secs(2),
        })
    }

    /// First retry delay; doubles on every further attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn listing_url(
        &self,
        subreddit: &str,
        sort: Sort,
        after: Option<&str>,
    ) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(&listing_path(subreddit, sort))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &PAGE_LIMIT.to_string());
            query.append_pair("raw_json", "1");
            if let Some(after) = after {
                query.append_pair("after", after);
            }
        }
        Ok(url)
    }

    /// Browser URL for a site path such as a permalink or "/u/name".
    pub fn web_url(&self, path: &str) -> Option<Url> {
        self.base.join(path).ok()
    }

    /// Fetch one page of a subreddit listing.
    ///
    /// 429 and 5xx responses are retried with exponential backoff; other
    /// non-2xx statuses fail immediately.
    pub async fn fetch_listing(
        &self,
        subreddit: &str,
        sort: Sort,
        after: Option<&str>,
    ) -> Result<Listing, FetchError> {
        let url = self.listing_url(subreddit, sort, after)?;
        let mut retry_count = 0;

        let bytes = loop {
            let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.get(url.clone()).send())
                .await
                .map_err(|_| FetchError::Timeout)?
                .map_err(FetchError::Network)?;

            let status = response.status();
            let retryable =
                status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if retryable {
                if retry_count >= MAX_RETRIES {
                    return Err(if status.is_server_error() {
                        FetchError::HttpStatus(status.as_u16())
                    } else {
                        FetchError::RateLimited(MAX_RETRIES)
                    });
                }
                let delay = self.backoff * 2u32.pow(retry_count);
                tracing::warn!(
                    url = %url,
                    status = %status,
                    retry = retry_count,
                    delay_ms = delay.as_millis() as u64,
                    "Listing request failed, backing off"
                );
                tokio::time::sleep(delay).await;
                retry_count += 1;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::HttpStatus(status.as_u16()));
            }

            break read_limited_bytes(response, MAX_LISTING_SIZE).await?;
        };

        let listing = parse_listing(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
        tracing::debug!(
            subreddit = %subreddit,
            posts = listing.posts.len(),
            "Fetched listing"
        );
        Ok(listing)
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = r#"{"kind": "Listing", "data": {"after": "t3_b", "children": [
        {"kind": "t3", "data": {"id": "a", "title": "First", "subreddit": "rust"}},
        {"kind": "t3", "data": {"id": "b", "title": "Second", "subreddit": "rust"}}
    ]}}"#;

    fn client_for(server: &MockServer) -> RedditClient {
        RedditClient::with_base_url(reqwest::Client::new(), &server.uri())
            .unwrap()
            .with_backoff(Duration::from_millis(1))
    }

    #[test]
    fn test_listing_path_forms() {
        assert_eq!(listing_path("frontpage", Sort::Hot), "/hot.json");
        assert_eq!(listing_path("", Sort::New), "/new.json");
        assert_eq!(listing_path("rust", Sort::Top), "/r/rust/top.json");
        assert_eq!(
            listing_path("/user/spez/m/tech/", Sort::Hot),
            "/user/spez/m/tech/hot.json"
        );
    }

    #[test]
    fn test_sort_cycle_and_names() {
        assert_eq!(Sort::Rising.next(), Sort::Hot);
        assert_eq!(Sort::from_str_name("TOP"), Some(Sort::Top));
        assert_eq!(Sort::from_str_name("best"), None);
    }

    #[test]
    fn test_listing_url_query() {
        let client =
            RedditClient::with_base_url(reqwest::Client::new(), DEFAULT_BASE_URL).unwrap();
        let url = client.listing_url("rust", Sort::Hot, Some("t3_x")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.reddit.com/r/rust/hot.json?limit=25&raw_json=1&after=t3_x"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = RedditClient::with_base_url(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_fetch_listing_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/rust/hot.json"))
            .and(query_param("raw_json", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(&server)
            .await;

        let listing = client_for(&server)
            .fetch_listing("rust", Sort::Hot, None)
            .await
            .unwrap();
        assert_eq!(listing.posts.len(), 2);
        assert_eq!(listing.after.as_deref(), Some("t3_b"));
    }

    #[tokio::test]
    async fn test_fetch_listing_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        match client_for(&server).fetch_listing("nope", Sort::Hot, None).await {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_listing_500_retries_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4) // Initial request + 3 retries
            .mount(&server)
            .await;

        match client_for(&server).fetch_listing("rust", Sort::Hot, None).await {
            Err(FetchError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_listing_rate_limited_then_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(&server)
            .await;

        let listing = client_for(&server)
            .fetch_listing("rust", Sort::Hot, None)
            .await
            .unwrap();
        assert_eq!(listing.posts.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_listing_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
            .mount(&server)
            .await;

        match client_for(&server).fetch_listing("rust", Sort::Hot, None).await {
            Err(FetchError::Parse(_)) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }
}
