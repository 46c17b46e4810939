//! Page loading: the [`PageFetcher`] seam and its HTTP implementation.
//!
//! A load only succeeds once the awaited selector is present in the markup,
//! mirroring a browser driver that waits for an element before returning.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};

use jobcrawl_shared::{JobCrawlError, Result};

// ---------------------------------------------------------------------------
// FetchError
// ---------------------------------------------------------------------------

/// Why a single page load failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("HTTP {0}")]
    Status(u16),

    /// The page loaded but the awaited element never appeared.
    #[error("selector `{0}` not present on page")]
    SelectorMissing(String),

    /// The awaited selector is not valid CSS.
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),

    /// Every retry attempt failed.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Whether this failure is a timeout, including a wait for an element
    /// that never showed up.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::SelectorMissing(_) => true,
            Self::Exhausted { last, .. } => last.is_timeout(),
            _ => false,
        }
    }
}

impl From<FetchError> for JobCrawlError {
    fn from(err: FetchError) -> Self {
        if err.is_timeout() {
            JobCrawlError::Timeout(err.to_string())
        } else {
            JobCrawlError::Network(err.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Loads results pages and job detail pages for the orchestrator.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url` and return its markup once `wait_selector` is present.
    async fn load(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, FetchError>;

    /// Load a detail page and return the text of the `wait_selector` element.
    async fn load_detail(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, FetchError>;

    /// Release the session. Called once at the end of a run.
    async fn close(&self) -> std::result::Result<(), FetchError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// [`PageFetcher`] backed by a pooled `reqwest` client.
pub struct HttpFetcher {
    client: Client,
    closed: AtomicBool,
}

impl HttpFetcher {
    /// Create a fetcher that identifies itself with `user_agent`.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| JobCrawlError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            closed: AtomicBool::new(false),
        })
    }

    async fn get(&self, url: &str, timeout: Duration) -> std::result::Result<String, FetchError> {
        debug!(url, ?timeout, "GET");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| classify(e, timeout))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn load(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, FetchError> {
        let markup = self.get(url, timeout).await?;
        if wait_selector.is_empty() || selector_present(&markup, wait_selector)? {
            Ok(markup)
        } else {
            Err(FetchError::SelectorMissing(wait_selector.to_string()))
        }
    }

    async fn load_detail(
        &self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> std::result::Result<String, FetchError> {
        let markup = self.get(url, timeout).await?;
        match element_text(&markup, wait_selector)? {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(FetchError::SelectorMissing(wait_selector.to_string())),
        }
    }

    async fn close(&self) -> std::result::Result<(), FetchError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            debug!("fetch session already closed");
        } else {
            info!("fetch session closed");
        }
        Ok(())
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Transport(err.to_string())
    }
}

fn parse_selector(css: &str) -> std::result::Result<Selector, FetchError> {
    Selector::parse(css).map_err(|_| FetchError::InvalidSelector(css.to_string()))
}

/// Whether any element in `markup` matches `css`.
pub fn selector_present(markup: &str, css: &str) -> std::result::Result<bool, FetchError> {
    let selector = parse_selector(css)?;
    let doc = Html::parse_document(markup);
    Ok(doc.select(&selector).next().is_some())
}

/// Trimmed text of the first element matching `css`, if any.
pub fn element_text(markup: &str, css: &str) -> std::result::Result<Option<String>, FetchError> {
    let selector = parse_selector(css)?;
    let doc = Html::parse_document(markup);
    Ok(doc.select(&selector).next().map(|el| {
        el.text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS: &str = r#"<html><body>
        <div id="mosaic-provider-jobcards"><div class="job_seen_beacon">card</div></div>
    </body></html>"#;

    const DETAIL: &str = r#"<html><body>
        <div id="jobDescriptionText">
            <p>Grow our Amazon marketplace.</p>
            <p>Own seller operations.</p>
        </div>
    </body></html>"#;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new("jobcrawl-test").expect("client")
    }

    #[test]
    fn timeout_classification() {
        assert!(FetchError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(FetchError::SelectorMissing("#x".into()).is_timeout());
        assert!(!FetchError::Status(503).is_timeout());
        let exhausted = FetchError::Exhausted {
            attempts: 3,
            last: Box::new(FetchError::Timeout(Duration::from_secs(1))),
        };
        assert!(exhausted.is_timeout());
    }

    #[test]
    fn fetch_error_converts_by_kind() {
        let err: JobCrawlError = FetchError::Timeout(Duration::from_secs(5)).into();
        assert!(matches!(err, JobCrawlError::Timeout(_)));
        let err: JobCrawlError = FetchError::Status(500).into();
        assert!(matches!(err, JobCrawlError::Network(_)));
    }

    #[test]
    fn element_text_joins_blocks() {
        let text = element_text(DETAIL, "#jobDescriptionText").unwrap().unwrap();
        assert_eq!(text, "Grow our Amazon marketplace.\nOwn seller operations.");
        assert_eq!(element_text(DETAIL, "#missing").unwrap(), None);
    }

    #[test]
    fn invalid_selector_is_reported() {
        let err = selector_present(RESULTS, "[[[").unwrap_err();
        assert!(matches!(err, FetchError::InvalidSelector(_)));
    }

    #[tokio::test]
    async fn load_waits_for_selector() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS))
            .mount(&server)
            .await;

        let url = format!("{}/jobs", server.uri());
        let fetcher = fetcher();

        let markup = fetcher
            .load(&url, "#mosaic-provider-jobcards, .jobsearch-ResultsList", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(markup.contains("job_seen_beacon"));

        let err = fetcher
            .load(&url, ".jobsearch-ResultsList", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::SelectorMissing(".jobsearch-ResultsList".into()));
    }

    #[tokio::test]
    async fn load_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher()
            .load(&server.uri(), "", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status(503));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(RESULTS)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = fetcher()
            .load(&server.uri(), "", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }

    #[tokio::test]
    async fn load_detail_returns_description_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/viewjob"))
            .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL))
            .mount(&server)
            .await;

        let url = format!("{}/viewjob?jk=abc", server.uri());
        let text = fetcher()
            .load_detail(&url, "#jobDescriptionText", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(text.contains("seller operations"));
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let fetcher = fetcher();
        assert!(fetcher.close().await.is_ok());
        assert!(fetcher.close().await.is_ok());
    }
}
