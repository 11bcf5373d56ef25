//! Async API for fetching and cleaning articles.
//!
//! Enable the `async` feature to use these APIs (on by default):
//!
//! ```toml
//! [dependencies]
//! webtext = { version = "0.1", features = ["async"] }
//! ```
//!
//! webtext does not fetch pages itself. Implement [`Fetcher`] on top of
//! whatever crawler or HTTP client renders the page to markdown.

use crate::cleanup::{Cleaner, CleanupOptions};
use crate::error::{Error, Result};
use crate::response::{CleanRequest, Reply};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

/// Source of page markdown.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the main content of the page at `url` as markdown, optionally
    /// preceded by a `Title:` / `URL Source:` preamble.
    ///
    /// Implementations report non-success responses as
    /// [`Error::FetchStatus`].
    async fn fetch_markdown(&self, url: &Url) -> Result<String>;
}

/// Parses an article URL, accepting only http and https.
pub fn parse_article_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::UnsupportedScheme(other.to_string())),
    }
}

/// Cleans `content` on a blocking thread.
pub async fn clean(content: String, cleaner: Arc<Cleaner>) -> Result<String> {
    // Cleaning is CPU-bound, keep it off the async workers
    tokio::task::spawn_blocking(move || cleaner.clean(&content))
        .await
        .map_err(|e| Error::Task(e.to_string()))
}

/// Fetches the article at `url` and cleans it.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use webtext::async_api::{fetch_and_clean, Fetcher};
/// # async fn example(fetcher: &impl Fetcher) -> webtext::Result<()> {
/// let cleaner = Arc::new(webtext::Cleaner::default());
/// let text = fetch_and_clean(fetcher, "https://example.com/post", cleaner).await?;
/// println!("{}", text);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_and_clean<F>(fetcher: &F, url: &str, cleaner: Arc<Cleaner>) -> Result<String>
where
    F: Fetcher + ?Sized,
{
    let url = parse_article_url(url)?;

    info!(%url, "fetching article");
    let markdown = fetcher.fetch_markdown(&url).await?;
    info!(%url, bytes = markdown.len(), "received article content");

    clean(markdown, cleaner).await
}

/// Answers a clean request.
///
/// A request without a usable URL is rejected before the fetcher or the
/// cleaner is touched. Failures are logged and folded into the reply.
pub async fn handle_request<F>(fetcher: &F, request: &CleanRequest, cleaner: Arc<Cleaner>) -> Reply
where
    F: Fetcher + ?Sized,
{
    let Some(url) = request.url() else {
        return Reply::from_error(&Error::MissingUrl);
    };

    match fetch_and_clean(fetcher, url, cleaner).await {
        Ok(text) => {
            info!(url, "response generated successfully");
            Reply::ok(text)
        }
        Err(err) => {
            error!(url, error = %err, "error in converting to text");
            Reply::from_error(&err)
        }
    }
}

/// Fetcher and cleaner bundled for repeated use.
///
/// # Example
///
/// ```no_run
/// # use webtext::async_api::{ArticleService, Fetcher};
/// # async fn example<F: Fetcher>(fetcher: F) -> webtext::Result<()> {
/// let service = ArticleService::new(fetcher)
///     .with_options(webtext::CleanupOptions::minimal())?;
/// let text = service.fetch_and_clean("https://example.com/post").await?;
/// # Ok(())
/// # }
/// ```
pub struct ArticleService<F> {
    fetcher: F,
    cleaner: Arc<Cleaner>,
}

impl<F: Fetcher> ArticleService<F> {
    /// Creates a service with the default cleanup options.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            cleaner: Arc::new(Cleaner::default()),
        }
    }

    /// Replaces the cleanup options.
    pub fn with_options(mut self, options: CleanupOptions) -> Result<Self> {
        self.cleaner = Arc::new(Cleaner::new(options)?);
        Ok(self)
    }

    /// Returns the cleaner in use.
    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }

    /// Fetches and cleans one article.
    pub async fn fetch_and_clean(&self, url: &str) -> Result<String> {
        fetch_and_clean(&self.fetcher, url, Arc::clone(&self.cleaner)).await
    }

    /// Answers a clean request.
    pub async fn handle(&self, request: &CleanRequest) -> Reply {
        handle_request(&self.fetcher, request, Arc::clone(&self.cleaner)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{Envelope, ReplyStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticFetcher {
        body: String,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch_markdown(&self, _url: &Url) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct FailingFetcher(u16);

    #[async_trait]
    impl Fetcher for FailingFetcher {
        async fn fetch_markdown(&self, _url: &Url) -> Result<String> {
            Err(Error::FetchStatus { status: self.0 })
        }
    }

    const PAGE: &str = "Title: Example\n\nURL Source: http://x\n\nMarkdown Content:\n\nBody text";

    #[test]
    fn test_parse_article_url() {
        assert!(parse_article_url("https://example.com/a").is_ok());
        assert!(matches!(
            parse_article_url("ftp://example.com/a"),
            Err(Error::UnsupportedScheme(_))
        ));
        assert!(matches!(
            parse_article_url("not a url"),
            Err(Error::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_and_clean() {
        let fetcher = StaticFetcher::new(PAGE);
        let cleaner = Arc::new(Cleaner::default());
        let text = fetch_and_clean(&fetcher, "https://example.com", cleaner)
            .await
            .unwrap();
        assert_eq!(text, "Example\n\nBody text");
    }

    #[tokio::test]
    async fn test_missing_url_skips_fetcher() {
        let fetcher = StaticFetcher::new(PAGE);
        let reply = handle_request(&fetcher, &CleanRequest::default(), Arc::new(Cleaner::default())).await;

        assert_eq!(reply.status, ReplyStatus::BadRequest);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_reply() {
        let service = ArticleService::new(FailingFetcher(404));
        let reply = service.handle(&CleanRequest::new("https://example.com/gone")).await;

        assert_eq!(reply.status, ReplyStatus::InternalError);
        match reply.envelope {
            Envelope::Error { error } => assert!(error.ends_with("Failed to fetch data: Status 404")),
            Envelope::Success { .. } => panic!("expected an error envelope"),
        }
    }

    #[tokio::test]
    async fn test_service_success_reply() {
        let service = ArticleService::new(StaticFetcher::new("- one\n- two"));
        let reply = service.handle(&CleanRequest::new("http://example.com")).await;

        assert_eq!(reply.status, ReplyStatus::Ok);
        assert_eq!(reply.envelope, Envelope::success("\t• one\n\t• two"));
    }

    #[tokio::test]
    async fn test_service_with_minimal_options() {
        let service = ArticleService::new(StaticFetcher::new(PAGE))
            .with_options(CleanupOptions::minimal())
            .unwrap();
        let text = service.fetch_and_clean("https://example.com").await.unwrap();
        assert!(text.starts_with("Title: Example"));
    }
}
