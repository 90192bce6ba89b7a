//! Client for the content-scraping service.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{error::OpError, net::Net};

mod core;
pub mod data;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{ScrapeResult, ScrapeStage};

/// Handle to the scraping service.
///
/// Every call takes a [`CancellationToken`]; cancelling it abandons the HTTP
/// request in flight and yields an error of kind `Cancelled`.
///
/// # Examples
/// ```ignore
/// let scraper = Scraper::new(net, "http://localhost:8080");
/// let token = CancellationToken::new();
/// let page = scraper
///     .scrape_with_progress("https://example.com", 30, &token, |stage, msg| {
///         println!("{}: {msg}", stage.as_str())
///     })
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub enum Scraper {
    Actual(Arc<core::Core>),
    Mock(mock::Mock),
}

impl Scraper {
    pub fn new(net: Net, base_url: &str) -> Self {
        Self::Actual(Arc::new(core::Core::new(net, base_url)))
    }

    /// Creates a mock that answers every scrape with `result`.
    pub fn mock(result: Result<ScrapeResult, OpError>) -> Self {
        Self::Mock(mock::Mock::new(result))
    }

    /// Checks that the service is up. Failures are `ServiceUnavailable`.
    pub async fn check_health(&self, token: &CancellationToken) -> Result<(), OpError> {
        match self {
            Scraper::Actual(core) => core.check_health(token).await,
            Scraper::Mock(mock) => mock.check_health(token).await,
        }
    }

    /// Scrapes `url`, reporting each stage through `progress`.
    ///
    /// # Arguments
    /// * `url` - Absolute URL of the page
    /// * `timeout_secs` - Deadline the service should apply to the page fetch
    /// * `token` - Cancels the request when triggered
    /// * `progress` - Called with each stage and a human-readable message
    pub async fn scrape_with_progress(
        &self,
        url: &str,
        timeout_secs: u64,
        token: &CancellationToken,
        progress: impl FnMut(ScrapeStage, &str),
    ) -> Result<ScrapeResult, OpError> {
        match self {
            Scraper::Actual(core) => {
                core.scrape_with_progress(url, timeout_secs, token, progress)
                    .await
            }
            Scraper::Mock(mock) => {
                mock.scrape_with_progress(url, timeout_secs, token, progress)
                    .await
            }
        }
    }

    pub async fn mock_set_result(&self, result: Result<ScrapeResult, OpError>) {
        if let Scraper::Mock(mock) = self {
            mock.set_result(result).await;
        }
    }

    /// Makes mock scrapes take `delay` before extracting
    pub async fn mock_set_delay(&self, delay: Option<std::time::Duration>) {
        if let Scraper::Mock(mock) = self {
            mock.set_delay(delay).await;
        }
    }

    /// Makes mock scrapes panic mid-flight
    pub async fn mock_set_panics(&self, panics: bool) {
        if let Scraper::Mock(mock) = self {
            mock.set_panics(panics).await;
        }
    }

    pub async fn mock_set_healthy(&self, healthy: bool) {
        if let Scraper::Mock(mock) = self {
            mock.set_healthy(healthy).await;
        }
    }

    /// URLs a mock was asked to scrape
    pub async fn mock_calls(&self) -> Vec<String> {
        match self {
            Scraper::Actual(_) => Vec::new(),
            Scraper::Mock(mock) => mock.calls().await,
        }
    }
}
