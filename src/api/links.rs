use std::sync::Arc;

use crate::net::Net;

mod core;
pub mod data;
mod mock;

pub use data::{ApiError, Link, LinkCreate, LinkId, LinkUpdate, ScrapeOptions};
pub use mock::MockOp;

/// Client for the link management REST API.
///
/// Every call is an independent request through the [`Net`] actor, so the
/// real variant shares its core behind an `Arc` and clones are cheap.
///
/// # Examples
/// ```ignore
/// let api = LinkApi::new(net, "http://localhost:8000", "secret");
/// let links = api.list_links().await?;
/// ```
#[derive(Debug, Clone)]
pub enum LinkApi {
    /// Talks to the service over HTTP
    Actual(Arc<core::Core>),
    /// An in-memory store for testing
    Mock(mock::Mock),
}

impl LinkApi {
    /// # Arguments
    /// * `net` - The networking actor for making HTTP requests
    /// * `base_url` - API root, e.g. `http://localhost:8000`
    /// * `api_key` - Bearer token sent with every request
    pub fn new(net: Net, base_url: &str, api_key: &str) -> Self {
        Self::Actual(Arc::new(core::Core::new(net, base_url, api_key)))
    }

    /// Creates a mock API pre-populated with `links`.
    pub fn mock(links: Vec<Link>) -> Self {
        Self::Mock(mock::Mock::new(links))
    }

    pub async fn list_links(&self) -> Result<Vec<Link>, ApiError> {
        match self {
            LinkApi::Actual(core) => core.list_links().await,
            LinkApi::Mock(mock) => mock.list_links().await,
        }
    }

    pub async fn get_link(&self, id: LinkId) -> Result<Link, ApiError> {
        match self {
            LinkApi::Actual(core) => core.get_link(id).await,
            LinkApi::Mock(mock) => mock.get_link(id).await,
        }
    }

    pub async fn create_link(&self, link: &LinkCreate) -> Result<Link, ApiError> {
        match self {
            LinkApi::Actual(core) => core.create_link(link).await,
            LinkApi::Mock(mock) => mock.create_link(link).await,
        }
    }

    /// Creates a link and lets the service scrape the page to fill the
    /// missing fields.
    pub async fn create_link_with_scraping(
        &self,
        link: &LinkCreate,
        options: &ScrapeOptions,
    ) -> Result<Link, ApiError> {
        match self {
            LinkApi::Actual(core) => core.create_link_with_scraping(link, options).await,
            LinkApi::Mock(mock) => mock.create_link_with_scraping(link, options).await,
        }
    }

    pub async fn update_link(&self, id: LinkId, update: &LinkUpdate) -> Result<Link, ApiError> {
        match self {
            LinkApi::Actual(core) => core.update_link(id, update).await,
            LinkApi::Mock(mock) => mock.update_link(id, update).await,
        }
    }

    /// Asks the service to scrape an existing link again.
    pub async fn enrich_link(&self, id: LinkId, options: &ScrapeOptions) -> Result<Link, ApiError> {
        match self {
            LinkApi::Actual(core) => core.enrich_link(id, options).await,
            LinkApi::Mock(mock) => mock.enrich_link(id, options).await,
        }
    }

    pub async fn delete_link(&self, id: LinkId) -> Result<(), ApiError> {
        match self {
            LinkApi::Actual(core) => core.delete_link(id).await,
            LinkApi::Mock(mock) => mock.delete_link(id).await,
        }
    }

    /// Makes the given operation fail with `err` on a mock; a no-op otherwise.
    pub async fn mock_fail(&self, op: MockOp, err: ApiError) {
        if let LinkApi::Mock(mock) = self {
            mock.fail(op, err).await;
        }
    }

    pub async fn mock_clear_failure(&self, op: MockOp) {
        if let LinkApi::Mock(mock) = self {
            mock.clear_failure(op).await;
        }
    }

    /// Delays every mock call by `delay`
    pub async fn mock_delay(&self, delay: Option<std::time::Duration>) {
        if let LinkApi::Mock(mock) = self {
            mock.set_delay(delay).await;
        }
    }

    /// Operations a mock has served so far, empty for the real client
    pub async fn mock_calls(&self) -> Vec<MockOp> {
        match self {
            LinkApi::Actual(_) => Vec::new(),
            LinkApi::Mock(mock) => mock.calls().await,
        }
    }

    /// Links held by a mock, empty for the real client
    pub async fn mock_links(&self) -> Vec<Link> {
        match self {
            LinkApi::Actual(_) => Vec::new(),
            LinkApi::Mock(mock) => mock.links().await,
        }
    }
}
