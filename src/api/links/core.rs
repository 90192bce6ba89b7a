use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};

use super::data::{
    ApiError, CreateWithScraping, ErrorBody, Link, LinkCreate, LinkId, LinkUpdate, ScrapeOptions,
};
use crate::{
    ArcStr,
    net::{Method, Net, Request, Response},
};

/// Extra time the server gets on top of the scrape deadline to store the link
const SCRAPE_GRACE: Duration = Duration::from_secs(10);

/// The core of the link API client.
///
/// It builds authenticated JSON requests for the `/api/v1/links` endpoints
/// and turns the replies into typed values. Calls are independent of each
/// other, so the core is shared behind an `Arc` instead of running as an
/// actor loop.
#[derive(Debug)]
pub struct Core {
    net: Net,
    base_url: ArcStr,
    api_key: ArcStr,
}

impl Core {
    /// # Arguments
    /// * `net` - The networking actor for making HTTP requests
    /// * `base_url` - API root such as `http://localhost:8000`; a trailing
    ///   slash is ignored
    /// * `api_key` - Bearer token; no `Authorization` header when empty
    pub fn new(net: Net, base_url: &str, api_key: &str) -> Self {
        Self {
            net,
            base_url: ArcStr::from(base_url.trim_end_matches('/')),
            api_key: ArcStr::from(api_key),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/links{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Request {
        let req = Request::new(method, self.endpoint(path)).header("Accept", "application/json");
        if self.api_key.is_empty() {
            req
        } else {
            req.header("Authorization", &format!("Bearer {}", self.api_key))
        }
    }

    fn scraping(req: Request, options: &ScrapeOptions) -> Request {
        req.timeout(Duration::from_secs(options.timeout_seconds) + SCRAPE_GRACE)
    }

    fn with_json<B: Serialize>(req: Request, body: &B) -> Result<Request, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        Ok(req.json(body))
    }

    /// Turns a non-2xx reply into [`ApiError::Status`], preferring the
    /// server's `{"error": ...}` message over the raw body. A blank message
    /// falls back to the status text.
    fn check(resp: Response) -> Result<Response, ApiError> {
        if resp.is_success() {
            return Ok(resp);
        }
        let body = resp.body.trim();
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Some(parsed.error.trim().to_string()),
            Err(_) => Some(body.to_string()),
        }
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            reqwest::StatusCode::from_u16(resp.status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("unknown error")
                .to_string()
        });
        Err(ApiError::Status {
            status: resp.status,
            message,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, req: Request) -> Result<T, ApiError> {
        let resp = Self::check(self.net.send(req).await?)?;
        serde_json::from_str(&resp.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn list_links(&self) -> Result<Vec<Link>, ApiError> {
        self.execute(self.request(Method::Get, "")).await
    }

    pub async fn get_link(&self, id: LinkId) -> Result<Link, ApiError> {
        self.execute(self.request(Method::Get, &format!("/{id}")))
            .await
    }

    pub async fn create_link(&self, link: &LinkCreate) -> Result<Link, ApiError> {
        let req = Self::with_json(self.request(Method::Post, ""), link)?;
        self.execute(req).await
    }

    pub async fn create_link_with_scraping(
        &self,
        link: &LinkCreate,
        options: &ScrapeOptions,
    ) -> Result<Link, ApiError> {
        let body = CreateWithScraping { link, options };
        let req = Self::scraping(self.request(Method::Post, "/with-scraping"), options);
        let req = Self::with_json(req, &body)?;
        self.execute(req).await
    }

    pub async fn update_link(&self, id: LinkId, update: &LinkUpdate) -> Result<Link, ApiError> {
        let req = Self::with_json(self.request(Method::Put, &format!("/{id}")), update)?;
        self.execute(req).await
    }

    pub async fn enrich_link(&self, id: LinkId, options: &ScrapeOptions) -> Result<Link, ApiError> {
        let req = Self::scraping(self.request(Method::Post, &format!("/{id}/enrich")), options);
        let req = Self::with_json(req, options)?;
        self.execute(req).await
    }

    pub async fn delete_link(&self, id: LinkId) -> Result<(), ApiError> {
        let resp = self.net.send(self.request(Method::Delete, &format!("/{id}"))).await?;
        Self::check(resp).map(|_| ())
    }
}
