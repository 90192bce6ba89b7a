use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use super::data::{ErrorBody, ScrapeRequest, ScrapeResult, ScrapeStage};
use crate::{
    ArcStr,
    error::{ErrorKind, OpError},
    net::{Net, Request, Response},
};

/// Extra time granted to the HTTP request on top of the service-side timeout,
/// so the service gets to report its own deadline first.
const REQUEST_GRACE: Duration = Duration::from_secs(5);

/// Races `fut` against the token; a cancelled token wins and drops the future.
pub(super) async fn cancellable<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T, OpError>>,
) -> Result<T, OpError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(OpError::cancelled()),
        res = fut => res,
    }
}

/// Rejects anything that is not an absolute URL before going on the wire.
pub(super) fn validate_url(url: &str) -> Result<(), OpError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(OpError::invalid_input("URL is required"));
    }
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| OpError::invalid_input(format!("invalid URL: {e}")))
}

/// The core of the scraper client.
#[derive(Debug)]
pub struct Core {
    net: Net,
    base_url: ArcStr,
}

impl Core {
    pub fn new(net: Net, base_url: &str) -> Self {
        Self {
            net,
            base_url: ArcStr::from(base_url.trim_end_matches('/')),
        }
    }

    async fn send(&self, token: &CancellationToken, req: Request) -> Result<Response, OpError> {
        cancellable(token, async { self.net.send(req).await.map_err(OpError::from) }).await
    }

    /// Probes `/scraper/health`, then `/health` when the first one cannot be
    /// reached at all.
    pub async fn check_health(&self, token: &CancellationToken) -> Result<(), OpError> {
        let primary = Request::get(format!("{}/scraper/health", self.base_url));
        let resp = match self.send(token, primary).await {
            Ok(resp) => resp,
            Err(e) if matches!(e.kind, ErrorKind::Cancelled | ErrorKind::Timeout) => {
                return Err(e);
            }
            Err(_) => {
                let fallback = Request::get(format!("{}/health", self.base_url));
                self.send(token, fallback).await.map_err(|e| {
                    if e.kind == ErrorKind::Cancelled {
                        e
                    } else {
                        OpError::new(ErrorKind::ServiceUnavailable, "scraper service unreachable")
                            .with_cause(e)
                    }
                })?
            }
        };
        if resp.status != 200 {
            return Err(OpError::new(
                ErrorKind::ServiceUnavailable,
                format!("service unhealthy: status {}", resp.status),
            ));
        }
        Ok(())
    }

    pub async fn scrape_with_progress(
        &self,
        url: &str,
        timeout_secs: u64,
        token: &CancellationToken,
        mut progress: impl FnMut(ScrapeStage, &str),
    ) -> Result<ScrapeResult, OpError> {
        validate_url(url)?;
        progress(ScrapeStage::HealthCheck, "Checking scraper service...");

        progress(ScrapeStage::Fetching, "Sending scrape request...");
        let body = ScrapeRequest {
            url: url.trim(),
            timeout: (timeout_secs > 0).then_some(timeout_secs),
        };
        let body = serde_json::to_string(&body)
            .map_err(|e| OpError::invalid_response("failed to encode request").with_cause(e))?;
        let req = Request::post(format!("{}/scrape", self.base_url))
            .json(body)
            .timeout(Duration::from_secs(timeout_secs) + REQUEST_GRACE);

        progress(ScrapeStage::Extracting, "Extracting content from URL...");
        let resp = self.send(token, req).await?;
        let result = classify(resp)?;

        progress(ScrapeStage::Complete, "Scraping completed successfully");
        Ok(result)
    }
}

/// Turns a scraper reply into a result or a classified error.
pub(super) fn classify(resp: Response) -> Result<ScrapeResult, OpError> {
    if resp.status != 200 {
        return match serde_json::from_str::<ErrorBody>(&resp.body) {
            Ok(body) if !body.error.is_empty() => {
                Err(OpError::new(ErrorKind::Extraction, body.error))
            }
            _ => Err(OpError::invalid_response(format!(
                "scraper service error (status {})",
                resp.status
            ))
            .with_cause(format!("response: {}", resp.body))),
        };
    }
    let result: ScrapeResult = serde_json::from_str(&resp.body)
        .map_err(|e| OpError::invalid_response("failed to decode response").with_cause(e))?;
    if !result.success {
        let message = result
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| "Failed to extract content".to_string());
        return Err(OpError::new(ErrorKind::Extraction, message));
    }
    Ok(result)
}
