use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use super::{
    core::{cancellable, validate_url},
    data::{ScrapeResult, ScrapeStage},
};
use crate::error::{ErrorKind, OpError};

#[derive(Debug)]
struct Behaviour {
    result: Result<ScrapeResult, OpError>,
    delay: Option<Duration>,
    panics: bool,
    healthy: bool,
}

/// Scraper stand-in with a canned answer.
///
/// The delay is spent between the `fetching` and `extracting` stages and
/// honours cancellation, so tests can observe in-flight scrapes.
#[derive(Debug, Clone)]
pub struct Mock {
    behaviour: Arc<Mutex<Behaviour>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Mock {
    pub fn new(result: Result<ScrapeResult, OpError>) -> Self {
        Self {
            behaviour: Arc::new(Mutex::new(Behaviour {
                result,
                delay: None,
                panics: false,
                healthy: true,
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn set_result(&self, result: Result<ScrapeResult, OpError>) {
        self.behaviour.lock().await.result = result;
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.behaviour.lock().await.delay = delay;
    }

    pub async fn set_panics(&self, panics: bool) {
        self.behaviour.lock().await.panics = panics;
    }

    pub async fn set_healthy(&self, healthy: bool) {
        self.behaviour.lock().await.healthy = healthy;
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn check_health(&self, token: &CancellationToken) -> Result<(), OpError> {
        if token.is_cancelled() {
            return Err(OpError::cancelled());
        }
        if self.behaviour.lock().await.healthy {
            Ok(())
        } else {
            Err(OpError::new(
                ErrorKind::ServiceUnavailable,
                "service unhealthy: status 503",
            ))
        }
    }

    pub async fn scrape_with_progress(
        &self,
        url: &str,
        _timeout_secs: u64,
        token: &CancellationToken,
        mut progress: impl FnMut(ScrapeStage, &str),
    ) -> Result<ScrapeResult, OpError> {
        validate_url(url)?;
        self.calls.lock().await.push(url.trim().to_string());
        let (result, delay, panics) = {
            let b = self.behaviour.lock().await;
            (b.result.clone(), b.delay, b.panics)
        };

        progress(ScrapeStage::HealthCheck, "Checking scraper service...");
        progress(ScrapeStage::Fetching, "Sending scrape request...");
        if let Some(delay) = delay {
            cancellable(token, async {
                tokio::time::sleep(delay).await;
                Ok::<(), OpError>(())
            })
            .await?;
        }
        if panics {
            panic!("mock scraper exploded");
        }
        progress(ScrapeStage::Extracting, "Extracting content from URL...");
        let result = result?;
        progress(ScrapeStage::Complete, "Scraping completed successfully");
        Ok(result)
    }
}
