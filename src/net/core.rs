use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use tokio::task::JoinHandle;

use crate::{
    log::Log,
    net::{
        Net,
        data::{NetError, Request, Response},
        message::Message,
    },
};

const SCOPE: &str = "net";

/// The core of the networking system that handles HTTP requests.
///
/// Each request runs on its own task, so a slow scrape never holds up a
/// list refresh. If the caller stops waiting (its future was dropped because
/// the operation was cancelled or timed out) the request is abandoned too.
#[derive(Debug)]
pub struct Core {
    log: Log,
    client: Client,
}

impl Core {
    /// Creates a new networking core with a client-wide default timeout.
    ///
    /// # Errors
    /// Fails if the TLS backend cannot be initialised.
    pub fn new(log: Log, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Building HTTP client")?;
        Ok(Self { log, client })
    }

    pub fn spawn(self) -> (Net, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Send { req, mut tx } => {
                        let client = self.client.clone();
                        let log = self.log.clone();
                        tokio::spawn(async move {
                            let label = format!("{} {}", req.method, req.url);
                            let res = tokio::select! {
                                res = Self::send(&client, req) => res,
                                _ = tx.closed() => {
                                    log.info(SCOPE, format!("{label} abandoned by caller"));
                                    return;
                                }
                            };
                            match &res {
                                Ok(resp) => log.info(SCOPE, format!("{label} -> {}", resp.status)),
                                Err(err) => log.warn(SCOPE, format!("{label} failed: {err}")),
                            }
                            let _ = tx.send(res);
                        });
                    }
                }
            }
        });

        (Net::Actual(tx), handle)
    }

    async fn send(client: &Client, req: Request) -> Result<Response, NetError> {
        let mut request = client.request(req.method.into(), req.url.as_ref());
        for (key, value) in &req.headers {
            request = request.header(key.as_ref(), value.as_ref());
        }
        if let Some(body) = req.body {
            request = request.body(body.to_string());
        }
        if let Some(timeout) = req.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(Response::new(status, body))
    }
}
