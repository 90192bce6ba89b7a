use std::{collections::HashMap, time::Duration};

use tokio::sync::mpsc::Sender;

use crate::{
    log::Log,
    net::{core::Core, message::Message},
};

mod core;
pub mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{Method, MockRequestKey, NetError, Request, Response};

/// The networking actor that provides a thread-safe interface for network operations.
///
/// # Examples
/// ```ignore
/// let net = Net::spawn(log, Duration::from_secs(30))?;
/// let response = net.send(Request::get("http://localhost:8080/health")).await?;
/// ```
#[derive(Debug, Clone)]
pub enum Net {
    /// A real networking actor that performs HTTP requests
    Actual(Sender<Message>),
    /// A mock implementation answering from canned replies
    Mock(mock::Mock),
}

impl Net {
    /// Creates a new networking instance and spawns its actor.
    ///
    /// # Arguments
    /// * `log` - The logging actor for request logging
    /// * `timeout` - Default timeout applied to requests without their own
    pub fn spawn(log: Log, timeout: Duration) -> anyhow::Result<Self> {
        let (net, _) = Core::new(log, timeout)?.spawn();
        Ok(net)
    }

    /// Creates a new mock networking instance answering from `replies`.
    pub fn mock(replies: HashMap<MockRequestKey, Result<Response, NetError>>) -> Self {
        Self::Mock(mock::Mock::new(replies))
    }

    /// Performs an HTTP request.
    ///
    /// Dropping the returned future abandons the request.
    pub async fn send(&self, req: Request) -> Result<Response, NetError> {
        match self {
            Net::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Send { req, tx })
                    .await
                    .map_err(|_| NetError::Transport("net actor is not running".into()))?;
                rx.await
                    .map_err(|_| NetError::Transport("net actor dropped the request".into()))?
            }
            Net::Mock(mock) => mock.send(req).await,
        }
    }

    /// Requests recorded by a mock, empty for the real actor
    pub async fn recorded_requests(&self) -> Vec<Request> {
        match self {
            Net::Actual(_) => Vec::new(),
            Net::Mock(mock) => mock.requests().await,
        }
    }

    /// Replaces a canned reply on a mock; a no-op for the real actor
    pub async fn set_mock_reply(&self, key: MockRequestKey, reply: Result<Response, NetError>) {
        if let Net::Mock(mock) = self {
            mock.set_reply(key, reply).await;
        }
    }
}
