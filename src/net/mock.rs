use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::net::data::{MockRequestKey, NetError, Request, Response};

/// Mock implementation of the Net actor for testing purposes.
///
/// Requests are answered from a table of canned replies keyed by method and
/// URL. Every request is recorded so tests can assert on headers and bodies.
#[derive(Debug, Clone)]
pub struct Mock {
    replies: Arc<Mutex<HashMap<MockRequestKey, Result<Response, NetError>>>>,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl Mock {
    pub fn new(replies: HashMap<MockRequestKey, Result<Response, NetError>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn send(&self, req: Request) -> Result<Response, NetError> {
        let key = MockRequestKey::new(req.method, &req.url);
        self.requests.lock().await.push(req);
        let replies = self.replies.lock().await;
        replies.get(&key).cloned().unwrap_or_else(|| {
            Err(NetError::Connect(format!(
                "no mock response for {} {}",
                key.method, key.url
            )))
        })
    }

    pub async fn set_reply(&self, key: MockRequestKey, reply: Result<Response, NetError>) {
        self.replies.lock().await.insert(key, reply);
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.requests.lock().await.clone()
    }
}
