use std::time::Duration;

use crate::ArcStr;

/// HTTP methods the clients need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        write!(f, "{name}")
    }
}

/// An HTTP request description handed to the [`Net`](super::Net) actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: ArcStr,
    pub headers: Vec<(ArcStr, ArcStr)>,
    pub body: Option<ArcStr>,
    /// Overrides the client-wide timeout for this request
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<ArcStr>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(url: impl Into<ArcStr>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<ArcStr>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((ArcStr::from(key), ArcStr::from(value)));
        self
    }

    /// Sets a JSON body and the matching content type
    pub fn json(self, body: String) -> Self {
        let mut req = self.header("Content-Type", "application/json");
        req.body = Some(ArcStr::from(body));
        req
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status and body of a completed HTTP exchange. Non-2xx statuses are not
/// errors at this layer; the API clients interpret them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: ArcStr,
}

impl Response {
    pub fn new(status: u16, body: impl Into<ArcStr>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for NetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetError::Timeout(err.to_string())
        } else if err.is_connect() {
            NetError::Connect(err.to_string())
        } else {
            NetError::Transport(err.to_string())
        }
    }
}

/// Key used to look up canned responses in the mock
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockRequestKey {
    pub method: Method,
    pub url: String,
}

impl MockRequestKey {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
        }
    }

    pub fn get(url: &str) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: &str) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: &str) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: &str) -> Self {
        Self::new(Method::Delete, url)
    }
}

impl From<NetError> for crate::error::OpError {
    fn from(err: NetError) -> Self {
        use crate::error::{ErrorKind, OpError};
        let kind = match &err {
            NetError::Timeout(_) => ErrorKind::Timeout,
            NetError::Connect(_) => ErrorKind::ServiceUnavailable,
            NetError::Transport(_) => ErrorKind::Network,
        };
        OpError::new(kind, &err).with_cause(&err)
    }
}
