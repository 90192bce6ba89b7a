//! Error taxonomy shared by background operations and the flows that render
//! their failures.

use std::fmt::Display;

use crate::ArcStr;

/// Classification of a failed background operation.
///
/// Flows never look at raw error strings to decide what to do next; they
/// branch on the kind and ask it whether a retry makes sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The remote service could not be reached or reported itself unhealthy
    ServiceUnavailable,
    /// The operation exceeded its deadline
    Timeout,
    /// A transport failure happened mid-request
    Network,
    /// The scraper could not extract content from the page
    Extraction,
    /// The user supplied something the service rejected
    InvalidInput,
    /// The service answered with something we could not understand, or the
    /// operation itself crashed
    InvalidResponse,
    /// The operation was cancelled before it finished
    Cancelled,
}

impl ErrorKind {
    /// Whether trying the same operation again may succeed.
    pub fn retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::ServiceUnavailable | ErrorKind::Network | ErrorKind::Timeout
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::ServiceUnavailable => "service unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network error",
            ErrorKind::Extraction => "extraction failed",
            ErrorKind::InvalidInput => "invalid input",
            ErrorKind::InvalidResponse => "invalid response",
            ErrorKind::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

/// A classified failure of a background operation.
///
/// `message` is meant for humans and is kept apart from `cause`, which holds
/// the low-level error text (if any) for the log file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct OpError {
    pub kind: ErrorKind,
    pub message: String,
    pub cause: Option<ArcStr>,
}

impl OpError {
    pub fn new<M: Display>(kind: ErrorKind, message: M) -> Self {
        Self {
            kind,
            message: message.to_string(),
            cause: None,
        }
    }

    /// Attaches the underlying error text
    pub fn with_cause<C: Display>(mut self, cause: C) -> Self {
        self.cause = Some(ArcStr::from(cause.to_string()));
        self
    }

    pub fn timeout<M: Display>(message: M) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "operation cancelled")
    }

    pub fn invalid_input<M: Display>(message: M) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn invalid_response<M: Display>(message: M) -> Self {
        Self::new(ErrorKind::InvalidResponse, message)
    }

    pub fn retryable(&self) -> bool {
        self.kind.retryable()
    }

    /// Short text suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self.kind {
            ErrorKind::ServiceUnavailable => {
                "Service unavailable. Please check if the service is running.".to_string()
            }
            ErrorKind::Timeout => {
                "Operation timed out. The service may be slow or busy.".to_string()
            }
            ErrorKind::Network => {
                "Network error occurred. Please check your connection and try again.".to_string()
            }
            ErrorKind::Extraction => {
                format!("Failed to extract content from URL: {}", self.message)
            }
            ErrorKind::InvalidInput => format!("Invalid input: {}", self.message),
            ErrorKind::InvalidResponse => {
                "Received an invalid response. Please try again.".to_string()
            }
            ErrorKind::Cancelled => "Operation was cancelled.".to_string(),
        }
    }

    /// The user message followed by a retry hint when one applies.
    pub fn user_message_with_hint(&self, retry_hint: &str) -> String {
        if self.retryable() {
            format!("{} {}", self.user_message(), retry_hint)
        } else {
            self.user_message()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::ServiceUnavailable.retryable());
        assert!(ErrorKind::Network.retryable());
        assert!(ErrorKind::Timeout.retryable());
        assert!(!ErrorKind::Extraction.retryable());
        assert!(!ErrorKind::InvalidInput.retryable());
        assert!(!ErrorKind::InvalidResponse.retryable());
        assert!(!ErrorKind::Cancelled.retryable());
    }

    #[test]
    fn test_user_message_keeps_cause_out() {
        let err = OpError::new(ErrorKind::Network, "socket closed").with_cause("ECONNRESET");
        assert!(!err.user_message().contains("ECONNRESET"));
        assert_eq!(err.cause.as_deref(), Some("ECONNRESET"));
    }

    #[test]
    fn test_extraction_message_includes_detail() {
        let err = OpError::new(ErrorKind::Extraction, "no readable content");
        assert_eq!(
            err.user_message(),
            "Failed to extract content from URL: no readable content"
        );
    }

    #[test]
    fn test_hint_only_for_retryable() {
        let timeout = OpError::timeout("slow");
        let input = OpError::invalid_input("bad url");
        assert!(timeout.user_message_with_hint("Press r to retry.").ends_with("Press r to retry."));
        assert!(!input.user_message_with_hint("Press r to retry.").contains("retry"));
    }
}
