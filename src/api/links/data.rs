use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{ErrorKind, OpError},
    net::NetError,
};

/// Identifier of a stored link
pub type LinkId = Uuid;

/// A link as stored by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Payload of a link creation. Absent optionals are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCreate {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Partial update of a link; only the present fields change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// How the API should scrape when creating or enriching a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeOptions {
    pub enabled: bool,
    pub timeout_seconds: u64,
    /// Keep whatever title/text the link already has
    pub only_fill_empty: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_seconds: 30,
            only_fill_empty: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CreateWithScraping<'a> {
    pub link: &'a LinkCreate,
    pub options: &'a ScrapeOptions,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub error: String,
}

/// Failures of the link API client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Net(#[from] NetError),
    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("invalid response from API: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl From<ApiError> for OpError {
    fn from(err: ApiError) -> Self {
        let kind = match &err {
            ApiError::Net(net) => return OpError::from(net.clone()),
            ApiError::Status { status, .. } if (400..500).contains(status) => {
                ErrorKind::InvalidInput
            }
            ApiError::Status { status, .. } if *status >= 500 => ErrorKind::ServiceUnavailable,
            ApiError::Status { .. } | ApiError::Decode(_) => ErrorKind::InvalidResponse,
            ApiError::Encode(_) => ErrorKind::InvalidInput,
        };
        let message = match &err {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        };
        OpError::new(kind, message).with_cause(err)
    }
}

/// RFC 3339 timestamps, also accepting naive ISO 8601 values (taken as UTC)
/// as some database drivers emit them without an offset.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMATS: [&str; 3] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
