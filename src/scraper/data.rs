use serde::{Deserialize, Serialize};

/// What the scraping service extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeResult {
    pub success: bool,
    pub url: String,
    pub title: String,
    pub text: String,
    pub extracted_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Steps of a scrape, reported through the progress callback in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrapeStage {
    HealthCheck,
    Fetching,
    Extracting,
    Complete,
}

impl ScrapeStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ScrapeStage::HealthCheck => "health_check",
            ScrapeStage::Fetching => "fetching",
            ScrapeStage::Extracting => "extracting",
            ScrapeStage::Complete => "complete",
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeRequest<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub error: String,
}
