use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ArcPath, ArcStr, log::LogLevel};

/// Options for string configuration values that can be accessed and modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrOpt {
    /// Base URL of the link API, e.g. `http://localhost:8000`
    ApiBaseUrl,
    /// Bearer token sent with every API request
    ApiKey,
    /// Base URL of the scraping service
    ScraperBaseUrl,
}

/// Options for numeric configuration values that can be accessed and modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum USizeOpt {
    /// Timeout for a scrape, in seconds
    ScrapeTimeout,
    /// Timeout for regular API requests, in seconds
    RequestTimeout,
    /// Maximum age of log files in days before they are deleted
    MaxAge,
}

/// Options for path-based configuration values that can be accessed and modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOpt {
    /// Directory where log files are stored
    LogDir,
}

/// A configuration key as written in the TOML file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Str(StrOpt),
    USize(USizeOpt),
    Path(PathOpt),
    LogLevel,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Str(StrOpt::ApiBaseUrl),
        Key::Str(StrOpt::ApiKey),
        Key::Str(StrOpt::ScraperBaseUrl),
        Key::USize(USizeOpt::ScrapeTimeout),
        Key::USize(USizeOpt::RequestTimeout),
        Key::Path(PathOpt::LogDir),
        Key::LogLevel,
        Key::USize(USizeOpt::MaxAge),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Key::Str(StrOpt::ApiBaseUrl) => "api_base_url",
            Key::Str(StrOpt::ApiKey) => "api_key",
            Key::Str(StrOpt::ScraperBaseUrl) => "scraper_base_url",
            Key::USize(USizeOpt::ScrapeTimeout) => "scrape_timeout",
            Key::USize(USizeOpt::RequestTimeout) => "request_timeout",
            Key::USize(USizeOpt::MaxAge) => "max_age",
            Key::Path(PathOpt::LogDir) => "log_dir",
            Key::LogLevel => "log_level",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Key::ALL
            .into_iter()
            .find(|k| k.name() == name)
            .ok_or_else(|| {
                let known: Vec<_> = Key::ALL.iter().map(|k| k.name()).collect();
                anyhow::anyhow!(
                    "Unknown configuration key {name:?} (expected one of: {})",
                    known.join(", ")
                )
            })
    }
}

/// The configuration data structure that holds all configurable values.
///
/// Missing keys in the TOML file fall back to their defaults, so a file that
/// only sets `api_base_url` and `api_key` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Data {
    api_base_url: String,
    api_key: String,
    scraper_base_url: String,
    scrape_timeout: usize,
    request_timeout: usize,
    log_dir: PathBuf,
    log_level: LogLevel,
    max_age: usize,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            api_key: String::new(),
            scraper_base_url: "http://localhost:8080".to_string(),
            scrape_timeout: 30,
            request_timeout: 30,
            log_dir: PathBuf::from("/tmp/linkmgmt/logs"),
            log_level: LogLevel::Warning,
            max_age: 0,
        }
    }
}

impl Data {
    pub fn str(&self, opt: StrOpt) -> ArcStr {
        match opt {
            StrOpt::ApiBaseUrl => ArcStr::from(self.api_base_url.as_str()),
            StrOpt::ApiKey => ArcStr::from(self.api_key.as_str()),
            StrOpt::ScraperBaseUrl => ArcStr::from(self.scraper_base_url.as_str()),
        }
    }

    pub fn set_str(&mut self, opt: StrOpt, value: &str) {
        let value = value.to_string();
        match opt {
            StrOpt::ApiBaseUrl => self.api_base_url = value,
            StrOpt::ApiKey => self.api_key = value,
            StrOpt::ScraperBaseUrl => self.scraper_base_url = value,
        }
    }

    pub fn usize(&self, opt: USizeOpt) -> usize {
        match opt {
            USizeOpt::ScrapeTimeout => self.scrape_timeout,
            USizeOpt::RequestTimeout => self.request_timeout,
            USizeOpt::MaxAge => self.max_age,
        }
    }

    pub fn set_usize(&mut self, opt: USizeOpt, value: usize) {
        match opt {
            USizeOpt::ScrapeTimeout => self.scrape_timeout = value,
            USizeOpt::RequestTimeout => self.request_timeout = value,
            USizeOpt::MaxAge => self.max_age = value,
        }
    }

    /// Reads a numeric option as a duration in seconds
    pub fn seconds(&self, opt: USizeOpt) -> Duration {
        Duration::from_secs(self.usize(opt) as u64)
    }

    pub fn path(&self, opt: PathOpt) -> ArcPath {
        match opt {
            PathOpt::LogDir => ArcPath::from(self.log_dir.as_path()),
        }
    }

    pub fn set_path(&mut self, opt: PathOpt, path: ArcPath) {
        match opt {
            PathOpt::LogDir => self.log_dir = path.to_path_buf(),
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    /// Checks that the values the clients cannot work without are present.
    ///
    /// # Errors
    /// Names the first missing or malformed value.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url is not configured");
        }
        if self.api_key.trim().is_empty() {
            anyhow::bail!("api_key is not configured");
        }
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("scraper_base_url", &self.scraper_base_url),
        ] {
            reqwest::Url::parse(url.trim())
                .map_err(|e| anyhow::anyhow!("{name} is not a valid URL: {e}"))?;
        }
        if self.scrape_timeout == 0 || self.request_timeout == 0 {
            anyhow::bail!("timeouts must be at least one second");
        }
        Ok(())
    }
}
