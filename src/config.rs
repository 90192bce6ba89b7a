use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

pub use data::{Data, Key, PathOpt, StrOpt, USizeOpt};
use message::Message;

use crate::{ArcPath, ArcStr, fs::Fs, log::LogLevel};

mod core;
mod data;
mod message;
mod mock;

/// The configuration actor that provides a thread-safe interface for configuration operations.
///
/// # Examples
/// ```ignore
/// let config = Config::spawn(fs, config_path);
/// config.load().await?;
/// let base_url = config.str(StrOpt::ApiBaseUrl).await?;
/// ```
#[derive(Debug, Clone)]
pub enum Config {
    /// A real configuration actor that reads from and writes to a TOML file
    Actual(Sender<Message>),
    /// A mock implementation for testing that stores data in memory
    Mock(mock::Mock),
}

impl Config {
    /// Creates a new configuration instance backed by the file at `path` and
    /// spawns its actor. Values start at their defaults until [`load`](Self::load).
    pub fn spawn(fs: Fs, path: ArcPath) -> Self {
        let (config, _) = core::Core::new(fs, path).spawn();
        config
    }

    pub fn mock(data: Data) -> Self {
        Self::Mock(mock::Mock::new(data))
    }

    async fn request<T>(
        sender: &Sender<Message>,
        what: &'static str,
        make: impl FnOnce(oneshot::Sender<T>) -> Message,
    ) -> anyhow::Result<T> {
        let (tx, rx) = oneshot::channel();
        sender
            .send(make(tx))
            .await
            .with_context(|| format!("{what} with Config actor"))?;
        rx.await
            .with_context(|| format!("Awaiting response for {what} with Config actor"))
    }

    async fn notify(sender: &Sender<Message>, what: &'static str, msg: Message) -> anyhow::Result<()> {
        sender
            .send(msg)
            .await
            .with_context(|| format!("{what} with Config actor"))
    }

    /// Loads the configuration from the file.
    pub async fn load(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Loading config", |tx| Message::Load { tx }).await?
            }
            Self::Mock(_) => Ok(()),
        }
    }

    /// Saves the current configuration to the file.
    pub async fn save(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Saving config", |tx| Message::Save { tx }).await?
            }
            Self::Mock(_) => Ok(()),
        }
    }

    /// A copy of every configuration value
    pub async fn snapshot(&self) -> anyhow::Result<Data> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Reading snapshot", |tx| Message::Snapshot { tx }).await
            }
            Self::Mock(mock) => Ok(mock.with(|data| data.clone()).await),
        }
    }

    /// Fails when a value required to talk to the services is missing.
    pub async fn validate(&self) -> anyhow::Result<()> {
        self.snapshot().await?.validate()
    }

    pub async fn str(&self, opt: StrOpt) -> anyhow::Result<ArcStr> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting string", |tx| Message::GetStr { opt, tx }).await
            }
            Self::Mock(mock) => Ok(mock.with(|data| data.str(opt)).await),
        }
    }

    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting string", Message::SetStr { opt, value }).await
            }
            Self::Mock(mock) => {
                mock.with(|data| data.set_str(opt, &value)).await;
                Ok(())
            }
        }
    }

    pub async fn usize(&self, opt: USizeOpt) -> anyhow::Result<usize> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting numeric value", |tx| Message::GetUSize {
                    opt,
                    tx,
                })
                .await
            }
            Self::Mock(mock) => Ok(mock.with(|data| data.usize(opt)).await),
        }
    }

    pub async fn set_usize(&self, opt: USizeOpt, size: usize) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting numeric value", Message::SetUSize { opt, size })
                    .await
            }
            Self::Mock(mock) => {
                mock.with(|data| data.set_usize(opt, size)).await;
                Ok(())
            }
        }
    }

    pub async fn path(&self, opt: PathOpt) -> anyhow::Result<ArcPath> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting path", |tx| Message::GetPath { opt, tx }).await
            }
            Self::Mock(mock) => Ok(mock.with(|data| data.path(opt)).await),
        }
    }

    pub async fn set_path(&self, opt: PathOpt, path: ArcPath) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting path", Message::SetPath { opt, path }).await
            }
            Self::Mock(mock) => {
                mock.with(|data| data.set_path(opt, path)).await;
                Ok(())
            }
        }
    }

    pub async fn log_level(&self) -> anyhow::Result<LogLevel> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Getting log level", |tx| Message::GetLogLevel { tx }).await
            }
            Self::Mock(mock) => Ok(mock.with(|data| data.log_level()).await),
        }
    }

    pub async fn set_log_level(&self, level: LogLevel) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::notify(sender, "Setting log level", Message::SetLogLevel { level }).await
            }
            Self::Mock(mock) => {
                mock.with(|data| data.set_log_level(level)).await;
                Ok(())
            }
        }
    }
}
