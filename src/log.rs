use std::fmt::Display;

use tokio::{
    sync::mpsc::{Sender, error::TrySendError},
    task::JoinHandle,
};

use crate::{ArcPath, fs::Fs};

mod core;
mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{LogLevel, LogMessage};
use message::Message;

const SCOPE: &str = "log";

/// The logging actor that provides a thread-safe interface for logging operations.
///
/// Every call is tagged with a scope, the name of the module that produced
/// the message, so the log file reads like `[ts] [WARN] [tui.runner] ...`.
///
/// # Examples
/// ```ignore
/// let log = Log::spawn(fs, LogLevel::Warning, 7, log_dir).await?;
/// log.info("app", "Application started");
/// ```
#[derive(Debug, Clone)]
pub enum Log {
    /// A real logging actor that writes to files and stderr
    Actual(Sender<Message>),
    /// A mock implementation for testing that keeps messages in memory
    Mock(mock::Mock),
}

impl Log {
    /// Builds the logger core and spawns its actor.
    ///
    /// # Arguments
    /// * `fs` - Filesystem actor used to create the log files
    /// * `level` - Minimum level printed to stderr on [`flush`](Self::flush)
    /// * `max_age` - Maximum age of log files in days, 0 disables cleanup
    /// * `log_dir` - Directory where log files are stored
    pub async fn spawn(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let (log, _) = core::LogCore::build(fs, level, max_age, log_dir)
            .await?
            .spawn();
        Ok(log)
    }

    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    /// Sends a [`LogMessage`] to the logger without blocking the caller.
    fn log(&self, scope: &'static str, message: String, level: LogLevel) {
        let message = LogMessage::new(level, scope, message);
        match self {
            Self::Actual(sender) => {
                // The logger is gone after a flush; late messages are dropped
                if let Err(TrySendError::Full(message)) = sender.try_send(Message::Log(message)) {
                    let sender = sender.clone();
                    tokio::spawn(async move {
                        let _ = sender.send(message).await;
                    });
                }
            }
            Self::Mock(mock) => mock.log(message),
        }
    }

    /// Log a message with the `INFO` level
    pub fn info<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Info);
    }

    /// Log a message with the `WARNING` level
    pub fn warn<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Warning);
    }

    /// Log a message with the `ERROR` level
    pub fn error<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Error);
    }

    /// Log an info message if the result is an error and return the result as is
    pub fn info_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        if let Err(err) = &result {
            self.log(scope, err.to_string(), LogLevel::Info);
        }
        result
    }

    /// Log a warning message if the result is an error and return the result as is
    pub fn warn_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        if let Err(err) = &result {
            self.log(scope, err.to_string(), LogLevel::Warning);
        }
        result
    }

    /// Log an error message if the result is an error and return the result as is
    pub fn error_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        if let Err(err) = &result {
            self.log(scope, err.to_string(), LogLevel::Error);
        }
        result
    }

    /// Flushes the logger by printing its buffered messages to stderr and
    /// stopping the actor. Messages logged afterwards are dropped.
    pub fn flush(self) -> JoinHandle<()> {
        match self {
            Self::Actual(sender) => tokio::spawn(async move {
                let _ = sender.send(Message::Flush).await;
                sender.closed().await;
            }),
            Self::Mock(_) => tokio::spawn(async {}),
        }
    }

    /// Deletes log files older than the `max_age` given at [`spawn`](Self::spawn)
    pub async fn collect_garbage(&self) {
        if let Self::Actual(sender) = self {
            let _ = sender.send(Message::CollectGarbage).await;
        }
    }

    /// Messages recorded by a mock logger, empty for the real one
    pub fn get_messages(&self) -> Vec<LogMessage> {
        match self {
            Self::Actual(_) => Vec::new(),
            Self::Mock(mock) => mock.get_messages(),
        }
    }
}
