use anyhow::Context;
use tokio::{fs::File, io::AsyncWriteExt, task::JoinHandle};

use super::data::{LogLevel, LogMessage};
use super::message::Message;
use crate::{ArcPath, fs::Fs};

const FILE_PREFIX: &str = "linkmgmt_";

/// The core of the logging system.
///
/// Every message goes to a timestamped log file and to `latest.log`. Messages
/// at or above `print_level` are also buffered and printed to stderr on
/// [`flush`](Self::flush), once the TUI has given the terminal back.
#[derive(Debug)]
pub struct LogCore {
    fs: Fs,
    log_dir: ArcPath,
    log_path: ArcPath,
    log_file: File,
    latest_log_file: File,
    logs_to_print: Vec<LogMessage>,
    print_level: LogLevel,
    /// Maximum age of log files in days, 0 keeps them forever
    max_age: usize,
}

impl LogCore {
    /// Creates the log directory and opens both log files.
    ///
    /// # Errors
    /// Fails if the directory or either file cannot be created.
    pub async fn build(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let log_path = ArcPath::from(log_dir.join(format!(
            "{FILE_PREFIX}{}.log",
            chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S")
        )));
        let latest_log_path = ArcPath::from(log_dir.join("latest.log"));

        fs.mkdir(log_dir.clone())
            .await
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_file = fs
            .create_file(log_path.clone())
            .await
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        let latest_log_file = fs
            .create_file(latest_log_path.clone())
            .await
            .with_context(|| {
                format!(
                    "Failed to create latest log file: {}",
                    latest_log_path.display()
                )
            })?;

        Ok(Self {
            fs,
            log_dir,
            log_path,
            log_file,
            latest_log_file,
            logs_to_print: Vec::new(),
            print_level: level,
            max_age,
        })
    }

    pub fn spawn(mut self) -> (super::Log, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Message::Log(msg) => self.log(msg).await,
                    Message::Flush => {
                        rx.close();
                        // Drain what was queued before the flush request
                        while let Ok(Message::Log(msg)) = rx.try_recv() {
                            self.log(msg).await;
                        }
                        self.flush();
                        break;
                    }
                    Message::CollectGarbage => self.collect_garbage().await,
                }
            }
        });
        (super::Log::Actual(tx), handle)
    }

    async fn log(&mut self, message: LogMessage) {
        let line = format!("{}\n", &message);
        // A failing log write must never take the application down
        let _ = self.log_file.write_all(line.as_bytes()).await;
        let _ = self.log_file.flush().await;
        let _ = self.latest_log_file.write_all(line.as_bytes()).await;
        let _ = self.latest_log_file.flush().await;

        if message.level >= self.print_level {
            self.logs_to_print.push(message);
        }
    }

    fn flush(self) {
        for message in &self.logs_to_print {
            eprintln!("{}", message);
        }
        if !self.logs_to_print.is_empty() {
            eprintln!("Check the full log file: {}", self.log_path.display());
        }
    }

    async fn collect_garbage(&mut self) {
        if self.max_age == 0 {
            return;
        }
        let now = std::time::SystemTime::now();
        let Ok(logs) = self.fs.read_dir(self.log_dir.clone()).await else {
            self.log(LogMessage::new(
                LogLevel::Error,
                super::SCOPE,
                "Failed to read the logs directory during garbage collection".into(),
            ))
            .await;
            return;
        };

        for log in logs {
            let Some(filename) = log.file_name() else {
                continue;
            };
            let filename = filename.to_string_lossy();
            if !filename.ends_with(".log") || !filename.starts_with(FILE_PREFIX) {
                continue;
            }
            let Ok(modified) = tokio::fs::metadata(&log).await.and_then(|m| m.modified()) else {
                continue;
            };
            let Ok(age) = now.duration_since(modified) else {
                continue;
            };
            let age_days = (age.as_secs() / 60 / 60 / 24) as usize;

            if age_days > self.max_age && self.fs.remove_file(log.clone()).await.is_err() {
                self.log(LogMessage::new(
                    LogLevel::Warning,
                    super::SCOPE,
                    format!("Failed to remove the log file: {}", log.display()),
                ))
                .await;
            }
        }
    }
}
