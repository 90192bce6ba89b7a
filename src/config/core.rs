use anyhow::Context;

use crate::{ArcPath, fs::Fs};

use super::{data::Data, message::Message};

/// The core configuration actor that handles file I/O and data management.
///
/// The data lives in memory; `load` replaces it with the file contents and
/// `save` writes it back as TOML, creating the parent directory if needed.
pub struct Core {
    fs: Fs,
    path: ArcPath,
    data: Data,
}

impl Core {
    pub fn new(fs: Fs, path: ArcPath) -> Self {
        Self {
            fs,
            path,
            data: Data::default(),
        }
    }

    pub fn spawn(mut self) -> (super::Config, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Load { tx } => {
                        let _ = tx.send(self.load().await);
                    }
                    Message::Save { tx } => {
                        let _ = tx.send(self.save().await);
                    }
                    Message::Snapshot { tx } => {
                        let _ = tx.send(self.data.clone());
                    }
                    Message::GetStr { opt, tx } => {
                        let _ = tx.send(self.data.str(opt));
                    }
                    Message::SetStr { opt, value } => self.data.set_str(opt, &value),
                    Message::GetUSize { opt, tx } => {
                        let _ = tx.send(self.data.usize(opt));
                    }
                    Message::SetUSize { opt, size } => self.data.set_usize(opt, size),
                    Message::GetPath { opt, tx } => {
                        let _ = tx.send(self.data.path(opt));
                    }
                    Message::SetPath { opt, path } => self.data.set_path(opt, path),
                    Message::GetLogLevel { tx } => {
                        let _ = tx.send(self.data.log_level());
                    }
                    Message::SetLogLevel { level } => self.data.set_log_level(level),
                }
            }
        });
        (super::Config::Actual(tx), handle)
    }

    async fn load(&mut self) -> anyhow::Result<()> {
        let contents = self
            .fs
            .read_to_string(self.path.clone())
            .await
            .with_context(|| format!("Failed to read config file: {}", self.path.display()))?;
        self.data = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", self.path.display()))?;
        Ok(())
    }

    async fn save(&self) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize config")?;
        if let Some(parent) = self.path.parent() {
            self.fs
                .mkdir(ArcPath::from(parent))
                .await
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        self.fs
            .write(self.path.clone(), contents)
            .await
            .with_context(|| format!("Failed to write config file: {}", self.path.display()))?;
        Ok(())
    }
}
