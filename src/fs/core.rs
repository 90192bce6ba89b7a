use std::io;

use tokio::{
    fs::OpenOptions,
    sync::{mpsc, oneshot},
};

use crate::ArcPath;

use super::message::Message;

/// The core of the Fs actor, responsible for handling filesystem operations.
///
/// It wraps tokio's filesystem functions behind a message channel so every
/// other actor touches the disk through the same interface (and can be
/// handed a mock in tests).
#[derive(Debug, Default)]
pub struct Core;

impl Core {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn spawn(self) -> (super::Fs, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                use Message::*;
                match msg {
                    ReadToString { tx, path } => {
                        let _ = tx.send(tokio::fs::read_to_string(&path).await);
                    }
                    Write { tx, path, contents } => {
                        let _ = tx.send(tokio::fs::write(&path, contents).await);
                    }
                    CreateFile { tx, path } => Self::create_file(tx, path).await,
                    RemoveFile { tx, path } => {
                        let _ = tx.send(tokio::fs::remove_file(&path).await);
                    }
                    ReadDir { tx, path } => {
                        let _ = tx.send(Self::read_dir(path).await);
                    }
                    MkDir { tx, path } => {
                        let _ = tx.send(tokio::fs::create_dir_all(&path).await);
                    }
                }
            }
        });
        (super::Fs::Actual(tx), handle)
    }

    async fn create_file(tx: oneshot::Sender<io::Result<tokio::fs::File>>, path: ArcPath) {
        let res = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await;
        let _ = tx.send(res);
    }

    pub(super) async fn read_dir(path: ArcPath) -> io::Result<Vec<ArcPath>> {
        let mut rd = tokio::fs::read_dir(&path).await?;
        let mut entries = Vec::new();
        while let Some(entry) = rd.next_entry().await? {
            entries.push(ArcPath::from(entry.path()));
        }
        Ok(entries)
    }
}
