use std::io;

use tokio::sync::{mpsc::Sender, oneshot};

use crate::ArcPath;

mod core;
mod message;
mod mock;

use message::Message;

/// The fs actor is responsible for handling filesystem operations.
///
/// This enum represents either a real filesystem actor or a mock implementation
/// rooted in a temporary directory. It provides a unified interface for
/// filesystem operations regardless of the underlying implementation.
///
/// # Examples
/// ```ignore
/// let fs = Fs::spawn();
/// fs.write(path, "contents".into()).await?;
/// ```
#[derive(Debug, Clone)]
pub enum Fs {
    /// A real filesystem actor that interacts with the system
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(mock::Mock),
}

fn actor_died() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "fs actor died")
}

impl Fs {
    /// Spawns a new Fs actor
    pub fn spawn() -> Self {
        let (fs, _) = core::Core::new().spawn();
        fs
    }

    /// Creates a new mock instance of the Fs actor for testing. Every path is
    /// resolved inside a fresh temporary directory.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    async fn request<T>(
        sender: &Sender<Message>,
        make: impl FnOnce(oneshot::Sender<io::Result<T>>) -> Message,
    ) -> io::Result<T> {
        let (tx, rx) = oneshot::channel();
        sender.send(make(tx)).await.map_err(|_| actor_died())?;
        rx.await.map_err(|_| actor_died())?
    }

    /// Reads a whole file as UTF-8 text
    pub async fn read_to_string(&self, path: ArcPath) -> io::Result<String> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, |tx| Message::ReadToString { tx, path }).await
            }
            Self::Mock(mock) => mock.read_to_string(path).await,
        }
    }

    /// Replaces the contents of a file, creating it if needed
    pub async fn write(&self, path: ArcPath, contents: String) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, |tx| Message::Write { tx, path, contents }).await
            }
            Self::Mock(mock) => mock.write(path, contents).await,
        }
    }

    /// Opens a file for writing, truncating it first
    pub async fn create_file(&self, path: ArcPath) -> io::Result<tokio::fs::File> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, |tx| Message::CreateFile { tx, path }).await
            }
            Self::Mock(mock) => mock.create_file(path).await,
        }
    }

    /// Removes a file from the filesystem
    pub async fn remove_file(&self, path: ArcPath) -> io::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, |tx| Message::RemoveFile { tx, path }).await
            }
            Self::Mock(mock) => mock.remove_file(path).await,
        }
    }

    /// Lists the entries of a directory
    pub async fn read_dir(&self, path: ArcPath) -> io::Result<Vec<ArcPath>> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, |tx| Message::ReadDir { tx, path }).await
            }
            Self::Mock(mock) => mock.read_dir(path).await,
        }
    }

    /// Creates a directory and its parents if they don't exist
    pub async fn mkdir(&self, path: ArcPath) -> io::Result<()> {
        match self {
            Self::Actual(sender) => Self::request(sender, |tx| Message::MkDir { tx, path }).await,
            Self::Mock(mock) => mock.mkdir(path).await,
        }
    }
}
