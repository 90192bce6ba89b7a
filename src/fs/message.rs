use std::io;

use tokio::sync::oneshot;

use crate::ArcPath;

/// Messages that can be sent to a [`Fs`](super::Fs) actor.
#[derive(Debug)]
pub enum Message {
    /// Reads a whole file as text
    ReadToString {
        tx: oneshot::Sender<io::Result<String>>,
        path: ArcPath,
    },
    /// Replaces the contents of a file
    Write {
        tx: oneshot::Sender<io::Result<()>>,
        path: ArcPath,
        contents: String,
    },
    /// Opens a file for writing, truncating it
    CreateFile {
        tx: oneshot::Sender<io::Result<tokio::fs::File>>,
        path: ArcPath,
    },
    /// Removes a file from the filesystem
    RemoveFile {
        tx: oneshot::Sender<io::Result<()>>,
        path: ArcPath,
    },
    /// Reads the contents of a directory
    ReadDir {
        tx: oneshot::Sender<io::Result<Vec<ArcPath>>>,
        path: ArcPath,
    },
    /// Creates a directory and its parents
    MkDir {
        tx: oneshot::Sender<io::Result<()>>,
        path: ArcPath,
    },
}
