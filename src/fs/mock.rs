use std::{
    io,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use tempfile::TempDir;

use crate::ArcPath;

/// Mock implementation of the Fs actor for testing purposes.
///
/// Every path, absolute or relative, is re-rooted inside a temporary
/// directory that lives as long as the last clone of the mock.
#[derive(Debug, Clone)]
pub struct Mock {
    temp_dir: Arc<TempDir>,
}

impl Mock {
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir for Fs mock");
        Self {
            temp_dir: Arc::new(temp_dir),
        }
    }

    /// Maps a caller path to its location inside the temporary directory.
    fn mock_path(&self, path: &Path) -> PathBuf {
        let relative: PathBuf = path
            .components()
            .filter(|c| matches!(c, Component::Normal(_) | Component::ParentDir))
            .collect();
        self.temp_dir.path().join(relative)
    }

    pub async fn read_to_string(&self, path: ArcPath) -> io::Result<String> {
        tokio::fs::read_to_string(self.mock_path(&path)).await
    }

    pub async fn write(&self, path: ArcPath, contents: String) -> io::Result<()> {
        tokio::fs::write(self.mock_path(&path), contents).await
    }

    pub async fn create_file(&self, path: ArcPath) -> io::Result<tokio::fs::File> {
        tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.mock_path(&path))
            .await
    }

    pub async fn remove_file(&self, path: ArcPath) -> io::Result<()> {
        // Paths handed out by `read_dir` are already inside the temp dir
        let real = if path.starts_with(self.temp_dir.path()) {
            path.to_path_buf()
        } else {
            self.mock_path(&path)
        };
        tokio::fs::remove_file(real).await
    }

    pub async fn read_dir(&self, path: ArcPath) -> io::Result<Vec<ArcPath>> {
        super::core::Core::read_dir(ArcPath::from(self.mock_path(&path))).await
    }

    pub async fn mkdir(&self, path: ArcPath) -> io::Result<()> {
        tokio::fs::create_dir_all(self.mock_path(&path)).await
    }
}
