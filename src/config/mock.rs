use std::sync::Arc;
use tokio::sync::Mutex;

use super::Data;

/// Mock implementation of the Config actor for testing purposes.
///
/// The data is kept in memory; `load` and `save` always succeed.
#[derive(Debug, Clone)]
pub struct Mock {
    data: Arc<Mutex<Data>>,
}

impl Mock {
    pub fn new(data: Data) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    /// Runs `f` against the stored data
    pub async fn with<T>(&self, f: impl FnOnce(&mut Data) -> T) -> T {
        let mut data = self.data.lock().await;
        f(&mut data)
    }
}
