use std::sync::{Arc, Mutex};

use crate::log::LogMessage;

/// Mock implementation of the Log actor for testing purposes.
///
/// Messages are stored in memory synchronously, so a test can inspect them
/// right after the code under test returns.
#[derive(Debug, Clone, Default)]
pub struct Mock {
    messages: Arc<Mutex<Vec<LogMessage>>>,
}

impl Mock {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn log(&self, message: LogMessage) {
        if let Ok(mut lock) = self.messages.lock() {
            lock.push(message);
        }
    }

    /// Gets all logged messages in the order they were logged.
    pub fn get_messages(&self) -> Vec<LogMessage> {
        self.messages
            .lock()
            .map(|lock| lock.clone())
            .unwrap_or_default()
    }
}
