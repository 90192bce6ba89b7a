use anyhow::Context;
use tokio::sync::{mpsc::Sender, oneshot};

use crate::log::Log;

mod core;
mod input;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use input::{InputReader, translate};
use message::Message;

/// The terminal actor owns the screen while the TUI runs.
///
/// It switches the terminal into raw mode on the alternate screen, draws the
/// text frames produced by the runtime and gives the screen back on release.
/// Keyboard input is read separately by an [`InputReader`].
#[derive(Debug, Clone)]
pub enum Terminal {
    Actual(Sender<Message>),
    /// Records frames in memory instead of drawing them
    Mock(mock::Mock),
}

impl Terminal {
    /// Builds the crossterm backed terminal and spawns its actor.
    pub fn spawn(log: Log) -> anyhow::Result<Self> {
        let (terminal, _) = core::Core::build(log)?.spawn();
        Ok(terminal)
    }

    pub fn mock(size: (u16, u16)) -> Self {
        Self::Mock(mock::Mock::new(size))
    }

    async fn request<T>(
        sender: &Sender<Message>,
        what: &'static str,
        make: impl FnOnce(oneshot::Sender<anyhow::Result<T>>) -> Message,
    ) -> anyhow::Result<T> {
        let (tx, rx) = oneshot::channel();
        sender
            .send(make(tx))
            .await
            .with_context(|| format!("{what} with Terminal actor"))?;
        rx.await
            .with_context(|| format!("Awaiting response for {what} with Terminal actor"))?
    }

    /// Enters raw mode and the alternate screen.
    pub async fn take_over(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Taking over", |tx| Message::TakeOver { tx }).await
            }
            Self::Mock(mock) => mock.take_over().await,
        }
    }

    /// Leaves the alternate screen and restores the cooked mode.
    pub async fn release(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Releasing", |tx| Message::Release { tx }).await
            }
            Self::Mock(mock) => mock.release().await,
        }
    }

    /// Replaces the screen content with `frame`.
    pub async fn draw(&self, frame: String) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Drawing", |tx| Message::Draw { frame, tx }).await
            }
            Self::Mock(mock) => mock.draw(frame).await,
        }
    }

    /// Current size as `(width, height)`
    pub async fn size(&self) -> anyhow::Result<(u16, u16)> {
        match self {
            Self::Actual(sender) => {
                Self::request(sender, "Reading size", |tx| Message::Size { tx }).await
            }
            Self::Mock(mock) => Ok(mock.size()),
        }
    }

    /// Frames drawn on a mock terminal, empty for the real one
    pub async fn frames(&self) -> Vec<String> {
        match self {
            Self::Actual(_) => Vec::new(),
            Self::Mock(mock) => mock.frames().await,
        }
    }
}
