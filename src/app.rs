use anyhow::Result;

use crate::{ArcPath, terminal::Terminal};

mod core;
mod data;
#[cfg(test)]
mod tests;

pub use data::Command;

/// Central coordinator of the client.
///
/// It wires the actors and clients together from the configuration, then
/// either runs a one-shot [`Command`] or hands the terminal to the TUI.
#[derive(Debug)]
pub struct App {
    core: core::Core,
}

impl App {
    /// Spawns every actor and loads the configuration from `config_path`,
    /// or from `$HOME/.config/linkmgmt/config.toml` when it is `None`.
    pub async fn build(config_path: Option<ArcPath>) -> Result<Self> {
        let core = core::Core::build(config_path).await?;
        Ok(Self { core })
    }

    /// Runs a command and returns its printable report.
    pub async fn report(&self, command: Command) -> Result<String> {
        match command {
            Command::Links => self.core.links().await,
            Command::Health => self.core.health().await,
            Command::Scrape { url } => self.core.scrape(&url).await,
            Command::Add {
                url,
                title,
                description,
                server_scrape,
            } => {
                self.core
                    .add(url, title, description, server_scrape)
                    .await
            }
            Command::Config => self.core.show_config().await,
            Command::SetConfig { key, value } => self.core.set_config(&key, &value).await,
        }
    }

    /// Runs a one-shot command and prints its report to stdout.
    pub async fn resolve(&self, command: Command) -> Result<()> {
        let report = self.report(command).await?;
        println!("{report}");
        Ok(())
    }

    /// Takes over the terminal and runs the interactive interface until the
    /// user quits.
    pub async fn run_tui(&self) -> Result<()> {
        let terminal = Terminal::spawn(self.core.log())?;
        self.core.run_tui(terminal).await
    }

    /// Flushes the log. Buffered warnings and errors are printed to stderr.
    pub async fn shutdown(self) {
        let _ = self.core.log().flush().await;
    }
}
