use std::io::{Stdout, stdout};

use anyhow::bail;
use ratatui::{
    crossterm::{
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::CrosstermBackend,
    widgets::Paragraph,
};
use tokio::{sync::mpsc, task::JoinHandle};

use super::{Terminal, message::Message};
use crate::log::Log;

const SCOPE: &str = "terminal";

pub struct Core {
    taken_over: bool,
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
    log: Log,
}

impl Core {
    pub fn build(log: Log) -> anyhow::Result<Self> {
        let terminal = ratatui::Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            taken_over: false,
            terminal,
            log,
        })
    }

    pub fn spawn(mut self) -> (Terminal, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::TakeOver { tx } => {
                        let _ = tx.send(self.take_over());
                    }
                    Message::Release { tx } => {
                        let _ = tx.send(self.release());
                    }
                    Message::Draw { frame, tx } => {
                        let _ = tx.send(self.draw(frame));
                    }
                    Message::Size { tx } => {
                        let size = self
                            .terminal
                            .size()
                            .map(|s| (s.width, s.height))
                            .map_err(anyhow::Error::from);
                        let _ = tx.send(size);
                    }
                }
            }
            if self.taken_over {
                let _ = self.release();
            }
        });
        (Terminal::Actual(tx), handle)
    }

    fn take_over(&mut self) -> anyhow::Result<()> {
        if self.taken_over {
            bail!("Terminal already taken over");
        }
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.taken_over = true;
        self.log.info(SCOPE, "terminal taken over");
        Ok(())
    }

    fn release(&mut self) -> anyhow::Result<()> {
        if !self.taken_over {
            bail!("Terminal not taken over");
        }
        self.taken_over = false;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        self.terminal.show_cursor()?;
        self.log.info(SCOPE, "terminal released");
        Ok(())
    }

    fn draw(&mut self, frame: String) -> anyhow::Result<()> {
        if !self.taken_over {
            bail!("Terminal not taken over");
        }
        self.terminal.draw(|f| {
            let area = f.area();
            f.render_widget(Paragraph::new(frame), area);
        })?;
        Ok(())
    }
}
