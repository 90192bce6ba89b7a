use std::sync::Arc;

use anyhow::bail;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    taken_over: bool,
    frames: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Mock {
    size: (u16, u16),
    state: Arc<Mutex<State>>,
}

impl Mock {
    pub fn new(size: (u16, u16)) -> Self {
        Self {
            size,
            state: Default::default(),
        }
    }

    pub async fn take_over(&self) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if state.taken_over {
            bail!("Terminal already taken over");
        }
        state.taken_over = true;
        Ok(())
    }

    pub async fn release(&self) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if !state.taken_over {
            bail!("Terminal not taken over");
        }
        state.taken_over = false;
        Ok(())
    }

    pub async fn draw(&self, frame: String) -> anyhow::Result<()> {
        let mut state = self.state.lock().await;
        if !state.taken_over {
            bail!("Terminal not taken over");
        }
        state.frames.push(frame);
        Ok(())
    }

    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub async fn frames(&self) -> Vec<String> {
        self.state.lock().await.frames.clone()
    }
}
