use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    log::Log,
    tui::{Key, Message},
};

const SCOPE: &str = "terminal.input";
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reads crossterm events on a dedicated thread and forwards them as
/// [`Message`]s. The thread stops when [`stop`](Self::stop) is called or the
/// receiving side goes away.
#[derive(Debug)]
pub struct InputReader {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl InputReader {
    /// Must be called from within a tokio runtime.
    pub fn spawn(tx: UnboundedSender<Message>, log: Log) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        // the logger may need to spawn onto the runtime
        let runtime = tokio::runtime::Handle::current();
        let handle = thread::spawn(move || {
            let _guard = runtime.enter();
            read_loop(&tx, &flag, &log)
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the reader and waits for its thread to finish.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_loop(tx: &UnboundedSender<Message>, stop: &AtomicBool, log: &Log) {
    while !stop.load(Ordering::Relaxed) {
        let ready = match event::poll(POLL_INTERVAL) {
            Ok(ready) => ready,
            Err(e) => {
                log.error(SCOPE, format!("failed to poll terminal events: {e}"));
                return;
            }
        };
        if !ready {
            continue;
        }
        let event = match event::read() {
            Ok(event) => event,
            Err(e) => {
                log.error(SCOPE, format!("failed to read terminal event: {e}"));
                return;
            }
        };
        if let Some(msg) = translate(event) {
            if tx.send(msg).is_err() {
                return;
            }
        }
    }
}

/// Maps a crossterm event to a runtime message. Key releases, repeats and
/// keys without a counterpart in [`Key`] yield `None`.
pub fn translate(event: Event) -> Option<Message> {
    match event {
        Event::Key(key) => translate_key(key).map(Message::Key),
        Event::Resize(width, height) => Some(Message::Resize { width, height }),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let key = match key.code {
        KeyCode::Char(c) if ctrl => Key::Ctrl(c.to_ascii_lowercase()),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Esc,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };
    Some(key)
}
