use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers,
};

use super::*;
use crate::tui::{Key, Message};

fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
    Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::NONE,
    })
}

#[test]
fn test_translate_plain_keys() {
    assert_eq!(
        translate(press(KeyCode::Char('a'), KeyModifiers::NONE)),
        Some(Message::Key(Key::Char('a')))
    );
    assert_eq!(
        translate(press(KeyCode::Char('?'), KeyModifiers::SHIFT)),
        Some(Message::Key(Key::Char('?')))
    );
    assert_eq!(
        translate(press(KeyCode::Enter, KeyModifiers::NONE)),
        Some(Message::Key(Key::Enter))
    );
    assert_eq!(
        translate(press(KeyCode::BackTab, KeyModifiers::SHIFT)),
        Some(Message::Key(Key::BackTab))
    );
}

#[test]
fn test_translate_control_chords() {
    assert_eq!(
        translate(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Message::Key(Key::Ctrl('c')))
    );
    assert_eq!(
        translate(press(KeyCode::Char('S'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)),
        Some(Message::Key(Key::Ctrl('s')))
    );
}

#[test]
fn test_translate_ignores_releases_and_unknown_keys() {
    let release = Event::Key(KeyEvent {
        code: KeyCode::Char('q'),
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Release,
        state: KeyEventState::NONE,
    });
    assert_eq!(translate(release), None);
    assert_eq!(translate(press(KeyCode::F(5), KeyModifiers::NONE)), None);
    assert_eq!(translate(Event::FocusGained), None);
}

#[test]
fn test_translate_resize() {
    assert_eq!(
        translate(Event::Resize(120, 40)),
        Some(Message::Resize {
            width: 120,
            height: 40
        })
    );
}

#[tokio::test]
async fn test_mock_records_frames_only_while_taken_over() {
    let terminal = Terminal::mock((80, 24));
    assert!(terminal.draw("early".into()).await.is_err());

    terminal.take_over().await.unwrap();
    assert!(terminal.take_over().await.is_err());
    terminal.draw("one".into()).await.unwrap();
    terminal.draw("two".into()).await.unwrap();
    terminal.release().await.unwrap();
    assert!(terminal.release().await.is_err());

    assert_eq!(terminal.frames().await, vec!["one", "two"]);
    assert_eq!(terminal.size().await.unwrap(), (80, 24));
}
