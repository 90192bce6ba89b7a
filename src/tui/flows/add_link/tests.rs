use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::error::OpError;

fn flow(scrape: bool) -> AddLinkFlow {
    let mut flow = AddLinkFlow::new(1, scrape, Settings::default());
    assert_eq!(flow.init(), Command::FocusInput);
    flow
}

fn key(flow: &mut AddLinkFlow, key: Key) -> Command {
    flow.update(Message::Key(key))
}

fn type_str(flow: &mut AddLinkFlow, s: &str) {
    for c in s.chars() {
        key(flow, Key::Char(c));
    }
}

fn started_op(cmd: &Command) -> OpId {
    match cmd {
        Command::RunAsync { op, .. } => *op,
        other => panic!("expected RunAsync, got {other:?}"),
    }
}

fn scraped(title: &str, text: &str) -> Outcome {
    Outcome::Ok(Payload::Scraped {
        result: ScrapeResult {
            success: true,
            url: "https://example.com/a".into(),
            title: title.into(),
            text: text.into(),
            extracted_at: None,
            error: None,
        },
        elapsed: Duration::from_millis(1500),
    })
}

fn saved(url: &str) -> Outcome {
    let now = Utc::now();
    Outcome::Ok(Payload::Link(Link {
        id: Uuid::new_v4(),
        user_id: None,
        url: url.into(),
        title: None,
        description: None,
        text: None,
        created_at: now,
        updated_at: now,
    }))
}

/// Brings a scraping flow to the review step without any scraped content
fn at_review() -> AddLinkFlow {
    let mut flow = flow(true);
    type_str(&mut flow, "https://example.com/a");
    key(&mut flow, Key::Ctrl('s'));
    assert_eq!(flow.step(), &Step::Review);
    flow
}

#[test]
fn test_scrape_success_prefills_review() {
    let mut flow = flow(true);
    type_str(&mut flow, "https://example.com/a");
    let cmd = key(&mut flow, Key::Enter);
    let op = started_op(&cmd);
    assert!(matches!(
        cmd,
        Command::RunAsync {
            slot: Slot::Scrape,
            operation: Operation::Scrape { ref url },
            ..
        } if url == "https://example.com/a"
    ));
    assert!(!flow.captures_text());

    flow.update(Message::AsyncProgress {
        op,
        stage: Stage::Fetching,
        text: "Sending scrape request...".into(),
    });
    assert!(matches!(
        flow.step(),
        Step::Scraping {
            stage: Stage::Fetching,
            ..
        }
    ));

    let cmd = flow.update(Message::AsyncResult {
        op,
        outcome: scraped("A", "body"),
    });
    assert_eq!(cmd, Command::FocusInput);
    assert_eq!(flow.step(), &Step::Review);
    assert_eq!(flow.focus(), Field::Title);
    assert_eq!(flow.value(Field::Title), "A");
    assert_eq!(flow.value(Field::Text), "body");
    assert!(flow.is_scraped(Field::Title));
    assert!(flow.is_scraped(Field::Text));
    assert!(flow.view(&ViewCtx::default()).contains("A (scraped)"));
}

#[test]
fn test_scrape_timeout_falls_back_to_manual_entry() {
    let mut flow = flow(true);
    type_str(&mut flow, "https://example.com/a");
    let op = started_op(&key(&mut flow, Key::Enter));

    flow.update(Message::AsyncResult {
        op,
        outcome: Outcome::Err(OpError::timeout("operation timed out after 30s")),
    });
    assert_eq!(flow.step(), &Step::Review);
    assert_eq!(flow.value(Field::Title), "");
    assert_eq!(flow.value(Field::Text), "");
    let warning = flow.warning().unwrap();
    assert!(warning.starts_with("Scraping failed: Operation timed out."));
    assert!(warning.ends_with("(you can still fill fields manually)"));
    assert!(flow.view(&ViewCtx::default()).contains("Operation timed out"));
}

#[test]
fn test_esc_while_scraping_cancels_and_moves_to_review() {
    let mut flow = flow(true);
    type_str(&mut flow, "https://example.com/a");
    let op = started_op(&key(&mut flow, Key::Enter));

    let cmd = key(&mut flow, Key::Esc);
    assert_eq!(
        cmd,
        Command::Batch(vec![Command::Cancel(op), Command::FocusInput])
    );
    assert_eq!(flow.step(), &Step::Review);
}

#[test]
fn test_late_scrape_result_after_cancel_is_ignored() {
    let mut flow = flow(true);
    type_str(&mut flow, "https://example.com/a");
    let op = started_op(&key(&mut flow, Key::Enter));
    key(&mut flow, Key::Esc);
    type_str(&mut flow, "Mine");

    let before_step = flow.step().clone();
    let before_payload = flow.payload();
    for msg in [
        Message::AsyncProgress {
            op,
            stage: Stage::Extracting,
            text: "Extracting content from URL...".into(),
        },
        Message::AsyncResult {
            op,
            outcome: scraped("Theirs", "text"),
        },
    ] {
        assert_eq!(flow.update(msg), Command::None);
    }
    assert_eq!(flow.step(), &before_step);
    assert_eq!(flow.payload(), before_payload);
    assert_eq!(flow.value(Field::Title), "Mine");
}

#[test]
fn test_superseded_save_result_is_ignored() {
    let mut flow = at_review();
    let first = started_op(&key(&mut flow, Key::Enter));
    key(&mut flow, Key::Esc);
    let second = started_op(&key(&mut flow, Key::Enter));
    assert_ne!(first, second);

    flow.update(Message::AsyncResult {
        op: first,
        outcome: saved("https://example.com/a"),
    });
    assert_eq!(flow.step(), &Step::Saving { op: second });

    flow.update(Message::AsyncResult {
        op: second,
        outcome: saved("https://example.com/a"),
    });
    assert!(matches!(flow.step(), Step::Success { .. }));
}

#[test]
fn test_failed_save_keeps_fields_and_payload() {
    let mut flow = at_review();
    type_str(&mut flow, "  Title  ");
    key(&mut flow, Key::Tab);
    type_str(&mut flow, "Description");
    key(&mut flow, Key::Tab);
    type_str(&mut flow, "Some text");

    let cmd = key(&mut flow, Key::Enter);
    let op = started_op(&cmd);
    let Command::RunAsync {
        operation: Operation::CreateLink(first),
        slot: Slot::Save,
        ..
    } = cmd
    else {
        panic!("expected a save");
    };

    flow.update(Message::AsyncResult {
        op,
        outcome: Outcome::Err(OpError::new(
            crate::error::ErrorKind::ServiceUnavailable,
            "connection refused",
        )),
    });
    assert_eq!(flow.step(), &Step::Review);
    let error = flow.error().unwrap();
    assert!(error.contains("Service unavailable"));
    assert!(error.ends_with("Press Enter to retry."));

    let Command::RunAsync {
        operation: Operation::CreateLink(second),
        ..
    } = key(&mut flow, Key::Enter)
    else {
        panic!("expected a second save");
    };
    assert_eq!(first, second);
    assert_eq!(
        second,
        LinkCreate {
            url: "https://example.com/a".into(),
            title: Some("Title".into()),
            description: Some("Description".into()),
            text: Some("Some text".into()),
        }
    );
}

#[test]
fn test_url_validation_keeps_step() {
    let mut flow = flow(true);
    assert_eq!(key(&mut flow, Key::Enter), Command::None);
    assert_eq!(flow.error(), Some("URL is required"));
    assert_eq!(flow.step(), &Step::UrlInput);

    type_str(&mut flow, "not a url");
    key(&mut flow, Key::Enter);
    assert!(flow.error().unwrap().starts_with("invalid URL"));
    assert_eq!(flow.step(), &Step::UrlInput);
}

#[test]
fn test_basic_mode_skips_scraping() {
    let mut flow = flow(false);
    type_str(&mut flow, "https://example.com");
    assert_eq!(key(&mut flow, Key::Enter), Command::FocusInput);
    assert_eq!(flow.step(), &Step::Review);
}

#[test]
fn test_scrape_never_overwrites_typed_text() {
    let mut flow = at_review();
    type_str(&mut flow, "Typed");
    flow.merge(&ScrapeResult {
        success: true,
        title: "Scraped".into(),
        text: "Scraped text".into(),
        ..ScrapeResult::default()
    });
    assert_eq!(flow.value(Field::Title), "Typed");
    assert!(!flow.is_scraped(Field::Title));
    assert_eq!(flow.value(Field::Text), "Scraped text");
    assert!(flow.is_scraped(Field::Text));
}

#[test]
fn test_focus_cycles_through_fields() {
    let mut flow = at_review();
    assert_eq!(flow.focus(), Field::Title);
    for expected in [Field::Description, Field::Text, Field::Url, Field::Title] {
        key(&mut flow, Key::Tab);
        assert_eq!(flow.focus(), expected);
    }
    key(&mut flow, Key::BackTab);
    assert_eq!(flow.focus(), Field::Url);
}

#[test]
fn test_payload_omits_empty_fields() {
    let flow = at_review();
    assert_eq!(
        flow.payload(),
        LinkCreate {
            url: "https://example.com/a".into(),
            ..LinkCreate::default()
        }
    );
}

#[test]
fn test_success_shows_link_and_returns_on_any_key() {
    let mut flow = flow(true);
    type_str(&mut flow, "https://example.com/a");
    let op = started_op(&key(&mut flow, Key::Enter));
    flow.update(Message::AsyncResult {
        op,
        outcome: scraped("A", "body"),
    });
    let op = started_op(&key(&mut flow, Key::Enter));
    flow.update(Message::AsyncResult {
        op,
        outcome: saved("https://example.com/a"),
    });
    let view = flow.view(&ViewCtx::default());
    assert!(view.contains("URL: https://example.com/a"));
    assert!(view.contains("Scraped in 1.5s"));
    assert_eq!(key(&mut flow, Key::Char('x')), Command::ReturnToMenu);
}
