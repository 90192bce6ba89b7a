use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError, unbounded_channel};
use uuid::Uuid;

use super::*;
use crate::{
    api::links::{ApiError, LinkCreate, MockOp},
    scraper::ScrapeResult,
};

fn page() -> ScrapeResult {
    ScrapeResult {
        success: true,
        url: "https://example.com/a".into(),
        title: "A".into(),
        text: "body".into(),
        extracted_at: None,
        error: None,
    }
}

fn setup(api: LinkApi, scraper: Scraper) -> (Runner, UnboundedReceiver<Message>) {
    let (tx, rx) = unbounded_channel();
    (Runner::new(api, scraper, Log::mock(), tx), rx)
}

fn op(seq: u64) -> OpId {
    OpId { flow: 1, seq }
}

fn scrape() -> Operation {
    Operation::Scrape {
        url: "https://example.com/a".into(),
    }
}

async fn next(rx: &mut UnboundedReceiver<Message>) -> Message {
    tokio::time::timeout(Duration::from_secs(600), rx.recv())
        .await
        .expect("no message from the runner")
        .expect("runner channel closed")
}

/// Collects messages up to and including the first result of `id`
async fn until_result(rx: &mut UnboundedReceiver<Message>, id: OpId) -> (Vec<Stage>, Outcome) {
    let mut stages = Vec::new();
    loop {
        match next(rx).await {
            Message::AsyncProgress { op, stage, .. } if op == id => stages.push(stage),
            Message::AsyncResult { op, outcome } if op == id => return (stages, outcome),
            _ => {}
        }
    }
}

async fn assert_quiet(rx: &mut UnboundedReceiver<Message>) {
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(rx.try_recv().unwrap_err(), TryRecvError::Empty);
}

#[tokio::test]
async fn test_scrape_reports_stages_then_one_result() {
    let (mut runner, mut rx) = setup(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())));
    runner.start(op(1), Slot::Scrape, scrape(), Duration::from_secs(30));
    assert!(runner.is_live(op(1)));

    let (stages, outcome) = until_result(&mut rx, op(1)).await;
    assert_eq!(
        stages,
        vec![Stage::HealthCheck, Stage::Fetching, Stage::Extracting, Stage::Done]
    );
    let Outcome::Ok(Payload::Scraped { result, .. }) = &outcome else {
        panic!("unexpected outcome {outcome:?}");
    };
    assert_eq!(result.title, "A");

    let finished = runner.finish(op(1), &outcome).unwrap();
    assert_eq!(finished.stage, Stage::Done);
    assert!(!runner.is_live(op(1)));
    assert_quiet(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_idempotent() {
    let scraper = Scraper::mock(Ok(page()));
    scraper.mock_set_delay(Some(Duration::from_secs(60))).await;
    let (mut runner, mut rx) = setup(LinkApi::mock(Vec::new()), scraper);

    runner.start(op(1), Slot::Scrape, scrape(), Duration::from_secs(120));
    tokio::task::yield_now().await;
    assert!(runner.cancel(op(1)));
    assert!(!runner.cancel(op(1)));

    let (stages, outcome) = until_result(&mut rx, op(1)).await;
    assert_eq!(outcome, Outcome::Cancelled);
    assert!(!stages.contains(&Stage::Extracting));

    assert!(runner.finish(op(1), &outcome).is_none());
    assert!(!runner.cancel(op(1)));
    assert!(!runner.cancel(op(42)));
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn test_cancel_after_completion_is_silent() {
    let (mut runner, mut rx) = setup(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())));
    runner.start(op(1), Slot::Load, Operation::ListLinks, Duration::from_secs(5));
    let (_, outcome) = until_result(&mut rx, op(1)).await;
    assert_eq!(outcome, Outcome::Ok(Payload::Links(Vec::new())));
    runner.finish(op(1), &outcome);

    assert!(!runner.cancel(op(1)));
    assert_quiet(&mut rx).await;
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_enforced_by_the_runner() {
    let scraper = Scraper::mock(Ok(page()));
    scraper.mock_set_delay(Some(Duration::from_secs(300))).await;
    let (mut runner, mut rx) = setup(LinkApi::mock(Vec::new()), scraper);

    runner.start(op(1), Slot::Scrape, scrape(), Duration::from_secs(30));
    let (_, outcome) = until_result(&mut rx, op(1)).await;
    let Outcome::Err(err) = outcome else {
        panic!("expected a timeout, got {outcome:?}");
    };
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(err.retryable());
}

#[tokio::test]
async fn test_panic_becomes_invalid_response() {
    let scraper = Scraper::mock(Ok(page()));
    scraper.mock_set_panics(true).await;
    let (mut runner, mut rx) = setup(LinkApi::mock(Vec::new()), scraper);

    runner.start(op(1), Slot::Scrape, scrape(), Duration::from_secs(30));
    let (_, outcome) = until_result(&mut rx, op(1)).await;
    let Outcome::Err(err) = outcome else {
        panic!("expected an error, got {outcome:?}");
    };
    assert_eq!(err.kind, ErrorKind::InvalidResponse);
    assert_eq!(err.cause.as_deref(), Some("mock scraper exploded"));
}

#[tokio::test(start_paused = true)]
async fn test_new_operation_supersedes_slot() {
    let scraper = Scraper::mock(Ok(page()));
    scraper.mock_set_delay(Some(Duration::from_secs(10))).await;
    let (mut runner, mut rx) = setup(LinkApi::mock(Vec::new()), scraper);

    runner.start(op(1), Slot::Scrape, scrape(), Duration::from_secs(30));
    runner.start(op(2), Slot::Scrape, scrape(), Duration::from_secs(30));
    assert!(!runner.is_live(op(1)));
    assert!(runner.is_live(op(2)));
    assert_eq!(runner.in_slot(Slot::Scrape), Some(op(2)));

    let mut results = Vec::new();
    while results.len() < 2 {
        if let Message::AsyncResult { op, outcome } = next(&mut rx).await {
            results.push((op, outcome));
        }
    }
    assert!(results.contains(&(op(1), Outcome::Cancelled)));
    assert!(
        results
            .iter()
            .any(|(id, o)| *id == op(2) && matches!(o, Outcome::Ok(Payload::Scraped { .. })))
    );
}

#[tokio::test]
async fn test_slots_are_independent() {
    let (mut runner, _rx) = setup(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())));
    runner.start(op(1), Slot::Load, Operation::ListLinks, Duration::from_secs(5));
    runner.start(
        op(2),
        Slot::Save,
        Operation::CreateLink(LinkCreate {
            url: "https://example.com".into(),
            ..LinkCreate::default()
        }),
        Duration::from_secs(5),
    );
    assert!(runner.is_live(op(1)));
    assert!(runner.is_live(op(2)));
    runner.cancel_all();
    assert_eq!(runner.live_count(), 0);
}

#[tokio::test]
async fn test_api_errors_are_classified() {
    let api = LinkApi::mock(Vec::new());
    api.mock_fail(
        MockOp::List,
        ApiError::Status {
            status: 500,
            message: "database is down".into(),
        },
    )
    .await;
    let (mut runner, mut rx) = setup(api, Scraper::mock(Ok(page())));

    runner.start(op(1), Slot::Load, Operation::ListLinks, Duration::from_secs(5));
    let (_, outcome) = until_result(&mut rx, op(1)).await;
    let Outcome::Err(err) = outcome else {
        panic!("expected an error, got {outcome:?}");
    };
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
}

#[tokio::test]
async fn test_delete_reports_the_deleted_id() {
    let api = LinkApi::mock(Vec::new());
    let created = api
        .create_link(&LinkCreate {
            url: "https://example.com".into(),
            ..LinkCreate::default()
        })
        .await
        .unwrap();
    let (mut runner, mut rx) = setup(api.clone(), Scraper::mock(Ok(page())));

    runner.start(
        op(1),
        Slot::Mutate,
        Operation::DeleteLink(created.id),
        Duration::from_secs(5),
    );
    let (_, outcome) = until_result(&mut rx, op(1)).await;
    assert_eq!(outcome, Outcome::Ok(Payload::Deleted(created.id)));
    assert!(api.mock_links().await.is_empty());

    runner.start(
        op(2),
        Slot::Mutate,
        Operation::DeleteLink(Uuid::new_v4()),
        Duration::from_secs(5),
    );
    let (_, outcome) = until_result(&mut rx, op(2)).await;
    assert!(matches!(outcome, Outcome::Err(e) if e.kind == ErrorKind::InvalidInput));
}
