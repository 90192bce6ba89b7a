use std::{collections::HashMap, time::Duration};

use tokio_util::sync::CancellationToken;

use super::*;
use crate::{
    error::ErrorKind,
    net::{MockRequestKey, NetError, Response},
};

const BASE: &str = "http://scraper.test";

fn scraper_with(replies: Vec<(MockRequestKey, Result<Response, NetError>)>) -> (Scraper, Net) {
    let net = Net::mock(replies.into_iter().collect::<HashMap<_, _>>());
    (Scraper::new(net.clone(), BASE), net)
}

fn scrape_key() -> MockRequestKey {
    MockRequestKey::post(&format!("{BASE}/scrape"))
}

async fn scrape(scraper: &Scraper) -> (Result<ScrapeResult, OpError>, Vec<&'static str>) {
    let token = CancellationToken::new();
    let mut stages = Vec::new();
    let res = scraper
        .scrape_with_progress("https://example.com", 10, &token, |stage, _| {
            stages.push(stage.as_str())
        })
        .await;
    (res, stages)
}

#[tokio::test]
async fn test_scrape_success_reports_all_stages() {
    let (scraper, net) = scraper_with(vec![(
        scrape_key(),
        Ok(Response::new(
            200,
            r#"{"success":true,"url":"https://example.com","title":"Example","text":"Hello","extracted_at":"2024-03-01T10:00:00Z"}"#,
        )),
    )]);

    let (res, stages) = scrape(&scraper).await;
    let page = res.unwrap();
    assert_eq!(page.title, "Example");
    assert_eq!(page.text, "Hello");
    assert_eq!(
        stages,
        vec!["health_check", "fetching", "extracting", "complete"]
    );

    let body = net.recorded_requests().await[0].body.clone().unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["url"], "https://example.com");
    assert_eq!(json["timeout"], 10);
}

#[tokio::test]
async fn test_unsuccessful_scrape_is_extraction_error() {
    let (scraper, _) = scraper_with(vec![(
        scrape_key(),
        Ok(Response::new(200, r#"{"success":false,"error":"page is empty"}"#)),
    )]);
    let (res, stages) = scrape(&scraper).await;
    let err = res.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Extraction);
    assert_eq!(
        err.user_message(),
        "Failed to extract content from URL: page is empty"
    );
    assert!(!stages.contains(&"complete"));
}

#[tokio::test]
async fn test_error_status_classification() {
    let (scraper, net) = scraper_with(vec![(
        scrape_key(),
        Ok(Response::new(422, r#"{"error":"unsupported content"}"#)),
    )]);
    assert_eq!(scrape(&scraper).await.0.unwrap_err().kind, ErrorKind::Extraction);

    net.set_mock_reply(scrape_key(), Ok(Response::new(502, "bad gateway")))
        .await;
    let err = scrape(&scraper).await.0.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidResponse);
    assert_eq!(err.message, "scraper service error (status 502)");

    net.set_mock_reply(scrape_key(), Err(NetError::Timeout("deadline".into())))
        .await;
    let err = scrape(&scraper).await.0.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Timeout);
    assert!(err.retryable());
}

#[tokio::test]
async fn test_invalid_url_is_rejected_locally() {
    let (scraper, net) = scraper_with(Vec::new());
    let token = CancellationToken::new();
    let err = scraper
        .scrape_with_progress("not a url", 10, &token, |_, _| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidInput);
    assert!(net.recorded_requests().await.is_empty());
}

#[tokio::test]
async fn test_health_falls_back_to_root_endpoint() {
    let (scraper, net) = scraper_with(vec![(
        MockRequestKey::get(&format!("{BASE}/health")),
        Ok(Response::new(200, "ok")),
    )]);
    let token = CancellationToken::new();
    scraper.check_health(&token).await.unwrap();
    let urls: Vec<_> = net
        .recorded_requests()
        .await
        .into_iter()
        .map(|r| r.url.to_string())
        .collect();
    assert_eq!(
        urls,
        vec![format!("{BASE}/scraper/health"), format!("{BASE}/health")]
    );
}

#[tokio::test]
async fn test_unhealthy_status_is_service_unavailable() {
    let (scraper, _) = scraper_with(vec![(
        MockRequestKey::get(&format!("{BASE}/scraper/health")),
        Ok(Response::new(503, "")),
    )]);
    let err = scraper
        .check_health(&CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ServiceUnavailable);
}

#[tokio::test(start_paused = true)]
async fn test_mock_delay_honours_cancellation() {
    let scraper = Scraper::mock(Ok(ScrapeResult {
        success: true,
        ..ScrapeResult::default()
    }));
    scraper.mock_set_delay(Some(Duration::from_secs(60))).await;
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
    });
    let err = scraper
        .scrape_with_progress("https://example.com", 30, &token, |_, _| {})
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Cancelled);
    assert_eq!(scraper.mock_calls().await, vec!["https://example.com"]);
}
