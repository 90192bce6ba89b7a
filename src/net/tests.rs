use std::collections::HashMap;

use super::*;

#[tokio::test]
async fn test_mock_answers_by_method_and_url() {
    let mut replies = HashMap::new();
    replies.insert(
        MockRequestKey::get("http://svc/health"),
        Ok(Response::new(200, "ok")),
    );
    replies.insert(
        MockRequestKey::post("http://svc/health"),
        Ok(Response::new(405, "")),
    );
    let net = Net::mock(replies);

    let resp = net.send(Request::get("http://svc/health")).await.unwrap();
    assert!(resp.is_success());
    assert_eq!(resp.body.as_ref(), "ok");

    let resp = net.send(Request::post("http://svc/health")).await.unwrap();
    assert!(!resp.is_success());
}

#[tokio::test]
async fn test_mock_unknown_request_is_connect_error() {
    let net = Net::mock(HashMap::new());
    let err = net.send(Request::get("http://nowhere")).await.unwrap_err();
    assert!(matches!(err, NetError::Connect(_)));
}

#[tokio::test]
async fn test_mock_records_requests() {
    let net = Net::mock(HashMap::new());
    let req = Request::post("http://svc/scrape")
        .header("Authorization", "Bearer k")
        .json("{\"url\":\"https://example.com\"}".to_string());
    let _ = net.send(req.clone()).await;

    let recorded = net.recorded_requests().await;
    assert_eq!(recorded, vec![req]);
    assert!(
        recorded[0]
            .headers
            .iter()
            .any(|(k, v)| k.as_ref() == "Content-Type" && v.as_ref() == "application/json")
    );
}

#[tokio::test]
async fn test_actual_connect_failure_is_classified() {
    let net = Net::spawn(crate::log::Log::mock(), std::time::Duration::from_secs(2)).unwrap();
    let err = net
        .send(Request::get("http://127.0.0.1:9/health"))
        .await
        .unwrap_err();
    assert!(matches!(err, NetError::Connect(_) | NetError::Timeout(_)));
}

#[test]
fn test_response_success_range() {
    assert!(Response::new(200, "").is_success());
    assert!(Response::new(204, "").is_success());
    assert!(!Response::new(301, "").is_success());
    assert!(!Response::new(404, "").is_success());
}
