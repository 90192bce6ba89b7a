use std::{path::Path, time::Duration};

use chrono::Utc;
use tokio::sync::mpsc::unbounded_channel;
use uuid::Uuid;

use super::{core::Core, *};
use crate::{
    api::{
        LinkApi,
        links::{ApiError, Link, MockOp},
    },
    config::{Config, Data, StrOpt, USizeOpt},
    log::{Log, LogLevel},
    scraper::{ScrapeResult, Scraper},
    tui::{Key, Message, Settings},
};

fn configured() -> Data {
    let mut data = Data::default();
    data.set_str(StrOpt::ApiBaseUrl, "http://localhost:8000");
    data.set_str(StrOpt::ApiKey, "secret-key");
    data
}

fn app_with(api: LinkApi, scraper: Scraper, data: Data) -> App {
    App {
        core: Core::new(
            Config::mock(data),
            ArcPath::from(Path::new("/tmp/linkmgmt-test/config.toml")),
            Log::mock(),
            api,
            scraper,
            Settings::default(),
        ),
    }
}

fn page() -> ScrapeResult {
    ScrapeResult {
        success: true,
        url: "https://example.com/a".into(),
        title: "A page".into(),
        text: "Some body text".into(),
        extracted_at: Some("2025-01-01T00:00:00Z".into()),
        error: None,
    }
}

fn stored(n: usize) -> Link {
    let now = Utc::now();
    Link {
        id: Uuid::new_v4(),
        user_id: None,
        url: format!("https://example.com/{n}"),
        title: (n == 0).then(|| "First".to_string()),
        description: None,
        text: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_links_report() {
    let app = app_with(
        LinkApi::mock(vec![stored(0), stored(1)]),
        Scraper::mock(Ok(page())),
        configured(),
    );
    let report = app.report(Command::Links).await.unwrap();
    assert!(report.starts_with("Links (2):"));
    assert!(report.contains("1. First"));
    assert!(report.contains("2. https://example.com/1"));

    let empty = app_with(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())), configured());
    assert_eq!(empty.report(Command::Links).await.unwrap(), "No links yet.");
}

#[tokio::test]
async fn test_api_commands_require_configuration() {
    let api = LinkApi::mock(Vec::new());
    let app = app_with(api.clone(), Scraper::mock(Ok(page())), Data::default());

    let err = app.report(Command::Links).await.unwrap_err();
    let text = format!("{err:#}");
    assert!(text.contains("Invalid configuration"));
    assert!(text.contains("api_base_url is not configured"));
    assert!(api.mock_calls().await.is_empty());

    // the scraper does not need the API
    assert!(app.report(Command::Health).await.is_ok());
}

#[tokio::test]
async fn test_api_failure_reports_user_message() {
    let api = LinkApi::mock(Vec::new());
    api.mock_fail(
        MockOp::List,
        ApiError::Status {
            status: 503,
            message: "maintenance".into(),
        },
    )
    .await;
    let app = app_with(api, Scraper::mock(Ok(page())), configured());
    let err = app.report(Command::Links).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Service unavailable. Please check if the service is running."
    );
}

#[tokio::test]
async fn test_add_basic_link() {
    let api = LinkApi::mock(Vec::new());
    let app = app_with(api.clone(), Scraper::mock(Ok(page())), configured());
    let report = app
        .report(Command::Add {
            url: " https://example.com/new ".into(),
            title: Some("  New  ".into()),
            description: Some("   ".into()),
            server_scrape: false,
        })
        .await
        .unwrap();
    assert!(report.starts_with("Link saved"));
    assert!(report.contains("Description: -"));

    let links = api.mock_links().await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, "https://example.com/new");
    assert_eq!(links[0].title.as_deref(), Some("New"));
    assert_eq!(links[0].description, None);
    assert_eq!(api.mock_calls().await, vec![MockOp::Create]);
}

#[tokio::test]
async fn test_add_with_server_scrape() {
    let api = LinkApi::mock(Vec::new());
    let app = app_with(api.clone(), Scraper::mock(Ok(page())), configured());
    let report = app
        .report(Command::Add {
            url: "https://example.com/s".into(),
            title: None,
            description: None,
            server_scrape: true,
        })
        .await
        .unwrap();
    assert!(report.contains("Title: Title of https://example.com/s"));
    assert_eq!(api.mock_calls().await, vec![MockOp::CreateWithScraping]);
}

#[tokio::test]
async fn test_add_rejects_invalid_url_locally() {
    let api = LinkApi::mock(Vec::new());
    let app = app_with(api.clone(), Scraper::mock(Ok(page())), configured());
    let err = app
        .report(Command::Add {
            url: "not a url".into(),
            title: None,
            description: None,
            server_scrape: false,
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid URL"));
    assert!(api.mock_calls().await.is_empty());
}

#[tokio::test]
async fn test_health_report() {
    let scraper = Scraper::mock(Ok(page()));
    let app = app_with(LinkApi::mock(Vec::new()), scraper.clone(), configured());
    assert_eq!(
        app.report(Command::Health).await.unwrap(),
        "Scraper service at http://localhost:8080 is healthy"
    );

    scraper.mock_set_healthy(false).await;
    let err = app.report(Command::Health).await.unwrap_err();
    assert!(err.to_string().starts_with("Service unavailable"));
}

#[tokio::test]
async fn test_scrape_report() {
    let scraper = Scraper::mock(Ok(page()));
    let app = app_with(LinkApi::mock(Vec::new()), scraper.clone(), configured());
    let report = app
        .report(Command::Scrape {
            url: "https://example.com/a".into(),
        })
        .await
        .unwrap();
    assert!(report.contains("Title: A page"));
    assert!(report.contains("Extracted at: 2025-01-01T00:00:00Z"));
    assert!(report.ends_with("Some body text"));
    assert_eq!(scraper.mock_calls().await, vec!["https://example.com/a"]);
}

#[tokio::test(start_paused = true)]
async fn test_scrape_report_times_out() {
    let scraper = Scraper::mock(Ok(page()));
    scraper.mock_set_delay(Some(Duration::from_secs(600))).await;
    let app = app_with(LinkApi::mock(Vec::new()), scraper, configured());
    let err = app
        .report(Command::Scrape {
            url: "https://example.com/a".into(),
        })
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Operation timed out"));
}

#[tokio::test]
async fn test_config_report_masks_the_key() {
    let app = app_with(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())), configured());
    let report = app.report(Command::Config).await.unwrap();
    assert!(report.starts_with("# /tmp/linkmgmt-test/config.toml"));
    assert!(report.contains("api_base_url = \"http://localhost:8000\""));
    assert!(report.contains("api_key = \"********\""));
    assert!(!report.contains("secret-key"));
}

#[tokio::test]
async fn test_set_config_updates_and_reports() {
    let app = app_with(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())), Data::default());
    let set = |key: &str, value: &str| Command::SetConfig {
        key: key.into(),
        value: value.into(),
    };

    let report = app
        .report(set("api_base_url", " http://links.local:9000 "))
        .await
        .unwrap();
    assert!(report.contains("api_base_url = \"http://links.local:9000\""));
    app.report(set("api_key", "abc123")).await.unwrap();
    app.report(set("scrape_timeout", "90")).await.unwrap();
    let report = app.report(set("log_level", "error")).await.unwrap();
    assert!(report.contains("api_key = \"********\""));
    assert!(report.contains("scrape_timeout = 90"));

    let data = app.core.config().snapshot().await.unwrap();
    assert_eq!(data.str(StrOpt::ApiKey).as_ref(), "abc123");
    assert_eq!(data.usize(USizeOpt::ScrapeTimeout), 90);
    assert_eq!(data.log_level(), LogLevel::Error);
    assert!(data.validate().is_ok());
}

#[tokio::test]
async fn test_set_config_rejects_bad_input() {
    let app = app_with(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())), configured());
    let set = |key: &str, value: &str| Command::SetConfig {
        key: key.into(),
        value: value.into(),
    };

    let err = app.report(set("api_url", "x")).await.unwrap_err();
    assert!(err.to_string().contains("Unknown configuration key"));
    let err = app.report(set("request_timeout", "soon")).await.unwrap_err();
    assert!(err.to_string().contains("request_timeout must be a whole number"));
    let err = app.report(set("scraper_base_url", "not a url")).await.unwrap_err();
    assert!(err.to_string().contains("scraper_base_url must be a URL"));
    assert!(app.report(set("log_level", "loud")).await.is_err());

    assert_eq!(app.core.config().snapshot().await.unwrap(), configured());
}

#[tokio::test]
async fn test_tui_refuses_to_start_without_configuration() {
    let app = app_with(LinkApi::mock(Vec::new()), Scraper::mock(Ok(page())), Data::default());
    let terminal = Terminal::mock((80, 24));
    assert!(app.core.run_tui(terminal.clone()).await.is_err());
    assert!(terminal.frames().await.is_empty());
}

#[tokio::test]
async fn test_event_loop_draws_until_quit() {
    let app = app_with(
        LinkApi::mock(vec![stored(0), stored(1)]),
        Scraper::mock(Ok(page())),
        configured(),
    );
    let terminal = Terminal::mock((100, 30));
    terminal.take_over().await.unwrap();

    let (tx, rx) = unbounded_channel();
    let input = tx.clone();
    let user = async {
        input.send(Message::Key(Key::Char('3'))).unwrap();
        for _ in 0..200 {
            if terminal.frames().await.iter().any(|f| f.contains("Links (2)")) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        input.send(Message::Key(Key::Char('q'))).unwrap();
    };
    let (result, ()) = tokio::join!(app.core.drive(&terminal, tx, rx), user);
    result.unwrap();

    let frames = terminal.frames().await;
    assert!(frames[0].contains("What would you like to do?"));
    assert_eq!(frames[0].lines().count(), 30);
    assert!(frames.iter().any(|f| f.contains("→ First")));
}
