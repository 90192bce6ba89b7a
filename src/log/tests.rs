use std::path::Path;

use super::*;

#[tokio::test]
async fn test_log_mock_records_in_order() {
    let log = Log::mock();
    log.info("test", "info");
    log.warn("test", "warn");
    log.error("other", "error");

    let messages = log.get_messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].level, LogLevel::Info);
    assert_eq!(messages[1].message, "warn");
    assert_eq!(messages[2].scope, "other");
}

#[tokio::test]
async fn test_log_on_error_passes_result_through() {
    let log = Log::mock();
    let ok: Result<u32, &str> = Ok(42);
    let err: Result<u32, &str> = Err("fail");

    assert_eq!(log.info_on_error("test", ok), Ok(42));
    assert!(log.warn_on_error("test", err).is_err());
    assert!(log.error_on_error("test", err).is_err());

    let messages = log.get_messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].level, LogLevel::Warning);
    assert_eq!(messages[1].level, LogLevel::Error);
}

#[tokio::test]
async fn test_log_actual_writes_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let log_dir = crate::ArcPath::from(temp_dir.path().join("logs"));

    let log = Log::spawn(Fs::spawn(), LogLevel::Error, 0, log_dir.clone())
        .await
        .unwrap();
    log.info("test", "hello from the test");
    log.flush().await.unwrap();

    let latest = tokio::fs::read_to_string(log_dir.join("latest.log"))
        .await
        .unwrap();
    assert!(latest.contains("[INFO] [test] hello from the test"));

    let mut rd = tokio::fs::read_dir(&log_dir).await.unwrap();
    let mut timestamped = 0;
    while let Some(entry) = rd.next_entry().await.unwrap() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with("linkmgmt_") {
            timestamped += 1;
        }
    }
    assert_eq!(timestamped, 1);

    temp_dir.close().unwrap();
}

#[tokio::test]
async fn test_log_build_fails_on_unwritable_dir() {
    let temp_dir = tempfile::tempdir().unwrap();
    let blocker = temp_dir.path().join("not_a_dir");
    tokio::fs::write(&blocker, "x").await.unwrap();

    let log_dir = crate::ArcPath::from(Path::new(&blocker).join("logs"));
    let result = Log::spawn(Fs::spawn(), LogLevel::Info, 0, log_dir).await;
    assert!(result.is_err());
}
