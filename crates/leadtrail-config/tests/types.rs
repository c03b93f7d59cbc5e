use std::io::Write;
use std::sync::Arc;

use leadtrail_config::*;
use leadtrail_core::{Clock, Event, RecordingSink, SimulatedHost, SystemClock};
use leadtrail_tracking::PageTracker;

fn manager_for(content: &str, prefix: &str) -> (tempfile::TempDir, ConfigManager) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    (dir, ConfigManager::with_path(path).with_env_prefix(prefix))
}

#[test]
fn test_tracking_config_default() {
    let config = TrackingConfig::default();
    assert!(!config.development);
    assert_eq!(config.sink.kind, SinkKind::None);
    assert_eq!(config.sink.batch_size, 20);
    assert_eq!(config.sink.flush_interval_ms, 5000);
    assert_eq!(config.sink.queue_capacity, 1000);
    assert_eq!(config.scroll_milestones, vec![25, 50, 75, 100]);
    assert!(config.funnels_path.is_none());
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut manager = ConfigManager::with_path(dir.path().join("absent.toml"))
        .with_env_prefix("LEADTRAIL_TEST_ABSENT");
    assert_eq!(manager.load().unwrap(), TrackingConfig::default());
}

#[test]
fn test_load_from_file() {
    let (_dir, mut manager) = manager_for(
        r#"
development = true
scroll_milestones = [10, 50, 90]

[sink]
kind = "http"
endpoint = "https://collect.example.edu/events"
batch_size = 50
"#,
        "LEADTRAIL_TEST_FILE",
    );

    let config = manager.load().unwrap();
    assert!(config.development);
    assert_eq!(config.scroll_milestones, vec![10, 50, 90]);
    assert_eq!(config.sink.kind, SinkKind::Http);
    assert_eq!(config.sink.batch_size, 50);
    assert_eq!(config.sink.queue_capacity, 1000);
}

#[test]
fn test_environment_overrides_file() {
    let (_dir, mut manager) = manager_for("development = false\n", "LEADTRAIL_TEST_ENV");
    std::env::set_var("LEADTRAIL_TEST_ENV_DEVELOPMENT", "true");
    std::env::set_var("LEADTRAIL_TEST_ENV_SINK__KIND", "console");

    let config = manager.load().unwrap();
    assert!(config.development);
    assert_eq!(config.sink.kind, SinkKind::Console);

    std::env::remove_var("LEADTRAIL_TEST_ENV_DEVELOPMENT");
    std::env::remove_var("LEADTRAIL_TEST_ENV_SINK__KIND");
}

#[test]
fn test_config_validation() {
    let manager = ConfigManager::new();
    let mut config = TrackingConfig::default();
    assert!(manager.validate_config(&config).is_ok());

    config.scroll_milestones = vec![50, 25];
    assert!(matches!(
        manager.validate_config(&config),
        Err(ConfigError::Validation(_))
    ));

    config.scroll_milestones = vec![0, 50];
    assert!(manager.validate_config(&config).is_err());

    config.scroll_milestones = vec![25, 50];
    config.sink.batch_size = 0;
    assert!(manager.validate_config(&config).is_err());

    config.sink.batch_size = 20;
    config.sink.kind = SinkKind::Http;
    assert!(manager.validate_config(&config).is_err());

    config.sink.endpoint = Some("ftp://collect.example.edu".to_string());
    assert!(manager.validate_config(&config).is_err());

    config.sink.endpoint = Some("https://collect.example.edu/events".to_string());
    assert!(manager.validate_config(&config).is_ok());
}

#[test]
fn test_missing_funnels_path_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrackingConfig {
        funnels_path: Some(dir.path().join("funnels.json")),
        ..TrackingConfig::default()
    };
    assert!(matches!(
        ConfigManager::new().validate_config(&config),
        Err(ConfigError::NotFound(_))
    ));
}

#[test]
fn test_configured_milestones_drive_page_tracker() {
    let (_dir, mut manager) = manager_for(
        "scroll_milestones = [10, 50, 90]\n",
        "LEADTRAIL_TEST_MILESTONES",
    );
    let config = manager.load().unwrap();

    let sink = Arc::new(RecordingSink::new());
    let host = Arc::new(SimulatedHost::with_page("/programs/msds", 500.0, 5000.0));
    let dispatcher = config.dispatcher(sink.clone()).with_host(host.clone());
    let mut tracker = PageTracker::new(config.page_options("program_page"), dispatcher);
    tracker.start();

    host.scroll_to_percent(60.0);
    tracker.handle_scroll();
    host.scroll_to_percent(95.0);
    tracker.handle_scroll();

    let depths: Vec<i64> = sink
        .named("scroll_depth")
        .iter()
        .filter_map(|e| e.int_property("scroll_percentage"))
        .collect();
    assert_eq!(depths, vec![10, 50, 90]);
    assert_eq!(tracker.milestones_reached(), &[10, 50, 90]);
}

#[test]
fn test_invalid_file_is_parse_error() {
    let (_dir, mut manager) = manager_for("sink = 3\n", "LEADTRAIL_TEST_BAD");
    assert!(matches!(manager.load(), Err(ConfigError::Parse(_))));
}

#[test]
fn test_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut manager = ConfigManager::with_path(path.clone()).with_env_prefix("LEADTRAIL_TEST_SAVE");

    let mut config = TrackingConfig::default();
    config.development = true;
    config.sink.kind = SinkKind::Console;
    manager.save_config(&config).unwrap();

    assert!(path.exists());
    assert_eq!(manager.load().unwrap(), config);
}

#[test]
fn test_console_sink_and_dispatcher() {
    let config = TrackingConfig {
        development: true,
        ..TrackingConfig::default()
    };
    let handle = config.build_sink().unwrap();
    assert!(!handle.is_background());

    let recording = Arc::new(RecordingSink::new());
    let dispatcher = config.dispatcher(recording.clone());
    assert!(dispatcher.is_development());
    dispatcher.track_event("cta_click", Default::default());
    assert_eq!(recording.names(), vec!["cta_click"]);

    let event = Event::new("cta_click", Default::default(), SystemClock.now());
    assert!(handle.sink().event(&event).is_ok());
}

#[tokio::test]
async fn test_http_sink_lifecycle() {
    let config = TrackingConfig {
        sink: SinkConfig {
            kind: SinkKind::Http,
            endpoint: Some("http://127.0.0.1:9/events".to_string()),
            ..SinkConfig::default()
        },
        ..TrackingConfig::default()
    };

    let handle = config.build_sink().unwrap();
    assert!(handle.is_background());
    handle.start().unwrap();
    handle.shutdown().await;
}
