//! Integration tests for logging functionality

use site_settings::config::LoggingConfig;
use site_settings::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, "info");
    assert!(!config.file_enabled);
    assert_eq!(config.rotation, "daily");
}

// The global subscriber can only be installed once per process, so this
// file holds a single initialization test.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        level: "debug".to_string(),
        file_enabled: true,
        file_path: log_path.to_string_lossy().to_string(),
        rotation: "never".to_string(),
    };

    assert!(!log_path.exists());
    let guard = init_logging(&config.level, &config).unwrap();
    tracing::info!("written to file");
    drop(guard);

    assert!(log_path.is_dir());
}
