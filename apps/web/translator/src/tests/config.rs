// Unit tests for config loading and validation

use crate::config::{AppConfig, CONFIG_FILE_NAME, choose_dir};
use crate::error::ConfigError;
use crate::logger::DEFAULT_LOG_LEVEL;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::LevelFilter;
use tempfile::TempDir;

fn write_config(contents: &str) -> TempDir {
    let temp_dir = TempDir::new().expect("temp dir");
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), contents).expect("write config");
    temp_dir
}

/// **VALUE**: Verifies a fresh install starts without a config file.
///
/// **WHY THIS MATTERS**: Nobody writes `translator.toml` before the first run.
///
/// **BUG THIS CATCHES**: Would catch `load()` treating a missing file as an error.
#[test]
fn given_no_config_file_when_loading_then_defaults() {
    // GIVEN: An empty directory
    let temp_dir = TempDir::new().expect("temp dir");

    // WHEN: Loading
    let config = AppConfig::load(temp_dir.path()).expect("defaults");

    // THEN: Defaults
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.server.port, 3000);
    assert!(config.upstream.browser_headers);
    assert_eq!(config.upstream.default_model, "gpt-3.5-turbo");
    assert_eq!(config.ocr.default_language, "eng");
    assert_eq!(config.ocr.max_image_bytes, 10 * 1024 * 1024);
}

#[test]
fn given_partial_config_when_loading_then_missing_keys_use_defaults() {
    let temp_dir = write_config(
        r#"
[server]
port = 8080

[upstream]
browser_headers = false
"#,
    );

    let config = AppConfig::load(temp_dir.path()).expect("valid config");

    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.host, "127.0.0.1");
    assert!(!config.upstream.browser_headers);
    assert_eq!(config.upstream.request_timeout_secs, 60);
    assert!(config.ocr.enabled);
}

/// **VALUE**: Verifies a corrupt file is reported rather than silently replaced.
///
/// **WHY THIS MATTERS**: An operator who disabled header spoofing must not find it
/// quietly re-enabled because of a typo elsewhere in the file.
///
/// **BUG THIS CATCHES**: Would catch parse errors falling back to defaults.
#[test]
fn given_invalid_toml_when_loading_then_parse_error() {
    // GIVEN: Broken TOML
    let temp_dir = write_config("[server\nport = ");

    // WHEN: Loading
    let result = AppConfig::load(temp_dir.path());

    // THEN: ParseError naming the file
    match result {
        Err(ConfigError::ParseError { path, .. }) => {
            assert!(path.ends_with(CONFIG_FILE_NAME))
        }
        other => panic!("Expected ParseError, got {other:?}"),
    }
}

#[test]
fn given_wrong_value_type_when_loading_then_parse_error() {
    let temp_dir = write_config("[server]\nport = \"eighty\"\n");

    let result = AppConfig::load(temp_dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_port_zero_when_validating_then_validation_error() {
    let mut config = AppConfig::default();
    config.server.port = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn given_invalid_host_when_validating_then_validation_error() {
    let mut config = AppConfig::default();
    config.server.host = String::from("not an address");

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn given_timeout_out_of_range_when_validating_then_validation_error() {
    let mut config = AppConfig::default();

    config.upstream.request_timeout_secs = 0;
    assert!(config.validate().is_err(), "zero timeout");

    config.upstream.request_timeout_secs = 601;
    assert!(config.validate().is_err(), "timeout above ten minutes");

    config.upstream.request_timeout_secs = 600;
    assert!(config.validate().is_ok(), "ten minutes is allowed");
}

#[test]
fn given_blank_default_model_when_validating_then_validation_error() {
    let mut config = AppConfig::default();
    config.upstream.default_model = String::from("   ");

    assert!(config.validate().is_err());
}

/// **VALUE**: Verifies the OCR language is checked at load time.
///
/// **WHY THIS MATTERS**: The language is passed to the OCR engine's command line.
///
/// **BUG THIS CATCHES**: Would catch a default language like `eng -psm 7` reaching the engine.
#[test]
fn given_invalid_ocr_language_when_loading_then_validation_error() {
    // GIVEN: A language with spaces and a flag
    let temp_dir = write_config("[ocr]\ndefault_language = \"eng -psm 7\"\n");

    // WHEN: Loading
    let result = AppConfig::load(temp_dir.path());

    // THEN: Rejected
    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_zero_image_limit_when_validating_then_validation_error() {
    let mut config = AppConfig::default();
    config.ocr.max_image_bytes = 0;

    assert!(config.validate().is_err());
}

#[test]
fn given_log_level_when_reading_then_parsed_or_rejected() {
    let mut config = AppConfig::default();
    assert_eq!(config.log_level().expect("default"), DEFAULT_LOG_LEVEL);

    config.logging.level = Some(String::from("warn"));
    assert_eq!(config.log_level().expect("warn"), LevelFilter::Warn);

    config.logging.level = Some(String::from("loud"));
    assert!(config.log_level().is_err());
    assert!(config.validate().is_err());
}

#[test]
fn given_upstream_section_when_building_options_then_values_carry_over() {
    let mut config = AppConfig::default();
    config.upstream.browser_headers = false;
    config.upstream.request_timeout_secs = 15;
    config.upstream.default_model = String::from(" gpt-4o ");

    let options = config.upstream_options();

    assert!(!options.browser_headers);
    assert_eq!(options.request_timeout, Duration::from_secs(15));
    assert_eq!(options.default_model, "gpt-4o");
}

#[test]
fn given_default_server_when_building_addr_then_loopback_3000() {
    let addr = AppConfig::default().socket_addr().expect("valid addr");

    assert_eq!(addr.to_string(), "127.0.0.1:3000");
}

#[test]
fn given_override_dir_when_choosing_then_override_wins() {
    let chosen = choose_dir(
        Some(PathBuf::from("/srv/translator")),
        Some(PathBuf::from("/home/user/.config")),
        &["translator"],
    );

    assert_eq!(chosen, Some(PathBuf::from("/srv/translator")));
}

#[test]
fn given_no_override_when_choosing_then_segments_appended_to_platform_dir() {
    let chosen = choose_dir(
        Some(PathBuf::new()),
        Some(PathBuf::from("/home/user/.local/share")),
        &["translator", "logs"],
    );

    assert_eq!(
        chosen,
        Some(PathBuf::from("/home/user/.local/share/translator/logs"))
    );
}

#[test]
fn given_no_dirs_when_choosing_then_none() {
    assert_eq!(choose_dir(None, None, &["translator"]), None);
}
