// Unit tests for logger setup
// Tests focus on idempotence and error handling

use crate::error::TranslatorError;
use crate::logger::{LOG_FILE_NAME, build_dispatch, initialize};

use std::path::PathBuf;

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Startup code and tests may both reach the logger. Installing
/// a second global logger makes `log` return an error that would abort start-up.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable directory
    let temp_dir = TempDir::new().expect("temp dir");

    // WHEN: Calling initialize twice
    let first = initialize(temp_dir.path(), LevelFilter::Debug);
    let second = initialize(temp_dir.path(), LevelFilter::Debug);

    // THEN: Both succeed
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should be a no-op");
}

/// **VALUE**: Verifies that an unusable log directory is an error, not a panic.
///
/// **WHY THIS MATTERS**: A misconfigured `TRANSLATOR_LOG_DIR` should produce a clear
/// start-up message.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped.
#[test]
fn given_invalid_log_dir_when_building_dispatch_then_returns_logger_error() {
    // GIVEN: A path under a file, which can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch
    let result = build_dispatch(&invalid_dir, LevelFilter::Info);

    // THEN: Logger error
    assert!(
        matches!(result, Err(TranslatorError::Logger { .. })),
        "Should return TranslatorError::Logger for invalid log directory"
    );
}

#[test]
fn given_writable_dir_when_building_dispatch_then_log_file_is_created() {
    let temp_dir = TempDir::new().expect("temp dir");

    let result = build_dispatch(temp_dir.path(), LevelFilter::Info);

    assert!(result.is_ok());
    assert!(temp_dir.path().join(LOG_FILE_NAME).exists());
}
