//! Service configuration loaded from `translator.toml`.
//!
//! Every key has a default, so a missing file (or a missing section) is fine.
//! A file that exists but cannot be read, parsed, or validated is an error.

use crate::error::ConfigError;
use crate::logger::DEFAULT_LOG_LEVEL;

use translate_core::DEFAULT_MODEL;
use translate_core::ocr::{DEFAULT_OCR_LANGUAGE, validate_language};
use translate_core::upstream::UpstreamOptions;

use common::ErrorLocation;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, info, warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "translator.toml";
pub const CONFIG_DIR_ENV: &str = "TRANSLATOR_CONFIG_DIR";
pub const LOG_DIR_ENV: &str = "TRANSLATOR_LOG_DIR";

const APP_DIR_NAME: &str = "translator";
const LOG_DIR_NAME: &str = "logs";
const MAX_TIMEOUT_SECS: u64 = 600;
const TEN_MIB: usize = 10 * 1024 * 1024;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Send browser-like User-Agent and Sec-Fetch-* headers upstream.
    #[serde(default = "default_true")]
    pub browser_headers: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            browser_headers: default_true(),
            request_timeout_secs: default_request_timeout_secs(),
            default_model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OcrConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tesseract_binary")]
    pub tesseract_binary: String,
    #[serde(default = "default_ocr_language")]
    pub default_language: String,
    /// Largest decoded image accepted by `/api/ocr`.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            tesseract_binary: default_tesseract_binary(),
            default_language: default_ocr_language(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug`, `trace` or `off`. Build default when unset.
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_true() -> bool {
    true
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_tesseract_binary() -> String {
    "tesseract".to_string()
}
fn default_ocr_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}
fn default_max_image_bytes() -> usize {
    TEN_MIB
}

// ============================================
// IMPLEMENTATION
// ============================================

impl AppConfig {
    /// Load config from `{config_dir}/translator.toml`, or defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but is unreadable, not valid
    /// TOML, or fails [`AppConfig::validate`].
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: AppConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {e}");
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        IpAddr::from_str(&self.server.host)
            .map_err(|_| validation_error(format!("Invalid host: {}", self.server.host)))?;

        if self.server.port == 0 {
            return Err(validation_error("Port must be between 1 and 65535".to_string()));
        }

        if self.upstream.request_timeout_secs == 0
            || self.upstream.request_timeout_secs > MAX_TIMEOUT_SECS
        {
            return Err(validation_error(format!(
                "Invalid request timeout: {}s (must be 1-{MAX_TIMEOUT_SECS})",
                self.upstream.request_timeout_secs
            )));
        }

        if self.upstream.default_model.trim().is_empty() {
            return Err(validation_error("default_model cannot be empty".to_string()));
        }

        validate_language(&self.ocr.default_language)
            .map_err(|e| validation_error(e.user_message()))?;

        if self.ocr.max_image_bytes == 0 {
            return Err(validation_error("max_image_bytes must be greater than 0".to_string()));
        }

        if self.ocr.enabled && self.ocr.tesseract_binary.trim().is_empty() {
            return Err(validation_error(
                "tesseract_binary cannot be empty while OCR is enabled".to_string(),
            ));
        }

        self.log_level()?;

        Ok(())
    }

    /// Address the service listens on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = IpAddr::from_str(&self.server.host)
            .map_err(|_| validation_error(format!("Invalid host: {}", self.server.host)))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Configured log level, or the build default when unset.
    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        match self.logging.level.as_deref() {
            None => Ok(DEFAULT_LOG_LEVEL),
            Some(level) => LevelFilter::from_str(level.trim())
                .map_err(|_| validation_error(format!("Invalid log level: {level}"))),
        }
    }

    pub fn upstream_options(&self) -> UpstreamOptions {
        UpstreamOptions {
            browser_headers: self.upstream.browser_headers,
            request_timeout: Duration::from_secs(self.upstream.request_timeout_secs),
            default_model: self.upstream.default_model.trim().to_string(),
        }
    }
}

#[track_caller]
fn validation_error(reason: String) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason,
    }
}

/// `$TRANSLATOR_CONFIG_DIR`, else the platform config dir + `translator`.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    choose_dir(
        env::var_os(CONFIG_DIR_ENV).map(PathBuf::from),
        dirs::config_dir(),
        &[APP_DIR_NAME],
    )
    .ok_or_else(|| ConfigError::DirectoryNotFound {
        location: ErrorLocation::from(Location::caller()),
        reason: format!("No config directory; set {CONFIG_DIR_ENV}"),
    })
}

/// `$TRANSLATOR_LOG_DIR`, else the platform local data dir + `translator/logs`.
pub fn log_dir() -> Result<PathBuf, ConfigError> {
    choose_dir(
        env::var_os(LOG_DIR_ENV).map(PathBuf::from),
        dirs::data_local_dir(),
        &[APP_DIR_NAME, LOG_DIR_NAME],
    )
    .ok_or_else(|| ConfigError::DirectoryNotFound {
        location: ErrorLocation::from(Location::caller()),
        reason: format!("No log directory; set {LOG_DIR_ENV}"),
    })
}

/// An explicit override wins as-is; otherwise `segments` are appended to the platform dir.
pub(crate) fn choose_dir(
    override_dir: Option<PathBuf>,
    platform_dir: Option<PathBuf>,
    segments: &[&str],
) -> Option<PathBuf> {
    if let Some(dir) = override_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        return Some(dir);
    }

    platform_dir.map(|base| segments.iter().fold(base, |path, segment| path.join(segment)))
}
