pub mod config;

pub use config::ConfigError;

use common::ErrorLocation;

use thiserror::Error;

/// Errors that stop the translator service from starting or running.
///
/// Request-level failures never end up here; handlers answer those with an
/// HTTP status and a `{ error }` body instead.
#[derive(Debug, Error)]
pub enum TranslatorError {
    /// Error from this app's own bootstrap
    #[error("Translator Error: {message} {location}")]
    Translator {
        message: String,
        location: ErrorLocation,
    },

    /// Logger could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Upstream client could not be built
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// Listener failed to bind or the server stopped unexpectedly
    #[error("Server Error: {message} {location}")]
    Server {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
