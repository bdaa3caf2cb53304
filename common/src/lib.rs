//! Shared leaf types for the translator workspace.
//!
//! Nothing in here performs I/O. These types are passed between layers:
//!
//! - **common** (this crate): error locations, HTTP status codes, redacted keys
//! - **translate-core**: the upstream adaptation layer built on these types
//! - **translator**: the local HTTP service wiring everything together

pub mod error;
pub mod http_status;
pub mod redacted_key;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use http_status::HttpStatusCode;
pub use redacted_key::RedactedApiKey;
