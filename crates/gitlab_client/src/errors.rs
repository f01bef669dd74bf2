//! Error types for GitLab client operations.
//!
//! This module defines the error types that can occur when talking to the GitLab
//! REST API through the gitlab_client crate. HTTP status codes are mapped onto
//! dedicated variants so callers can react to missing templates or rejected
//! credentials without inspecting raw responses.

use crate::models::{TemplateKind, TemplateScope};

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitLab client operations.
///
/// ## Examples
///
/// ```rust,no_run
/// use gitlab_client::{create_anonymous_client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = create_anonymous_client("https://gitlab.com")?;
/// match client.licenses().get("mit").await {
///     Ok(license) => println!("{}", license.content),
///     Err(Error::NotFound) => eprintln!("No such license"),
///     Err(Error::RateLimitExceeded) => eprintln!("Rate limit exceeded, retry later"),
///     Err(err) => eprintln!("Other error: {}", err),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with an unexpected non-success status.
    ///
    /// The message is taken from the `message` or `error` field of the JSON
    /// body when the server provides one.
    #[error("API request failed with status {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The server rejected the credentials (HTTP 401 or 403).
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The client could not be built from the supplied configuration.
    ///
    /// Raised for malformed base URLs and for tokens that are not valid
    /// header values.
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    /// Error deserializing the response body.
    #[error("Failed to deserialize GitLab response: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// The response parsed, but its identifying attribute does not match the
    /// template that was requested.
    #[error("Invalid response format")]
    InvalidResponse,

    /// The requested template does not exist (HTTP 404).
    #[error("Resource not found")]
    NotFound,

    /// GitLab API rate limit has been exceeded (HTTP 429).
    ///
    /// The client does not retry; callers decide when to try again.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// The request never produced an HTTP response (DNS, TLS, timeouts, ...).
    #[error("Failed to reach the GitLab server: {0}")]
    Transport(String),

    /// The template kind is not offered at the requested scope.
    ///
    /// Issue and merge request templates only exist on projects.
    #[error("{kind} templates are not available at {scope} scope")]
    UnsupportedTemplateKind {
        kind: TemplateKind,
        scope: TemplateScope,
    },
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Transport(value.to_string())
    }
}
