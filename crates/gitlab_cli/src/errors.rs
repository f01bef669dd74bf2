use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the gitlab-templates CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials could not be read, stored or resolved.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error occurred while loading, parsing or saving the
    /// configuration file.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A request to GitLab failed.
    #[error("GitLab error: {0}")]
    GitLab(#[from] gitlab_client::Error),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// A result could not be rendered for display.
    #[error("Failed to render output: {0}")]
    Output(String),
}
