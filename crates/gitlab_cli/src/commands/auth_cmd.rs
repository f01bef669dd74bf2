//! Authentication command module for GitLab credentials management.
//!
//! Tokens are stored in the system keyring rather than in the configuration
//! file. The configuration only records which authentication method is in
//! use. The `GITLAB_PRIVATE_TOKEN` environment variable takes precedence over
//! the keyring so CI jobs can run without one.

use clap::Subcommand;
use keyring::Entry;
use tracing::{debug, error, info, instrument};

use crate::{
    config::{get_config_path, AppConfig, AUTH_METHOD_NONE, AUTH_METHOD_TOKEN},
    errors::Error,
};

pub const KEY_RING_SERVICE_NAME: &str = "gitlab_templates_cli";
pub const KEY_RING_USER_TOKEN: &str = "gitlab_private_token";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV_VAR: &str = "GITLAB_PRIVATE_TOKEN";

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;

/// Authentication subcommands for managing GitLab credentials.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store a private access token in the system keyring.
    ///
    /// The token is read from standard input.
    Token,

    /// Remove the stored token and switch to anonymous access.
    Clear,
}

/// Executes the specified authentication command.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration file cannot be loaded or saved
/// - Keyring operations fail
/// - The supplied token is empty
#[instrument]
pub async fn execute(cmd: &AuthCommands, config_path: Option<&str>) -> Result<(), Error> {
    match cmd {
        AuthCommands::Token => store_token(config_path),
        AuthCommands::Clear => clear_token(config_path),
    }
}

#[instrument]
fn store_token(config_path: Option<&str>) -> Result<(), Error> {
    let config_path = get_config_path(config_path);
    let mut config = AppConfig::load_or_default(&config_path).map_err(|e| {
        error!(message = "Failed to load configuration", path = ?config_path, error = ?e);
        Error::Config("Failed to load configuration".to_string())
    })?;

    info!(message = "GitLab Private Access Token Authentication");
    println!("GitLab Private Access Token Authentication");
    println!("-----------------------------------------");
    println!("Please provide your GitLab access token:");

    let mut token = String::new();
    std::io::stdin()
        .read_line(&mut token)
        .map_err(|e| Error::Auth(format!("Failed to read input: {}", e)))?;
    let token = token.trim();
    debug!(message = "Read token from stdin");

    if token.is_empty() {
        let err = Error::Auth("Token cannot be empty".to_string());
        error!(message = "Token cannot be empty", error = ?err);
        return Err(err);
    }

    token_entry()?
        .set_password(token)
        .map_err(|e| Error::Auth(format!("Failed to save token to keyring: {}", e)))?;
    debug!(message = "Saved token to keyring");

    config.authentication.auth_method = AUTH_METHOD_TOKEN.to_string();
    config.save(&config_path).map_err(|e| {
        error!(error = e.to_string(), "Failed to save the configuration");
        Error::Config("Failed to save the configuration.".to_string())
    })?;
    info!(
        message = "Updated configuration with auth method",
        auth_method = AUTH_METHOD_TOKEN
    );

    println!("GitLab token authentication configured successfully!");
    Ok(())
}

#[instrument]
fn clear_token(config_path: Option<&str>) -> Result<(), Error> {
    let config_path = get_config_path(config_path);
    let mut config = AppConfig::load_or_default(&config_path)?;

    match token_entry()?.delete_credential() {
        Ok(()) => debug!(message = "Removed token from keyring"),
        Err(keyring::Error::NoEntry) => debug!(message = "No token stored in keyring"),
        Err(e) => {
            return Err(Error::Auth(format!(
                "Failed to remove token from keyring: {}",
                e
            )))
        }
    }

    config.authentication.auth_method = AUTH_METHOD_NONE.to_string();
    config.save(&config_path)?;

    println!("Stored GitLab token removed");
    Ok(())
}

fn token_entry() -> Result<Entry, Error> {
    Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_USER_TOKEN)
        .map_err(|e| Error::Auth(format!("Failed to access keyring: {}", e)))
}

/// Finds the token to use for requests, if any.
///
/// Checks `GITLAB_PRIVATE_TOKEN` first, then the keyring when the configured
/// method is `token`.
pub fn resolve_token(config: &AppConfig) -> Result<Option<String>, Error> {
    select_token(
        &config.authentication.auth_method,
        std::env::var(TOKEN_ENV_VAR).ok(),
        || {
            token_entry()?.get_password().map_err(|e| {
                Error::Auth(format!(
                    "Failed to get token from keyring: {}. Run 'gitlab-templates auth token' to store one.",
                    e
                ))
            })
        },
    )
}

fn select_token<F>(
    auth_method: &str,
    env_token: Option<String>,
    keyring_token: F,
) -> Result<Option<String>, Error>
where
    F: FnOnce() -> Result<String, Error>,
{
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        debug!(message = "Using token from environment");
        return Ok(Some(token.trim().to_string()));
    }

    match auth_method {
        AUTH_METHOD_NONE => Ok(None),
        AUTH_METHOD_TOKEN => keyring_token().map(Some),
        other => Err(Error::Config(format!(
            "Unsupported authentication method '{}', expected '{}' or '{}'",
            other, AUTH_METHOD_NONE, AUTH_METHOD_TOKEN
        ))),
    }
}
