use clap::Subcommand;
use tracing::{debug, error, info, instrument};

use crate::config::{get_config_path, AppConfig, AUTH_METHOD_NONE, AUTH_METHOD_TOKEN};
use crate::errors::Error;

#[cfg(test)]
#[path = "config_cmd_tests.rs"]
mod tests;

/// Subcommands for the config command
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Create initial configuration file
    Init,

    /// Check configuration syntax
    Validate,

    /// Show current configuration
    Get {
        /// Configuration key to get (e.g., "server.url")
        key: Option<String>,
    },

    /// Update configuration values
    Set {
        /// Configuration key to set (e.g., "server.url")
        key: String,

        /// Value to set
        value: String,
    },
}

/// Execute the config command
#[instrument]
pub async fn execute(cmd: &ConfigCommands, path: Option<&str>) -> Result<(), Error> {
    match cmd {
        ConfigCommands::Init => init_config(path),
        ConfigCommands::Validate => validate_config(path),
        ConfigCommands::Get { key } => get_config(path, key.as_deref()),
        ConfigCommands::Set { key, value } => set_config(path, key, value),
    }
}

/// Initialize a new configuration file
#[instrument]
fn init_config(path: Option<&str>) -> Result<(), Error> {
    let config_path = get_config_path(path);
    debug!(message = "Initializing configuration", path = ?config_path);

    if config_path.exists() {
        let err = Error::Config(format!(
            "Configuration file already exists at {:?}",
            config_path
        ));
        error!(
            message = "Configuration file already exists",
            path = ?config_path,
            error = ?err
        );
        return Err(err);
    }

    let config = AppConfig::default();
    if let Err(e) = config.save(&config_path) {
        error!(message = "Failed to save configuration", path = ?config_path, error = ?e);
        return Err(Error::Config("Failed to save configuration".to_string()));
    }

    info!(message = "Configuration initialized", path = ?config_path);
    println!("Configuration initialized at {:?}", config_path);
    Ok(())
}

/// Validate a configuration file
#[instrument]
fn validate_config(path: Option<&str>) -> Result<(), Error> {
    let config_path = get_config_path(path);
    debug!(message = "Validating configuration", path = ?config_path);

    let config = AppConfig::load(&config_path).map_err(|e| {
        error!(
            message = "Configuration is invalid",
            path = ?config_path,
            error = ?e
        );
        Error::Config("The configuration is invalid".to_string())
    })?;

    check_config(&config)?;

    info!(message = "Configuration is valid", path = ?config_path);
    println!("Configuration is valid");
    Ok(())
}

/// Checks the values that TOML parsing alone cannot catch.
fn check_config(config: &AppConfig) -> Result<(), Error> {
    config
        .client_config(None)
        .api_url()
        .map_err(|e| Error::Config(e.to_string()))?;

    match config.authentication.auth_method.as_str() {
        AUTH_METHOD_NONE | AUTH_METHOD_TOKEN => Ok(()),
        other => Err(Error::Config(format!(
            "Unsupported authentication method '{}'",
            other
        ))),
    }
}

/// Get a configuration value
#[instrument]
fn get_config(path: Option<&str>, key: Option<&str>) -> Result<(), Error> {
    let config_path = get_config_path(path);
    debug!(message = "Getting configuration", path = ?config_path, key = ?key);

    let config = AppConfig::load(&config_path).map_err(|e| {
        error!(message = "Failed to load configuration", path = ?config_path, error = ?e);
        Error::Config("Failed to load the configuration".to_string())
    })?;

    if let Some(key) = key {
        let value = get_config_value(&config, key)?;
        println!("{}: {}", key, value);
    } else {
        let config_str = toml::to_string_pretty(&config)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;
        println!("{}", config_str);
    }

    Ok(())
}

/// Set a configuration value
#[instrument]
fn set_config(path: Option<&str>, key: &str, value: &str) -> Result<(), Error> {
    let config_path = get_config_path(path);
    debug!(
        message = "Setting configuration",
        path = ?config_path,
        key = key,
        value = value
    );

    let mut config = AppConfig::load_or_default(&config_path).map_err(|e| {
        error!(message = "Failed to load configuration", path = ?config_path, error = ?e);
        Error::Config("Failed to load the configuration".to_string())
    })?;

    if let Err(e) = set_config_value(&mut config, key, value) {
        error!(message = "Failed to set configuration value", key = key, value = value, error = ?e);
        return Err(e);
    }

    if let Err(e) = config.save(&config_path) {
        error!(message = "Failed to save configuration", path = ?config_path, error = ?e);
        return Err(Error::Config("Failed to save configuration".to_string()));
    }

    info!(message = "Configuration updated", key = key, value = value);
    println!("Configuration updated: {} = {}", key, value);
    Ok(())
}

fn invalid_key(key: &str) -> Error {
    Error::InvalidArguments(format!("Invalid configuration key: {}", key))
}

/// Get a value from the configuration by key path
fn get_config_value(config: &AppConfig, key: &str) -> Result<String, Error> {
    match key.split_once('.') {
        Some(("server", "url")) => Ok(config.server.url.clone()),
        Some(("server", "api_version")) => Ok(config.server.api_version.clone()),
        Some(("server", "timeout_secs")) => Ok(config.server.timeout_secs.to_string()),
        Some(("authentication", "auth_method")) => Ok(config.authentication.auth_method.clone()),
        _ => Err(invalid_key(key)),
    }
}

/// Set a value in the configuration by key path
fn set_config_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), Error> {
    match key.split_once('.') {
        Some(("server", "url")) => {
            config.server.url = value.trim_end_matches('/').to_string();
        }
        Some(("server", "api_version")) => {
            config.server.api_version = value.to_string();
        }
        Some(("server", "timeout_secs")) => {
            config.server.timeout_secs = value.parse().map_err(|_| {
                Error::InvalidArguments(format!("Invalid timeout '{}': expected seconds", value))
            })?;
        }
        Some(("authentication", "auth_method")) => match value {
            AUTH_METHOD_NONE | AUTH_METHOD_TOKEN => {
                config.authentication.auth_method = value.to_string();
            }
            _ => {
                return Err(Error::InvalidArguments(format!(
                    "Invalid authentication method '{}', expected '{}' or '{}'",
                    value, AUTH_METHOD_NONE, AUTH_METHOD_TOKEN
                )))
            }
        },
        _ => return Err(invalid_key(key)),
    }
    Ok(())
}
