//! Configuration management for the gitlab-templates CLI.
//!
//! The configuration is stored in TOML format and names the GitLab server to
//! talk to and how to authenticate against it. Secrets never live in this
//! file; tokens come from the environment or the system keyring.

use std::{
    fs,
    path::{Path, PathBuf},
};

use gitlab_client::{
    Auth, ClientConfig, DEFAULT_API_VERSION, DEFAULT_TIMEOUT_SECS, DEFAULT_URL,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "gitlab-templates.toml";

/// Authentication method that sends no credentials.
pub const AUTH_METHOD_NONE: &str = "none";

/// Authentication method that sends a private access token.
pub const AUTH_METHOD_TOKEN: &str = "token";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the CLI.
///
/// # Example TOML Configuration
///
/// ```toml
/// [server]
/// url = "https://gitlab.example.com"
/// api_version = "4"
/// timeout_secs = 30
///
/// [authentication]
/// auth_method = "token"
/// ```
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub authentication: AuthenticationConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - The specified file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML or does not match the schema
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Loads the configuration, falling back to defaults when the file does
    /// not exist. A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, Error> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No configuration at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file, creating parent directories
    /// as needed and overwriting any existing file.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        debug!("Saving configuration to {:?}", path);

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize configuration: {}", e)))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write configuration file: {}", e)))?;

        info!("Configuration saved to {:?}", path);
        Ok(())
    }

    /// Builds the client settings, attaching the token if one was resolved.
    pub fn client_config(&self, token: Option<String>) -> ClientConfig {
        let auth = match token {
            Some(token) => Auth::PrivateToken(SecretString::from(token)),
            None => Auth::None,
        };

        ClientConfig {
            url: self.server.url.clone(),
            api_version: self.server.api_version.clone(),
            auth,
            timeout_secs: self.server.timeout_secs,
            ..Default::default()
        }
    }
}

/// The GitLab server the CLI talks to.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_url")]
    pub url: String,

    #[serde(default = "ServerConfig::default_api_version")]
    pub api_version: String,

    #[serde(default = "ServerConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ServerConfig {
    fn default_url() -> String {
        DEFAULT_URL.to_string()
    }

    fn default_api_version() -> String {
        DEFAULT_API_VERSION.to_string()
    }

    fn default_timeout_secs() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: ServerConfig::default_url(),
            api_version: ServerConfig::default_api_version(),
            timeout_secs: ServerConfig::default_timeout_secs(),
        }
    }
}

/// Configuration for CLI authentication settings.
///
/// * `auth_method` - `none` for anonymous access, `token` for a private
///   access token (defaults to `none`)
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticationConfig {
    #[serde(default = "AuthenticationConfig::default_auth_method")]
    pub auth_method: String,
}

impl AuthenticationConfig {
    fn default_auth_method() -> String {
        AUTH_METHOD_NONE.to_string()
    }
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self {
            auth_method: AuthenticationConfig::default_auth_method(),
        }
    }
}

/// Resolves the path to the configuration file.
///
/// - If `config_path` is `Some(path)`, returns that path as a `PathBuf`
/// - If `config_path` is `None`, returns `./gitlab-templates.toml` in the
///   current directory
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
