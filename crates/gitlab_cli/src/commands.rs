//! Command modules for the gitlab-templates CLI.
//!
//! - `auth_cmd`: Storing and clearing the GitLab access token
//! - `config_cmd`: Configuration file management
//! - `template_cmd`: Fetching and listing templates

pub mod auth_cmd;
pub mod config_cmd;
pub mod template_cmd;
