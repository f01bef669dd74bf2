//! Crate for reading template resources from the GitLab REST API.
//!
//! GitLab serves license texts, `.gitignore` files, `.gitlab-ci.yml` files
//! and Dockerfiles at instance level, and the same plus issue and merge
//! request description templates per project. This crate maps each of those
//! collections onto a typed manager:
//!
//! ```rust,no_run
//! use gitlab_client::{create_token_client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! let client = create_token_client("https://gitlab.example.com", "glpat-...")?;
//!
//! let license = client.licenses().get("mit").await?;
//! let issue = client.project(42).issue_templates().get("Bug").await?;
//! println!("{}\n{}", license.content, issue.content);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod manager;
pub use manager::{ProjectTemplates, TemplateManager};

pub mod models;
pub use models::{
    GetOptions, ListOptions, TemplateKind, TemplateOwner, TemplateScope, TemplateSummary,
};

pub mod templates;
pub use templates::{
    AnyTemplate, Dockerfile, Gitignore, Gitlabciyml, License, ProjectDockerfileTemplate,
    ProjectGitignoreTemplate, ProjectGitlabciymlTemplate, ProjectIssueTemplate,
    ProjectLicenseTemplate, ProjectMergeRequestTemplate, TemplateResource,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Default GitLab host.
pub const DEFAULT_URL: &str = "https://gitlab.com";

/// Default REST API version.
pub const DEFAULT_API_VERSION: &str = "4";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const NEXT_PAGE_HEADER: &str = "x-next-page";

/// How requests authenticate against GitLab.
#[derive(Debug, Default)]
pub enum Auth {
    /// Anonymous access; only public templates are visible.
    #[default]
    None,
    /// Personal, project or group access token (`PRIVATE-TOKEN` header).
    PrivateToken(SecretString),
    /// OAuth2 access token (`Authorization: Bearer` header).
    OAuthToken(SecretString),
    /// CI job token (`JOB-TOKEN` header).
    JobToken(SecretString),
}

impl Auth {
    fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        let (name, value) = match self {
            Auth::None => return Ok(headers),
            Auth::PrivateToken(token) => (
                HeaderName::from_static("private-token"),
                token.expose_secret().to_string(),
            ),
            Auth::OAuthToken(token) => {
                (AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            }
            Auth::JobToken(token) => (
                HeaderName::from_static("job-token"),
                token.expose_secret().to_string(),
            ),
        };

        let mut value = HeaderValue::from_str(&value).map_err(|_| {
            Error::Configuration("The access token is not a valid header value".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(name, value);
        Ok(headers)
    }
}

/// Settings used to build a [`GitLabClient`].
#[derive(Debug)]
pub struct ClientConfig {
    /// Host URL, e.g. `https://gitlab.com`. A trailing slash is ignored.
    pub url: String,

    /// REST API version, `4` for every current GitLab release.
    pub api_version: String,

    pub auth: Auth,

    /// Per-request timeout.
    pub timeout_secs: u64,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            auth: Auth::None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// The API root, e.g. `https://gitlab.com/api/v4/`.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the URL cannot be parsed or cannot
    /// carry a path.
    pub fn api_url(&self) -> Result<Url, Error> {
        let raw = format!(
            "{}/api/v{}/",
            self.url.trim_end_matches('/'),
            self.api_version
        );
        let url = Url::parse(&raw).map_err(|e| {
            error!(url = %self.url, error = %e, "Failed to parse GitLab URL");
            Error::Configuration(format!("Invalid GitLab URL '{}': {}", self.url, e))
        })?;
        if url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Invalid GitLab URL '{}': not a base URL",
                self.url
            )));
        }
        Ok(url)
    }
}

/// A client for reading templates from a GitLab instance.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    client: reqwest::Client,
    api_url: Url,
}

impl GitLabClient {
    /// Creates a new `GitLabClient` from the given settings.
    ///
    /// # Errors
    /// Returns `Error::Configuration` if the URL or credentials are malformed,
    /// or `Error::Transport` if the HTTP client cannot be initialised.
    #[instrument(skip(config), fields(url = %config.url, api_version = %config.api_version))]
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let api_url = config.api_url()?;
        let headers = config.auth.headers()?;

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client");
                Error::Transport(e.to_string())
            })?;

        debug!(api_url = %api_url, "Created GitLab client");
        Ok(Self { client, api_url })
    }

    /// The API root every request path is resolved against.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn dockerfiles(&self) -> TemplateManager<'_, Dockerfile> {
        TemplateManager::new(self, TemplateOwner::Instance)
    }

    pub fn gitignores(&self) -> TemplateManager<'_, Gitignore> {
        TemplateManager::new(self, TemplateOwner::Instance)
    }

    pub fn gitlabciymls(&self) -> TemplateManager<'_, Gitlabciyml> {
        TemplateManager::new(self, TemplateOwner::Instance)
    }

    pub fn licenses(&self) -> TemplateManager<'_, License> {
        TemplateManager::new(self, TemplateOwner::Instance)
    }

    /// Template managers of the project with the given ID.
    ///
    /// No request is made until one of the managers is used.
    pub fn project(&self, id: u64) -> ProjectTemplates<'_> {
        ProjectTemplates::new(self, id)
    }

    /// Builds the URL of a template collection, or of one template when `id`
    /// is given. The id is percent-encoded as a single path segment, so names
    /// such as `Global/Vim` stay intact.
    pub(crate) fn template_url(
        &self,
        owner: TemplateOwner,
        kind: TemplateKind,
        id: Option<&str>,
        query: &[(&str, String)],
    ) -> Result<Url, Error> {
        if !kind.is_available_at(owner.scope()) {
            warn!(kind = %kind, scope = %owner.scope(), "Template kind not offered at scope");
            return Err(Error::UnsupportedTemplateKind {
                kind,
                scope: owner.scope(),
            });
        }

        let mut url = self.api_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                Error::Configuration(format!("Invalid GitLab URL '{}'", self.api_url))
            })?;
            segments.pop_if_empty();
            segments.extend(owner.path_segments());
            segments.push("templates");
            segments.push(kind.category());
            if let Some(id) = id {
                segments.push(id);
            }
        }

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    async fn send_get(&self, url: Url) -> Result<reqwest::Response, Error> {
        debug!(url = %url, "Sending GET request");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to send request to GitLab");
            Error::Transport(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to read error response body");
                String::new()
            }
        };
        let message = error_message(&body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });
        error!(
            url = %url,
            status = status.as_u16(),
            error_message = message.as_str(),
            "Received an error from GitLab"
        );

        Err(match status.as_u16() {
            401 | 403 => Error::AuthError(message),
            404 => Error::NotFound,
            429 => Error::RateLimitExceeded,
            code => Error::ApiError {
                status: code,
                message,
            },
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        let response = self.send_get(url).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, "Failed to deserialize GitLab response");
            Error::Deserialization(e)
        })
    }

    #[instrument(skip(self, options))]
    pub(crate) async fn list_summaries(
        &self,
        owner: TemplateOwner,
        kind: TemplateKind,
        options: &ListOptions,
    ) -> Result<Vec<TemplateSummary>, Error> {
        let mut page = options.page;
        let mut results = Vec::new();

        loop {
            let url = self.template_url(owner, kind, None, &options.query_pairs(page))?;
            let response = self.send_get(url).await?;
            let next_page = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());

            let body = response.bytes().await?;
            let mut batch: Vec<TemplateSummary> = serde_json::from_slice(&body).map_err(|e| {
                error!(error = %e, "Failed to deserialize GitLab template listing");
                Error::Deserialization(e)
            })?;
            debug!(page = ?page, count = batch.len(), "Received template page");
            results.append(&mut batch);

            match next_page {
                Some(next) if options.all && page.map_or(true, |current| next > current) => {
                    page = Some(next);
                }
                _ => break,
            }
        }

        info!(count = results.len(), "Listed templates");
        Ok(results)
    }
}

/// Runtime-dispatched access to templates, for callers that only know the
/// kind and owner at runtime.
#[async_trait]
pub trait TemplateProvider: Send + Sync {
    /// Fetches a single template.
    ///
    /// # Errors
    /// Returns `Error::UnsupportedTemplateKind` when the kind is not offered
    /// by the owner, before any request is made.
    async fn get_template(
        &self,
        owner: TemplateOwner,
        kind: TemplateKind,
        id: &str,
        options: &GetOptions,
    ) -> Result<AnyTemplate, Error>;

    /// Lists templates of one kind.
    async fn list_templates(
        &self,
        owner: TemplateOwner,
        kind: TemplateKind,
        options: &ListOptions,
    ) -> Result<Vec<TemplateSummary>, Error>;
}

#[async_trait]
impl TemplateProvider for GitLabClient {
    async fn get_template(
        &self,
        owner: TemplateOwner,
        kind: TemplateKind,
        id: &str,
        options: &GetOptions,
    ) -> Result<AnyTemplate, Error> {
        match owner {
            TemplateOwner::Instance => match kind {
                TemplateKind::Dockerfile => self
                    .dockerfiles()
                    .get_with(id, options)
                    .await
                    .map(AnyTemplate::Dockerfile),
                TemplateKind::Gitignore => self
                    .gitignores()
                    .get_with(id, options)
                    .await
                    .map(AnyTemplate::Gitignore),
                TemplateKind::GitlabCiYml => self
                    .gitlabciymls()
                    .get_with(id, options)
                    .await
                    .map(AnyTemplate::Gitlabciyml),
                TemplateKind::License => self
                    .licenses()
                    .get_with(id, options)
                    .await
                    .map(AnyTemplate::License),
                TemplateKind::Issue | TemplateKind::MergeRequest => {
                    Err(Error::UnsupportedTemplateKind {
                        kind,
                        scope: TemplateScope::Instance,
                    })
                }
            },
            TemplateOwner::Project(project_id) => {
                let project = self.project(project_id);
                match kind {
                    TemplateKind::Dockerfile => project
                        .dockerfile_templates()
                        .get_with(id, options)
                        .await
                        .map(AnyTemplate::ProjectDockerfile),
                    TemplateKind::Gitignore => project
                        .gitignore_templates()
                        .get_with(id, options)
                        .await
                        .map(AnyTemplate::ProjectGitignore),
                    TemplateKind::GitlabCiYml => project
                        .gitlabciyml_templates()
                        .get_with(id, options)
                        .await
                        .map(AnyTemplate::ProjectGitlabciyml),
                    TemplateKind::License => project
                        .license_templates()
                        .get_with(id, options)
                        .await
                        .map(AnyTemplate::ProjectLicense),
                    TemplateKind::Issue => project
                        .issue_templates()
                        .get_with(id, options)
                        .await
                        .map(AnyTemplate::ProjectIssue),
                    TemplateKind::MergeRequest => project
                        .mergerequest_templates()
                        .get_with(id, options)
                        .await
                        .map(AnyTemplate::ProjectMergeRequest),
                }
            }
        }
    }

    async fn list_templates(
        &self,
        owner: TemplateOwner,
        kind: TemplateKind,
        options: &ListOptions,
    ) -> Result<Vec<TemplateSummary>, Error> {
        self.list_summaries(owner, kind, options).await
    }
}

/// Creates a `GitLabClient` that authenticates with a private access token.
///
/// # Example
///
/// ```rust,no_run
/// use gitlab_client::create_token_client;
///
/// let client = create_token_client("https://gitlab.example.com", "glpat-xxxxxxxxxxxx").unwrap();
/// let licenses = client.licenses();
/// ```
#[instrument(skip(token))]
pub fn create_token_client(url: &str, token: &str) -> Result<GitLabClient, Error> {
    if token.trim().is_empty() {
        return Err(Error::AuthError("The access token is empty".to_string()));
    }

    GitLabClient::new(ClientConfig {
        url: url.to_string(),
        auth: Auth::PrivateToken(SecretString::from(token.to_string())),
        ..Default::default()
    })
}

/// Creates a `GitLabClient` without credentials.
#[instrument]
pub fn create_anonymous_client(url: &str) -> Result<GitLabClient, Error> {
    GitLabClient::new(ClientConfig {
        url: url.to_string(),
        ..Default::default()
    })
}

/// Pulls the human readable message out of a GitLab error body.
///
/// GitLab uses `{"message": ...}` for most errors and `{"error": ...}` for
/// OAuth failures; the message may itself be an object.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let field = value.get("message").or_else(|| value.get("error"))?;
    match field {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
