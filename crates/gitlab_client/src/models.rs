//! # Models
//!
//! Addressing types shared by every template endpoint: which kind of template
//! is requested, who owns it, and the options accepted by the get and list
//! calls.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// Largest page size accepted by the GitLab API.
pub const MAX_PER_PAGE: u32 = 100;

/// The category of a template.
///
/// Each kind maps to one collection segment in the URL, e.g.
/// `templates/gitlab_ci_ymls/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Dockerfile,
    Gitignore,
    #[serde(rename = "gitlabciyml")]
    GitlabCiYml,
    License,
    Issue,
    #[serde(rename = "mergerequest")]
    MergeRequest,
}

impl TemplateKind {
    /// All kinds, in the order the API documents them.
    pub const ALL: [TemplateKind; 6] = [
        TemplateKind::Dockerfile,
        TemplateKind::Gitignore,
        TemplateKind::GitlabCiYml,
        TemplateKind::License,
        TemplateKind::Issue,
        TemplateKind::MergeRequest,
    ];

    /// The collection segment used in the request path.
    pub fn category(&self) -> &'static str {
        match self {
            TemplateKind::Dockerfile => "dockerfiles",
            TemplateKind::Gitignore => "gitignores",
            TemplateKind::GitlabCiYml => "gitlab_ci_ymls",
            TemplateKind::License => "licenses",
            TemplateKind::Issue => "issues",
            TemplateKind::MergeRequest => "merge_requests",
        }
    }

    /// The short name used on the command line and in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateKind::Dockerfile => "dockerfile",
            TemplateKind::Gitignore => "gitignore",
            TemplateKind::GitlabCiYml => "gitlabciyml",
            TemplateKind::License => "license",
            TemplateKind::Issue => "issue",
            TemplateKind::MergeRequest => "mergerequest",
        }
    }

    /// The JSON attribute that identifies a template of this kind.
    ///
    /// License templates are keyed by `key` (e.g. `mit`), everything else
    /// by `name`.
    pub fn id_attr(&self) -> &'static str {
        match self {
            TemplateKind::License => "key",
            _ => "name",
        }
    }

    /// Name of the manager that serves this kind on the given scope, if any.
    pub fn manager_name(&self, scope: TemplateScope) -> Option<&'static str> {
        match (scope, self) {
            (TemplateScope::Instance, TemplateKind::Dockerfile) => Some("dockerfiles"),
            (TemplateScope::Instance, TemplateKind::Gitignore) => Some("gitignores"),
            (TemplateScope::Instance, TemplateKind::GitlabCiYml) => Some("gitlabciymls"),
            (TemplateScope::Instance, TemplateKind::License) => Some("licenses"),
            (TemplateScope::Instance, TemplateKind::Issue | TemplateKind::MergeRequest) => None,
            (TemplateScope::Project, TemplateKind::Dockerfile) => Some("dockerfile_templates"),
            (TemplateScope::Project, TemplateKind::Gitignore) => Some("gitignore_templates"),
            (TemplateScope::Project, TemplateKind::GitlabCiYml) => Some("gitlabciyml_templates"),
            (TemplateScope::Project, TemplateKind::License) => Some("license_templates"),
            (TemplateScope::Project, TemplateKind::Issue) => Some("issue_templates"),
            (TemplateScope::Project, TemplateKind::MergeRequest) => Some("mergerequest_templates"),
        }
    }

    /// Whether the kind is offered at the given scope.
    pub fn is_available_at(&self, scope: TemplateScope) -> bool {
        self.manager_name(scope).is_some()
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    /// Accepts the short name (`gitlabciyml`) or the collection segment
    /// (`gitlab_ci_ymls`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TemplateKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted || kind.category() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown template kind `{}`, expected one of: {}",
                    s,
                    TemplateKind::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

/// The level a template is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateScope {
    Instance,
    Project,
}

impl fmt::Display for TemplateScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateScope::Instance => f.write_str("instance"),
            TemplateScope::Project => f.write_str("project"),
        }
    }
}

/// The entity that aggregates template managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateOwner {
    /// The GitLab instance itself (`/templates/...`).
    Instance,
    /// A single project, addressed by its numeric ID (`/projects/{id}/templates/...`).
    Project(u64),
}

impl TemplateOwner {
    pub fn scope(&self) -> TemplateScope {
        match self {
            TemplateOwner::Instance => TemplateScope::Instance,
            TemplateOwner::Project(_) => TemplateScope::Project,
        }
    }

    /// Path prefix of the owner relative to the API root, with leading and
    /// trailing slashes (`/` or `/projects/42/`).
    pub fn path_prefix(&self) -> String {
        match self {
            TemplateOwner::Instance => "/".to_string(),
            TemplateOwner::Project(id) => format!("/projects/{}/", id),
        }
    }

    pub(crate) fn path_segments(&self) -> Vec<String> {
        match self {
            TemplateOwner::Instance => Vec::new(),
            TemplateOwner::Project(id) => vec!["projects".to_string(), id.to_string()],
        }
    }
}

/// An entry of a template listing.
///
/// Listing endpoints return identifiers only; fetch the template to get its
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSummary {
    /// Machine key, present for licenses and project templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Display name of the template.
    pub name: String,
}

impl TemplateSummary {
    /// The value to pass to `get` for this entry.
    pub fn id(&self, kind: TemplateKind) -> &str {
        match (kind, &self.key) {
            (TemplateKind::License, Some(key)) => key,
            _ => &self.name,
        }
    }
}

/// Optional query parameters for fetching a single template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    /// Project name substituted into license placeholders.
    pub project: Option<String>,

    /// Copyright holder substituted into license placeholders.
    pub fullname: Option<String>,

    /// Project that provides the template, for project-scoped requests.
    pub source_template_project_id: Option<u64>,
}

impl GetOptions {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(project) = &self.project {
            pairs.push(("project", project.clone()));
        }
        if let Some(fullname) = &self.fullname {
            pairs.push(("fullname", fullname.clone()));
        }
        if let Some(source) = self.source_template_project_id {
            pairs.push(("source_template_project_id", source.to_string()));
        }
        pairs
    }
}

/// Pagination options for template listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to start from (1-based). The server default applies when unset.
    pub page: Option<u32>,

    /// Items per page, clamped to [`MAX_PER_PAGE`].
    pub per_page: Option<u32>,

    /// Follow the `x-next-page` header until the last page.
    pub all: bool,
}

impl ListOptions {
    /// Options that fetch every page.
    pub fn all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }

    pub(crate) fn query_pairs(&self, page: Option<u32>) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string()));
        }
        pairs
    }
}
