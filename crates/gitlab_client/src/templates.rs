//! Template domain types.
//!
//! GitLab returns every template as a small JSON object holding an identifier
//! and the template text. Each (owner, kind) pair still gets its own wrapper
//! type so that a manager can only ever hand back the type it was created
//! for: a `licenses()` manager yields [`License`], a project's
//! `license_templates()` manager yields [`ProjectLicenseTemplate`], and so on.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::{TemplateKind, TemplateScope};

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;

/// Behaviour shared by every template wrapper.
///
/// The associated constants describe where the type lives in the API; the
/// methods expose the fields every template has.
pub trait TemplateResource: DeserializeOwned + Send {
    /// The category this type is fetched from.
    const KIND: TemplateKind;

    /// Whether the type is served at instance or project level.
    const SCOPE: TemplateScope;

    /// Name of the JSON attribute that identifies the template.
    const ID_ATTR: &'static str;

    /// Value of the identifying attribute.
    fn id(&self) -> &str;

    /// Template text.
    fn content(&self) -> &str;
}

macro_rules! named_template {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $scope:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            /// Template name. This is the identifying attribute.
            pub name: String,

            /// Machine key, when the server reports one.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub key: Option<String>,

            /// Template text.
            #[serde(default)]
            pub content: String,
        }

        impl TemplateResource for $name {
            const KIND: TemplateKind = $kind;
            const SCOPE: TemplateScope = $scope;
            const ID_ATTR: &'static str = "name";

            fn id(&self) -> &str {
                &self.name
            }

            fn content(&self) -> &str {
                &self.content
            }
        }
    };
}

macro_rules! license_template {
    ($(#[$meta:meta])* $name:ident, $scope:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            /// License key (e.g. `mit`). This is the identifying attribute.
            pub key: String,

            /// Full license name (e.g. `MIT License`).
            #[serde(default)]
            pub name: String,

            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub nickname: Option<String>,

            /// Whether GitLab lists the license among the popular ones.
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub popular: Option<bool>,

            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub html_url: Option<String>,

            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub source_url: Option<String>,

            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub description: Option<String>,

            /// Conditions imposed by the license (e.g. `include-copyright`).
            #[serde(default, skip_serializing_if = "Vec::is_empty")]
            pub conditions: Vec<String>,

            #[serde(default, skip_serializing_if = "Vec::is_empty")]
            pub permissions: Vec<String>,

            #[serde(default, skip_serializing_if = "Vec::is_empty")]
            pub limitations: Vec<String>,

            /// License text, with placeholders filled in when the request
            /// supplied `project`/`fullname`.
            #[serde(default)]
            pub content: String,
        }

        impl TemplateResource for $name {
            const KIND: TemplateKind = TemplateKind::License;
            const SCOPE: TemplateScope = $scope;
            const ID_ATTR: &'static str = "key";

            fn id(&self) -> &str {
                &self.key
            }

            fn content(&self) -> &str {
                &self.content
            }
        }
    };
}

named_template!(
    /// A Dockerfile template offered by the instance.
    Dockerfile,
    TemplateKind::Dockerfile,
    TemplateScope::Instance
);

named_template!(
    /// A `.gitignore` template offered by the instance.
    Gitignore,
    TemplateKind::Gitignore,
    TemplateScope::Instance
);

named_template!(
    /// A `.gitlab-ci.yml` template offered by the instance.
    Gitlabciyml,
    TemplateKind::GitlabCiYml,
    TemplateScope::Instance
);

license_template!(
    /// An open source license template offered by the instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use gitlab_client::{License, TemplateResource};
    ///
    /// let license: License = serde_json::from_str(
    ///     r#"{"key": "mit", "name": "MIT License", "content": "MIT License\n..."}"#,
    /// ).unwrap();
    /// assert_eq!(license.id(), "mit");
    /// assert_eq!(License::ID_ATTR, "key");
    /// ```
    License,
    TemplateScope::Instance
);

named_template!(
    /// A Dockerfile template as seen from a project.
    ProjectDockerfileTemplate,
    TemplateKind::Dockerfile,
    TemplateScope::Project
);

named_template!(
    /// A `.gitignore` template as seen from a project.
    ProjectGitignoreTemplate,
    TemplateKind::Gitignore,
    TemplateScope::Project
);

named_template!(
    /// A `.gitlab-ci.yml` template as seen from a project.
    ProjectGitlabciymlTemplate,
    TemplateKind::GitlabCiYml,
    TemplateScope::Project
);

license_template!(
    /// A license template as seen from a project.
    ProjectLicenseTemplate,
    TemplateScope::Project
);

named_template!(
    /// An issue description template stored in a project.
    ProjectIssueTemplate,
    TemplateKind::Issue,
    TemplateScope::Project
);

named_template!(
    /// A merge request description template stored in a project.
    ProjectMergeRequestTemplate,
    TemplateKind::MergeRequest,
    TemplateScope::Project
);

/// Any of the template wrappers, for callers that pick the kind at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnyTemplate {
    Dockerfile(Dockerfile),
    Gitignore(Gitignore),
    Gitlabciyml(Gitlabciyml),
    License(License),
    ProjectDockerfile(ProjectDockerfileTemplate),
    ProjectGitignore(ProjectGitignoreTemplate),
    ProjectGitlabciyml(ProjectGitlabciymlTemplate),
    ProjectLicense(ProjectLicenseTemplate),
    ProjectIssue(ProjectIssueTemplate),
    ProjectMergeRequest(ProjectMergeRequestTemplate),
}

impl AnyTemplate {
    pub fn kind(&self) -> TemplateKind {
        match self {
            AnyTemplate::Dockerfile(_) => Dockerfile::KIND,
            AnyTemplate::Gitignore(_) => Gitignore::KIND,
            AnyTemplate::Gitlabciyml(_) => Gitlabciyml::KIND,
            AnyTemplate::License(_) => License::KIND,
            AnyTemplate::ProjectDockerfile(_) => ProjectDockerfileTemplate::KIND,
            AnyTemplate::ProjectGitignore(_) => ProjectGitignoreTemplate::KIND,
            AnyTemplate::ProjectGitlabciyml(_) => ProjectGitlabciymlTemplate::KIND,
            AnyTemplate::ProjectLicense(_) => ProjectLicenseTemplate::KIND,
            AnyTemplate::ProjectIssue(_) => ProjectIssueTemplate::KIND,
            AnyTemplate::ProjectMergeRequest(_) => ProjectMergeRequestTemplate::KIND,
        }
    }

    pub fn scope(&self) -> TemplateScope {
        match self {
            AnyTemplate::Dockerfile(_)
            | AnyTemplate::Gitignore(_)
            | AnyTemplate::Gitlabciyml(_)
            | AnyTemplate::License(_) => TemplateScope::Instance,
            _ => TemplateScope::Project,
        }
    }

    /// Name of the wrapper type, e.g. `ProjectIssueTemplate`.
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyTemplate::Dockerfile(_) => "Dockerfile",
            AnyTemplate::Gitignore(_) => "Gitignore",
            AnyTemplate::Gitlabciyml(_) => "Gitlabciyml",
            AnyTemplate::License(_) => "License",
            AnyTemplate::ProjectDockerfile(_) => "ProjectDockerfileTemplate",
            AnyTemplate::ProjectGitignore(_) => "ProjectGitignoreTemplate",
            AnyTemplate::ProjectGitlabciyml(_) => "ProjectGitlabciymlTemplate",
            AnyTemplate::ProjectLicense(_) => "ProjectLicenseTemplate",
            AnyTemplate::ProjectIssue(_) => "ProjectIssueTemplate",
            AnyTemplate::ProjectMergeRequest(_) => "ProjectMergeRequestTemplate",
        }
    }

    pub fn id_attr(&self) -> &'static str {
        self.kind().id_attr()
    }

    pub fn id(&self) -> &str {
        match self {
            AnyTemplate::Dockerfile(t) => t.id(),
            AnyTemplate::Gitignore(t) => t.id(),
            AnyTemplate::Gitlabciyml(t) => t.id(),
            AnyTemplate::License(t) => t.id(),
            AnyTemplate::ProjectDockerfile(t) => t.id(),
            AnyTemplate::ProjectGitignore(t) => t.id(),
            AnyTemplate::ProjectGitlabciyml(t) => t.id(),
            AnyTemplate::ProjectLicense(t) => t.id(),
            AnyTemplate::ProjectIssue(t) => t.id(),
            AnyTemplate::ProjectMergeRequest(t) => t.id(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            AnyTemplate::Dockerfile(t) => t.content(),
            AnyTemplate::Gitignore(t) => t.content(),
            AnyTemplate::Gitlabciyml(t) => t.content(),
            AnyTemplate::License(t) => t.content(),
            AnyTemplate::ProjectDockerfile(t) => t.content(),
            AnyTemplate::ProjectGitignore(t) => t.content(),
            AnyTemplate::ProjectGitlabciyml(t) => t.content(),
            AnyTemplate::ProjectLicense(t) => t.content(),
            AnyTemplate::ProjectIssue(t) => t.content(),
            AnyTemplate::ProjectMergeRequest(t) => t.content(),
        }
    }
}
