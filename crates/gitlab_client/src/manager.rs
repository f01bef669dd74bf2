//! Template managers.
//!
//! A manager binds a client, an owner and a wrapper type together. It knows
//! which collection to hit and what type to return, so calling code never
//! builds template URLs by hand.

use std::marker::PhantomData;

use tracing::{error, info, instrument};

use crate::models::{GetOptions, ListOptions, TemplateKind, TemplateOwner, TemplateSummary};
use crate::templates::{
    ProjectDockerfileTemplate, ProjectGitignoreTemplate, ProjectGitlabciymlTemplate,
    ProjectIssueTemplate, ProjectLicenseTemplate, ProjectMergeRequestTemplate, TemplateResource,
};
use crate::{Error, GitLabClient};

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;

/// Read-only access to one template collection.
///
/// Obtain one from [`GitLabClient::dockerfiles`] and friends, or from a
/// [`ProjectTemplates`] handle.
#[derive(Debug)]
pub struct TemplateManager<'a, T> {
    client: &'a GitLabClient,
    owner: TemplateOwner,
    _template: PhantomData<fn() -> T>,
}

impl<'a, T> Clone for TemplateManager<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for TemplateManager<'a, T> {}

impl<'a, T: TemplateResource> TemplateManager<'a, T> {
    pub(crate) fn new(client: &'a GitLabClient, owner: TemplateOwner) -> Self {
        debug_assert_eq!(owner.scope(), T::SCOPE);
        Self {
            client,
            owner,
            _template: PhantomData,
        }
    }

    pub fn owner(&self) -> TemplateOwner {
        self.owner
    }

    /// Request path of the template relative to the API root, e.g.
    /// `/projects/1/templates/licenses/mit`.
    ///
    /// The identifier is percent-encoded as a single segment, the same way
    /// it is sent.
    pub fn path(&self, id: &str) -> String {
        let mut url = self.client.api_url().clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .clear()
                .extend(self.owner.path_segments())
                .push("templates")
                .push(T::KIND.category())
                .push(id);
        }
        url.path().to_string()
    }

    /// Fetches a single template by its identifier.
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` if the template does not exist.
    /// * `Error::InvalidResponse` if the returned identifier differs from `id`.
    /// * Any other `Error` produced by the request itself.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use gitlab_client::create_anonymous_client;
    /// # async fn example() -> Result<(), gitlab_client::Error> {
    /// let client = create_anonymous_client("https://gitlab.com")?;
    /// let ci = client.gitlabciymls().get("Rust").await?;
    /// println!("{}", ci.content);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, id: &str) -> Result<T, Error> {
        self.get_with(id, &GetOptions::default()).await
    }

    /// Fetches a single template, passing the given query parameters.
    #[instrument(skip(self, options), fields(kind = %T::KIND, owner = ?self.owner))]
    pub async fn get_with(&self, id: &str, options: &GetOptions) -> Result<T, Error> {
        let url =
            self.client
                .template_url(self.owner, T::KIND, Some(id), &options.query_pairs())?;
        let template: T = self.client.get_json(url).await?;

        // License keys come back lowercased.
        let matches = if T::KIND == TemplateKind::License {
            template.id().eq_ignore_ascii_case(id)
        } else {
            template.id() == id
        };
        if !matches {
            error!(
                requested = id,
                received = template.id(),
                id_attr = T::ID_ATTR,
                "Template returned by GitLab does not match the requested identifier"
            );
            return Err(Error::InvalidResponse);
        }

        info!(
            id = id,
            content_length = template.content().len(),
            "Retrieved template"
        );
        Ok(template)
    }

    /// Lists the templates of this collection.
    ///
    /// Entries carry identifiers only; use [`get`](Self::get) for content.
    pub async fn list(&self, options: &ListOptions) -> Result<Vec<TemplateSummary>, Error> {
        self.client
            .list_summaries(self.owner, T::KIND, options)
            .await
    }
}

/// The template managers of a single project.
#[derive(Debug, Clone, Copy)]
pub struct ProjectTemplates<'a> {
    client: &'a GitLabClient,
    id: u64,
}

impl<'a> ProjectTemplates<'a> {
    pub(crate) fn new(client: &'a GitLabClient, id: u64) -> Self {
        Self { client, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    fn manager<T: TemplateResource>(&self) -> TemplateManager<'a, T> {
        TemplateManager::new(self.client, TemplateOwner::Project(self.id))
    }

    pub fn dockerfile_templates(&self) -> TemplateManager<'a, ProjectDockerfileTemplate> {
        self.manager()
    }

    pub fn gitignore_templates(&self) -> TemplateManager<'a, ProjectGitignoreTemplate> {
        self.manager()
    }

    pub fn gitlabciyml_templates(&self) -> TemplateManager<'a, ProjectGitlabciymlTemplate> {
        self.manager()
    }

    pub fn license_templates(&self) -> TemplateManager<'a, ProjectLicenseTemplate> {
        self.manager()
    }

    /// Issue description templates stored in the project's
    /// `.gitlab/issue_templates` directory.
    pub fn issue_templates(&self) -> TemplateManager<'a, ProjectIssueTemplate> {
        self.manager()
    }

    /// Merge request description templates stored in the project's
    /// `.gitlab/merge_request_templates` directory.
    pub fn mergerequest_templates(&self) -> TemplateManager<'a, ProjectMergeRequestTemplate> {
        self.manager()
    }
}
