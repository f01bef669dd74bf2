//! Template retrieval commands for the gitlab-templates CLI.
//!
//! # Examples
//!
//! ```bash
//! # Print the MIT license with the placeholders filled in
//! gitlab-templates template get license mit --fullname "Jane Doe"
//!
//! # Print a project's bug report issue template as JSON
//! gitlab-templates template get issue Bug --project 42 --format json
//!
//! # List every .gitignore template on the instance
//! gitlab-templates template list gitignore --all
//! ```

use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use gitlab_client::{
    AnyTemplate, GetOptions, GitLabClient, ListOptions, TemplateKind, TemplateOwner,
    TemplateProvider, TemplateSummary,
};
use tracing::{debug, info, instrument};

use crate::commands::auth_cmd::resolve_token;
use crate::config::{get_config_path, AppConfig};
use crate::errors::Error;

#[cfg(test)]
#[path = "template_cmd_tests.rs"]
mod tests;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable output.
    Pretty,
    /// Pretty-printed JSON, suitable for scripting.
    Json,
}

/// Template retrieval subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TemplateCommands {
    /// Fetch a single template and print it.
    Get {
        /// Template kind: dockerfile, gitignore, gitlabciyml, license, issue
        /// or mergerequest.
        kind: TemplateKind,

        /// Template name, or key for licenses.
        id: String,

        /// Read the template through this project instead of the instance.
        #[arg(long)]
        project: Option<u64>,

        /// Project that provides the template (project scope only).
        #[arg(long)]
        source_project: Option<u64>,

        /// Project name to fill into license placeholders.
        #[arg(long)]
        license_project: Option<String>,

        /// Copyright holder to fill into license placeholders.
        #[arg(long)]
        fullname: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// List the available templates of one kind.
    List {
        /// Template kind: dockerfile, gitignore, gitlabciyml, license, issue
        /// or mergerequest.
        kind: TemplateKind,

        /// List the templates visible to this project instead of the instance.
        #[arg(long)]
        project: Option<u64>,

        /// Page to fetch (1-based).
        #[arg(long)]
        page: Option<u32>,

        /// Entries per page (at most 100).
        #[arg(long)]
        per_page: Option<u32>,

        /// Fetch every page.
        #[arg(long)]
        all: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

/// Executes the specified template command.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration cannot be loaded or a token cannot be resolved
/// - The template kind is not offered at the requested scope
/// - The GitLab request fails
/// - Output formatting fails
#[instrument]
pub async fn execute(cmd: &TemplateCommands, config_path: Option<&str>) -> Result<(), Error> {
    let client = create_client(config_path)?;

    let output = match cmd {
        TemplateCommands::Get {
            kind,
            id,
            project,
            source_project,
            license_project,
            fullname,
            format,
        } => {
            let options = GetOptions {
                project: license_project.clone(),
                fullname: fullname.clone(),
                source_template_project_id: *source_project,
            };
            let template = get_template(&client, owner_for(*project), *kind, id, &options).await?;
            render_template(&template, *format)?
        }
        TemplateCommands::List {
            kind,
            project,
            page,
            per_page,
            all,
            format,
        } => {
            let options = ListOptions {
                page: *page,
                per_page: *per_page,
                all: *all,
            };
            let summaries = list_templates(&client, owner_for(*project), *kind, &options).await?;
            render_summaries(*kind, &summaries, *format)?
        }
    };

    println!("{}", output);
    Ok(())
}

/// Builds a client from the configuration file and the resolved token.
fn create_client(config_path: Option<&str>) -> Result<GitLabClient, Error> {
    let config_path = get_config_path(config_path);
    let config = AppConfig::load_or_default(&config_path)?;
    let token = resolve_token(&config)?;

    debug!(
        url = %config.server.url,
        authenticated = token.is_some(),
        "Creating GitLab client"
    );
    Ok(GitLabClient::new(config.client_config(token))?)
}

fn owner_for(project: Option<u64>) -> TemplateOwner {
    match project {
        Some(id) => TemplateOwner::Project(id),
        None => TemplateOwner::Instance,
    }
}

/// Fetches one template through the given provider.
///
/// Kinds that only exist on projects are rejected with
/// `Error::InvalidArguments` before any request is made.
pub async fn get_template(
    provider: &dyn TemplateProvider,
    owner: TemplateOwner,
    kind: TemplateKind,
    id: &str,
    options: &GetOptions,
) -> Result<AnyTemplate, Error> {
    check_scope(owner, kind)?;
    let template = provider.get_template(owner, kind, id, options).await?;
    info!(
        kind = %kind,
        id = template.id(),
        type_name = template.type_name(),
        "Fetched template"
    );
    Ok(template)
}

/// Lists templates through the given provider.
pub async fn list_templates(
    provider: &dyn TemplateProvider,
    owner: TemplateOwner,
    kind: TemplateKind,
    options: &ListOptions,
) -> Result<Vec<TemplateSummary>, Error> {
    check_scope(owner, kind)?;
    let summaries = provider.list_templates(owner, kind, options).await?;
    info!(kind = %kind, count = summaries.len(), "Listed templates");
    Ok(summaries)
}

fn check_scope(owner: TemplateOwner, kind: TemplateKind) -> Result<(), Error> {
    if kind.is_available_at(owner.scope()) {
        Ok(())
    } else {
        Err(Error::InvalidArguments(format!(
            "{} templates are only available on projects, pass --project <ID>",
            kind
        )))
    }
}

/// Renders a template for display.
pub fn render_template(template: &AnyTemplate, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(template)
            .map_err(|e| Error::Output(format!("Failed to serialize template: {}", e))),
        OutputFormat::Pretty => {
            let header = format!(
                "{} ({}: {})",
                template.type_name().bold(),
                template.id_attr(),
                template.id().cyan()
            );
            Ok(format!("{}\n\n{}", header, template.content()))
        }
    }
}

/// Renders a template listing for display.
pub fn render_summaries(
    kind: TemplateKind,
    summaries: &[TemplateSummary],
    format: OutputFormat,
) -> Result<String, Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summaries)
            .map_err(|e| Error::Output(format!("Failed to serialize templates: {}", e))),
        OutputFormat::Pretty => {
            if summaries.is_empty() {
                return Ok(format!("No {} templates found", kind));
            }
            let lines: Vec<String> = summaries
                .iter()
                .map(|s| {
                    let id = s.id(kind);
                    if id == s.name {
                        format!("  {}", id.green())
                    } else {
                        format!("  {} - {}", id.green(), s.name)
                    }
                })
                .collect();
            Ok(format!(
                "{} {} template(s):\n{}",
                summaries.len(),
                kind,
                lines.join("\n")
            ))
        }
    }
}
