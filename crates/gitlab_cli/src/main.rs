use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitlab_cli::commands::{
    auth_cmd::AuthCommands, config_cmd::ConfigCommands, template_cmd::TemplateCommands,
};

/// gitlab-templates: Fetch license, .gitignore, CI, Dockerfile and
/// description templates from GitLab
#[derive(Parser)]
#[command(name = "gitlab-templates")]
#[command(about = "Fetch templates from a GitLab instance", long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to ./gitlab-templates.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Auth(AuthCommands),

    #[command(subcommand)]
    Config(ConfigCommands),

    #[command(subcommand)]
    Template(TemplateCommands),

    /// Show the CLI version
    Version,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("GITLAB_TEMPLATES_LOG"))
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Auth(cmd) => gitlab_cli::commands::auth_cmd::execute(cmd, config).await,
        Commands::Config(cmd) => gitlab_cli::commands::config_cmd::execute(cmd, config).await,
        Commands::Template(cmd) => gitlab_cli::commands::template_cmd::execute(cmd, config).await,
        Commands::Version => {
            println!("gitlab-templates {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
