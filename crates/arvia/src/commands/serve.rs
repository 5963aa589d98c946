//! `arvia serve` command implementation.

use std::path::PathBuf;

use arvia_config::{CliSettings, ProjectConfig};
use arvia_server::{run_server, server_config_from_project};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover arvia.json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to.
    #[arg(long, env = "ARVIA_HOST")]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Disable live reload.
    #[arg(long)]
    no_live_reload: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the source directory is
    /// missing, or the server fails to start.
    pub(crate) async fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            port: self.port,
            source_dir: self.source_dir,
            ..CliSettings::default()
        };
        let project = ProjectConfig::load(self.config.as_deref(), Some(&cli_settings))?;

        if !project.source_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Source directory '{}' not found",
                project.source_dir.display()
            )));
        }

        let mut server_config = server_config_from_project(&project);
        if let Some(host) = self.host {
            server_config.host = host;
        }
        server_config.live_reload_enabled = !self.no_live_reload;

        output.highlight("Starting Arvia development server...");
        output.field("Serving", &project.source_dir.display().to_string());
        output.field(
            "URL",
            &format!("http://{}:{}", server_config.host, server_config.port),
        );
        output.field(
            "Live reload",
            if server_config.live_reload_enabled {
                "enabled"
            } else {
                "disabled"
            },
        );
        output.blank();
        output.info("Press Ctrl+C to stop");

        run_server(server_config).await?;
        Ok(())
    }
}
