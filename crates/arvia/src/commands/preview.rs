//! `arvia preview` command implementation.

use std::path::PathBuf;

use arvia_config::ProjectConfig;
use arvia_server::{preview_config_from_project, run_preview};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the preview command.
#[derive(Args)]
pub(crate) struct PreviewArgs {
    /// Path to configuration file (default: auto-discover arvia.json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to bind to (default: configured port + 1).
    #[arg(short, long)]
    port: Option<u16>,
}

impl PreviewArgs {
    /// Execute the preview command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, nothing has been built yet,
    /// or the server fails to start.
    pub(crate) async fn execute(self, output: &Output) -> Result<(), CliError> {
        let project = ProjectConfig::load(self.config.as_deref(), None)?;

        if !project.build_dir.is_dir() {
            return Err(CliError::Validation(
                "Build not found. Run 'arvia build' first.".to_owned(),
            ));
        }

        let mut preview_config = preview_config_from_project(&project);
        if let Some(port) = self.port {
            preview_config.port = port;
        }

        output.highlight("Starting preview server...");
        output.field("Serving", &project.build_dir.display().to_string());
        output.field(
            "URL",
            &format!("http://{}:{}", preview_config.host, preview_config.port),
        );
        output.blank();
        output.info("Press Ctrl+C to stop");

        run_preview(preview_config).await?;
        Ok(())
    }
}
