//! `arvia build` command implementation.

use std::path::PathBuf;

use arvia_build::BuildPipeline;
use arvia_config::{CliSettings, ProjectConfig};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover arvia.json).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl BuildArgs {
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            build_dir: self.output_dir,
            ..CliSettings::default()
        };
        let project = ProjectConfig::load(self.config.as_deref(), Some(&cli_settings))?;

        output.highlight("Building Arvia project...");
        output.field("Source", &project.source_dir.display().to_string());
        output.field("Output", &project.build_dir.display().to_string());

        let report = BuildPipeline::new(&project).run()?;

        for warning in &report.warnings {
            output.warning(&format!("Warning: {warning}"));
        }
        output.success(&format!("Copied {} source files", report.source_files));
        match report.asset_files {
            Some(count) => output.success(&format!("Copied {count} asset files")),
            None => output.info("No assets directory, skipped"),
        }
        output.success(&format!(
            "Build completed: {}",
            report.output_dir.display()
        ));

        Ok(())
    }
}
