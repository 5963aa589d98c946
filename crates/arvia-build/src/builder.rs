//! Production bundle builder.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arvia_config::ProjectConfig;

use crate::copy::{CopyError, copy_dir};

/// Name of the assets directory inside the build output.
pub const ASSETS_DIR_NAME: &str = "assets";

/// Error returned by the build pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The source directory does not exist.
    #[error("Source directory '{}' not found", .0.display())]
    SourceNotFound(PathBuf),
    /// Copying the source tree failed.
    #[error("Error copying source files: {0}")]
    CopySource(#[source] CopyError),
    /// Copying the assets tree failed.
    #[error("Error copying assets: {0}")]
    CopyAssets(#[source] CopyError),
    /// Cleaning the output would delete project input.
    #[error("Build directory '{}' contains '{}'; refusing to clean it", build.display(), input.display())]
    OutputContainsInput {
        /// Configured build directory.
        build: PathBuf,
        /// Source or assets directory inside it.
        input: PathBuf,
    },
}

/// Outcome of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    /// Directory the bundle was written to.
    pub output_dir: PathBuf,
    /// Number of files copied from the source directory.
    pub source_files: usize,
    /// Number of files copied from the assets directory, `None` if it does not exist.
    pub asset_files: Option<usize>,
    /// Non-fatal problems (e.g. the stale output could not be removed).
    pub warnings: Vec<String>,
}

/// Mirrors the source and assets trees into a clean output directory.
pub struct BuildPipeline {
    source_dir: PathBuf,
    assets_dir: PathBuf,
    build_dir: PathBuf,
}

impl BuildPipeline {
    /// Create a pipeline for the given project.
    #[must_use]
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            assets_dir: config.assets_dir.clone(),
            build_dir: config.build_dir.clone(),
        }
    }

    /// Run the build.
    ///
    /// Output is not rolled back on failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the source directory is missing, if the build
    /// directory is or contains the source or assets directory, or if any
    /// file of the source tree, or of the assets tree when it exists, cannot
    /// be copied.
    pub fn run(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        if !self.source_dir.is_dir() {
            return Err(BuildError::SourceNotFound(self.source_dir.clone()));
        }

        check_output_is_separate(&self.build_dir, [&self.source_dir, &self.assets_dir])?;

        let mut warnings = Vec::new();
        if let Err(e) = remove_stale_output(&self.build_dir) {
            tracing::warn!(path = %self.build_dir.display(), error = %e, "Could not clean build directory");
            warnings.push(format!("Could not clean build directory: {e}"));
        }

        let source_files =
            copy_dir(&self.source_dir, &self.build_dir).map_err(BuildError::CopySource)?;
        tracing::info!(files = source_files, "Copied source files");

        let asset_files = if self.assets_dir.exists() {
            let destination = self.build_dir.join(ASSETS_DIR_NAME);
            let count = copy_dir(&self.assets_dir, &destination).map_err(BuildError::CopyAssets)?;
            tracing::info!(files = count, "Copied assets");
            Some(count)
        } else {
            tracing::debug!(path = %self.assets_dir.display(), "No assets directory, skipping");
            None
        };

        tracing::info!(
            output = %self.build_dir.display(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Build completed"
        );

        Ok(BuildReport {
            output_dir: self.build_dir.clone(),
            source_files,
            asset_files,
            warnings,
        })
    }
}

/// Refuse a build dir that is, or contains, one of `inputs`.
///
/// Compares canonical paths, so relative spellings and symlinks are caught.
/// A build dir that does not exist yet cannot contain anything.
fn check_output_is_separate(build_dir: &Path, inputs: [&Path; 2]) -> Result<(), BuildError> {
    let Ok(build) = fs::canonicalize(build_dir) else {
        return Ok(());
    };
    for input in inputs {
        if fs::canonicalize(input).is_ok_and(|input| input.starts_with(&build)) {
            return Err(BuildError::OutputContainsInput {
                build: build_dir.to_path_buf(),
                input: input.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Remove a previous build, treating an absent directory as already clean.
fn remove_stale_output(build_dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(build_dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}
