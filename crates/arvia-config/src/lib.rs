//! Project configuration for Arvia.
//!
//! Parses the `arvia.json` project descriptor with serde and provides
//! auto-discovery of the descriptor in parent directories.
//!
//! Directory fields are stored relative to the descriptor in the file and
//! resolved against the descriptor's directory on load. CLI settings can be
//! applied during load via [`CliSettings`].
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "version": "1.0.0",
//!   "source": "src",
//!   "build": "dist",
//!   "assets": "assets",
//!   "port": 8080
//! }
//! ```

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Descriptor filename to search for.
pub const CONFIG_FILENAME: &str = "arvia.json";

/// Project name used when none is given.
const DEFAULT_NAME: &str = "arvia-app";

/// CLI settings that override descriptor values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override dev server port.
    pub port: Option<u16>,
    /// Override source directory.
    pub source_dir: Option<PathBuf>,
    /// Override build output directory.
    pub build_dir: Option<PathBuf>,
    /// Override assets directory.
    pub assets_dir: Option<PathBuf>,
}

/// Project configuration.
///
/// Loaded once per invocation and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name.
    pub name: String,
    /// Project version.
    pub version: String,
    /// Directory holding the pages to serve and build.
    #[serde(rename = "source")]
    pub source_dir: PathBuf,
    /// Output directory of `arvia build`.
    #[serde(rename = "build")]
    pub build_dir: PathBuf,
    /// Directory holding static assets (optional on disk).
    #[serde(rename = "assets")]
    pub assets_dir: PathBuf,
    /// Dev server port.
    pub port: u16,

    /// Path to the descriptor (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_owned(),
            version: "1.0.0".to_owned(),
            source_dir: PathBuf::from("src"),
            build_dir: PathBuf::from("dist"),
            assets_dir: PathBuf::from("assets"),
            port: 8080,
            config_path: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Descriptor not found.
    #[error("{} not found. Run 'arvia init' first.", .0.display())]
    NotFound(PathBuf),
    /// Descriptor already exists and would be overwritten.
    #[error("Configuration file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl ProjectConfig {
    /// Default configuration for a new project called `name`.
    #[must_use]
    pub fn for_project(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Self::default()
        }
    }

    /// Load configuration with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `arvia.json` in the current directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no descriptor exists, or an error
    /// if reading, parsing or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        Self::load_in(&cwd, config_path, cli_settings)
    }

    /// Load configuration as seen from `cwd`.
    ///
    /// Relative paths given on the command line (the descriptor path and
    /// directory overrides) are resolved against `cwd`.
    fn load_in(
        cwd: &Path,
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let path = match config_path {
            Some(path) => cwd.join(path),
            None => discover_config(cwd)
                .ok_or_else(|| ConfigError::NotFound(PathBuf::from(CONFIG_FILENAME)))?,
        };

        let mut config = Self::load_from_file(&path)?;

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings, cwd);
            config.validate()?;
        }

        Ok(config)
    }

    /// Load configuration from a specific descriptor file.
    ///
    /// Relative directories are resolved against the descriptor's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid JSON,
    /// or fails validation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;
        tracing::debug!(path = %path.display(), name = %config.name, "Loaded project config");

        Ok(config)
    }

    /// Write the descriptor to `path` as pretty-printed JSON.
    ///
    /// Never overwrites an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if `path` exists, or an I/O error.
    pub fn create(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => ConfigError::AlreadyExists(path.to_path_buf()),
                _ => ConfigError::Io(e),
            })?;
        file.write_all(json.as_bytes())?;
        file.write_all(b"\n")?;

        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Validation("name cannot be empty".to_owned()));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation("port cannot be 0".to_owned()));
        }
        require_dir_set(&self.source_dir, "source")?;
        require_dir_set(&self.build_dir, "build")?;
        require_dir_set(&self.assets_dir, "assets")?;
        let build = normalize(&self.build_dir);
        if normalize(&self.source_dir).starts_with(&build) {
            return Err(ConfigError::Validation(
                "build must differ from source and must not contain it".to_owned(),
            ));
        }
        if normalize(&self.assets_dir).starts_with(&build) {
            return Err(ConfigError::Validation(
                "build must not contain assets".to_owned(),
            ));
        }
        Ok(())
    }

    /// Apply CLI settings, resolving relative directories against `cwd`.
    fn apply_cli_settings(&mut self, settings: &CliSettings, cwd: &Path) {
        if let Some(port) = settings.port {
            self.port = port;
        }
        for (dir, value) in [
            (&mut self.source_dir, &settings.source_dir),
            (&mut self.build_dir, &settings.build_dir),
            (&mut self.assets_dir, &settings.assets_dir),
        ] {
            if let Some(value) = value {
                *dir = cwd.join(value);
            }
        }
    }

    /// Resolve relative directories against the descriptor's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        for dir in [
            &mut self.source_dir,
            &mut self.build_dir,
            &mut self.assets_dir,
        ] {
            if dir.is_relative() {
                *dir = config_dir.join(&*dir);
            }
        }
    }
}

/// Require a directory field to be non-empty.
fn require_dir_set(dir: &Path, field: &str) -> Result<(), ConfigError> {
    if dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            _ => out.push(component),
        }
    }
    out
}

/// Search for the descriptor in `start` and its parents.
#[must_use]
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
