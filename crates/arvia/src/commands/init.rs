//! `arvia init` command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use arvia_config::{CONFIG_FILENAME, ProjectConfig};
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const STYLE_CSS: &str = include_str!("../../templates/style.css");
const APP_JS: &str = include_str!("../../templates/app.js");

/// Arguments for the init command.
#[derive(Args)]
pub(crate) struct InitArgs {
    /// Project name, also used as the directory name.
    #[arg(default_value = "my-arvia-app")]
    name: String,
}

impl InitArgs {
    /// Execute the init command.
    ///
    /// # Errors
    ///
    /// Returns an error if the project already exists or files cannot be written.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        output.highlight(&format!("Creating Arvia project: {}", self.name));

        let root = scaffold(Path::new("."), &self.name)?;

        output.success(&format!("Project '{}' created", self.name));
        output.info("Structure:");
        output.info(&format!("   {}/", root.display()));
        output.info("   ├── src/index.html");
        output.info("   ├── assets/css/style.css");
        output.info("   ├── assets/js/app.js");
        output.info(&format!("   └── {CONFIG_FILENAME}"));
        output.blank();
        output.info("Get started:");
        output.info(&format!("   cd {}", self.name));
        output.info("   arvia serve");

        Ok(())
    }
}

/// Create the starter project `name` inside `parent`.
///
/// The descriptor is written first so an existing project is never touched.
fn scaffold(parent: &Path, name: &str) -> Result<PathBuf, CliError> {
    if name.trim().is_empty() {
        return Err(CliError::Validation("Project name cannot be empty".to_owned()));
    }

    let root = parent.join(name);
    fs::create_dir_all(&root)?;

    let config = ProjectConfig::for_project(name);
    config.validate()?;
    config.create(&root.join(CONFIG_FILENAME))?;

    let source = root.join(&config.source_dir);
    let assets = root.join(&config.assets_dir);
    for dir in [
        source.clone(),
        assets.join("css"),
        assets.join("js"),
        assets.join("img"),
    ] {
        fs::create_dir_all(dir)?;
    }

    fs::write(source.join("index.html"), INDEX_HTML.replace("{{name}}", &escape_html(name)))?;
    fs::write(assets.join("css/style.css"), STYLE_CSS)?;
    fs::write(assets.join("js/app.js"), APP_JS)?;

    tracing::info!(path = %root.display(), "Project scaffolded");
    Ok(root)
}

/// Escape text for use inside HTML element content.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    use arvia_config::ConfigError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scaffold_creates_tree() {
        let temp = tempfile::tempdir().unwrap();

        let root = scaffold(temp.path(), "site").unwrap();

        assert_eq!(root, temp.path().join("site"));
        assert!(root.join("src/index.html").is_file());
        assert!(root.join("assets/css/style.css").is_file());
        assert!(root.join("assets/js/app.js").is_file());
        assert!(root.join("assets/img").is_dir());
        assert!(root.join(CONFIG_FILENAME).is_file());
    }

    #[test]
    fn test_scaffold_descriptor_loads() {
        let temp = tempfile::tempdir().unwrap();
        let root = scaffold(temp.path(), "site").unwrap();

        let config = ProjectConfig::load_from_file(&root.join(CONFIG_FILENAME)).unwrap();

        assert_eq!(config.name, "site");
        assert_eq!(config.port, 8080);
        assert_eq!(config.source_dir, root.join("src"));
        assert_eq!(config.build_dir, root.join("dist"));
        assert_eq!(config.assets_dir, root.join("assets"));
    }

    #[test]
    fn test_scaffold_page_carries_name_and_body() {
        let temp = tempfile::tempdir().unwrap();
        let root = scaffold(temp.path(), "site").unwrap();

        let page = fs::read_to_string(root.join("src/index.html")).unwrap();

        assert!(page.contains("<title>site</title>"));
        assert!(!page.contains("{{name}}"));
        assert!(page.contains("</body>"));
    }

    #[test]
    fn test_scaffold_escapes_name_in_page() {
        let temp = tempfile::tempdir().unwrap();
        let root = scaffold(temp.path(), "a<b&c>").unwrap();

        let page = fs::read_to_string(root.join("src/index.html")).unwrap();

        assert!(page.contains("<title>a&lt;b&amp;c&gt;</title>"));
        assert!(page.contains("<h1>a&lt;b&amp;c&gt;</h1>"));
        assert!(!page.contains("a<b"));
    }

    #[test]
    fn test_scaffold_twice_fails_and_keeps_files() {
        let temp = tempfile::tempdir().unwrap();
        let root = scaffold(temp.path(), "site").unwrap();
        fs::write(root.join("src/index.html"), "mine").unwrap();

        let err = scaffold(temp.path(), "site").unwrap_err();

        assert!(matches!(err, CliError::Config(ConfigError::AlreadyExists(_))));
        assert_eq!(fs::read_to_string(root.join("src/index.html")).unwrap(), "mine");
    }

    #[test]
    fn test_scaffold_rejects_empty_name() {
        let temp = tempfile::tempdir().unwrap();

        let err = scaffold(temp.path(), " ").unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
    }
}
