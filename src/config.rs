use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::parser::ExtractOptions;

const ENV_PREFIX: &str = "SNIPPETS";
const DEFAULT_FILE: &str = "snippets";

/// Runtime settings: defaults, then `snippets.toml` (or `--config`), then `SNIPPETS_*` env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub docs_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub max_retries: u32,
    pub db_path: PathBuf,
    pub output_path: PathBuf,
    pub plugin_name: String,
    /// Top heading of the docs page. Snippets titled or pathed exactly like it are dropped.
    pub boilerplate: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docs_url: "https://wp-staging.com/docs/actions-and-filters/".into(),
            user_agent: concat!("snippet_importer/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
            max_redirects: 5,
            max_retries: 3,
            db_path: "data/snippets.sqlite".into(),
            output_path: "data/custom-snippets.php".into(),
            plugin_name: "Custom Snippets".into(),
            boilerplate: Some("Actions and Filters – Customize WP Staging".into()),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured boilerplate heading, `None` when unset or blank.
    pub fn boilerplate(&self) -> Option<&str> {
        self.boilerplate
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            boilerplate: self.boilerplate().map(str::to_string),
        }
    }
}
