//! Console configuration
//!
//! Loaded from YAML (default `config/console.yaml`, overridable through
//! `CAMPUS_CONSOLE_CONFIG`) after `.env` has been applied.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::api::ImportTarget;
use crate::error::ConfigError;
use crate::search::SearchSettings;

/// Default configuration path
pub const DEFAULT_CONFIG_PATH: &str = "config/console.yaml";

/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`]
pub const CONFIG_PATH_ENV: &str = "CAMPUS_CONSOLE_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub import: ImportConfig,
    /// Named remote option sources (e.g. "students", "teachers")
    #[serde(default)]
    pub sources: HashMap<String, OptionSourceConfig>,
}

/// REST backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Name of the env var holding a bearer token
    #[serde(default)]
    pub token_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the bearer token from the environment, if configured
    pub fn token(&self) -> Option<String> {
        self.token_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|token| !token.trim().is_empty())
    }
}

/// Timing of the search dropdown
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_focus_delay_ms")]
    pub focus_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            focus_delay_ms: default_focus_delay_ms(),
        }
    }
}

impl SearchConfig {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            focus_delay: Duration::from_millis(self.focus_delay_ms),
        }
    }
}

/// Excel import constraints and per-target profiles
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    #[serde(default = "default_extensions")]
    pub accepted_extensions: Vec<String>,
    #[serde(default)]
    pub profiles: HashMap<ImportTarget, ImportProfile>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: default_max_file_bytes(),
            accepted_extensions: default_extensions(),
            profiles: HashMap::new(),
        }
    }
}

impl ImportConfig {
    pub fn limits(&self) -> FileLimits {
        FileLimits {
            max_bytes: self.max_file_bytes,
            extensions: self
                .accepted_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Profile for a target, falling back to the built-in one
    pub fn profile(&self, target: ImportTarget) -> ImportProfile {
        self.profiles
            .get(&target)
            .cloned()
            .unwrap_or_else(|| ImportProfile::builtin(target))
    }
}

/// What the import dialog shows for one target
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportProfile {
    pub title: String,
    /// Column hint shown above the file picker
    #[serde(default)]
    pub required_columns: Option<String>,
    pub template_file_name: String,
}

impl ImportProfile {
    pub fn builtin(target: ImportTarget) -> Self {
        let (title, columns, file) = match target {
            ImportTarget::Students => (
                "Import students (Excel)",
                None,
                "template_import_etudiants.xlsx",
            ),
            ImportTarget::TuitionPayments => (
                "Import tuition payments (Excel)",
                Some("matricule, amount, payment_method, academic_year, reference"),
                "template_paiements.xlsx",
            ),
            ImportTarget::Salaries => (
                "Import salaries (Excel)",
                Some("employee, month, year, base_salary, bonuses, deductions"),
                "template_salaires.xlsx",
            ),
            ImportTarget::Expenses => (
                "Import expenses (Excel)",
                Some("category, description, amount, date"),
                "template_depenses.xlsx",
            ),
        };
        Self {
            title: title.to_string(),
            required_columns: columns.map(str::to_string),
            template_file_name: file.to_string(),
        }
    }
}

/// Constraints checked when a file is picked
#[derive(Debug, Clone, PartialEq)]
pub struct FileLimits {
    pub max_bytes: u64,
    /// Lower-case, without the leading dot
    pub extensions: Vec<String>,
}

impl Default for FileLimits {
    fn default() -> Self {
        ImportConfig::default().limits()
    }
}

/// A REST list endpoint exposed as an option source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionSourceConfig {
    /// Path relative to the API base (e.g. "students/")
    pub path: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Template for the label (e.g. "{first_name} {last_name}")
    pub label_template: String,
    #[serde(default)]
    pub sub_label_template: Option<String>,
    #[serde(default = "default_search_param")]
    pub search_param: String,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_focus_delay_ms() -> u64 {
    100
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_extensions() -> Vec<String> {
    vec!["xlsx".to_string()]
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_search_param() -> String {
    "search".to_string()
}

impl ConsoleConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: ConsoleConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `.env`, then load from `CAMPUS_CONSOLE_CONFIG` or the default path
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "No .env file applied");
        }
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        tracing::info!(path = %path, "Loading configuration");
        Self::from_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "search.debounce_ms must be greater than zero".to_string(),
            ));
        }
        if url::Url::parse(&self.api.base_url).is_err() {
            return Err(ConfigError::Invalid(format!(
                "api.base_url '{}' is not a valid URL",
                self.api.base_url
            )));
        }
        if self.import.accepted_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "import.accepted_extensions must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Look up a named option source
    pub fn source(&self, name: &str) -> Result<&OptionSourceConfig, ConfigError> {
        self.sources
            .get(name)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown option source '{name}'")))
    }
}
