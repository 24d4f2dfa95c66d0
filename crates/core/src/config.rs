//! Configuration management for the Knowledge Hub.
//!
//! This module handles loading and merging configuration from multiple sources,
//! lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`khub.yaml` in the working directory, or `kh_config`)
//! - Environment variables (`kh_pg_conn_str`, `kh_weaviate_host`, ...)
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Concept providers the LLM factory knows how to build.
pub const KNOWN_CONCEPT_PROVIDERS: [&str; 1] = ["openai"];

/// Default config file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "khub.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// PostgreSQL connection string
    pub database_url: Option<String>,

    /// Base URL of the generative-search backend (e.g. http://localhost:8080)
    pub weaviate_url: Option<String>,

    /// API key forwarded to the concept provider and the generative backend
    pub openai_api_key: Option<String>,

    /// Port the HTTP server listens on
    pub port: u16,

    /// Log level override
    pub log_level: Option<String>,

    /// Emit logs as JSON
    pub log_json: bool,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Answer retrieval settings
    pub retrieval: RetrievalSettings,

    /// Concept extraction settings
    pub concepts: ConceptSettings,
}

/// Settings for the generative retrieval query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of nearest documents handed to grouped generation
    #[serde(rename = "resultLimit", default = "default_result_limit")]
    pub result_limit: u32,

    /// Field on each matched document that identifies its source
    #[serde(rename = "sourceField", default = "default_source_field")]
    pub source_field: String,
}

fn default_result_limit() -> u32 {
    5
}

fn default_source_field() -> String {
    "source".to_string()
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            source_field: default_source_field(),
        }
    }
}

/// Settings for the concept extraction provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptSettings {
    /// Provider name (see `KNOWN_CONCEPT_PROVIDERS`)
    #[serde(default = "default_concept_provider")]
    pub provider: String,

    /// Chat model used for extraction
    #[serde(default = "default_concept_model")]
    pub model: String,

    /// Custom API endpoint
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(rename = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

fn default_concept_provider() -> String {
    "openai".to_string()
}

fn default_concept_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for ConceptSettings {
    fn default() -> Self {
        Self {
            provider: default_concept_provider(),
            model: default_concept_model(),
            endpoint: None,
            timeout_secs: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    server: Option<ServerSection>,
    database: Option<UrlSection>,
    weaviate: Option<UrlSection>,
    retrieval: Option<RetrievalSettings>,
    concepts: Option<ConceptSettings>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerSection {
    port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UrlSection {
    url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    json: Option<bool>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            database_url: None,
            weaviate_url: None,
            openai_api_key: None,
            port: 8080,
            log_level: None,
            log_json: false,
            verbose: false,
            no_color: false,
            retrieval: RetrievalSettings::default(),
            concepts: ConceptSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `kh_pg_conn_str`: PostgreSQL connection string
    /// - `kh_weaviate_host`: generative-search backend URL
    /// - `kh_openai_access_key`: API key for concepts and generation
    /// - `kh_app_port`: HTTP port
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use khub_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Port: {}", config.port);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path.to_path_buf())
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                default_path.exists().then_some(default_path)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
        }

        config.apply_env(|name| std::env::var(name).ok())?;

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(port) = config_file.server.and_then(|s| s.port) {
            result.port = port;
        }

        if let Some(url) = config_file.database.and_then(|d| d.url) {
            result.database_url = Some(url);
        }

        if let Some(url) = config_file.weaviate.and_then(|w| w.url) {
            result.weaviate_url = Some(url);
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(concepts) = config_file.concepts {
            result.concepts = concepts;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(json) = logging.json {
                result.log_json = json;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply environment variables, read through `lookup`.
    fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("kh_pg_conn_str") {
            self.database_url = Some(url);
        }

        if let Some(url) = lookup("kh_weaviate_host") {
            self.weaviate_url = Some(url);
        }

        if let Some(key) = lookup("kh_openai_access_key") {
            self.openai_api_key = Some(key);
        }

        if let Some(port) = lookup("kh_app_port") {
            self.port = port.parse().map_err(|_| {
                AppError::Config(format!(
                    "environment variable kh_app_port is not a valid port: {}",
                    port
                ))
            })?;
        }

        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }

        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }

        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        weaviate_url: Option<String>,
        port: Option<u16>,
        log_level: Option<String>,
        log_json: bool,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = Some(database_url);
        }

        if let Some(weaviate_url) = weaviate_url {
            self.weaviate_url = Some(weaviate_url);
        }

        if let Some(port) = port {
            self.port = port;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if log_json {
            self.log_json = true;
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// PostgreSQL connection string, or a configuration error naming its source.
    pub fn require_database_url(&self) -> AppResult<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            AppError::Config("database url not set (kh_pg_conn_str or --database-url)".to_string())
        })
    }

    /// Generative backend URL, or a configuration error naming its source.
    pub fn require_weaviate_url(&self) -> AppResult<&str> {
        self.weaviate_url.as_deref().ok_or_else(|| {
            AppError::Config(
                "weaviate url not set (kh_weaviate_host or --weaviate-url)".to_string(),
            )
        })
    }

    /// API key for concepts and generation, or a configuration error.
    pub fn require_openai_api_key(&self) -> AppResult<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("kh_openai_access_key not set".to_string()))
    }

    /// Validate settings that do not depend on which command runs.
    pub fn validate(&self) -> AppResult<()> {
        if self.retrieval.result_limit == 0 {
            return Err(AppError::Config(
                "retrieval.resultLimit must be at least 1".to_string(),
            ));
        }

        if self.retrieval.source_field.trim().is_empty() {
            return Err(AppError::Config(
                "retrieval.sourceField must not be empty".to_string(),
            ));
        }

        let provider = self.concepts.provider.to_lowercase();
        if !KNOWN_CONCEPT_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown concept provider: {}. Supported: {}",
                self.concepts.provider,
                KNOWN_CONCEPT_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}
