//! Configuration management for docchat.
//!
//! Configuration is layered, lowest precedence first:
//! - Built-in defaults
//! - Config file (`.docchat/config.yaml` in the workspace, or `DOCCHAT_CONFIG`)
//! - Environment variables
//! - Command-line flags (see [`AppConfig::with_overrides`])

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Providers the model-service factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "openai"];

/// Upper bound on chunks handed from the selector to the synthesizer.
pub const MAX_SOURCES_LIMIT: usize = 3;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace root (contains `.docchat/`)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Location of the PDF: a local path or an http(s) URL
    pub source: String,

    /// Display title of the document; defaults to the source file name
    pub title: Option<String>,

    /// Model-service provider ("gemini", "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom API endpoint
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the service credential
    pub api_key_env: String,

    /// Credential resolved from `api_key_env`
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// HTTP timeout for model calls, in seconds
    pub timeout_secs: Option<u64>,

    /// Maximum tokens in a generated answer
    pub max_output_tokens: Option<u32>,

    /// Retrieval and synthesis settings
    pub rag: RagConfig,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Retrieval and synthesis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RagConfig {
    /// Maximum chunks the selector may return (1..=3)
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,

    /// Temperature of the selection call
    #[serde(default)]
    pub selection_temperature: f32,

    /// Temperature of the synthesis call
    #[serde(default = "default_answer_temperature")]
    pub answer_temperature: f32,
}

fn default_max_sources() -> usize {
    MAX_SOURCES_LIMIT
}

fn default_answer_temperature() -> f32 {
    0.3
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            max_sources: default_max_sources(),
            selection_temperature: 0.0,
            answer_temperature: default_answer_temperature(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    document: Option<DocumentSection>,
    llm: Option<LlmSection>,
    rag: Option<RagConfig>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentSection {
    source: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    api_key_env: Option<String>,
    timeout_secs: Option<u64>,
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
    format: Option<LogFormat>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            source: "document.pdf".to_string(),
            title: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: None,
            api_key_env: "API_KEY".to_string(),
            api_key: None,
            timeout_secs: None,
            max_output_tokens: None,
            rag: RagConfig::default(),
            log_level: None,
            log_format: LogFormat::Text,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// `workspace` and `config_file` (command-line flags) take precedence over
    /// `DOCCHAT_WORKSPACE` and `DOCCHAT_CONFIG`.
    ///
    /// Environment variables:
    /// - `DOCCHAT_WORKSPACE`: Override workspace path
    /// - `DOCCHAT_CONFIG`: Path to config file
    /// - `DOCCHAT_SOURCE`: PDF path or URL
    /// - `DOCCHAT_PROVIDER`: Model-service provider
    /// - `DOCCHAT_MODEL`: Model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// The credential is read from the variable named by `apiKeyEnv`
    /// (`API_KEY` by default). A missing credential is not an error here;
    /// it is reported when a question is asked.
    ///
    /// # Example
    /// ```no_run
    /// use docchat_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_with(None, None).expect("Failed to load config");
    /// println!("Document: {}", config.source);
    /// ```
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        let workspace =
            workspace.or_else(|| std::env::var_os("DOCCHAT_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var_os("DOCCHAT_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.docchat_dir().join("config.yaml"));

        if config_path.exists() {
            tracing::debug!("Loading config file {:?}", config_path);
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        // Environment variables override YAML config
        if let Ok(source) = std::env::var("DOCCHAT_SOURCE") {
            config.source = source;
        }

        if let Ok(provider) = std::env::var("DOCCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCCHAT_MODEL") {
            config.model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.no_color = true;
        }

        config.resolve_api_key();

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = if contents.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(contents)?
        };

        let mut result = self.clone();

        if let Some(document) = config_file.document {
            if let Some(source) = document.source {
                result.source = source;
            }
            if document.title.is_some() {
                result.title = document.title;
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(api_key_env) = llm.api_key_env {
                result.api_key_env = api_key_env;
            }
            if llm.timeout_secs.is_some() {
                result.timeout_secs = llm.timeout_secs;
            }
            if llm.max_output_tokens.is_some() {
                result.max_output_tokens = llm.max_output_tokens;
            }
        }

        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the config file and the environment.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        source: Option<String>,
        title: Option<String>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(source) = source {
            self.source = source;
        }

        if let Some(title) = title {
            self.title = Some(title);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Read the credential from the configured environment variable.
    pub fn resolve_api_key(&mut self) {
        self.api_key = std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
    }

    /// Path to the `.docchat` directory.
    pub fn docchat_dir(&self) -> PathBuf {
        self.workspace.join(".docchat")
    }

    /// Whether the source points at a remote resource.
    pub fn source_is_url(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    /// Source location with relative paths resolved against the workspace.
    pub fn resolved_source(&self) -> String {
        if self.source_is_url() {
            return self.source.clone();
        }

        let path = Path::new(&self.source);
        if path.is_absolute() {
            self.source.clone()
        } else {
            self.workspace.join(path).to_string_lossy().into_owned()
        }
    }

    /// Document title: explicit title, else the source's file name.
    pub fn document_title(&self) -> String {
        if let Some(ref title) = self.title {
            return title.clone();
        }

        self.source
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.source)
            .to_string()
    }

    /// Validate provider and retrieval settings.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model cannot be empty".to_string()));
        }

        if self.rag.max_sources == 0 || self.rag.max_sources > MAX_SOURCES_LIMIT {
            return Err(AppError::Config(format!(
                "rag.maxSources must be between 1 and {}, got {}",
                MAX_SOURCES_LIMIT, self.rag.max_sources
            )));
        }

        for (name, value) in [
            ("rag.selectionTemperature", self.rag.selection_temperature),
            ("rag.answerTemperature", self.rag.answer_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{} must be between 0.0 and 2.0, got {}",
                    name, value
                )));
            }
        }

        if self.timeout_secs == Some(0) {
            return Err(AppError::Config(
                "llm.timeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
