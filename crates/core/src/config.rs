//! Configuration management for knowqa.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`<workspace>/.knowqa/config.yaml`, or an explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! Relative storage paths are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Embedding providers known to the knowledge crate.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

/// Answer-synthesis providers known to the llm crate. `none` disables synthesis.
pub const KNOWN_LLM_PROVIDERS: [&str; 3] = ["gemini", "ollama", "none"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .knowqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Where uploaded documents and the persisted index live
    pub storage: StorageConfig,

    /// Chunking and search parameters
    pub retrieval: RetrievalConfig,

    /// Embedding backend selection
    pub embedding: EmbeddingSettings,

    /// Answer-synthesis backend selection
    pub llm: LlmSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Storage locations, relative to the workspace unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Directory holding the source `.txt` documents
    pub uploads_dir: PathBuf,

    /// Directory holding `vectors.bin` and `metadata.json`
    pub vector_store_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: PathBuf::from("uploads"),
            vector_store_dir: PathBuf::from("vector_store"),
        }
    }
}

/// Chunking and search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrievalConfig {
    /// Maximum words per chunk
    pub chunk_size: usize,

    /// Default number of chunks retrieved per question
    pub top_k: usize,

    /// Extension (without dot) of eligible source documents
    pub document_extension: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            top_k: 3,
            document_extension: "txt".to_string(),
        }
    }
}

/// Embedding backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbeddingSettings {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimension
    pub dimensions: usize,

    /// Endpoint for HTTP providers
    pub endpoint: Option<String>,

    /// Upper bound for a single embedding call, in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
            timeout_secs: 60,
        }
    }
}

/// Answer-synthesis backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    /// Provider name: "gemini", "ollama" or "none"
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom endpoint URL
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Resolved API key (never written back to disk)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 60,
            api_key: None,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    workspace: Option<WorkspaceConfig>,
    storage: Option<StorageConfig>,
    retrieval: Option<RetrievalConfig>,
    embedding: Option<EmbeddingSettings>,
    llm: Option<LlmSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            storage: StorageConfig::default(),
            retrieval: RetrievalConfig::default(),
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace.
    ///
    /// `workspace` and `config_file` come from the command line (which
    /// already folds in `KNOWQA_WORKSPACE` / `KNOWQA_CONFIG`).
    ///
    /// Environment variables applied after the config file:
    /// - `KNOWQA_PROVIDER`: answer-synthesis provider
    /// - `KNOWQA_MODEL`: answer-synthesis model
    /// - `KNOWQA_UPLOADS_DIR`: document directory
    /// - `KNOWQA_VECTOR_STORE_DIR`: index directory
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    /// - the variable named by `llm.apiKeyEnv` (default `GEMINI_API_KEY`)
    ///
    /// # Example
    /// ```no_run
    /// use knowqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Uploads: {:?}", config.uploads_dir());
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.knowqa_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        if let Ok(provider) = std::env::var("KNOWQA_PROVIDER") {
            config.llm.provider = provider;
        }

        if let Ok(model) = std::env::var("KNOWQA_MODEL") {
            config.llm.model = model;
        }

        if let Ok(dir) = std::env::var("KNOWQA_UPLOADS_DIR") {
            config.storage.uploads_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("KNOWQA_VECTOR_STORE_DIR") {
            config.storage.vector_store_dir = PathBuf::from(dir);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        config.llm.api_key = std::env::var(&config.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
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

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(storage) = config_file.storage {
            result.storage = storage;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment and file values.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(model) = model {
            self.llm.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
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

    /// Get the path to the .knowqa directory.
    pub fn knowqa_dir(&self) -> PathBuf {
        self.workspace.join(".knowqa")
    }

    /// Directory holding uploaded source documents.
    pub fn uploads_dir(&self) -> PathBuf {
        self.workspace.join(&self.storage.uploads_dir)
    }

    /// Directory holding the persisted index artifacts.
    pub fn vector_store_dir(&self) -> PathBuf {
        self.workspace.join(&self.storage.vector_store_dir)
    }

    /// Ensure the document and index directories exist.
    pub fn ensure_dirs(&self) -> AppResult<()> {
        for dir in [self.uploads_dir(), self.vector_store_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    AppError::Config(format!("Failed to create directory {:?}: {}", dir, e))
                })?;
            }
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.retrieval.chunk_size == 0 {
            return Err(AppError::Config(
                "retrieval.chunkSize must be at least 1".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config(
                "retrieval.topK must be at least 1".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }

        let embedding_provider = self.embedding.provider.as_str();
        if !KNOWN_EMBEDDING_PROVIDERS.contains(&embedding_provider) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        let llm_provider = self.llm.provider.as_str();
        if !KNOWN_LLM_PROVIDERS.contains(&llm_provider) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                llm_provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.retrieval.chunk_size, 500);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.embedding.provider, "trigram");
        assert_eq!(config.embedding.dimensions, 384);
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_storage_paths_resolve_against_workspace() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/qa");
        assert_eq!(config.uploads_dir(), PathBuf::from("/srv/qa/uploads"));
        assert_eq!(
            config.vector_store_dir(),
            PathBuf::from("/srv/qa/vector_store")
        );

        config.storage.uploads_dir = PathBuf::from("/data/docs");
        assert_eq!(config.uploads_dir(), PathBuf::from("/data/docs"));
    }

    #[test]
    fn test_merge_yaml_partial_sections() {
        let yaml = r#"
retrieval:
  chunkSize: 200
embedding:
  provider: ollama
  model: all-minilm
  dimensions: 384
  endpoint: http://localhost:11434
llm:
  provider: none
logging:
  level: debug
  color: false
"#;
        let merged = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(merged.retrieval.chunk_size, 200);
        // Unspecified fields in a present section fall back to defaults
        assert_eq!(merged.retrieval.top_k, 3);
        assert_eq!(merged.embedding.provider, "ollama");
        assert_eq!(merged.embedding.timeout_secs, 60);
        assert_eq!(merged.llm.provider, "none");
        assert_eq!(merged.log_level, Some("debug".to_string()));
        assert!(merged.no_color);
    }

    #[test]
    fn test_load_reads_workspace_config_file() {
        let temp = TempDir::new().unwrap();
        let knowqa_dir = temp.path().join(".knowqa");
        std::fs::create_dir_all(&knowqa_dir).unwrap();
        std::fs::write(
            knowqa_dir.join("config.yaml"),
            "storage:\n  uploadsDir: docs\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(temp.path().to_path_buf()), None).unwrap();
        assert_eq!(config.uploads_dir(), temp.path().join("docs"));
    }

    #[test]
    fn test_load_missing_workspace_fails() {
        let result = AppConfig::load(Some(PathBuf::from("/definitely/not/here")), None);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_missing_explicit_config_file_fails() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("nope.yaml")),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.llm.provider, "ollama");
        assert_eq!(overridden.llm.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = AppConfig::default();
        config.retrieval.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_unknown_providers() {
        let mut config = AppConfig::default();
        config.embedding.provider = "word2vec".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate().is_err());

        config.llm.provider = "google".to_string();
        assert!(config.validate().is_err());
    }
}
