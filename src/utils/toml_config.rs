//! TOML-based configuration for SlidesBot
//!
//! Everything is optional: a missing `slidesbot.toml` means "all defaults",
//! which is the DeepSeek setup the bot was written against and the C/C++
//! course layout (lectures 0-10 in C, 11-28 in C++).
//!
//! ```toml
//! [llm]
//! api_base = "https://api.deepseek.com"
//! api_key_env = "DEEPSEEK_API_KEY"
//! basic_model = "deepseek-chat"
//! reasoner_model = "deepseek-reasoner"
//!
//! [course]
//! root = "/srv/cs100-slides"
//!
//! [coordinator]
//! max_iterations = 10
//! ```
//!
//! Credentials never live in this file. The key is read from the environment
//! variable named by `llm.api_key_env`, or from a JSON LLM config file passed
//! with `--config-llm`, which replaces the whole `[llm]` section.

use crate::agents::SpecialistConfig;
use crate::coordinator::CoordinatorConfig;
use crate::llm::ClientSettings;
use crate::resources::{CategoryRange, ResourceLayout};
use crate::summary::SummaryConfig;
use crate::types::AppError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "slidesbot.toml";

/// Root configuration structure loaded from slidesbot.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub course: CourseConfig,

    #[serde(default)]
    pub summary: SummarySection,

    #[serde(default)]
    pub coordinator: CoordinatorSection,
}

// ============= Logging =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ============= Completion Service =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variable name containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_basic_model")]
    pub basic_model: String,

    /// Model for the deep tier. Without one, deep requests use `basic_model`.
    ///
    /// Only a missing `[llm]` section implies `deepseek-reasoner`; a written
    /// section names its own deep model or has none.
    #[serde(default)]
    pub reasoner_model: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_api_key_env() -> String {
    "DEEPSEEK_API_KEY".to_string()
}

fn default_basic_model() -> String {
    "deepseek-chat".to_string()
}

fn default_reasoner_model() -> Option<String> {
    Some("deepseek-reasoner".to_string())
}

fn default_request_timeout() -> u64 {
    300
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            basic_model: default_basic_model(),
            reasoner_model: default_reasoner_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// JSON LLM config accepted by `--config-llm`.
///
/// ```json
/// {"api_key": "sk-...", "base_url": "https://api.openai.com/v1",
///  "basic_model": "gpt-4o-mini", "reasoner_model": "o3-mini"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmCredentialsFile {
    pub api_key: String,
    pub base_url: String,
    pub basic_model: String,
    #[serde(default)]
    pub reasoner_model: Option<String>,
}

impl LlmCredentialsFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

// ============= Course Layout =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseConfig {
    /// How the course is described to the models.
    #[serde(default = "default_course_name")]
    pub name: String,

    /// Directory holding the `l<N>/` lecture folders.
    #[serde(default = "default_course_root")]
    pub root: PathBuf,

    /// Title index document, relative to `root` unless absolute.
    #[serde(default = "default_index")]
    pub index: PathBuf,

    /// Summary catalog, relative to `root` unless absolute.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    /// Category of each id sub-range.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRange>,
}

fn default_course_name() -> String {
    "an introductory C/C++ programming course".to_string()
}

fn default_course_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_index() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_catalog() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_categories() -> Vec<CategoryRange> {
    vec![
        CategoryRange::new("C", 0, 10),
        CategoryRange::new("C++", 11, 28),
    ]
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            name: default_course_name(),
            root: default_course_root(),
            index: default_index(),
            catalog: default_catalog(),
            categories: default_categories(),
        }
    }
}

impl CourseConfig {
    pub fn index_path(&self) -> PathBuf {
        self.root.join(&self.index)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(&self.catalog)
    }

    /// The id space for a course with `count` lectures.
    pub fn layout(&self, count: u32) -> ResourceLayout {
        ResourceLayout::new(count, self.categories.clone())
    }
}

// ============= Engines =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySection {
    #[serde(default = "default_summary_workers")]
    pub max_workers: usize,

    #[serde(default = "default_summary_attempts")]
    pub max_attempts: usize,
}

fn default_summary_workers() -> usize {
    12
}

fn default_summary_attempts() -> usize {
    3
}

impl Default for SummarySection {
    fn default() -> Self {
        Self {
            max_workers: default_summary_workers(),
            max_attempts: default_summary_attempts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorSection {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    #[serde(default = "default_coordinator_workers")]
    pub max_workers: usize,

    #[serde(default = "default_forced_answer_attempts")]
    pub forced_answer_attempts: usize,

    #[serde(default = "default_specialist_temperature")]
    pub specialist_temperature: f32,
}

fn default_max_iterations() -> usize {
    8
}

fn default_coordinator_workers() -> usize {
    8
}

fn default_forced_answer_attempts() -> usize {
    3
}

fn default_specialist_temperature() -> f32 {
    0.3
}

impl Default for CoordinatorSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_workers: default_coordinator_workers(),
            forced_answer_attempts: default_forced_answer_attempts(),
            specialist_temperature: default_specialist_temperature(),
        }
    }
}

// ============= Loading =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse LLM config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl BotConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Like [`BotConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: BotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the engines cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if self.llm.api_base.trim().is_empty() {
            return invalid("llm.api_base must not be empty".to_string());
        }
        if self.llm.basic_model.trim().is_empty() {
            return invalid("llm.basic_model must not be empty".to_string());
        }
        if matches!(&self.llm.reasoner_model, Some(model) if model.trim().is_empty()) {
            return invalid(
                "llm.reasoner_model must not be empty; omit it to use basic_model".to_string(),
            );
        }
        if self.llm.request_timeout_secs == 0 {
            return invalid("llm.request_timeout_secs must be positive".to_string());
        }
        for category in &self.course.categories {
            if category.first > category.last {
                return invalid(format!(
                    "course.categories: '{}' has first {} > last {}",
                    category.name, category.first, category.last
                ));
            }
        }
        for (name, value) in [
            ("summary.max_workers", self.summary.max_workers),
            ("summary.max_attempts", self.summary.max_attempts),
            ("coordinator.max_workers", self.coordinator.max_workers),
            (
                "coordinator.forced_answer_attempts",
                self.coordinator.forced_answer_attempts,
            ),
        ] {
            if value == 0 {
                return invalid(format!("{} must be at least 1", name));
            }
        }
        if !(0.0..=2.0).contains(&self.coordinator.specialist_temperature) {
            return invalid(format!(
                "coordinator.specialist_temperature must be within 0.0-2.0, got {}",
                self.coordinator.specialist_temperature
            ));
        }

        Ok(())
    }

    /// Get the API key from the environment
    pub fn api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(self.llm.api_key_env.clone()))
    }

    /// Resolve connection settings, preferring a `--config-llm` file when given.
    pub fn client_settings(
        &self,
        credentials: Option<&LlmCredentialsFile>,
    ) -> Result<ClientSettings, ConfigError> {
        let timeout = Duration::from_secs(self.llm.request_timeout_secs);
        match credentials {
            Some(file) => Ok(ClientSettings {
                api_base: file.base_url.clone(),
                api_key: file.api_key.clone(),
                basic_model: file.basic_model.clone(),
                reasoner_model: file
                    .reasoner_model
                    .clone()
                    .filter(|model| !model.trim().is_empty()),
                timeout,
            }),
            None => Ok(ClientSettings {
                api_base: self.llm.api_base.clone(),
                api_key: self.api_key()?,
                basic_model: self.llm.basic_model.clone(),
                reasoner_model: self.llm.reasoner_model.clone(),
                timeout,
            }),
        }
    }

    pub fn summary_config(&self) -> SummaryConfig {
        SummaryConfig {
            max_workers: self.summary.max_workers,
            max_attempts: self.summary.max_attempts,
            course_name: self.course.name.clone(),
        }
    }

    pub fn specialist_config(&self) -> SpecialistConfig {
        SpecialistConfig {
            course_name: self.course.name.clone(),
            temperature: self.coordinator.specialist_temperature,
        }
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            max_iterations: self.coordinator.max_iterations,
            max_workers: self.coordinator.max_workers,
            forced_answer_attempts: self.coordinator.forced_answer_attempts,
            course_name: self.course.name.clone(),
        }
    }
}
