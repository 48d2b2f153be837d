//! Configuration for the tour assistant.
//!
//! Supports a `.env` file, environment variables and a YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{Result, TourError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Dotenv file read from the working directory at start-up.
pub const ENV_FILE: &str = ".env";

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL for the LLM API, including the version segment
    /// (e.g., "https://api.openai.com/v1")
    pub api_base: String,

    /// API key for authentication
    pub api_key: String,

    /// Model name (e.g., "gpt-4o-mini")
    pub model: String,

    /// Maximum tokens for response (optional)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (optional)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Whole-request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.4
}

fn default_llm_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Open-Meteo endpoints used by the weather tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many consecutive tool-call rounds a single user turn may take.
    pub max_tool_rounds: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { max_tool_rounds: 8 }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM settings
    pub llm: LlmConfig,
    /// Weather tool settings
    pub weather: WeatherConfig,
    /// Chat loop settings
    pub chat: ChatConfig,
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    llm: Option<LlmFileSection>,
    weather: Option<WeatherFileSection>,
    chat: Option<ChatFileSection>,
}

#[derive(Debug, Deserialize)]
struct LlmFileSection {
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WeatherFileSection {
    geocoding_url: Option<String>,
    forecast_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ChatFileSection {
    max_tool_rounds: Option<usize>,
}

impl Config {
    /// Load configuration from `.env`, environment variables and an optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (API_KEY, BASE_URL, TOUR_MODEL, ...), including
    ///    those supplied by `.env`
    /// 2. Config file (~/.config/tour-assistant/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        load_dotenv(Path::new(ENV_FILE))?;

        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                tracing::debug!("Reading config file {}", config_path.display());
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Override values from an environment lookup.
    ///
    /// `API_KEY` wins over `OPENAI_API_KEY`. Unparseable numbers are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.llm.api_key = api_key;
        }

        if let Some(api_base) = lookup("BASE_URL") {
            if !api_base.trim().is_empty() {
                self.llm.api_base = api_base;
            }
        }

        if let Some(model) = lookup("TOUR_MODEL") {
            self.llm.model = model;
        }

        if let Some(max_tokens) = lookup("TOUR_MAX_TOKENS") {
            if let Ok(tokens) = max_tokens.parse() {
                self.llm.max_tokens = tokens;
            }
        }

        if let Some(temperature) = lookup("TOUR_TEMPERATURE") {
            if let Ok(temp) = temperature.parse() {
                self.llm.temperature = temp;
            }
        }

        if let Some(timeout) = lookup("TOUR_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.llm.timeout_secs = secs;
            }
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TourError::io(path, e))?;

        let file_config: ConfigFile = serde_yaml::from_str(&content)
            .map_err(|e| TourError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();

        if let Some(llm) = file_config.llm {
            if let Some(api_base) = llm.api_base {
                config.llm.api_base = api_base;
            }
            if let Some(api_key) = llm.api_key {
                config.llm.api_key = api_key;
            }
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(max_tokens) = llm.max_tokens {
                config.llm.max_tokens = max_tokens;
            }
            if let Some(temperature) = llm.temperature {
                config.llm.temperature = temperature;
            }
            if let Some(timeout) = llm.timeout_secs {
                config.llm.timeout_secs = timeout;
            }
        }

        if let Some(weather) = file_config.weather {
            if let Some(url) = weather.geocoding_url {
                config.weather.geocoding_url = url;
            }
            if let Some(url) = weather.forecast_url {
                config.weather.forecast_url = url;
            }
            if let Some(timeout) = weather.timeout_secs {
                config.weather.timeout_secs = timeout;
            }
        }

        if let Some(chat) = file_config.chat {
            if let Some(rounds) = chat.max_tool_rounds {
                config.chat.max_tool_rounds = rounds;
            }
        }

        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tour-assistant")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that required configuration is present.
    ///
    /// Runs before any client is built, so a missing key never reaches the network.
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() {
            return Err(TourError::MissingApiKey);
        }

        if self.llm.api_base.trim().is_empty() {
            return Err(TourError::Config(
                "LLM API base URL is required. Set BASE_URL or add api_base to the config file."
                    .to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(TourError::Config(
                "LLM model is required. Set TOUR_MODEL or add model to the config file."
                    .to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(TourError::Config("llm.timeout_secs must be at least 1".to_string()));
        }

        if self.chat.max_tool_rounds == 0 {
            return Err(TourError::Config("chat.max_tool_rounds must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Create a config from explicit values (useful for testing).
    pub fn with_llm(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm: LlmConfig {
                api_base: api_base.into(),
                api_key: api_key.into(),
                model: model.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Load variables from a dotenv file without overriding the real environment.
///
/// A missing file is not an error.
pub fn load_dotenv(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            tracing::debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(TourError::Config(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}
