use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub speech: SpeechConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset means requests wait as long as the service takes.
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    pub azure_speech_key: String,
    pub azure_speech_region: String,
    pub azure_voice_name: String,
    pub output_dir: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            azure_speech_key: String::new(),
            azure_speech_region: String::new(),
            azure_voice_name: "fi-FI-SelmaNeural".to_string(),
            output_dir: "audio".to_string(),
        }
    }
}

impl SpeechConfig {
    pub fn has_azure_credentials(&self) -> bool {
        !self.azure_speech_key.trim().is_empty() && !self.azure_speech_region.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "spoken_finnish=info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Config> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            return Ok(Config::default());
        }

        let config_content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("could not read config file {}: {}", path.display(), e))?;
        Self::parse(&config_content)
    }

    pub fn parse(content: &str) -> Result<Config> {
        let config: Config = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("could not parse config file: {}", e))?;
        if config.api.base_url.trim().is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }
        Ok(config)
    }
}
