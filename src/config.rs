use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://us-central1-krishisaarathi.cloudfunctions.net/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hertz: u32,
    // Name of the environment variable holding the recognizer API key.
    // The key itself never lives in the config file.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: default_speech_endpoint(),
            language_code: default_language_code(),
            sample_rate_hertz: default_sample_rate(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_speech_endpoint() -> String {
    "https://speech.googleapis.com/v1/speech:recognize".to_string()
}
fn default_language_code() -> String {
    "en-US".to_string()
}
fn default_sample_rate() -> u32 {
    48_000
}
fn default_api_key_env() -> String {
    "SPEECH_TO_TEXT_API_KEY".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageConfig {
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            quality: default_quality(),
        }
    }
}

fn default_max_dimension() -> u32 {
    800
}
fn default_quality() -> u8 {
    80
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    #[serde(default = "default_profile_path")]
    pub path: PathBuf,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            path: default_profile_path(),
        }
    }
}

fn default_profile_path() -> PathBuf {
    PathBuf::from("./data/profile.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            speech: SpeechConfig::default(),
            image: ImageConfig::default(),
            server: ServerConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }
    if config.image.max_dimension == 0 {
        anyhow::bail!("image.max_dimension must be > 0");
    }
    if !(1..=100).contains(&config.image.quality) {
        anyhow::bail!("image.quality must be in 1..=100");
    }
    if config.speech.sample_rate_hertz == 0 {
        anyhow::bail!("speech.sample_rate_hertz must be > 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.image.max_dimension, 800);
        assert_eq!(config.image.quality, 80);
        assert_eq!(config.server.bind, "127.0.0.1:8787");
        assert_eq!(config.speech.api_key_env, "SPEECH_TO_TEXT_API_KEY");
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let config: Config = toml::from_str(
            r#"
[api]
base_url = "http://localhost:9100"

[image]
max_dimension = 1024
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:9100");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.image.max_dimension, 1024);
    }

    #[test]
    fn invalid_quality_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[image]\nquality = 0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("quality"));
    }
}
