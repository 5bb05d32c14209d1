use std::env;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.6;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TRANSCRIPT_PATH: &str = "chat_log.txt";

/// Startup-time configuration problems. Fatal: the session never starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(
                f,
                "OPENAI_API_KEY not found. \
                 Set it as an environment variable or add it to your .env file."
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub temperature: f32,
    pub model_timeout_secs: u64,
    pub transcript_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(
        mut get_var: impl FnMut(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = get_var("OPENAI_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key,
            api_base_url: get_var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            model: get_var("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_temperature(get_var("TEMPERATURE").as_deref()),
            model_timeout_secs: parse_model_timeout_secs(
                get_var("MODEL_TIMEOUT_SECS").as_deref(),
            ),
            transcript_path: parse_transcript_path(get_var("CHAT_LOG_PATH").as_deref()),
        })
    }
}

fn parse_temperature(raw: Option<&str>) -> f32 {
    raw.and_then(|value| value.trim().parse::<f32>().ok())
        .filter(|value| (0.0..=2.0).contains(value))
        .unwrap_or(DEFAULT_TEMPERATURE)
}

fn parse_model_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS)
}

fn parse_transcript_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSCRIPT_PATH))
}
