use std::net::SocketAddr;
use std::time::Duration;

use crate::llm::prompt::{PersonaPrompt, DEFAULT_PERSONA_PROMPT};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";
/// Callum, from the ElevenLabs voice library.
pub const DEFAULT_VOICE_ID: &str = "N2lVS1w4EtoT3dr4eOWO";
pub const DEFAULT_TTS_MODEL_ID: &str = "eleven_monolingual_v1";
/// Development front-end hosts.
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://127.0.0.1:5500", "http://localhost:5500"];

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error("{name} must be between 0 and 1, got {value}")]
    OutOfRange { name: &'static str, value: f32 },

    #[error("ALLOWED_ORIGINS must list at least one origin")]
    NoOrigins,

    #[error("PERSONA_PROMPT must contain a {{text}} placeholder")]
    PromptWithoutPlaceholder,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub prompt: PersonaPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub gemini: GeminiConfig,
    pub elevenlabs: ElevenLabsConfig,
    pub allowed_origins: Vec<String>,
    pub upstream_timeout: Duration,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Empty values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let gemini_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;
        let elevenlabs_key =
            get("ELEVENLABS_API_KEY").ok_or(ConfigError::Missing("ELEVENLABS_API_KEY"))?;

        let port = parse_or("PORT", get("PORT"), 5000u16)?;
        let timeout_secs = parse_or("UPSTREAM_TIMEOUT_SECS", get("UPSTREAM_TIMEOUT_SECS"), 30u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "UPSTREAM_TIMEOUT_SECS",
                value: "0".into(),
            });
        }

        let defaults = VoiceSettings::default();
        let voice_settings = VoiceSettings {
            stability: unit_interval(
                "TTS_STABILITY",
                parse_or("TTS_STABILITY", get("TTS_STABILITY"), defaults.stability)?,
            )?,
            similarity_boost: unit_interval(
                "TTS_SIMILARITY_BOOST",
                parse_or(
                    "TTS_SIMILARITY_BOOST",
                    get("TTS_SIMILARITY_BOOST"),
                    defaults.similarity_boost,
                )?,
            )?,
        };

        let prompt = PersonaPrompt::new(or_default("PERSONA_PROMPT", DEFAULT_PERSONA_PROMPT))
            .ok_or(ConfigError::PromptWithoutPlaceholder)?;

        let allowed_origins: Vec<String> = match get("ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(|o| o.trim().trim_end_matches('/').to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };
        if allowed_origins.is_empty() {
            return Err(ConfigError::NoOrigins);
        }

        Ok(Self {
            host: or_default("HOST", "127.0.0.1"),
            port,
            gemini: GeminiConfig {
                api_key: gemini_key,
                base_url: or_default("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
                model: or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                prompt,
            },
            elevenlabs: ElevenLabsConfig {
                api_key: elevenlabs_key,
                base_url: or_default("ELEVENLABS_BASE_URL", DEFAULT_ELEVENLABS_BASE_URL),
                voice_id: or_default("ELEVENLABS_VOICE_ID", DEFAULT_VOICE_ID),
                model_id: or_default("ELEVENLABS_MODEL_ID", DEFAULT_TTS_MODEL_ID),
                voice_settings,
            },
            allowed_origins,
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: "HOST",
                value: self.host.clone(),
            })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { name, value })
    }
}
