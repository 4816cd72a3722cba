//! Session configuration loading
//!
//! Settings come from an optional `config/default.toml` plus `VOXKIT`-
//! prefixed environment variables, environment winning. Every field has a
//! default, so a bare host runs unconfigured.

use crate::error::{SessionError, SessionResult};
use crate::generation::GenerationConfig;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::session::SessionOptions;
use crate::settings::VoiceSettings;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub history_capacity: usize,
    pub default_voice: String,
    pub progress_interval_ms: u64,
    pub load_timeout_ms: u64,
    pub words_per_second: f32,
}

impl Default for Settings {
    fn default() -> Self {
        let generation = GenerationConfig::default();
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            default_voice: "rachel".to_string(),
            progress_interval_ms: generation.progress_interval.as_millis() as u64,
            load_timeout_ms: generation.load_timeout.as_millis() as u64,
            words_per_second: generation.words_per_second,
        }
    }
}

impl Settings {
    /// Load from a specific config file path (for tests)
    pub fn from_path(config_path: impl AsRef<Path>) -> SessionResult<Self> {
        Self::load(Some(config_path.as_ref()))
    }

    /// Load from `config/default.toml` when present, then the environment
    pub fn new() -> SessionResult<Self> {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            info!("loading configuration from: {}", default_path.display());
            Self::load(Some(default_path))
        } else {
            warn!("no configuration file at 'config/default.toml'; using defaults and environment variables");
            Self::load(None)
        }
    }

    fn load(config_path: Option<&Path>) -> SessionResult<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder();

        builder = builder
            .set_default("history_capacity", defaults.history_capacity as i64)
            .unwrap()
            .set_default("default_voice", defaults.default_voice.clone())
            .unwrap()
            .set_default("progress_interval_ms", defaults.progress_interval_ms as i64)
            .unwrap()
            .set_default("load_timeout_ms", defaults.load_timeout_ms as i64)
            .unwrap()
            .set_default("words_per_second", defaults.words_per_second as f64)
            .unwrap();

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("VOXKIT")
                .separator("__")
                .list_separator(" "),
        );

        let config = builder
            .build()
            .map_err(|e| SessionError::Config(format!("failed to build config: {}", e)))?;
        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| SessionError::Config(format!("failed to deserialize settings: {}", e)))?;

        settings.validate().map_err(SessionError::Config)?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.history_capacity == 0 {
            return Err("history_capacity must be at least 1".to_string());
        }
        if self.progress_interval_ms == 0 {
            return Err("progress_interval_ms must be positive".to_string());
        }
        if self.load_timeout_ms == 0 {
            return Err("load_timeout_ms must be positive".to_string());
        }
        if !self.words_per_second.is_finite() || self.words_per_second <= 0.0 {
            return Err("words_per_second must be a positive number".to_string());
        }
        Ok(())
    }

    /// Session options derived from these settings
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            history_capacity: self.history_capacity,
            generation: GenerationConfig {
                progress_interval: Duration::from_millis(self.progress_interval_ms),
                load_timeout: Duration::from_millis(self.load_timeout_ms),
                words_per_second: self.words_per_second,
                ..GenerationConfig::default()
            },
        }
    }

    /// Voice settings seeded with the configured default voice
    pub fn default_voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            voice_id: self.default_voice.clone(),
            ..VoiceSettings::default()
        }
    }
}
