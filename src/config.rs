//! Runtime configuration for the encoder and the expiry controller.
//! Loaded from TOML, then overridden by `LATESEARCH_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Width of every token embedding row
    pub dim: usize,
    /// Hard cap on document tokens, whatever the corpus looks like
    pub model_max_tokens: usize,
    /// Query tokens kept after truncation
    pub query_max_tokens: usize,
    /// Lower bound of the dynamic document length
    pub min_inference_tokens: usize,
    /// Texts sampled when estimating the length distribution
    pub length_sample_size: usize,
    /// Texts encoded per batch
    pub batch_size: usize,
    /// Hash key material; two encoders agree only if their seeds do
    pub seed: String,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            dim: 128,
            model_max_tokens: 512,
            query_max_tokens: 32,
            min_inference_tokens: 256,
            length_sample_size: 1000,
            batch_size: 32,
            seed: "latesearch".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrieverConfig {
    pub encoder: EncoderConfig,
    /// Countdown before a non-forced clear deletes the store
    pub clear_delay_secs: u64,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            clear_delay_secs: 10,
        }
    }
}

impl RetrieverConfig {
    /// Preset for demos and tests: narrow vectors, short documents.
    pub fn small() -> Self {
        Self {
            encoder: EncoderConfig {
                dim: 64,
                model_max_tokens: 256,
                min_inference_tokens: 64,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Defaults, then `.env`, then process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let mut config = Self::default();
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Overrides fields from any key/value source.
    ///
    /// # Recognised variables
    /// - `LATESEARCH_DIM`
    /// - `LATESEARCH_MODEL_MAX_TOKENS`
    /// - `LATESEARCH_QUERY_MAX_TOKENS`
    /// - `LATESEARCH_BATCH_SIZE`
    /// - `LATESEARCH_CLEAR_DELAY_SECS`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { var, value })
        }

        if let Some(v) = lookup("LATESEARCH_DIM") {
            self.encoder.dim = parse("LATESEARCH_DIM", v)?;
        }
        if let Some(v) = lookup("LATESEARCH_MODEL_MAX_TOKENS") {
            self.encoder.model_max_tokens = parse("LATESEARCH_MODEL_MAX_TOKENS", v)?;
        }
        if let Some(v) = lookup("LATESEARCH_QUERY_MAX_TOKENS") {
            self.encoder.query_max_tokens = parse("LATESEARCH_QUERY_MAX_TOKENS", v)?;
        }
        if let Some(v) = lookup("LATESEARCH_BATCH_SIZE") {
            self.encoder.batch_size = parse("LATESEARCH_BATCH_SIZE", v)?;
        }
        if let Some(v) = lookup("LATESEARCH_CLEAR_DELAY_SECS") {
            self.clear_delay_secs = parse("LATESEARCH_CLEAR_DELAY_SECS", v)?;
        }

        self.validate()
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_secs(self.clear_delay_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let enc = &self.encoder;
        let checks = [
            (enc.dim, "dim"),
            (enc.model_max_tokens, "model_max_tokens"),
            (enc.query_max_tokens, "query_max_tokens"),
            (enc.batch_size, "batch_size"),
            (enc.length_sample_size, "length_sample_size"),
        ];
        for (value, name) in checks {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be > 0", name)));
            }
        }
        Ok(())
    }
}
