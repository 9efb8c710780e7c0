//! Application settings.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. an optional `vpm.toml` in the working directory,
//! 3. `VPM_*` environment variables (a `.env` file is loaded first if present).
//!
//! ```toml
//! backend_url = "http://localhost:8000"
//! log_level = "debug"
//! log_format = "pretty"
//! request_timeout_secs = 30
//! max_upload_bytes = 10485760
//! ```

use std::path::{Path, PathBuf};

use capture::CaptureConfig;
use client::{ClientConfig, ClientError, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable prefix, e.g. `VPM_BACKEND_URL`.
pub const ENV_PREFIX: &str = "VPM";

/// Name of the optional settings file, without extension.
pub const CONFIG_FILE_STEM: &str = "vpm";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// How log lines are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the matching service.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// `EnvFilter` directive, e.g. `info` or `client=debug,info`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Largest query image, for local files and downloaded URLs alike.
    /// Unlimited when unset.
    #[serde(default)]
    pub max_upload_bytes: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            request_timeout_secs: None,
            connect_timeout_secs: None,
            max_upload_bytes: None,
        }
    }
}

impl AppConfig {
    /// Apply a `.env` file from the working directory or its parents, if any.
    ///
    /// Returns the file that was read so the caller can log it once logging is up.
    pub fn load_dotenv() -> Option<PathBuf> {
        dotenvy::dotenv().ok()
    }

    /// Load `vpm.toml` and `VPM_*` variables. `backend_url` (the command-line
    /// flag) replaces the loaded value before validation.
    pub fn load(backend_url: Option<&str>) -> Result<Self, AppConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false));
        Self::finish(builder, ENV_PREFIX, backend_url)
    }

    /// Like [`load`](Self::load) with an explicit TOML file and environment prefix.
    pub fn load_from(
        file: Option<&Path>,
        env_prefix: &str,
        backend_url: Option<&str>,
    ) -> Result<Self, AppConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            let name = path.to_string_lossy();
            builder = builder.add_source(config::File::new(&name, config::FileFormat::Toml));
        }
        Self::finish(builder, env_prefix, backend_url)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        env_prefix: &str,
        backend_url: Option<&str>,
    ) -> Result<Self, AppConfigError> {
        let mut cfg: AppConfig = builder
            .add_source(config::Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?
            .try_deserialize()?;
        if let Some(url) = backend_url {
            cfg.backend_url = url.to_string();
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into();
        self
    }

    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.max_upload_bytes == Some(0) {
            return Err(AppConfigError::Invalid(
                "max_upload_bytes must be positive".into(),
            ));
        }
        self.client_config().validate().map_err(|err| match err {
            ClientError::InvalidConfig(msg) => AppConfigError::Invalid(msg),
            other => AppConfigError::Invalid(other.to_string()),
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.backend_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            max_image_bytes: self.max_upload_bytes,
            ..ClientConfig::default()
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        match self.max_upload_bytes {
            Some(limit) => CaptureConfig::default().with_max_file_bytes(limit),
            None => CaptureConfig::default(),
        }
    }
}

fn default_backend_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
