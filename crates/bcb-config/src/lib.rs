// SPDX-License-Identifier: MIT OR Apache-2.0
//! Configuration loading and validation for the Baichuan bridge.
//!
//! This crate provides [`BridgeConfig`] (log level plus the
//! [`BaichuanConfig`] vendor section) together with helpers for loading from
//! TOML files, applying environment overrides, and producing advisory
//! [`ConfigWarning`]s.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use bcb_baichuan_sdk::SecretKey;
use bcb_baichuan_sdk::dialect::BaichuanConfig;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested configuration file could not be read.
    #[error("config file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The file could not be parsed as valid TOML.
    #[error("failed to parse config: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// Semantic validation failed (one or more problems).
    #[error("config validation failed: {reasons:?}")]
    ValidationError {
        /// Individual validation failure messages.
        reasons: Vec<String>,
    },
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

/// Advisory-level issues that do not prevent operation but deserve attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A credential is not configured; requests cannot be signed without it.
    MissingCredential {
        /// Name of the missing field.
        field: String,
        /// Environment variable that would supply it.
        env_var: String,
    },
    /// The request timeout is unusually large.
    LargeTimeout {
        /// Timeout value in seconds.
        secs: u64,
    },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::MissingCredential { field, env_var } => {
                write!(f, "missing credential '{field}' (set it in the config or via {env_var})")
            }
            ConfigWarning::LargeTimeout { secs } => {
                write!(f, "request timeout is unusually large ({secs}s)")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Log level override (e.g. `"debug"`, `"info"`, `"warn"`).
    pub log_level: Option<String>,

    /// Baichuan API settings.
    pub baichuan: BaichuanConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".into()),
            baichuan: BaichuanConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Environment variable overriding the API base URL.
pub const ENV_API_BASE: &str = "BAICHUAN_API_BASE";
/// Environment variable supplying the API key.
pub const ENV_API_KEY: &str = "BAICHUAN_API_KEY";
/// Environment variable supplying the signing secret.
pub const ENV_SECRET_KEY: &str = "BAICHUAN_SECRET_KEY";
/// Environment variable overriding the model.
pub const ENV_MODEL: &str = "BAICHUAN_MODEL";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "BCB_LOG_LEVEL";

/// Timeouts above this many seconds produce a warning.
const LARGE_TIMEOUT_THRESHOLD: u64 = 600;

/// Largest `top_k` the service accepts.
const MAX_TOP_K: u32 = 20;

/// Recognised log levels.
const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a [`BridgeConfig`] from an optional TOML file path.
///
/// * If `path` is `Some`, reads and parses the file.
/// * If `path` is `None`, returns [`BridgeConfig::default()`].
///
/// Environment variable overrides are applied on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<BridgeConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).map_err(|_| ConfigError::FileNotFound {
                path: p.display().to_string(),
            })?;
            parse_toml(&content)?
        }
        None => BridgeConfig::default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Parse a TOML string into a [`BridgeConfig`].
pub fn parse_toml(content: &str) -> Result<BridgeConfig, ConfigError> {
    toml::from_str::<BridgeConfig>(content).map_err(|e| ConfigError::ParseError {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

/// Apply overrides from the process environment.
///
/// See [`apply_overrides`] for the recognised variables.
pub fn apply_env_overrides(config: &mut BridgeConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup`.
///
/// Recognised variables:
/// - `BAICHUAN_API_BASE`
/// - `BAICHUAN_API_KEY`
/// - `BAICHUAN_SECRET_KEY`
/// - `BAICHUAN_MODEL`
/// - `BCB_LOG_LEVEL`
pub fn apply_overrides<F>(config: &mut BridgeConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_API_BASE) {
        config.baichuan.api_base = val;
    }
    if let Some(val) = lookup(ENV_API_KEY) {
        debug!(target: "bcb_config", "api key taken from {ENV_API_KEY}");
        config.baichuan.api_key = Some(SecretKey::new(val));
    }
    if let Some(val) = lookup(ENV_SECRET_KEY) {
        debug!(target: "bcb_config", "secret key taken from {ENV_SECRET_KEY}");
        config.baichuan.secret_key = Some(SecretKey::new(val));
    }
    if let Some(val) = lookup(ENV_MODEL) {
        config.baichuan.model = val;
    }
    if let Some(val) = lookup(ENV_LOG_LEVEL) {
        config.log_level = Some(val);
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a configuration, returning advisory warnings.
///
/// Hard errors (bad URL scheme, empty model, out-of-range sampling
/// parameters) are returned as a [`ConfigError::ValidationError`]; soft
/// issues come back as warnings.
pub fn validate_config(config: &BridgeConfig) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<ConfigWarning> = Vec::new();
    let bc = &config.baichuan;

    if let Some(ref level) = config.log_level {
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!("invalid log_level '{level}'"));
        }
    }

    if !(bc.api_base.starts_with("https://") || bc.api_base.starts_with("http://")) {
        errors.push(format!(
            "api_base '{}' must start with http:// or https://",
            bc.api_base
        ));
    }
    if bc.model.trim().is_empty() {
        errors.push("model must not be empty".into());
    }

    let params = &bc.parameters;
    if !(0.0..=1.0).contains(&params.temperature) {
        errors.push(format!(
            "temperature {} out of range (0.0..=1.0)",
            params.temperature
        ));
    }
    if !(0.0..=1.0).contains(&params.top_p) {
        errors.push(format!("top_p {} out of range (0.0..=1.0)", params.top_p));
    }
    if params.top_k > MAX_TOP_K {
        errors.push(format!(
            "top_k {} out of range (0..={MAX_TOP_K})",
            params.top_k
        ));
    }

    if bc.request_timeout_secs == 0 {
        errors.push("request_timeout_secs must be at least 1".into());
    } else if bc.request_timeout_secs > LARGE_TIMEOUT_THRESHOLD {
        warnings.push(ConfigWarning::LargeTimeout {
            secs: bc.request_timeout_secs,
        });
    }

    if bc.api_key.as_ref().is_none_or(SecretKey::is_empty) {
        warnings.push(ConfigWarning::MissingCredential {
            field: "api_key".into(),
            env_var: ENV_API_KEY.into(),
        });
    }
    if bc.secret_key.as_ref().is_none_or(SecretKey::is_empty) {
        warnings.push(ConfigWarning::MissingCredential {
            field: "secret_key".into(),
            env_var: ENV_SECRET_KEY.into(),
        });
    }

    if errors.is_empty() {
        Ok(warnings)
    } else {
        Err(ConfigError::ValidationError { reasons: errors })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
