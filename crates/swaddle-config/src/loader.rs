//! Config file loading.
//!
//! A single file is parsed, optionally overridden from `SWADDLE_*`
//! environment variables, then validated.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Overrides `logging.level`.
pub const ENV_LOG_LEVEL: &str = "SWADDLE_LOG";
/// Overrides `logging.format`.
pub const ENV_LOG_FORMAT: &str = "SWADDLE_LOG_FORMAT";
/// Overrides `wrapper.after_optimizations` (`1`/`true`/`0`/`false`).
pub const ENV_AFTER_OPTIMIZATIONS: &str = "SWADDLE_AFTER_OPTIMIZATIONS";

/// Load a config from a specific file path.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, is too large, does
/// not parse, or fails validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let content = read_capped(path)?;
    let config = load_str(&content, &path.display().to_string())?;
    info!(path = %path.display(), "loaded wrapper config");
    Ok(config)
}

/// Load a config file and apply environment overrides from the process
/// environment.
///
/// # Errors
///
/// Same as [`load_file`], with validation running after the overrides.
pub fn load_file_with_env(path: &Path) -> ConfigResult<Config> {
    let env_vars: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with("SWADDLE_"))
        .collect();
    load_file_with_env_vars(path, &env_vars)
}

/// Load a config file and apply overrides from `env_vars` instead of the
/// process environment.
///
/// # Errors
///
/// Same as [`load_file`], with validation running after the overrides.
pub fn load_file_with_env_vars(
    path: &Path,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<Config> {
    let content = read_capped(path)?;
    let mut config = parse(&content, &path.display().to_string())?;

    let applied = apply_env_overrides(&mut config, env_vars)?;
    if applied > 0 {
        debug!(count = applied, "applied environment overrides");
    }

    validate::validate(&config)?;
    info!(path = %path.display(), "loaded wrapper config");
    Ok(config)
}

/// Parse and validate TOML text. `origin` names the text in errors.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the text does not parse or fails validation.
pub fn load_str(content: &str, origin: &str) -> ConfigResult<Config> {
    let config = parse(content, origin)?;
    validate::validate(&config)?;
    Ok(config)
}

/// Apply `SWADDLE_*` overrides from `env_vars`, returning how many applied.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] when a boolean override is not
/// a recognised boolean.
pub fn apply_env_overrides(
    config: &mut Config,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<usize> {
    let mut applied = 0_usize;

    if let Some(level) = env_vars.get(ENV_LOG_LEVEL) {
        config.logging.level.clone_from(level);
        applied = applied.saturating_add(1);
    }

    if let Some(format) = env_vars.get(ENV_LOG_FORMAT) {
        config.logging.format.clone_from(format);
        applied = applied.saturating_add(1);
    }

    if let Some(raw) = env_vars.get(ENV_AFTER_OPTIMIZATIONS) {
        config.wrapper.after_optimizations = parse_bool(raw).ok_or_else(|| {
            ConfigError::ValidationError {
                field: ENV_AFTER_OPTIMIZATIONS.to_owned(),
                message: format!("expected a boolean, got '{raw}'"),
            }
        })?;
        applied = applied.saturating_add(1);
    }

    Ok(applied)
}

fn parse(content: &str, origin: &str) -> ConfigResult<Config> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: origin.to_owned(),
        source: e,
    })
}

fn read_capped(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Size is checked after reading to avoid a stat/read race.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    Ok(content)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
