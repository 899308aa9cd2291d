#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! File-based configuration for the Swaddle wrapper stage.
//!
//! Hosts usually build `WrapperOptions` in code. This crate covers the case
//! where the header, footer and filename test live in a TOML file next to
//! the build, together with logging settings.
//!
//! # Usage
//!
//! ```rust,no_run
//! use swaddle_config::Config;
//!
//! let config = Config::load_file(std::path::Path::new("swaddle.toml")).unwrap();
//! println!("after optimizations: {}", config.wrapper.after_optimizations);
//! ```
//!
//! # Design
//!
//! This crate has **no dependencies on other internal swaddle crates**.
//! Conversion into plugin options happens in `swaddle-plugin`, and into a
//! logging setup in `swaddle-telemetry` (feature `config`).

/// Configuration error types.
pub mod error;
/// Configuration file loading and environment overrides.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

// Re-export primary types at the crate root.
pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl Config {
    /// Load configuration from a single file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Load configuration from a file, then apply `SWADDLE_*` environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or the
    /// overridden configuration fails validation.
    pub fn load_file_with_env(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file_with_env(path)
    }

    /// Load configuration from a file, then apply overrides from an explicit
    /// `SWADDLE_*` variable map.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load_file_with_env`].
    pub fn load_file_with_env_vars(
        path: &std::path::Path,
        env_vars: &std::collections::HashMap<String, String>,
    ) -> ConfigResult<Self> {
        loader::load_file_with_env_vars(path, env_vars)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the text cannot be parsed or fails
    /// validation.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::load_str(content, "<inline>")
    }
}
