//! The wrapper plugin.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tracing::info;

use swaddle_config::{Config, ConfigError, WrapperSection};
use swaddle_core::{Compiler, Phase, WrapError, WrapResult};

use crate::adapter::{self, HookBinding, WrapPass};
use crate::cache::CacheStats;
use crate::options::WrapperOptions;

/// Wraps matching output files in a header and footer.
///
/// Construct it with validated [`WrapperOptions`], then hand it to the host,
/// which calls [`WrapperPlugin::apply`] once.
#[derive(Debug)]
pub struct WrapperPlugin {
    pass: Arc<WrapPass>,
    phase: Phase,
    binding: Mutex<Option<HookBinding>>,
}

impl WrapperPlugin {
    /// Create a plugin from options.
    #[must_use]
    pub fn new(options: WrapperOptions) -> Self {
        Self {
            pass: Arc::new(WrapPass::from_options(&options)),
            phase: options.phase(),
            binding: Mutex::new(None),
        }
    }

    /// Create a plugin from loosely typed host options.
    ///
    /// # Errors
    ///
    /// Returns [`swaddle_core::WrapError::InvalidConfiguration`] if the options
    /// are not an object or a field is malformed.
    pub fn from_value(value: &Value) -> WrapResult<Self> {
        WrapperOptions::from_value(value).map(Self::new)
    }

    /// Create a plugin from the `[wrapper]` section of a config file.
    ///
    /// # Errors
    ///
    /// Returns [`swaddle_core::WrapError::InvalidConfiguration`] if a filename
    /// pattern does not compile.
    pub fn from_config(section: &WrapperSection) -> WrapResult<Self> {
        WrapperOptions::try_from(section).map(Self::new)
    }

    /// Create a plugin from a TOML config file, honouring `SWADDLE_*`
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`swaddle_core::WrapError::InvalidConfiguration`] if the file
    /// cannot be read, parsed or validated.
    pub fn from_config_file(path: &Path) -> WrapResult<Self> {
        let config = Config::load_file_with_env(path).map_err(config_error)?;
        Self::from_config(&config.wrapper)
    }

    /// Like [`from_config_file`](Self::from_config_file), with overrides
    /// taken from `env_vars` rather than the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`from_config_file`](Self::from_config_file).
    pub fn from_config_file_with_env(
        path: &Path,
        env_vars: &HashMap<String, String>,
    ) -> WrapResult<Self> {
        let config = Config::load_file_with_env_vars(path, env_vars).map_err(config_error)?;
        Self::from_config(&config.wrapper)
    }

    /// Register with the host.
    ///
    /// Detects the host's asset hook protocol and taps it for every
    /// compilation. Applying twice taps twice, as with any plugin applied
    /// to the same compiler twice.
    ///
    /// # Errors
    ///
    /// Returns [`swaddle_core::WrapError::UnsupportedHostVersion`] if the host
    /// exposes no hook that can serve the configured phase.
    pub fn apply(&self, compiler: &mut dyn Compiler) -> WrapResult<()> {
        let binding = adapter::attach(compiler, Arc::clone(&self.pass), self.phase)?;
        info!(
            hook = %binding.hook,
            phase = %binding.phase,
            stage = ?binding.stage,
            "Wrapper plugin applied"
        );
        *self.binding.lock().unwrap_or_else(PoisonError::into_inner) = Some(binding);
        Ok(())
    }

    /// Configured phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Hook selected by the last successful [`apply`](Self::apply).
    #[must_use]
    pub fn binding(&self) -> Option<HookBinding> {
        *self.binding.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Composite cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.pass.wrapper().cache().stats()
    }

    /// Number of cached composites.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.pass.wrapper().cache().len()
    }
}

fn config_error(error: ConfigError) -> WrapError {
    match error {
        ConfigError::ValidationError { field, message } => {
            WrapError::invalid_configuration(field, message)
        },
        other => WrapError::invalid_configuration("config", other.to_string()),
    }
}
