//! Error types for wrapping operations.

use thiserror::Error;

use crate::host::HookKind;

/// Errors that can occur while configuring, registering, or running the
/// wrapper stage.
#[derive(Debug, Error)]
pub enum WrapError {
    /// Constructor input was rejected before any host interaction.
    #[error("invalid configuration for '{field}': {message}")]
    InvalidConfiguration {
        /// The offending option.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// The host exposes none of the asset hook protocols this stage can use.
    #[error("unsupported host version: {required}")]
    UnsupportedHostVersion {
        /// Description of the hook (or hooks) that were looked for.
        required: String,
    },

    /// Header/footer content referenced a hash that the current phase does
    /// not provide.
    #[error("hash context field '{field}' is not available in this phase")]
    InvalidHashContext {
        /// The missing field (`hash` or `chunkhash`).
        field: &'static str,
    },

    /// Error raised by a user-supplied content function, passed through as is.
    #[error(transparent)]
    Content(Box<dyn std::error::Error + Send + Sync>),
}

impl WrapError {
    /// Build an [`InvalidConfiguration`](Self::InvalidConfiguration) error.
    #[must_use]
    pub fn invalid_configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Build an [`UnsupportedHostVersion`](Self::UnsupportedHostVersion) error
    /// for a single missing hook.
    #[must_use]
    pub fn unsupported_hook(hook: HookKind) -> Self {
        Self::UnsupportedHostVersion {
            required: format!("host does not expose the '{hook}' hook"),
        }
    }

    /// Wrap an arbitrary error raised by a content function.
    pub fn content<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Content(error.into())
    }

    /// Whether this error should stop the build before it starts
    /// (configuration or registration problems).
    #[must_use]
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. } | Self::UnsupportedHostVersion { .. }
        )
    }
}

/// Result type for wrapping operations.
pub type WrapResult<T> = Result<T, WrapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_error_is_transparent() {
        let err = WrapError::content("banner service unavailable");
        assert_eq!(err.to_string(), "banner service unavailable");
        assert!(!err.is_setup_error());
    }

    #[test]
    fn test_setup_errors() {
        assert!(WrapError::invalid_configuration("header", "bad").is_setup_error());
        assert!(WrapError::unsupported_hook(HookKind::ProcessAssets).is_setup_error());
        assert!(!WrapError::InvalidHashContext { field: "chunkhash" }.is_setup_error());
    }

    #[test]
    fn test_error_messages() {
        let err = WrapError::invalid_configuration("options", "expected an object");
        assert_eq!(
            err.to_string(),
            "invalid configuration for 'options': expected an object"
        );

        let err = WrapError::unsupported_hook(HookKind::OptimizeChunkAssets);
        assert!(err.to_string().contains("optimize_chunk_assets"));

        let err = WrapError::InvalidHashContext { field: "chunkhash" };
        assert!(err.to_string().contains("chunkhash"));
    }
}
