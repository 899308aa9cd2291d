//! Hash context passed to hash-dependent content.

use serde::{Deserialize, Serialize};

use crate::error::{WrapError, WrapResult};

/// Identifies the current build and chunk for function-valued header/footer
/// content.
///
/// Which fields are present depends on the hook that triggered wrapping: the
/// chunk-based hooks supply both, the staged asset hook supplies neither.
/// Use the accessors rather than the raw fields so that a missing hash is an
/// error instead of silently becoming an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashContext {
    /// Build-wide hash of the compilation.
    #[serde(default, rename = "hash")]
    pub build_hash: Option<String>,
    /// Hash of the chunk whose file is being wrapped.
    #[serde(default, rename = "chunkhash")]
    pub chunk_hash: Option<String>,
}

impl HashContext {
    /// A context with no hashes at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A context for a chunk file.
    #[must_use]
    pub fn new(build_hash: Option<String>, chunk_hash: Option<String>) -> Self {
        Self {
            build_hash,
            chunk_hash,
        }
    }

    /// Set the build hash.
    #[must_use]
    pub fn with_build_hash(mut self, hash: impl Into<String>) -> Self {
        self.build_hash = Some(hash.into());
        self
    }

    /// Set the chunk hash.
    #[must_use]
    pub fn with_chunk_hash(mut self, hash: impl Into<String>) -> Self {
        self.chunk_hash = Some(hash.into());
        self
    }

    /// The build hash.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::InvalidHashContext`] when the triggering phase has
    /// no build hash.
    pub fn build_hash(&self) -> WrapResult<&str> {
        self.build_hash
            .as_deref()
            .ok_or(WrapError::InvalidHashContext { field: "hash" })
    }

    /// The chunk hash.
    ///
    /// # Errors
    ///
    /// Returns [`WrapError::InvalidHashContext`] when the triggering phase has
    /// no chunk-level hash.
    pub fn chunk_hash(&self) -> WrapResult<&str> {
        self.chunk_hash
            .as_deref()
            .ok_or(WrapError::InvalidHashContext { field: "chunkhash" })
    }

    /// Whether neither hash is available.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.build_hash.is_none() && self.chunk_hash.is_none()
    }
}
