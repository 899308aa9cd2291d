//! Pipeline phase at which wrapping happens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in the host pipeline where the wrapper runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the host's optimizers (minifiers) run.
    #[default]
    BeforeOptimization,
    /// After the host's optimizers, so minification cannot touch the
    /// header/footer text.
    AfterOptimization,
}

impl Phase {
    /// Phase for the `after_optimizations` option.
    #[must_use]
    pub fn from_after_optimizations(after: bool) -> Self {
        if after {
            Self::AfterOptimization
        } else {
            Self::BeforeOptimization
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeOptimization => write!(f, "before_optimization"),
            Self::AfterOptimization => write!(f, "after_optimization"),
        }
    }
}
