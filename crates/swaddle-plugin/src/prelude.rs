//! Prelude module - commonly used types for convenient import.
//!
//! Use `use swaddle_plugin::prelude::*;` to import all essential types.

// Plugin and options
pub use crate::{WrapperOptions, WrapperPlugin};

// Content and filename tests
pub use crate::{TestSpec, WrapSpec};

// Shared core types
pub use swaddle_core::{HashContext, Phase, WrapError, WrapResult};
