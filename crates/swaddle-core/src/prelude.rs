//! Prelude module - commonly used types for convenient import.
//!
//! Use `use swaddle_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{WrapError, WrapResult};

// Artifacts
pub use crate::{ConcatSource, RawSource, Source, SourceRef};

// Host boundary
pub use crate::{Chunk, Compilation, Compiler, Done, HookKind, ProcessAssetsStage};

// Wrapping context
pub use crate::{HashContext, Phase};
