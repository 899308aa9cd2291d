//! Prelude module - commonly used test types for convenient import.
//!
//! Use `use swaddle_test::prelude::*;` to import all essential test types.

pub use crate::fixtures;
pub use crate::harness::{setup_test_logging, setup_test_logging_default};
pub use crate::mocks::{HostProfile, MockCompilation, MockCompiler};
