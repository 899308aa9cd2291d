//! Swaddle Test - Shared test utilities for Swaddle.
//!
//! This crate provides a scriptable mock host (compiler and compilation) and
//! test helpers that can be used across Swaddle crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! swaddle-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use swaddle_test::{HostProfile, MockCompiler, fixtures};
//!
//! let mut compiler = MockCompiler::new(HostProfile::Legacy);
//! plugin.apply(&mut compiler)?;
//!
//! let mut compilation = compiler
//!     .compilation()
//!     .with_chunk(fixtures::chunk("main", "abc123", &["main.js"]))
//!     .with_asset("main.js", fixtures::raw("run();"));
//! compiler.compile(&mut compilation)?;
//!
//! assert_eq!(compilation.asset_text("main.js").unwrap(), "/* banner */run();");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use harness::*;
pub use mocks::*;
