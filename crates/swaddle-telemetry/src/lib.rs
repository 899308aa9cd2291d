//! Swaddle Telemetry - Logging for the Swaddle asset wrapper.
//!
//! This crate provides configurable `tracing` subscriber setup with several
//! output formats and targets.
//!
//! # Example
//!
//! ```rust,no_run
//! use swaddle_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), swaddle_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("swaddle_plugin=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("wrapper ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
