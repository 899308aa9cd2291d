//! Swaddle Plugin - Wrap bundler output files in a header and footer.
//!
//! The plugin decorates already-produced output artifacts with computed
//! header and footer text (license banners, IIFE wrappers) for every file
//! whose name passes a filename test.
//!
//! # Components
//!
//! - [`matcher`]: filename tests (prefix, regex, glob, lists)
//! - [`content`]: header/footer specs and their resolution
//! - [`cache`]: identity-keyed cache of built composites
//! - [`wrapper`]: header + artifact + footer composition
//! - [`adapter`]: host hook protocol detection and registration
//!
//! # Example
//!
//! ```rust,ignore
//! use swaddle_plugin::{TestSpec, WrapSpec, WrapperOptions, WrapperPlugin};
//!
//! let plugin = WrapperPlugin::new(
//!     WrapperOptions::new()
//!         .with_header("/*! my-lib */\n")
//!         .with_footer(WrapSpec::function(|file, ctx| {
//!             Ok(format!("\n/* {file} {} */", ctx.chunk_hash()?))
//!         }))
//!         .with_test(TestSpec::regex(r"\.js$")?),
//! );
//!
//! plugin.apply(&mut compiler)?;
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod adapter;
pub mod cache;
pub mod content;
pub mod matcher;
pub mod options;
pub mod plugin;
pub mod wrapper;

pub use adapter::{HookBinding, PLUGIN_NAME, WrapPass};
pub use cache::{CacheStats, IdentityCache};
pub use content::{ContentFn, WrapSpec, resolve};
pub use matcher::{FileFilter, TestSpec, matches};
pub use options::WrapperOptions;
pub use plugin::WrapperPlugin;
pub use wrapper::Wrapper;
