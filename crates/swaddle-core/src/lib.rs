//! Swaddle Core - Foundation types for the Swaddle asset wrapper.
//!
//! This crate provides:
//! - The [`Source`] artifact model (`RawSource`, `ConcatSource`)
//! - The host boundary: [`Compiler`] and [`Compilation`] traits, chunks and
//!   the three asset hook protocols
//! - [`HashContext`] for hash-dependent header/footer content
//! - The [`WrapError`] taxonomy shared by every Swaddle crate

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod error;
pub mod hash_context;
pub mod host;
pub mod phase;
pub mod source;

pub use error::{WrapError, WrapResult};
pub use hash_context::HashContext;
pub use host::{
    AssetsListener, AsyncChunksListener, Chunk, ChunksListener, Compilation, CompilationListener,
    Compiler, Done, HookKind, ProcessAssetsStage,
};
pub use phase::Phase;
pub use source::{ConcatPart, ConcatSource, RawSource, Source, SourceRef};
