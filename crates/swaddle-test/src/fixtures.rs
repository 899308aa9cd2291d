//! Test fixtures for artifacts and chunks.

use swaddle_core::{Chunk, RawSource, SourceRef};

/// A fresh artifact with the given content.
#[must_use]
pub fn raw(content: &str) -> SourceRef {
    RawSource::new(content).into_ref()
}

/// A chunk rendered in this compilation.
#[must_use]
pub fn chunk(id: &str, hash: &str, files: &[&str]) -> Chunk {
    files
        .iter()
        .fold(Chunk::new(id).with_hash(hash), |chunk, file| {
            chunk.with_file(*file)
        })
}

/// A chunk reused from an earlier compilation.
#[must_use]
pub fn stale_chunk(id: &str, hash: &str, files: &[&str]) -> Chunk {
    chunk(id, hash, files).not_rendered()
}
