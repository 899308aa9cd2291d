//! Identity-keyed cache of wrapped composites.
//!
//! The host decides whether an output changed by comparing artifact
//! identity, so handing back the *same* composite for an unchanged source
//! lets it skip re-emitting that file. Entries are keyed by the source
//! artifact's allocation, never by filename or content.
//!
//! The cache must not keep sources alive. Each entry holds only a `Weak` to
//! its source, but the composite it stores embeds the source strongly. An
//! entry is therefore reclaimed once the only strong references left to the
//! source are the ones its own composite holds: nobody can present that
//! source for lookup again. Reclamation happens on every lookup, hit or
//! miss, and on [`IdentityCache::sweep`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace};

use swaddle_core::{Source, SourceRef, WrapResult};

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered with a stored composite.
    pub hits: u64,
    /// Lookups that had to build a composite.
    pub misses: u64,
    /// Entries reclaimed because their source became unreachable.
    pub reclaimed: u64,
}

#[derive(Debug)]
struct CacheEntry {
    source: Weak<dyn Source>,
    header: String,
    footer: String,
    composite: SourceRef,
    /// Strong references to `source` owned by `composite`.
    retained: usize,
}

impl CacheEntry {
    fn is_reclaimable(&self) -> bool {
        self.source.strong_count() <= self.retained
    }

    fn is_for(&self, source: &SourceRef, header: &str, footer: &str) -> bool {
        std::ptr::addr_eq(self.source.as_ptr(), Arc::as_ptr(source))
            && self.header == header
            && self.footer == footer
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<usize, CacheEntry>,
    stats: CacheStats,
}

impl CacheState {
    fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_reclaimable());
        let reclaimed = before.saturating_sub(self.entries.len());
        self.stats.reclaimed = self.stats.reclaimed.saturating_add(reclaimed as u64);
        reclaimed
    }
}

/// Maps source artifact identity to the last composite built for it.
#[derive(Debug, Default)]
pub struct IdentityCache {
    state: Mutex<CacheState>,
}

/// A live `Weak` pins the allocation, so an address cannot be reused while
/// an entry keyed by it exists.
fn identity(source: &SourceRef) -> usize {
    Arc::as_ptr(source).cast::<()>().addr()
}

impl IdentityCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the composite previously built for `source` with exactly this
    /// `header` and `footer`, or call `build` and remember its result.
    ///
    /// # Errors
    ///
    /// Returns whatever `build` returns; nothing is cached in that case.
    pub fn get_or_build<F>(
        &self,
        source: &SourceRef,
        header: &str,
        footer: &str,
        build: F,
    ) -> WrapResult<SourceRef>
    where
        F: FnOnce() -> WrapResult<SourceRef>,
    {
        let key = identity(source);

        {
            let mut state = self.state();
            let reclaimed = state.sweep();
            if reclaimed > 0 {
                debug!(reclaimed, entries = state.entries.len(), "identity cache swept");
            }
            let hit = state
                .entries
                .get(&key)
                .filter(|entry| entry.is_for(source, header, footer))
                .map(|entry| Arc::clone(&entry.composite));
            if let Some(composite) = hit {
                state.stats.hits = state.stats.hits.saturating_add(1);
                trace!(key, "identity cache hit");
                return Ok(composite);
            }
            state.stats.misses = state.stats.misses.saturating_add(1);
        }

        let before = Arc::strong_count(source);
        let composite = build()?;
        let retained = Arc::strong_count(source).saturating_sub(before);

        let mut state = self.state();
        let superseded = state
            .entries
            .insert(
                key,
                CacheEntry {
                    source: Arc::downgrade(source),
                    header: header.to_owned(),
                    footer: footer.to_owned(),
                    composite: Arc::clone(&composite),
                    retained,
                },
            )
            .is_some();
        debug!(
            key,
            superseded,
            entries = state.entries.len(),
            "identity cache miss"
        );

        Ok(composite)
    }

    /// Whether an entry exists for `source` (under any header/footer).
    #[must_use]
    pub fn contains(&self, source: &SourceRef) -> bool {
        self.state().entries.contains_key(&identity(source))
    }

    /// Drop entries whose source is no longer reachable outside the cache,
    /// returning how many were dropped.
    pub fn sweep(&self) -> usize {
        self.state().sweep()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// Whether the cache has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().entries.is_empty()
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) {
        self.state().entries.clear();
    }

    /// Hit/miss counters so far.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.state().stats
    }
}
