//! Mock host implementations for testing.
//!
//! [`MockCompiler`] and [`MockCompilation`] model a bundler exposing a
//! configurable subset of the asset hook protocols. A compilation runs its
//! hooks in the host's order:
//!
//! 1. staged taps up to [`ProcessAssetsStage::Additions`]
//! 2. the asynchronous chunk hook, waiting on each listener's [`Done`]
//! 3. staged taps from [`ProcessAssetsStage::Optimize`] to
//!    [`ProcessAssetsStage::OptimizeSize`], then the optimizer (if any)
//! 4. the synchronous after-optimize chunk hook
//! 5. the remaining staged taps

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use swaddle_core::{
    AssetsListener, AsyncChunksListener, Chunk, ChunksListener, Compilation, CompilationListener,
    Compiler, Done, HookKind, ProcessAssetsStage, RawSource, SourceRef, WrapError,
    WrapResult,
};

/// Which asset hooks a mock host exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProfile {
    /// Synchronous and asynchronous chunk hooks, no staged hook.
    Legacy,
    /// Staged hook plus the deprecated synchronous chunk hook.
    Staged,
    /// Staged hook only.
    StagedOnly,
    /// Asynchronous chunk hook only.
    AsyncOnly,
    /// Synchronous after-optimize chunk hook only.
    SyncOnly,
    /// No asset hook at all.
    Bare,
}

impl HostProfile {
    /// Hooks exposed by this profile.
    #[must_use]
    pub fn hooks(self) -> &'static [HookKind] {
        match self {
            Self::Legacy => &[
                HookKind::AfterOptimizeChunkAssets,
                HookKind::OptimizeChunkAssets,
            ],
            Self::Staged => &[HookKind::ProcessAssets, HookKind::AfterOptimizeChunkAssets],
            Self::StagedOnly => &[HookKind::ProcessAssets],
            Self::AsyncOnly => &[HookKind::OptimizeChunkAssets],
            Self::SyncOnly => &[HookKind::AfterOptimizeChunkAssets],
            Self::Bare => &[],
        }
    }

    /// Whether this profile exposes `hook`.
    #[must_use]
    pub fn supports(self, hook: HookKind) -> bool {
        self.hooks().contains(&hook)
    }
}

/// Mock compiler: collects compilation listeners and runs compilations.
pub struct MockCompiler {
    profile: HostProfile,
    listeners: Vec<(String, CompilationListener)>,
}

impl MockCompiler {
    /// Create a compiler exposing the hooks of `profile`.
    #[must_use]
    pub fn new(profile: HostProfile) -> Self {
        Self {
            profile,
            listeners: Vec::new(),
        }
    }

    /// The host profile.
    #[must_use]
    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    /// Number of compilation listeners tapped so far.
    #[must_use]
    pub fn tap_count(&self) -> usize {
        self.listeners.len()
    }

    /// A new, empty compilation with this compiler's profile.
    #[must_use]
    pub fn compilation(&self) -> MockCompilation {
        MockCompilation::new(self.profile)
    }

    /// Notify every listener that `compilation` started, then run it.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a compilation listener or surfaced
    /// by an asset hook listener.
    pub fn compile(&mut self, compilation: &mut MockCompilation) -> WrapResult<()> {
        for (plugin, listener) in &mut self.listeners {
            debug!(plugin = %plugin, "Starting compilation");
            listener(compilation)?;
        }
        compilation.run()
    }
}

impl Compiler for MockCompiler {
    fn supports(&self, hook: HookKind) -> bool {
        self.profile.supports(hook)
    }

    fn tap_compilation(&mut self, plugin: &str, listener: CompilationListener) {
        self.listeners.push((plugin.to_owned(), listener));
    }
}

impl std::fmt::Debug for MockCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCompiler")
            .field("profile", &self.profile)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

struct StagedTap {
    plugin: String,
    stage: ProcessAssetsStage,
    listener: AssetsListener,
}

type DoneSlot = Arc<Mutex<Option<WrapResult<()>>>>;

/// Mock compilation: chunk list, asset table, build hash and tapped hooks.
pub struct MockCompilation {
    profile: HostProfile,
    hash: Option<String>,
    chunks: Vec<Chunk>,
    assets: BTreeMap<String, SourceRef>,
    optimizer: Option<fn(&str) -> String>,
    after_optimize: Vec<(String, ChunksListener)>,
    process_assets: Vec<StagedTap>,
    optimize_async: Vec<(String, AsyncChunksListener)>,
    events: Vec<String>,
    done_count: usize,
}

impl MockCompilation {
    /// Create an empty compilation exposing the hooks of `profile`.
    #[must_use]
    pub fn new(profile: HostProfile) -> Self {
        Self {
            profile,
            hash: None,
            chunks: Vec::new(),
            assets: BTreeMap::new(),
            optimizer: None,
            after_optimize: Vec::new(),
            process_assets: Vec::new(),
            optimize_async: Vec::new(),
            events: Vec::new(),
            done_count: 0,
        }
    }

    /// Set the build hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Add a chunk.
    #[must_use]
    pub fn with_chunk(mut self, chunk: Chunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    /// Add an asset.
    #[must_use]
    pub fn with_asset(mut self, filename: impl Into<String>, source: SourceRef) -> Self {
        self.assets.insert(filename.into(), source);
        self
    }

    /// Rewrite every asset with `optimizer` during the optimize stages, the
    /// way a minifier would.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: fn(&str) -> String) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Linearized content of an asset.
    #[must_use]
    pub fn asset_text(&self, filename: &str) -> Option<String> {
        self.assets
            .get(filename)
            .map(|source| source.source().into_owned())
    }

    /// Hook invocations so far, as `hook:plugin` (`hook:stage:plugin` for the
    /// staged hook).
    #[must_use]
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Hooks with at least one listener.
    #[must_use]
    pub fn tapped(&self) -> Vec<HookKind> {
        let mut hooks = Vec::new();
        if !self.after_optimize.is_empty() {
            hooks.push(HookKind::AfterOptimizeChunkAssets);
        }
        if !self.process_assets.is_empty() {
            hooks.push(HookKind::ProcessAssets);
        }
        if !self.optimize_async.is_empty() {
            hooks.push(HookKind::OptimizeChunkAssets);
        }
        hooks
    }

    /// Stages tapped on the staged hook.
    #[must_use]
    pub fn tapped_stages(&self) -> Vec<ProcessAssetsStage> {
        self.process_assets.iter().map(|tap| tap.stage).collect()
    }

    /// Number of completion signals received from asynchronous listeners.
    #[must_use]
    pub fn done_count(&self) -> usize {
        self.done_count
    }

    /// Run the asset hooks in host order.
    ///
    /// # Errors
    ///
    /// Returns the first error a listener returned or passed to its
    /// completion handle, or an error if an asynchronous listener never
    /// signalled completion.
    pub fn run(&mut self) -> WrapResult<()> {
        self.run_stages(|stage| stage <= ProcessAssetsStage::Additions)?;
        self.run_optimize_async()?;
        self.run_stages(|stage| {
            stage >= ProcessAssetsStage::Optimize && stage <= ProcessAssetsStage::OptimizeSize
        })?;
        self.optimize();
        self.run_after_optimize()?;
        self.run_stages(ProcessAssetsStage::is_after_optimization)
    }

    fn run_stages(&mut self, select: impl Fn(ProcessAssetsStage) -> bool) -> WrapResult<()> {
        let mut taps = std::mem::take(&mut self.process_assets);
        taps.sort_by_key(|tap| tap.stage);

        let mut result = Ok(());
        for tap in taps.iter_mut().filter(|tap| select(tap.stage)) {
            self.events.push(format!(
                "{}:{}:{}",
                HookKind::ProcessAssets,
                tap.stage,
                tap.plugin
            ));
            if let Err(e) = (tap.listener)(self) {
                result = Err(e);
                break;
            }
        }

        taps.append(&mut self.process_assets);
        self.process_assets = taps;
        result
    }

    fn run_optimize_async(&mut self) -> WrapResult<()> {
        let mut taps = std::mem::take(&mut self.optimize_async);
        let chunks = self.chunks.clone();

        let mut result = Ok(());
        for (plugin, listener) in &mut taps {
            self.events
                .push(format!("{}:{plugin}", HookKind::OptimizeChunkAssets));
            let slot: DoneSlot = Arc::new(Mutex::new(None));
            let sink = Arc::clone(&slot);
            let done = Done::new(move |outcome| {
                *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
            });

            listener(self, &chunks, done);

            let outcome = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
            match outcome {
                Some(Ok(())) => self.done_count = self.done_count.saturating_add(1),
                Some(Err(e)) => {
                    self.done_count = self.done_count.saturating_add(1);
                    result = Err(e);
                    break;
                },
                None => {
                    result = Err(WrapError::content(format!(
                        "'{plugin}' never signalled completion"
                    )));
                    break;
                },
            }
        }

        taps.append(&mut self.optimize_async);
        self.optimize_async = taps;
        result
    }

    fn optimize(&mut self) {
        let Some(optimizer) = self.optimizer else {
            return;
        };
        for source in self.assets.values_mut() {
            *source = RawSource::new(optimizer(&source.source())).into_ref();
        }
        self.events.push("optimize".to_owned());
    }

    fn run_after_optimize(&mut self) -> WrapResult<()> {
        let mut taps = std::mem::take(&mut self.after_optimize);
        let chunks = self.chunks.clone();

        let mut result = Ok(());
        for (plugin, listener) in &mut taps {
            self.events
                .push(format!("{}:{plugin}", HookKind::AfterOptimizeChunkAssets));
            if let Err(e) = listener(self, &chunks) {
                result = Err(e);
                break;
            }
        }

        taps.append(&mut self.after_optimize);
        self.after_optimize = taps;
        result
    }

    fn check(&self, hook: HookKind) -> WrapResult<()> {
        if self.profile.supports(hook) {
            Ok(())
        } else {
            Err(WrapError::unsupported_hook(hook))
        }
    }
}

impl Compilation for MockCompilation {
    fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn asset_names(&self) -> Vec<String> {
        self.assets.keys().cloned().collect()
    }

    fn asset(&self, filename: &str) -> Option<SourceRef> {
        self.assets.get(filename).map(Arc::clone)
    }

    fn set_asset(&mut self, filename: &str, source: SourceRef) {
        self.assets.insert(filename.to_owned(), source);
    }

    fn tap_after_optimize_chunk_assets(
        &mut self,
        plugin: &str,
        listener: ChunksListener,
    ) -> WrapResult<()> {
        self.check(HookKind::AfterOptimizeChunkAssets)?;
        self.after_optimize.push((plugin.to_owned(), listener));
        Ok(())
    }

    fn tap_process_assets(
        &mut self,
        plugin: &str,
        stage: ProcessAssetsStage,
        listener: AssetsListener,
    ) -> WrapResult<()> {
        self.check(HookKind::ProcessAssets)?;
        self.process_assets.push(StagedTap {
            plugin: plugin.to_owned(),
            stage,
            listener,
        });
        Ok(())
    }

    fn tap_optimize_chunk_assets(
        &mut self,
        plugin: &str,
        listener: AsyncChunksListener,
    ) -> WrapResult<()> {
        self.check(HookKind::OptimizeChunkAssets)?;
        self.optimize_async.push((plugin.to_owned(), listener));
        Ok(())
    }
}

impl std::fmt::Debug for MockCompilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCompilation")
            .field("profile", &self.profile)
            .field("hash", &self.hash)
            .field("chunks", &self.chunks)
            .field("assets", &self.asset_names())
            .field("tapped", &self.tapped())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_profiles() {
        assert!(HostProfile::Legacy.supports(HookKind::OptimizeChunkAssets));
        assert!(!HostProfile::Legacy.supports(HookKind::ProcessAssets));
        assert!(HostProfile::Bare.hooks().is_empty());
    }

    #[test]
    fn test_unsupported_tap_fails() {
        let mut compilation = MockCompilation::new(HostProfile::SyncOnly);
        let err = compilation
            .tap_process_assets(
                "p",
                ProcessAssetsStage::Additions,
                Box::new(|_: &mut dyn Compilation| Ok(())),
            )
            .unwrap_err();
        assert!(matches!(err, WrapError::UnsupportedHostVersion { .. }));
    }

    #[test]
    fn test_hook_order() {
        let mut compilation = MockCompilation::new(HostProfile::Staged)
            .with_asset("a.js", fixtures::raw("a"))
            .with_optimizer(str::to_uppercase);
        compilation
            .tap_process_assets(
                "late",
                ProcessAssetsStage::Report,
                Box::new(|_: &mut dyn Compilation| Ok(())),
            )
            .unwrap();
        compilation
            .tap_process_assets(
                "early",
                ProcessAssetsStage::Additions,
                Box::new(|_: &mut dyn Compilation| Ok(())),
            )
            .unwrap();
        compilation
            .tap_after_optimize_chunk_assets(
                "sync",
                Box::new(|_: &mut dyn Compilation, _: &[Chunk]| Ok(())),
            )
            .unwrap();

        compilation.run().unwrap();

        assert_eq!(
            compilation.events(),
            [
                "process_assets:additions:early",
                "optimize",
                "after_optimize_chunk_assets:sync",
                "process_assets:report:late",
            ]
        );
        assert_eq!(compilation.asset_text("a.js").unwrap(), "A");
    }

    #[test]
    fn test_async_listener_must_finish() {
        let mut compilation = MockCompilation::new(HostProfile::AsyncOnly);
        compilation
            .tap_optimize_chunk_assets(
                "forgetful",
                Box::new(|_: &mut dyn Compilation, _: &[Chunk], _done: Done| {}),
            )
            .unwrap();

        let err = compilation.run().unwrap_err();
        assert!(err.to_string().contains("never signalled completion"));
        assert_eq!(compilation.done_count(), 0);
    }

    #[test]
    fn test_async_error_surfaces() {
        let mut compilation = MockCompilation::new(HostProfile::AsyncOnly);
        compilation
            .tap_optimize_chunk_assets(
                "failing",
                Box::new(|_: &mut dyn Compilation, _: &[Chunk], done: Done| {
                    done.finish(Err(WrapError::content("bad banner")));
                }),
            )
            .unwrap();

        let err = compilation.run().unwrap_err();
        assert_eq!(err.to_string(), "bad banner");
        assert_eq!(compilation.done_count(), 1);
    }

    #[test]
    fn test_compile_runs_compilation_listeners_first() {
        let mut compiler = MockCompiler::new(HostProfile::SyncOnly);
        compiler.tap_compilation(
            "p",
            Box::new(|compilation: &mut dyn Compilation| {
                compilation.set_asset("added.js", fixtures::raw("new"));
                Ok(())
            }),
        );

        let mut compilation = compiler.compilation();
        compiler.compile(&mut compilation).unwrap();
        assert_eq!(compilation.asset_text("added.js").unwrap(), "new");
        assert_eq!(compiler.tap_count(), 1);
    }
}
