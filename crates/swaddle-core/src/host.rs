//! Host build tool boundary.
//!
//! The host drives compilation and owns the chunk list and the asset table.
//! Swaddle only sees it through the [`Compiler`] and [`Compilation`] traits
//! below. Hosts differ in which asset hook they expose; see [`HookKind`].
//!
//! All listeners are invoked on the host's single compilation thread. They
//! are `Send` only so that a host may move them between compilations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WrapError, WrapResult};
use crate::source::SourceRef;

/// The asset hook protocols a host may expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    /// Synchronous hook fired with the chunk batch after chunk assets were
    /// optimized. No completion signal.
    AfterOptimizeChunkAssets,
    /// Staged asset processing hook. Fired once per tapped stage with the
    /// whole asset table and no chunk information.
    ProcessAssets,
    /// Asynchronous hook fired with the chunk batch before chunk assets are
    /// optimized. The listener must signal completion through [`Done`].
    OptimizeChunkAssets,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AfterOptimizeChunkAssets => write!(f, "after_optimize_chunk_assets"),
            Self::ProcessAssets => write!(f, "process_assets"),
            Self::OptimizeChunkAssets => write!(f, "optimize_chunk_assets"),
        }
    }
}

/// Stages of the staged asset processing hook, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessAssetsStage {
    /// Add additional assets to the compilation.
    Additional,
    /// Basic preprocessing of assets.
    PreProcess,
    /// Derive new assets from existing ones.
    Derived,
    /// Add additional sections to existing assets, like a banner.
    Additions,
    /// Optimize existing assets in a general way.
    Optimize,
    /// Optimize the count of existing assets.
    OptimizeCount,
    /// Optimize the compatibility of existing assets.
    OptimizeCompatibility,
    /// Optimize the size of existing assets (minification).
    OptimizeSize,
    /// Add development tooling, like source maps.
    DevTooling,
    /// Optimize the number of existing assets by inlining them.
    OptimizeInline,
    /// Summarize the list of existing assets.
    Summarize,
    /// Optimize the hashes of the assets.
    OptimizeHash,
    /// Optimize the transfer of existing assets.
    OptimizeTransfer,
    /// Analyse existing assets.
    Analyse,
    /// Create assets for reporting purposes.
    Report,
}

impl ProcessAssetsStage {
    /// Numeric stage value as hosts order taps.
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            Self::Additional => -2000,
            Self::PreProcess => -1000,
            Self::Derived => -200,
            Self::Additions => -100,
            Self::Optimize => 100,
            Self::OptimizeCount => 200,
            Self::OptimizeCompatibility => 300,
            Self::OptimizeSize => 400,
            Self::DevTooling => 500,
            Self::OptimizeInline => 700,
            Self::Summarize => 1000,
            Self::OptimizeHash => 2500,
            Self::OptimizeTransfer => 3000,
            Self::Analyse => 4000,
            Self::Report => 5000,
        }
    }

    /// Whether this stage runs after the host's size optimization.
    #[must_use]
    pub fn is_after_optimization(self) -> bool {
        self > Self::OptimizeSize
    }
}

impl fmt::Display for ProcessAssetsStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Additional => "additional",
            Self::PreProcess => "pre_process",
            Self::Derived => "derived",
            Self::Additions => "additions",
            Self::Optimize => "optimize",
            Self::OptimizeCount => "optimize_count",
            Self::OptimizeCompatibility => "optimize_compatibility",
            Self::OptimizeSize => "optimize_size",
            Self::DevTooling => "dev_tooling",
            Self::OptimizeInline => "optimize_inline",
            Self::Summarize => "summarize",
            Self::OptimizeHash => "optimize_hash",
            Self::OptimizeTransfer => "optimize_transfer",
            Self::Analyse => "analyse",
            Self::Report => "report",
        };
        write!(f, "{name}")
    }
}

/// A host-defined group of output files sharing a build-time hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk identifier (name or numeric id rendered as text).
    pub id: String,
    /// Content hash of the chunk, if the host computed one.
    #[serde(default)]
    pub hash: Option<String>,
    /// Whether the chunk was rendered in this compilation. Chunks reused from
    /// a previous compilation keep their previously wrapped assets.
    #[serde(default = "default_rendered")]
    pub rendered: bool,
    /// Output filenames produced by this chunk.
    #[serde(default)]
    pub files: Vec<String>,
}

fn default_rendered() -> bool {
    true
}

impl Chunk {
    /// Create a freshly rendered chunk with no files.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hash: None,
            rendered: true,
            files: Vec::new(),
        }
    }

    /// Set the chunk hash.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Add an output file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.files.push(file.into());
        self
    }

    /// Mark the chunk as reused from a previous compilation.
    #[must_use]
    pub fn not_rendered(mut self) -> Self {
        self.rendered = false;
        self
    }
}

/// Completion handle for [`HookKind::OptimizeChunkAssets`] listeners.
///
/// The host stays suspended at that phase until `finish` is called.
pub struct Done {
    callback: Box<dyn FnOnce(WrapResult<()>) + Send>,
}

impl Done {
    /// Create a completion handle around the host's continuation.
    pub fn new(callback: impl FnOnce(WrapResult<()>) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Signal completion, passing any error to the host.
    pub fn finish(self, result: WrapResult<()>) {
        (self.callback)(result);
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done").finish_non_exhaustive()
    }
}

/// Listener for the compilation-start notification.
pub type CompilationListener = Box<dyn FnMut(&mut dyn Compilation) -> WrapResult<()> + Send>;

/// Listener for the synchronous chunk hook.
pub type ChunksListener = Box<dyn FnMut(&mut dyn Compilation, &[Chunk]) -> WrapResult<()> + Send>;

/// Listener for the staged asset hook.
pub type AssetsListener = Box<dyn FnMut(&mut dyn Compilation) -> WrapResult<()> + Send>;

/// Listener for the asynchronous chunk hook.
pub type AsyncChunksListener = Box<dyn FnMut(&mut dyn Compilation, &[Chunk], Done) + Send>;

/// The host's compiler: the object plugins are applied to.
pub trait Compiler {
    /// Whether compilations created by this compiler expose `hook`.
    fn supports(&self, hook: HookKind) -> bool;

    /// Register a listener for every compilation this compiler starts.
    fn tap_compilation(&mut self, plugin: &str, listener: CompilationListener);
}

/// One compilation: the chunk list, asset table and build hash.
///
/// The `tap_*` methods default to failing with
/// [`WrapError::UnsupportedHostVersion`]; hosts override the ones they expose.
pub trait Compilation {
    /// Build-wide hash, once the host has computed it.
    fn hash(&self) -> Option<&str>;

    /// Names of every asset currently in the asset table.
    fn asset_names(&self) -> Vec<String>;

    /// Current artifact for `filename`.
    fn asset(&self, filename: &str) -> Option<SourceRef>;

    /// Replace the artifact stored under `filename`.
    fn set_asset(&mut self, filename: &str, source: SourceRef);

    /// Tap [`HookKind::AfterOptimizeChunkAssets`].
    ///
    /// # Errors
    ///
    /// Fails when the host does not expose the hook.
    fn tap_after_optimize_chunk_assets(
        &mut self,
        plugin: &str,
        listener: ChunksListener,
    ) -> WrapResult<()> {
        let _ = (plugin, listener);
        Err(WrapError::unsupported_hook(HookKind::AfterOptimizeChunkAssets))
    }

    /// Tap [`HookKind::ProcessAssets`] at `stage`.
    ///
    /// # Errors
    ///
    /// Fails when the host does not expose the hook.
    fn tap_process_assets(
        &mut self,
        plugin: &str,
        stage: ProcessAssetsStage,
        listener: AssetsListener,
    ) -> WrapResult<()> {
        let _ = (plugin, stage, listener);
        Err(WrapError::unsupported_hook(HookKind::ProcessAssets))
    }

    /// Tap [`HookKind::OptimizeChunkAssets`].
    ///
    /// # Errors
    ///
    /// Fails when the host does not expose the hook.
    fn tap_optimize_chunk_assets(
        &mut self,
        plugin: &str,
        listener: AsyncChunksListener,
    ) -> WrapResult<()> {
        let _ = (plugin, listener);
        Err(WrapError::unsupported_hook(HookKind::OptimizeChunkAssets))
    }
}
